/// Result of a best-effort orchestration step.
///
/// Collaborator processes can fail in part (one storefront out of five) or
/// leave usable output despite a non-zero exit, so a plain `Result` loses
/// information. Callers decide per operation whether `PartialSuccess` is
/// acceptable.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    PartialSuccess(T, Vec<String>),
    Failure(String),
}

impl<T> Outcome<T> {
    /// `Success` when `warnings` is empty, otherwise `PartialSuccess`.
    #[must_use]
    pub fn from_parts(value: T, warnings: Vec<String>) -> Self {
        if warnings.is_empty() {
            Outcome::Success(value)
        } else {
            Outcome::PartialSuccess(value, warnings)
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        match self {
            Outcome::PartialSuccess(_, warnings) => warnings,
            Outcome::Success(_) | Outcome::Failure(_) => &[],
        }
    }

    /// Accepts only a clean success; anything else becomes a single error message.
    ///
    /// # Errors
    ///
    /// Returns the failure reason, or the joined warnings of a partial success.
    pub fn strict(self) -> Result<T, String> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::PartialSuccess(_, warnings) => Err(warnings.join("; ")),
            Outcome::Failure(reason) => Err(reason),
        }
    }

    /// Accepts success and partial success, returning the value with any warnings.
    ///
    /// # Errors
    ///
    /// Returns the failure reason.
    pub fn lenient(self) -> Result<(T, Vec<String>), String> {
        match self {
            Outcome::Success(value) => Ok((value, Vec::new())),
            Outcome::PartialSuccess(value, warnings) => Ok((value, warnings)),
            Outcome::Failure(reason) => Err(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_without_warnings_is_success() {
        assert_eq!(Outcome::from_parts(1, vec![]), Outcome::Success(1));
    }

    #[test]
    fn strict_rejects_partial_success() {
        let outcome = Outcome::from_parts(1, vec!["a".into(), "b".into()]);
        assert_eq!(outcome.strict(), Err("a; b".to_string()));
    }

    #[test]
    fn lenient_keeps_warnings() {
        let outcome = Outcome::from_parts(7, vec!["zepto failed".into()]);
        assert_eq!(outcome.warnings(), ["zepto failed"]);
        let (value, warnings) = outcome.lenient().unwrap();
        assert_eq!(value, 7);
        assert_eq!(warnings, ["zepto failed"]);
    }

    #[test]
    fn lenient_rejects_failure() {
        let outcome: Outcome<()> = Outcome::Failure("spawn failed".into());
        assert_eq!(outcome.lenient(), Err("spawn failed".to_string()));
    }
}
