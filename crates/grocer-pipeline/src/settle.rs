//! Bounded polling for external-process output to become visible.
//!
//! The scraper and parser may still be flushing files after they exit.
//! Rather than sleeping a fixed amount, callers poll for a concrete
//! condition and give up after [`SettlePolicy::max_polls`] attempts.
//!
//! Polling only observes; nothing is re-run.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    pub poll_interval: Duration,
    /// Total number of probes, including the first. Always at least 1.
    pub max_polls: u32,
}

impl SettlePolicy {
    #[must_use]
    pub fn new(poll_interval: Duration, max_polls: u32) -> Self {
        Self {
            poll_interval,
            max_polls: max_polls.max(1),
        }
    }

    /// Sleep between probes with ±25 % jitter so concurrent waiters do not
    /// hit the filesystem in lockstep.
    async fn pause(&self) {
        if self.poll_interval.is_zero() {
            return;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let delay_ms =
            (self.poll_interval.as_millis() as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(250), 8)
    }
}

/// Probes until `probe` yields a value or the policy is exhausted.
pub async fn poll_until<T, F, Fut>(policy: SettlePolicy, what: &str, mut probe: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for attempt in 1..=policy.max_polls {
        if let Some(value) = probe().await {
            tracing::debug!(what, attempt, "settled");
            return Some(value);
        }
        if attempt < policy.max_polls {
            policy.pause().await;
        }
    }
    tracing::debug!(what, max_polls = policy.max_polls, "gave up waiting");
    None
}

/// Waits until the set of `*.{extension}` files in `dir` stops changing.
///
/// A listing counts as settled once two consecutive non-empty probes agree
/// on every file name and size. When the policy runs out first, the last
/// listing is returned as-is (possibly empty). A missing directory lists as
/// empty.
pub async fn wait_for_stable_listing(
    dir: &Path,
    extension: &str,
    policy: SettlePolicy,
) -> Vec<PathBuf> {
    let mut previous: Option<Vec<(PathBuf, u64)>> = None;

    for attempt in 1..=policy.max_polls {
        let current = list_with_sizes(dir, extension).await;
        if !current.is_empty() && previous.as_ref() == Some(&current) {
            tracing::debug!(dir = %dir.display(), attempt, files = current.len(), "listing settled");
            return into_paths(current);
        }
        previous = Some(current);
        if attempt < policy.max_polls {
            policy.pause().await;
        }
    }

    let last = previous.unwrap_or_default();
    if !last.is_empty() && policy.max_polls > 1 {
        tracing::warn!(
            dir = %dir.display(),
            files = last.len(),
            "directory still changing after settle window; using latest listing"
        );
    }
    into_paths(last)
}

async fn list_with_sizes(dir: &Path, extension: &str) -> Vec<(PathBuf, u64)> {
    let mut found = Vec::new();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return found,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot list directory");
            return found;
        }
    };

    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                    continue;
                }
                if let Ok(meta) = entry.metadata().await {
                    if meta.is_file() {
                        found.push((path, meta.len()));
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "directory listing interrupted");
                break;
            }
        }
    }

    found.sort();
    found
}

fn into_paths(listing: Vec<(PathBuf, u64)>) -> Vec<PathBuf> {
    listing.into_iter().map(|(path, _)| path).collect()
}
