use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Identifiers of every storefront the scraper knows how to drive.
pub const SUPPORTED_SITES: [&str; 5] = ["dmart", "jiomart", "naturesbasket", "zepto", "swiggy"];

/// The closed set of grocery storefronts accepted at query boundaries.
///
/// Artifacts on disk may carry any `site` string; only query arguments are
/// validated against this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Dmart,
    Jiomart,
    Naturesbasket,
    Zepto,
    Swiggy,
}

impl Site {
    pub const ALL: [Site; 5] = [
        Site::Dmart,
        Site::Jiomart,
        Site::Naturesbasket,
        Site::Zepto,
        Site::Swiggy,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Site::Dmart => "dmart",
            Site::Jiomart => "jiomart",
            Site::Naturesbasket => "naturesbasket",
            Site::Zepto => "zepto",
            Site::Swiggy => "swiggy",
        }
    }

    /// Case-insensitive equality against a raw `site` value read from an artifact.
    #[must_use]
    pub fn matches(self, raw: &str) -> bool {
        raw.eq_ignore_ascii_case(self.as_str())
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Site {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Site::ALL
            .into_iter()
            .find(|site| site.as_str() == lowered)
            .ok_or(CoreError::UnsupportedSite(lowered))
    }
}
