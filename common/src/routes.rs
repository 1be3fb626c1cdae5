// common/src/routes.rs
use serde::{Deserialize, Serialize};

/// Ordered list of path prefixes that need an authenticated session.
///
/// Matching is a plain string prefix test, so `/dashboard` also covers
/// `/dashboards` and `/dashboard/settings`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtectedRouteSet {
    prefixes: Vec<String>,
}

impl ProtectedRouteSet {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    /// Parse a comma separated prefix list, skipping blanks
    pub fn parse_list(raw: &str) -> Self {
        let prefixes = raw
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();
        Self { prefixes }
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}
