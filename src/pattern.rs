//! The glob that `ListFiles` filters blob names by.

use crate::config::ConfigError;
use glob::{MatchOptions, Pattern};
use std::fmt;
use std::str::FromStr;

/// The pattern used when none is configured.
pub const DEFAULT_LIST_PATTERN: &str = "*.txt";

// `*` stays within one path segment, so `*.txt` does not list `dir/a.txt`.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A glob over blob names, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPattern(Pattern);

impl ListPattern {
    /// Compile a glob. See [`glob::Pattern`] for the syntax.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self(Pattern::new(pattern)?))
    }

    /// Whether `name` is listed.
    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        self.0.matches_with(name, MATCH_OPTIONS)
    }

    /// The glob as written.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for ListPattern {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self(Pattern::new(DEFAULT_LIST_PATTERN).expect("default listing pattern is a valid glob"))
    }
}

impl FromStr for ListPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ListPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
