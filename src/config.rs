//! Startup configuration of the gateway.

use crate::pattern::ListPattern;
use std::fmt;
use std::str::FromStr;

/// An invalid configuration value.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The container name was empty.
    #[error("container name must not be empty")]
    EmptyContainer,
    /// The container name contained a path separator.
    #[error("container name {0:?} must not contain a path separator")]
    ContainerSeparator(String),
    /// The container name started with a dot.
    #[error("container name {0:?} must not start with `.`")]
    HiddenContainer(String),
    /// The listing pattern was not a valid glob.
    #[error("invalid listing pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// The name of the container all requests are forwarded to.
///
/// A container name is non-empty, does not contain `/` or `\`, and does not start with `.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Container(String);

impl Container {
    /// Validate and wrap a container name.
    pub fn new<S>(name: S) -> Result<Self, ConfigError>
    where
        S: Into<String>,
    {
        let name = name.into();
        if name.is_empty() {
            Err(ConfigError::EmptyContainer)
        } else if name.contains(['/', '\\']) {
            Err(ConfigError::ContainerSeparator(name))
        } else if name.starts_with('.') {
            Err(ConfigError::HiddenContainer(name))
        } else {
            Ok(Self(name))
        }
    }

    /// The container name.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Container {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Container {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What content the gateway accepts and serves.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "binary", derive(clap::ValueEnum))]
pub enum ContentPolicy {
    /// Bytes pass through verbatim.
    #[default]
    Binary,
    /// Content must be valid UTF-8, both on upload and on download.
    #[cfg_attr(feature = "binary", clap(alias = "text"))]
    Utf8,
}

impl fmt::Display for ContentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Binary => "binary",
            Self::Utf8 => "utf8",
        })
    }
}

/// Configuration fixed for the lifetime of a gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    container: Container,
    list_pattern: ListPattern,
    content_policy: ContentPolicy,
}

impl GatewayConfig {
    /// Configuration for `container` with the default listing pattern (`*.txt`) and binary
    /// content.
    pub fn new(container: Container) -> Self {
        Self {
            container,
            list_pattern: ListPattern::default(),
            content_policy: ContentPolicy::default(),
        }
    }

    /// Replace the pattern that `ListFiles` filters by.
    #[must_use]
    pub fn with_list_pattern(mut self, list_pattern: ListPattern) -> Self {
        self.list_pattern = list_pattern;
        self
    }

    /// Replace the content policy.
    #[must_use]
    pub const fn with_content_policy(mut self, content_policy: ContentPolicy) -> Self {
        self.content_policy = content_policy;
        self
    }

    /// The container requests are forwarded to.
    #[inline]
    pub const fn container(&self) -> &Container {
        &self.container
    }

    /// The pattern that `ListFiles` filters by.
    #[inline]
    pub const fn list_pattern(&self) -> &ListPattern {
        &self.list_pattern
    }

    /// The content policy.
    #[inline]
    pub const fn content_policy(&self) -> ContentPolicy {
        self.content_policy
    }
}
