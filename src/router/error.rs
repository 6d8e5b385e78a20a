use thiserror::Error;

/// Errors raised while building or installing a router.
///
/// A render pass itself never fails: bad query strings, missing mount
/// points and unmatched hashes all degrade to a valid outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// A route path did not compile as a regular expression.
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The route path is longer than the compiler accepts.
    #[error("route pattern is {len} bytes, exceeding the limit of {max}")]
    PatternTooLong { len: usize, max: usize },

    /// No browser window is available to install into.
    #[error("no browser window available")]
    NoWindow,

    /// A browser API call failed.
    #[error("browser call failed: {0}")]
    Browser(String),
}
