use regex::{Regex, RegexBuilder};

use super::RouterError;

/// Maximum accepted length of a route path, in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum compiled size of a route regex, in bytes.
const MAX_REGEX_SIZE: usize = 1 << 20;

/// A compiled route path.
///
/// The path is a regular expression. It is matched anywhere in the hash
/// but must reach the end of it, allowing one trailing `/`: the path
/// `/movie` compiles to `(?:/movie)/?$`. Add a leading `^` to pin the
/// start as well.
///
/// ```
/// use heropy::router::RoutePattern;
///
/// let pattern = RoutePattern::new("/movie").unwrap();
/// assert!(pattern.is_match("/movie"));
/// assert!(pattern.is_match("/movie/"));
/// assert!(!pattern.is_match("/movie/tt123"));
/// ```
#[derive(Debug, Clone)]
pub struct RoutePattern {
    path: String,
    regex: Regex,
}

impl RoutePattern {
    pub fn new(path: &str) -> Result<Self, RouterError> {
        if path.len() > MAX_PATTERN_LENGTH {
            return Err(RouterError::PatternTooLong {
                len: path.len(),
                max: MAX_PATTERN_LENGTH,
            });
        }

        let regex = RegexBuilder::new(&format!("(?:{path})/?$"))
            .size_limit(MAX_REGEX_SIZE)
            .build()
            .map_err(|e| RouterError::InvalidPattern {
                pattern: path.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            path: path.to_string(),
            regex,
        })
    }

    /// The path as written in the route table.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_match(&self, hash: &str) -> bool {
        self.regex.is_match(hash)
    }
}
