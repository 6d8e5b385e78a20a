use serde::{Deserialize, Serialize};

/// Router settings.
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Location substituted when the current one has no fragment.
    pub default_url: String,
    /// Scroll the viewport back to the origin after each mount.
    pub reset_scroll: bool,
}

impl RouterConfig {
    pub fn with_default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = url.into();
        self
    }

    pub fn with_reset_scroll(mut self, reset: bool) -> Self {
        self.reset_scroll = reset;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_url: "/#/".to_string(),
            reset_scroll: true,
        }
    }
}
