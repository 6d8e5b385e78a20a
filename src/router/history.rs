use serde_json::Value;

/// One entry of the navigation history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Full location, e.g. `/#/movies?page=2`.
    pub url: String,
    /// State payload attached to the entry.
    pub state: Option<Value>,
    pub title: String,
}

impl HistoryEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: None,
            title: String::new(),
        }
    }

    /// Text after the first `#`, or empty when there is none.
    pub fn fragment(&self) -> &str {
        self.url.split_once('#').map_or("", |(_, fragment)| fragment)
    }
}

/// The navigation environment a router renders against.
///
/// `replace_state` and `push_state` never signal a navigation change by
/// themselves; only moving through history does.
pub trait Navigation {
    /// The current fragment without its leading `#`. Empty when the
    /// location has no fragment or an empty one.
    fn fragment(&self) -> String;

    /// State payload of the current entry.
    fn state(&self) -> Option<Value>;

    /// Overwrite the current entry's state and title, and its URL when
    /// `url` is given. No entry is added.
    fn replace_state(&mut self, state: Option<Value>, title: &str, url: Option<&str>);

    /// Add a new entry after the current one, discarding forward entries.
    fn push_state(&mut self, state: Option<Value>, title: &str, url: &str);

    fn scroll_to(&mut self, x: f64, y: f64);

    /// Step back one entry. Returns `true` when the location changed
    /// synchronously; `false` when nothing moved or when the change will
    /// be announced later by the environment.
    fn back(&mut self) -> bool;

    /// Step forward one entry. Same return contract as [`Navigation::back`].
    fn forward(&mut self) -> bool;
}

/// In-process history: an entry stack, a cursor and a scroll position.
///
/// ```
/// use heropy::router::{MemoryHistory, Navigation};
///
/// let mut history = MemoryHistory::new("/#/movies");
/// history.push_state(None, "", "#/about");
///
/// assert_eq!(history.fragment(), "/about");
/// assert!(history.back());
/// assert_eq!(history.fragment(), "/movies");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<HistoryEntry>,
    index: usize,
    scroll: (f64, f64),
}

impl MemoryHistory {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            entries: vec![HistoryEntry::new(url)],
            index: 0,
            scroll: (0.0, 0.0),
        }
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn scroll_position(&self) -> (f64, f64) {
        self.scroll
    }

    // Fragment-only URLs are resolved against the current path.
    fn resolve(&self, url: &str) -> String {
        if url.starts_with('#') {
            let current = &self.current().url;
            let base = current.split_once('#').map_or(current.as_str(), |(base, _)| base);
            format!("{base}{url}")
        } else {
            url.to_string()
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigation for MemoryHistory {
    fn fragment(&self) -> String {
        self.current().fragment().to_string()
    }

    fn state(&self) -> Option<Value> {
        self.current().state.clone()
    }

    fn replace_state(&mut self, state: Option<Value>, title: &str, url: Option<&str>) {
        let url = url.map(|url| self.resolve(url));
        let entry = &mut self.entries[self.index];
        entry.state = state;
        entry.title = title.to_string();
        if let Some(url) = url {
            entry.url = url;
        }
    }

    fn push_state(&mut self, state: Option<Value>, title: &str, url: &str) {
        let url = self.resolve(url);
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry {
            url,
            state,
            title: title.to_string(),
        });
        self.index += 1;
    }

    fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll = (x, y);
    }

    fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }
}
