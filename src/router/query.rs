use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Split a location fragment into its hash path and query string.
///
/// Only the text between the first and second `?` is treated as the
/// query string; anything after a second `?` is dropped.
///
/// ```
/// use heropy::router::split_fragment;
///
/// assert_eq!(split_fragment("/movies?page=2"), ("/movies", "page=2"));
/// assert_eq!(split_fragment("/movies"), ("/movies", ""));
/// ```
pub fn split_fragment(fragment: &str) -> (&str, &str) {
    let mut parts = fragment.split('?');
    let hash = parts.next().unwrap_or_default();
    let query = parts.next().unwrap_or_default();
    (hash, query)
}

/// Query parameters parsed from the fragment's query string.
///
/// Keys keep the position of their first occurrence; a repeated key
/// takes the value of its last occurrence. A pair without `=` has no
/// value. Nothing is percent-decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(IndexMap<String, Option<String>>);

impl Query {
    /// Parse a raw query string such as `page=2&sort=desc`.
    ///
    /// Parsing never fails. An empty string yields one entry with an
    /// empty key and no value, and `a=1=2` keeps only `1`.
    pub fn parse(query_string: &str) -> Self {
        let mut params = IndexMap::new();
        for pair in query_string.split('&') {
            let mut parts = pair.split('=');
            let key = parts.next().unwrap_or_default();
            let value = parts.next().map(str::to_string);
            params.insert(key.to_string(), value);
        }
        Query(params)
    }

    /// Read a query state back out of a history entry.
    pub fn from_state(state: &Value) -> Option<Self> {
        Query::deserialize(state).ok()
    }

    /// The value for `key`, if the key is present and has a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    /// The JSON object stored in the history state slot. Missing values
    /// become `null`.
    pub fn to_state(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| {
                    let value = value.clone().map_or(Value::Null, Value::String);
                    (key.clone(), value)
                })
                .collect(),
        )
    }
}
