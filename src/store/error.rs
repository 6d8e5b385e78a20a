use thiserror::Error;

/// Errors returned by [`Store`](super::Store) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The key was not part of the state the store was created with.
    #[error("key `{0}` is not declared in this store")]
    UndeclaredKey(String),

    /// `from_state` was given something that does not serialize to a map.
    #[error("initial state must serialize to an object, got {0}")]
    NotAnObject(&'static str),

    /// `from_state` failed to serialize the initial state.
    #[error("failed to serialize initial state: {0}")]
    Serialize(String),
}
