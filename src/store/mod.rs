//! Keyed reactive state.
//!
//! A [`Store`] holds a fixed set of keys. Writing a key notifies the
//! callbacks subscribed to that key, synchronously and in subscription
//! order.

mod error;
mod store;

pub use error::StoreError;
pub use store::{Store, StoreReader, SubscriptionId};
