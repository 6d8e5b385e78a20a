//! # Heropy
//!
//! A small substrate for client-side applications.
//!
//! Heropy provides three pieces that views are built on:
//!
//! ## Store
//!
//! Keyed reactive state:
//! - `Store<V>` - fixed set of keys, synchronous per-key subscribers
//! - `StoreReader<V>` - read and subscribe without write access
//!
//! ## Router
//!
//! Hash-based navigation:
//! - `create_router` - compile a route table into an installer
//! - `Query` - parameters parsed from the fragment's query string
//! - `Navigation` / `MountPoint` - the injected environment
//!
//! ## Component
//!
//! The contract the router mounts:
//! - `Component` - zero-argument view constructor with a mountable element

pub mod component;
pub mod router;
pub mod store;

// Re-export main types for convenience
pub use component::Component;
pub use router::{create_router, Navigation, Query, Route, Routes};
pub use store::{Store, StoreError, StoreReader, SubscriptionId};
