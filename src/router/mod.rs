//! Hash-based navigation.
//!
//! The router reads the location fragment (`/#/movies?page=2`), splits it
//! into a hash path and query parameters, stores the parameters in the
//! current history entry, and mounts the view of the first route whose
//! path matches the hash.
//!
//! The environment is injected: anything implementing [`Navigation`]
//! supplies the location and history, and anything implementing
//! [`MountPoint`] receives the view. [`MemoryHistory`] and `Vec<E>` cover
//! native use and tests; the `browser` module adapts `web-sys` on wasm.

#[cfg(target_arch = "wasm32")]
pub mod browser;
mod config;
mod error;
mod history;
mod mount;
mod pattern;
mod query;
mod route;
mod router;

pub use config::RouterConfig;
pub use error::RouterError;
pub use history::{HistoryEntry, MemoryHistory, Navigation};
pub use mount::MountPoint;
pub use pattern::RoutePattern;
pub use query::{split_fragment, Query};
pub use route::{Route, Routes};
pub use router::{
    create_router, Installer, MountedRouter, NavigationState, RenderOutcome, Router,
};
