//! The contract between views and the router.

mod component;

pub use component::{Component, ViewFactory};
pub(crate) use component::factory_for;
