use std::fmt;
use std::rc::Rc;

use crate::component::{factory_for, Component, ViewFactory};

/// A route path paired with the view it mounts.
///
/// The path is a regular expression matched against the hash; see
/// [`RoutePattern`](super::RoutePattern) for the exact rule.
pub struct Route<E> {
    path: String,
    factory: ViewFactory<E>,
}

/// An ordered route table. The first route whose path matches wins, so
/// catch-all routes such as `.*` belong at the end.
pub type Routes<E> = Vec<Route<E>>;

impl<E> Route<E> {
    /// A route that mounts whatever `factory` returns.
    pub fn new<F>(path: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> E + 'static,
    {
        Self {
            path: path.into(),
            factory: Rc::new(factory),
        }
    }

    /// A route that creates a fresh `C` on every visit and mounts its element.
    pub fn component<C>(path: impl Into<String>) -> Self
    where
        C: Component<Element = E> + 'static,
    {
        Self {
            path: path.into(),
            factory: factory_for::<C>(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn into_parts(self) -> (String, ViewFactory<E>) {
        (self.path, self.factory)
    }
}

impl<E> Clone for Route<E> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            factory: Rc::clone(&self.factory),
        }
    }
}

impl<E> fmt::Debug for Route<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("path", &self.path).finish()
    }
}
