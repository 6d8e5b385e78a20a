use std::fmt;
use std::rc::Rc;

use super::{
    split_fragment, MountPoint, Navigation, Query, RoutePattern, RouterConfig, RouterError,
    Routes,
};
use crate::component::ViewFactory;

struct CompiledRoute<E> {
    pattern: RoutePattern,
    factory: ViewFactory<E>,
}

/// What a render pass did with the mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The route at `index` matched and its view was mounted.
    Mounted { index: usize, path: String },
    /// No route matched; the mount point was emptied.
    Cleared,
    /// There was no mount point, so matching and mounting were skipped.
    Detached,
}

/// Navigation state derived by one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    /// Fragment path before any `?`.
    pub hash: String,
    pub query: Query,
    pub outcome: RenderOutcome,
}

impl NavigationState {
    /// Index of the mounted route, if any.
    pub fn current_route(&self) -> Option<usize> {
        match self.outcome {
            RenderOutcome::Mounted { index, .. } => Some(index),
            _ => None,
        }
    }
}

/// A compiled route table.
///
/// Route paths are compiled once, when the router is built. Rendering
/// only reads the table.
pub struct Router<E> {
    routes: Rc<[CompiledRoute<E>]>,
    config: RouterConfig,
}

impl<E> Router<E> {
    pub fn new(routes: Routes<E>) -> Result<Self, RouterError> {
        Self::with_config(routes, RouterConfig::default())
    }

    pub fn with_config(routes: Routes<E>, config: RouterConfig) -> Result<Self, RouterError> {
        let routes = routes
            .into_iter()
            .map(|route| -> Result<CompiledRoute<E>, RouterError> {
                let (path, factory) = route.into_parts();
                Ok(CompiledRoute {
                    pattern: RoutePattern::new(&path)?,
                    factory,
                })
            })
            .collect::<Result<Rc<[_]>, _>>()?;

        Ok(Self { routes, config })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The first route whose path matches `hash`, as `(index, path)`.
    pub fn resolve(&self, hash: &str) -> Option<(usize, &str)> {
        self.routes
            .iter()
            .enumerate()
            .find(|(_, route)| route.pattern.is_match(hash))
            .map(|(index, route)| (index, route.pattern.path()))
    }

    /// Run one render pass against the current location.
    ///
    /// 1. A location without a fragment is replaced by the configured
    ///    default URL, without adding an entry.
    /// 2. The fragment is split into hash and query, and the query is
    ///    written into the current entry's state.
    /// 3. Without a mount point the pass stops here.
    /// 4. The mount point is cleared and the first matching route's view,
    ///    if any, is created and appended.
    /// 5. The viewport is scrolled back to the origin.
    pub fn render<N, M>(&self, navigation: &mut N, mount: Option<&mut M>) -> NavigationState
    where
        N: Navigation + ?Sized,
        M: MountPoint<E> + ?Sized,
    {
        if navigation.fragment().is_empty() {
            tracing::debug!(url = %self.config.default_url, "location has no fragment, normalizing");
            navigation.replace_state(None, "", Some(&self.config.default_url));
        }

        let fragment = navigation.fragment();
        let (hash, query_string) = split_fragment(&fragment);
        let query = Query::parse(query_string);
        tracing::trace!(hash, query = ?query, "parsed location");
        navigation.replace_state(Some(query.to_state()), "", None);

        let Some(mount) = mount else {
            tracing::debug!(hash, "no mount point, skipping render");
            return NavigationState {
                hash: hash.to_string(),
                query,
                outcome: RenderOutcome::Detached,
            };
        };

        let matched = self.resolve(hash);
        mount.clear();
        let outcome = match matched {
            Some((index, path)) => {
                mount.append((self.routes[index].factory)());
                RenderOutcome::Mounted {
                    index,
                    path: path.to_string(),
                }
            }
            None => RenderOutcome::Cleared,
        };

        if self.config.reset_scroll {
            navigation.scroll_to(0.0, 0.0);
        }

        tracing::debug!(hash, outcome = ?outcome, "render pass complete");
        NavigationState {
            hash: hash.to_string(),
            query,
            outcome,
        }
    }
}

impl<E> Clone for Router<E> {
    fn clone(&self) -> Self {
        Self {
            routes: Rc::clone(&self.routes),
            config: self.config.clone(),
        }
    }
}

impl<E> fmt::Debug for Router<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field(
                "routes",
                &self.routes.iter().map(|r| r.pattern.path()).collect::<Vec<_>>(),
            )
            .field("config", &self.config)
            .finish()
    }
}

/// Compile a route table and return the installer that mounts it.
///
/// ```
/// use heropy::router::{create_router, MemoryHistory, Route};
///
/// let install = create_router(vec![
///     Route::new("^/", || "home"),
///     Route::new("/movie", || "movie"),
///     Route::new(".*", || "not found"),
/// ])
/// .unwrap();
///
/// let mut router = install.install(MemoryHistory::new("/"), Some(Vec::new()));
/// assert_eq!(router.mount().unwrap(), &vec!["home"]);
///
/// router.navigate("#/movie?id=tt123");
/// assert_eq!(router.mount().unwrap(), &vec!["movie"]);
/// assert_eq!(router.state().query.get("id"), Some("tt123"));
/// ```
pub fn create_router<E>(routes: Routes<E>) -> Result<Installer<E>, RouterError> {
    Ok(Installer {
        router: Router::new(routes)?,
    })
}

/// A compiled router that has not been attached to a location yet.
#[derive(Debug)]
pub struct Installer<E> {
    router: Router<E>,
}

impl<E> Installer<E> {
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.router.config = config;
        self
    }

    pub fn router(&self) -> &Router<E> {
        &self.router
    }

    /// Attach to `navigation` and `mount`, and render the current location.
    ///
    /// The returned [`MountedRouter`] must be told about navigation
    /// changes through [`MountedRouter::pop_state`].
    pub fn install<N, M>(self, mut navigation: N, mut mount: Option<M>) -> MountedRouter<E, N, M>
    where
        N: Navigation,
        M: MountPoint<E>,
    {
        tracing::debug!(routes = self.router.len(), mounted = mount.is_some(), "installing router");
        let state = self.router.render(&mut navigation, mount.as_mut());
        MountedRouter {
            router: self.router,
            navigation,
            mount,
            state,
        }
    }
}

/// A router attached to a navigation environment and a mount point.
///
/// Each call that renders borrows the router mutably, so passes can never
/// overlap.
pub struct MountedRouter<E, N, M> {
    router: Router<E>,
    navigation: N,
    mount: Option<M>,
    state: NavigationState,
}

impl<E, N, M> MountedRouter<E, N, M>
where
    N: Navigation,
    M: MountPoint<E>,
{
    /// Handle a navigation-changed notification from the environment.
    pub fn pop_state(&mut self) -> &NavigationState {
        self.render()
    }

    /// Render the current location again.
    pub fn render(&mut self) -> &NavigationState {
        self.state = self.router.render(&mut self.navigation, self.mount.as_mut());
        &self.state
    }

    /// Add a history entry for `url` and render it.
    pub fn navigate(&mut self, url: &str) -> &NavigationState {
        self.navigation.push_state(None, "", url);
        self.render()
    }

    /// Step back, rendering if the location changed synchronously.
    pub fn back(&mut self) -> bool {
        let moved = self.navigation.back();
        if moved {
            self.render();
        }
        moved
    }

    /// Step forward, rendering if the location changed synchronously.
    pub fn forward(&mut self) -> bool {
        let moved = self.navigation.forward();
        if moved {
            self.render();
        }
        moved
    }
}

impl<E, N, M> MountedRouter<E, N, M> {
    /// State derived by the most recent pass.
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn router(&self) -> &Router<E> {
        &self.router
    }

    pub fn navigation(&self) -> &N {
        &self.navigation
    }

    pub fn navigation_mut(&mut self) -> &mut N {
        &mut self.navigation
    }

    pub fn mount(&self) -> Option<&M> {
        self.mount.as_ref()
    }

    pub fn mount_mut(&mut self) -> Option<&mut M> {
        self.mount.as_mut()
    }
}

impl<E, N: fmt::Debug, M> fmt::Debug for MountedRouter<E, N, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedRouter")
            .field("router", &self.router)
            .field("navigation", &self.navigation)
            .field("mounted", &self.mount.is_some())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{MemoryHistory, Route};
    use serde_json::json;
    use std::cell::Cell;

    fn routes() -> Routes<String> {
        vec![
            Route::new("^/", || "home".to_string()),
            Route::new("^/movie", || "movie".to_string()),
            Route::new("^/about", || "about".to_string()),
        ]
    }

    #[test]
    fn router_compiles_routes() {
        let router = Router::new(routes()).unwrap();
        assert_eq!(router.len(), 3);
        assert_eq!(router.resolve("/movie/"), Some((1, "^/movie")));
        assert_eq!(router.resolve("/nope"), None);
    }

    #[test]
    fn router_rejects_invalid_route() {
        let err = Router::new(vec![Route::new("/(", String::new)]).unwrap_err();
        assert!(matches!(err, RouterError::InvalidPattern { .. }));
    }

    #[test]
    fn render_normalizes_missing_fragment() {
        let router = Router::new(routes()).unwrap();
        let mut history = MemoryHistory::new("/");
        let mut view = Vec::new();

        let state = router.render(&mut history, Some(&mut view));

        assert_eq!(history.len(), 1);
        assert_eq!(history.current().url, "/#/");
        assert_eq!(state.hash, "/");
        assert_eq!(state.current_route(), Some(0));
        assert_eq!(view, vec!["home".to_string()]);
    }

    #[test]
    fn render_writes_query_to_history_state() {
        let router = Router::new(routes()).unwrap();
        let mut history = MemoryHistory::new("/#/movie?id=tt0076759&plot=full");
        let mut view = Vec::new();

        let state = router.render(&mut history, Some(&mut view));

        assert_eq!(state.hash, "/movie");
        assert_eq!(
            history.state(),
            Some(json!({ "id": "tt0076759", "plot": "full" }))
        );
        assert_eq!(history.current().title, "");
        assert_eq!(view, vec!["movie".to_string()]);
    }

    #[test]
    fn render_without_match_clears_view() {
        let router = Router::new(routes()).unwrap();
        let mut history = MemoryHistory::new("/#/nonexistent");
        let mut view = vec!["stale".to_string()];

        let state = router.render(&mut history, Some(&mut view));

        assert_eq!(state.outcome, RenderOutcome::Cleared);
        assert!(view.is_empty());
    }

    #[test]
    fn render_without_mount_point_is_detached() {
        let router = Router::new(routes()).unwrap();
        let mut history = MemoryHistory::new("/#/movie?id=1");
        history.scroll_to(0.0, 300.0);

        let state = router.render::<_, Vec<String>>(&mut history, None);

        assert_eq!(state.outcome, RenderOutcome::Detached);
        assert_eq!(history.state(), Some(json!({ "id": "1" })));
        assert_eq!(history.scroll_position(), (0.0, 300.0));
    }

    #[test]
    fn render_resets_scroll_unless_disabled() {
        let mut history = MemoryHistory::new("/#/");
        let mut view = Vec::new();

        history.scroll_to(10.0, 300.0);
        Router::new(routes())
            .unwrap()
            .render(&mut history, Some(&mut view));
        assert_eq!(history.scroll_position(), (0.0, 0.0));

        history.scroll_to(10.0, 300.0);
        let config = RouterConfig::default().with_reset_scroll(false);
        Router::with_config(routes(), config)
            .unwrap()
            .render(&mut history, Some(&mut view));
        assert_eq!(history.scroll_position(), (10.0, 300.0));
    }

    #[test]
    fn render_creates_fresh_view_each_pass() {
        let created = Rc::new(Cell::new(0));
        let counter = created.clone();
        let router = Router::new(vec![Route::new(".*", move || {
            counter.set(counter.get() + 1);
            counter.get()
        })])
        .unwrap();
        let mut history = MemoryHistory::new("/#/");
        let mut view = Vec::new();

        router.render(&mut history, Some(&mut view));
        router.render(&mut history, Some(&mut view));

        assert_eq!(created.get(), 2);
        assert_eq!(view, vec![2]);
    }

    #[test]
    fn custom_default_url() {
        let config = RouterConfig::default().with_default_url("/#/about");
        let router = Router::with_config(routes(), config).unwrap();
        let mut history = MemoryHistory::new("/app");
        let mut view = Vec::new();

        let state = router.render(&mut history, Some(&mut view));

        assert_eq!(history.current().url, "/#/about");
        assert_eq!(state.current_route(), Some(2));
    }

    #[test]
    fn installed_router_follows_history() {
        let mut router = create_router(routes())
            .unwrap()
            .install(MemoryHistory::new("/"), Some(Vec::new()));
        assert_eq!(router.state().hash, "/");

        router.navigate("#/movie?id=tt1");
        router.navigate("#/about");
        assert_eq!(router.navigation().len(), 3);
        assert_eq!(router.mount().unwrap(), &vec!["about".to_string()]);

        assert!(router.back());
        assert_eq!(router.state().query.get("id"), Some("tt1"));
        assert_eq!(router.mount().unwrap(), &vec!["movie".to_string()]);

        assert!(router.forward());
        assert_eq!(router.state().current_route(), Some(2));
        assert!(!router.forward());
    }

    #[test]
    fn pop_state_rerenders_current_location() {
        let mut router = create_router(routes())
            .unwrap()
            .install(MemoryHistory::new("/#/movie"), Some(Vec::new()));

        router
            .navigation_mut()
            .replace_state(None, "", Some("#/about"));
        let state = router.pop_state();

        assert_eq!(state.hash, "/about");
        assert_eq!(router.mount().unwrap(), &vec!["about".to_string()]);
    }
}
