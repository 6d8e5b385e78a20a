//! `web-sys` adapters for running the router in a browser.
//!
//! ```ignore
//! use heropy::router::{browser, create_router, Route};
//!
//! let router = browser::install(
//!     create_router(vec![Route::component::<Home>("^/"), Route::component::<NotFound>(".*")])?,
//!     browser::router_view(),
//! )?;
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, History, Window};

use super::{Installer, MountPoint, MountedRouter, Navigation, RouterError};

/// A router mounted into the page, shared with its `popstate` listener.
pub type BrowserRouter = MountedRouter<Element, BrowserNavigation, Element>;

/// [`Navigation`] backed by `window.location` and `window.history`.
#[derive(Debug, Clone)]
pub struct BrowserNavigation {
    window: Window,
}

impl BrowserNavigation {
    pub fn new() -> Result<Self, RouterError> {
        web_sys::window()
            .map(Self::from_window)
            .ok_or(RouterError::NoWindow)
    }

    pub fn from_window(window: Window) -> Self {
        Self { window }
    }

    fn history(&self) -> Option<History> {
        match self.window.history() {
            Ok(history) => Some(history),
            Err(err) => {
                tracing::warn!(error = ?err, "window.history unavailable");
                None
            }
        }
    }
}

impl Navigation for BrowserNavigation {
    fn fragment(&self) -> String {
        let hash = self.window.location().hash().unwrap_or_default();
        hash.strip_prefix('#').unwrap_or(&hash).to_string()
    }

    fn state(&self) -> Option<Value> {
        let state = self.history()?.state().ok()?;
        from_js(&state)
    }

    fn replace_state(&mut self, state: Option<Value>, title: &str, url: Option<&str>) {
        let Some(history) = self.history() else {
            return;
        };
        let data = state.as_ref().map_or(JsValue::NULL, to_js);
        if let Err(err) = history.replace_state_with_url(&data, title, url) {
            tracing::warn!(error = ?err, "history.replaceState failed");
        }
    }

    fn push_state(&mut self, state: Option<Value>, title: &str, url: &str) {
        let Some(history) = self.history() else {
            return;
        };
        let data = state.as_ref().map_or(JsValue::NULL, to_js);
        if let Err(err) = history.push_state_with_url(&data, title, Some(url)) {
            tracing::warn!(error = ?err, "history.pushState failed");
        }
    }

    fn scroll_to(&mut self, x: f64, y: f64) {
        self.window.scroll_to_with_x_and_y(x, y);
    }

    // The browser moves asynchronously and announces it with `popstate`.
    fn back(&mut self) -> bool {
        if let Some(Err(err)) = self.history().map(|h| h.back()) {
            tracing::warn!(error = ?err, "history.back failed");
        }
        false
    }

    fn forward(&mut self) -> bool {
        if let Some(Err(err)) = self.history().map(|h| h.forward()) {
            tracing::warn!(error = ?err, "history.forward failed");
        }
        false
    }
}

impl MountPoint<Element> for Element {
    fn clear(&mut self) {
        self.set_inner_html("");
    }

    fn append(&mut self, element: Element) {
        if let Err(err) = self.append_child(&element) {
            tracing::warn!(error = ?err, "failed to append view to mount point");
        }
    }
}

/// The page's `<router-view>` element, if there is one.
pub fn router_view() -> Option<Element> {
    web_sys::window()?
        .document()?
        .query_selector("router-view")
        .ok()
        .flatten()
}

/// Mount `installer` into `mount`, render the current location, and
/// re-render on every `popstate` event for the lifetime of the page.
pub fn install(
    installer: Installer<Element>,
    mount: Option<Element>,
) -> Result<Rc<RefCell<BrowserRouter>>, RouterError> {
    let navigation = BrowserNavigation::new()?;
    let window = navigation.window.clone();
    let router = Rc::new(RefCell::new(installer.install(navigation, mount)));

    let handle = Rc::clone(&router);
    let on_pop_state = Closure::wrap(Box::new(move |_event: Event| {
        match handle.try_borrow_mut() {
            Ok(mut router) => {
                router.pop_state();
            }
            Err(_) => tracing::warn!("popstate arrived during a render pass, ignored"),
        }
    }) as Box<dyn FnMut(Event)>);

    window
        .add_event_listener_with_callback("popstate", on_pop_state.as_ref().unchecked_ref())
        .map_err(|err| RouterError::Browser(format!("{err:?}")))?;
    on_pop_state.forget();

    Ok(router)
}

fn to_js(value: &Value) -> JsValue {
    js_sys::JSON::parse(&value.to_string()).unwrap_or(JsValue::NULL)
}

fn from_js(value: &JsValue) -> Option<Value> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    let text = String::from(js_sys::JSON::stringify(value).ok()?);
    serde_json::from_str(&text).ok()
}
