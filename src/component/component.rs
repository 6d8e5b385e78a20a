use std::rc::Rc;

/// A view the router can build on demand and mount.
///
/// Components are created with no arguments; whatever they need comes
/// from shared state such as a [`Store`](crate::Store) or the navigation
/// state written by the router.
///
/// # Examples
///
/// ```
/// use heropy::Component;
///
/// struct NotFound {
///     el: String,
/// }
///
/// impl Component for NotFound {
///     type Element = String;
///
///     fn create() -> Self {
///         Self { el: "<h1>Sorry..</h1>".to_string() }
///     }
///
///     fn into_el(self) -> String {
///         self.el
///     }
/// }
///
/// assert_eq!(NotFound::create().into_el(), "<h1>Sorry..</h1>");
/// ```
pub trait Component {
    /// The mountable handle this component renders into.
    type Element;

    /// Build the component with its initial state.
    fn create() -> Self
    where
        Self: Sized;

    /// Fill in the element from the component's state.
    ///
    /// Called once, right after [`Component::create`], whenever the router
    /// builds the component. Components that build their element in
    /// `create` can leave the default.
    fn render(&mut self) {}

    /// Give up the rendered element so it can be mounted.
    fn into_el(self) -> Self::Element;
}

/// Zero-argument constructor producing a mountable element.
///
/// Route tables and render passes are single-threaded, so factories are
/// reference counted with `Rc` and may capture non-`Send` handles.
pub type ViewFactory<E> = Rc<dyn Fn() -> E>;

/// Factory that creates and renders `C`, then returns its element.
pub(crate) fn factory_for<C>() -> ViewFactory<C::Element>
where
    C: Component + 'static,
{
    Rc::new(|| {
        let mut component = C::create();
        component.render();
        component.into_el()
    })
}
