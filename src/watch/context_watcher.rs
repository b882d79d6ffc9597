//! ContextWatcher - observes the ambient context a provider subtree exposes.
//!
//! The watcher hands a probe element to a builder, which places the probe
//! somewhere below the provider under test. The resulting tree is rendered
//! headlessly; every time the probe renders it pushes the context it
//! received into the watcher.
//!
//! ```ignore
//! let store = Provider::new("StoreProvider", state).with_shape(ContextShape::new(["store"]));
//! let watcher = ContextWatcher::new(|probe| Element::provider(&store).child(probe), None)?;
//!
//! // Pick up the initial snapshot
//! let context = watcher.value().unwrap_or_default();
//!
//! // Later, forward every change into a mounted surface
//! let unbind = bind_context_to_wrapper(&watcher, &surface);
//! ```

use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use tracing::{debug, trace};

use super::value_watcher::ValueWatcher;
use crate::error::{Error, Result};
use crate::pipeline::Updater;
use crate::primitives::{Component, Element};
use crate::renderer::{HeadlessSurface, RenderMode, Surface};
use crate::types::{Cleanup, ContextShape, Props};

// =============================================================================
// ContextWatcher
// =============================================================================

struct WatcherInner {
    watcher: Rc<ValueWatcher<Props>>,
    tree: Element,
    shape: ContextShape,
    /// Snapshot captured right after construction.
    initial: Option<Props>,
    /// Last snapshot handed to a bound wrapper, starting at `initial`.
    delivered: Rc<RefCell<Option<Props>>>,
    /// Live headless render, `None` while stopped.
    render: RefCell<Option<HeadlessSurface>>,
}

/// Shared handle to a context observation.
#[derive(Clone)]
pub struct ContextWatcher {
    inner: Rc<WatcherInner>,
}

impl ContextWatcher {
    /// Render `build(probe)` headlessly and start observing.
    ///
    /// # Arguments
    ///
    /// * `build` - Returns a tree with the probe mounted below the provider
    /// * `shape` - Context keys to observe. Only needed when the root element
    ///   returned by `build` is not a provider that declares its own shape.
    ///
    /// # Errors
    ///
    /// [`Error::ContextShapeUnknown`] if no shape was passed and none can be
    /// inferred from the root element.
    pub fn new<F>(build: F, shape: Option<ContextShape>) -> Result<Self>
    where
        F: FnOnce(Element) -> Element,
    {
        let watcher = Rc::new(ValueWatcher::new());
        let declared: Rc<OnceCell<ContextShape>> = Rc::new(OnceCell::new());

        // The probe only renders once the tree is mounted below
        let tree = build(probe(watcher.clone(), declared.clone()));

        let shape = match shape {
            Some(shape) => shape,
            None => tree
                .declared_shape()
                .cloned()
                .ok_or(Error::ContextShapeUnknown)?,
        };
        let shape = declared.get_or_init(|| shape).clone();

        let render = render_headless(&tree);
        let initial = watcher.value();
        debug!(root = tree.name(), keys = shape.len(), "context watcher started");

        Ok(Self {
            inner: Rc::new(WatcherInner {
                watcher,
                tree,
                shape,
                delivered: Rc::new(RefCell::new(initial.clone())),
                initial,
                render: RefCell::new(Some(render)),
            }),
        })
    }

    /// Latest observed context.
    pub fn value(&self) -> Option<Props> {
        self.inner.watcher.value()
    }

    /// Context observed when the watcher was created.
    pub fn initial_value(&self) -> Option<&Props> {
        self.inner.initial.as_ref()
    }

    pub fn shape(&self) -> &ContextShape {
        &self.inner.shape
    }

    /// True while the headless render is live.
    pub fn is_observing(&self) -> bool {
        self.inner.render.borrow().is_some()
    }

    /// Register a listener, restarting observation first if it was stopped.
    pub fn listen(&self, listener: impl Fn(&Props) + 'static) {
        if !self.is_observing() {
            let render = render_headless(&self.inner.tree);
            *self.inner.render.borrow_mut() = Some(render);
            debug!(root = self.inner.tree.name(), "context watcher restarted");
        }
        self.inner.watcher.listen(listener);
    }

    /// Push a snapshot to every listener.
    pub fn set(&self, value: Props) {
        self.inner.watcher.set(value);
    }

    /// Tear down the headless render and drop all listeners. Idempotent.
    pub fn stop(&self) {
        let render = self.inner.render.borrow_mut().take();
        if let Some(render) = render {
            render.unmount();
            debug!(root = self.inner.tree.name(), "context watcher stopped");
        }
        self.inner.watcher.stop();
    }
}

/// The element handed to the builder: pushes its context on every render.
fn probe(watcher: Rc<ValueWatcher<Props>>, shape: Rc<OnceCell<ContextShape>>) -> Element {
    let component = Component::new("ContextProbe", move |cx| {
        if let Some(shape) = shape.get() {
            watcher.set(shape.pick(cx.context));
        }
        None
    });
    Element::component(&component)
}

fn render_headless(tree: &Element) -> HeadlessSurface {
    let surface = HeadlessSurface::new(tree.clone(), Vec::new(), Props::new(), RenderMode::Full);
    surface.mount();
    surface
}

// =============================================================================
// Binding
// =============================================================================

/// Forward every future context change into `wrapper`'s context slot.
///
/// If the context moved on since a wrapper last received it (after
/// construction, or while unmounted between binds), the newer snapshot is
/// pushed immediately.
///
/// Returns a cleanup that stops the watcher.
pub fn bind_context_to_wrapper<S: Surface>(context: &ContextWatcher, wrapper: &S) -> Cleanup {
    let target = wrapper.clone();
    let delivered = context.inner.delivered.clone();
    context.listen(move |updated: &Props| {
        *delivered.borrow_mut() = Some(updated.clone());
        target.set_context(updated.clone());
    });

    if let Some(current) = context.value() {
        let stale = context.inner.delivered.borrow().as_ref() != Some(&current);
        if stale {
            trace!("context changed before binding, pushing latest snapshot");
            *context.inner.delivered.borrow_mut() = Some(current.clone());
            wrapper.set_context(current);
        }
    }

    let context = context.clone();
    Box::new(move || context.stop())
}

/// Lifecycle hook binding `context` to whatever surface it is invoked with.
pub fn bind_context<S: Surface>(context: ContextWatcher) -> Updater<S> {
    Rc::new(move |wrapper: &S| bind_context_to_wrapper(&context, wrapper))
}

/// Render a provider element once and return the context it exposes.
///
/// # Errors
///
/// - [`Error::NotAProvider`] if `element` is not a provider
/// - [`Error::ContextShapeUnknown`] if the provider declares no shape
pub fn context_from_provider(element: &Element) -> Result<Props> {
    if !element.is_provider() {
        return Err(Error::NotAProvider(element.name().to_string()));
    }

    let provider = element.clone();
    let watcher = ContextWatcher::new(move |probe| provider.child(probe), None)?;
    let context = watcher.value().unwrap_or_default();
    watcher.stop();
    Ok(context)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Provider;
    use crate::types::Value;
    use spark_signals::{flush_sync, signal};
    use std::cell::Cell;

    fn store_context(count: i64) -> Props {
        let mut state = Props::new();
        state.insert("count".to_string(), Value::from(count));
        let mut context = Props::new();
        context.insert("store".to_string(), Value::Map(state));
        context.insert("debug".to_string(), Value::from(false));
        context
    }

    fn count_of(context: &Props) -> Option<i64> {
        context.get("store")?.as_map()?.get("count")?.as_int()
    }

    fn store_provider(count: i64) -> Provider {
        Provider::new("StoreProvider", signal(store_context(count)))
            .with_shape(ContextShape::new(["store"]))
    }

    fn watch(provider: &Provider) -> ContextWatcher {
        let provider = provider.clone();
        ContextWatcher::new(move |probe| Element::provider(&provider).child(probe), None).unwrap()
    }

    /// Surface rendering `<span count={context.store.count} />`.
    fn target() -> HeadlessSurface {
        let counter = Component::new("Counter", |cx| {
            let count = count_of(cx.context).unwrap_or(-1);
            Some(Element::host("span").prop("count", count))
        });
        let surface = HeadlessSurface::new(
            Element::component(&counter),
            Vec::new(),
            Props::new(),
            RenderMode::Full,
        );
        surface.mount();
        surface
    }

    fn rendered_count(surface: &HeadlessSurface) -> Option<Value> {
        surface.find("span").and_then(|span| span.prop("count").cloned())
    }

    #[test]
    fn test_value_available_after_construction() {
        let provider = store_provider(1);
        let watcher = watch(&provider);

        let value = watcher.value().unwrap();
        assert_eq!(count_of(&value), Some(1));
        // Keys outside the declared shape are not observed
        assert!(!value.contains_key("debug"));
        assert_eq!(watcher.initial_value(), Some(&value));
        assert!(watcher.is_observing());
    }

    #[test]
    fn test_shape_unknown_is_an_error() {
        let bare = Provider::new("Bare", signal(store_context(1)));
        let result = ContextWatcher::new(move |probe| Element::provider(&bare).child(probe), None);
        assert!(matches!(result, Err(Error::ContextShapeUnknown)));

        let result = ContextWatcher::new(|probe| Element::host("div").child(probe), None);
        assert!(matches!(result, Err(Error::ContextShapeUnknown)));
    }

    #[test]
    fn test_explicit_shape_for_undeclared_provider() {
        let bare = Provider::new("Bare", signal(store_context(4)));
        let watcher = ContextWatcher::new(
            move |probe| Element::host("div").child(Element::provider(&bare).child(probe)),
            Some(ContextShape::new(["store", "debug"])),
        )
        .unwrap();

        let value = watcher.value().unwrap();
        assert_eq!(count_of(&value), Some(4));
        assert_eq!(value["debug"], Value::Bool(false));
    }

    #[test]
    fn test_provider_change_reaches_listener() {
        let provider = store_provider(1);
        let watcher = watch(&provider);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        watcher.listen(move |context| seen_clone.borrow_mut().push(count_of(context)));

        provider.set(store_context(2));
        flush_sync();

        assert_eq!(*seen.borrow(), vec![Some(2)]);
        assert_eq!(watcher.value().as_ref().and_then(count_of), Some(2));
    }

    #[test]
    fn test_stop_silences_and_listen_rearms() {
        let provider = store_provider(1);
        let watcher = watch(&provider);

        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        watcher.listen(move |_| calls_clone.set(calls_clone.get() + 1));

        watcher.stop();
        watcher.stop();
        assert!(!watcher.is_observing());

        provider.set(store_context(2));
        flush_sync();
        assert_eq!(calls.get(), 0, "stopped watcher must not notify");

        let latest = Rc::new(Cell::new(None));
        let latest_clone = latest.clone();
        watcher.listen(move |context| latest_clone.set(count_of(context)));
        assert!(watcher.is_observing());

        provider.set(store_context(3));
        flush_sync();
        assert_eq!(latest.get(), Some(3));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_bind_forwards_changes_into_surface() {
        let provider = store_provider(1);
        let watcher = watch(&provider);
        let surface = target();
        surface.set_context(watcher.value().unwrap_or_default());
        flush_sync();
        assert_eq!(rendered_count(&surface), Some(Value::Int(1)));

        let unbind = bind_context_to_wrapper(&watcher, &surface);
        provider.set(store_context(7));
        flush_sync();
        assert_eq!(rendered_count(&surface), Some(Value::Int(7)));

        unbind();
        assert!(!watcher.is_observing());

        provider.set(store_context(9));
        flush_sync();
        assert_eq!(rendered_count(&surface), Some(Value::Int(7)));
    }

    #[test]
    fn test_bind_reconciles_change_before_binding() {
        let provider = store_provider(1);
        let watcher = watch(&provider);
        let surface = target();
        surface.set_context(watcher.value().unwrap_or_default());

        // Provider moves on before anyone listens
        provider.set(store_context(5));
        flush_sync();
        assert_eq!(rendered_count(&surface), Some(Value::Int(1)));

        let _unbind = bind_context_to_wrapper(&watcher, &surface);
        flush_sync();
        assert_eq!(rendered_count(&surface), Some(Value::Int(5)));
    }

    #[test]
    fn test_bind_without_change_leaves_surface_alone() {
        let provider = store_provider(1);
        let watcher = watch(&provider);
        let surface = target();
        let renders = surface.render_count();

        let _unbind = bind_context_to_wrapper(&watcher, &surface);
        flush_sync();

        assert_eq!(surface.render_count(), renders);
        assert!(surface.context().is_empty());
    }

    #[test]
    fn test_rebind_after_revert_to_initial() {
        let provider = store_provider(1);
        let watcher = watch(&provider);
        let surface = target();
        surface.set_context(watcher.value().unwrap_or_default());

        let unbind = bind_context_to_wrapper(&watcher, &surface);
        provider.set(store_context(2));
        flush_sync();
        assert_eq!(rendered_count(&surface), Some(Value::Int(2)));
        unbind();

        // Back to the construction value while nobody listens
        provider.set(store_context(1));
        flush_sync();
        assert_eq!(rendered_count(&surface), Some(Value::Int(2)));

        let _unbind = bind_context_to_wrapper(&watcher, &surface);
        flush_sync();
        assert_eq!(rendered_count(&surface), Some(Value::Int(1)));
    }

    #[test]
    fn test_removed_state_key_leaves_surface() {
        let provider = store_provider(1);
        let watcher = watch(&provider);
        let surface = target();
        surface.set_context(watcher.value().unwrap_or_default());
        let _unbind = bind_context_to_wrapper(&watcher, &surface);

        let mut with_user = store_context(2);
        if let Some(Value::Map(state)) = with_user.get_mut("store") {
            state.insert("user".to_string(), Value::from(7));
        }
        provider.set(with_user);
        flush_sync();
        assert!(surface.context()["store"].as_map().unwrap().contains_key("user"));

        provider.set(store_context(3));
        flush_sync();

        let store = surface.context()["store"].as_map().cloned().unwrap();
        assert!(!store.contains_key("user"));
        assert_eq!(rendered_count(&surface), Some(Value::Int(3)));
    }

    #[test]
    fn test_context_from_provider() {
        let provider = store_provider(3);
        let context = context_from_provider(&Element::provider(&provider)).unwrap();
        assert_eq!(count_of(&context), Some(3));

        let err = context_from_provider(&Element::host("span")).unwrap_err();
        assert!(matches!(err, Error::NotAProvider(ref name) if name == "span"));

        let bare = Provider::new("Bare", signal(Props::new()));
        let err = context_from_provider(&Element::provider(&bare)).unwrap_err();
        assert!(matches!(err, Error::ContextShapeUnknown));
    }
}
