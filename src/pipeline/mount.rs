//! Mount API - the plugin-aware mount facade.
//!
//! A [`Mount`] owns a renderer and a plugin registry. Every call to
//! [`Mount::mount`] runs the plugin pipeline, renders the decorated tree,
//! and attaches every plugin hook to the resulting surface.
//!
//! # Example
//!
//! ```ignore
//! use spark_mount_context::pipeline::{create_mount, MountOptions, PluginRegistry};
//!
//! let mount = create_mount(PluginRegistry::new().register("store", store_plugin));
//!
//! let wrapper = mount.mount(Element::component(&leaf), MountOptions::new().with("name", "Julie"))?;
//! let store = wrapper.controller::<Store>("store").unwrap();
//!
//! // Lifecycle hooks run on every transition
//! wrapper.unmount();
//! wrapper.mount();
//! ```

use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use super::deprecation::{Deprecation, WarnOnce};
use super::execute::{execute_plugins, Controllers};
use super::lifecycle::Lifecycle;
use super::options::MountOptions;
use super::plugin::PluginRegistry;
use crate::error::Result;
use crate::primitives::Element;
use crate::renderer::{HeadlessRenderer, HeadlessSurface, Renderer, Surface};
use crate::types::Handle;

// =============================================================================
// Mount Facade
// =============================================================================

/// A mount function specialized with a fixed set of plugins.
pub struct Mount<R: Renderer> {
    renderer: R,
    plugins: PluginRegistry<R::Surface>,
    warnings: Arc<WarnOnce>,
}

impl<R: Renderer> Mount<R> {
    pub fn new(renderer: R, plugins: PluginRegistry<R::Surface>) -> Self {
        Self {
            renderer,
            plugins,
            warnings: WarnOnce::global(),
        }
    }

    /// Replace the process-wide deprecation tracker.
    pub fn with_warnings(mut self, warnings: Arc<WarnOnce>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn plugins(&self) -> &PluginRegistry<R::Surface> {
        &self.plugins
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mount `tree` with every registered plugin applied.
    ///
    /// # Arguments
    ///
    /// * `tree` - The element to mount
    /// * `options` - Base options; plugins read them and merge their own patches in
    ///
    /// # Errors
    ///
    /// Returns the first plugin error unchanged. Nothing is rendered in that case.
    pub fn mount(
        &self,
        tree: Element,
        options: MountOptions,
    ) -> Result<ContextWrapper<R::Surface>> {
        let result = execute_plugins(&self.plugins, tree, options)?;

        let surface = self.renderer.render(result.tree, &result.options);
        let lifecycle = Lifecycle::new(result.updaters);
        lifecycle.attach(&surface);

        debug!(
            plugins = self.plugins.len(),
            hooks = lifecycle.hook_count(),
            "mounted"
        );

        Ok(ContextWrapper {
            surface,
            controllers: result.controllers,
            lifecycle,
            warnings: self.warnings.clone(),
        })
    }
}

/// Facade rendering every component fully.
pub fn create_mount(plugins: PluginRegistry<HeadlessSurface>) -> Mount<HeadlessRenderer> {
    Mount::new(HeadlessRenderer::new(), plugins)
}

/// Facade rendering only the root component's own output.
pub fn create_shallow(plugins: PluginRegistry<HeadlessSurface>) -> Mount<HeadlessRenderer> {
    Mount::new(HeadlessRenderer::shallow(), plugins)
}

// =============================================================================
// Context Wrapper
// =============================================================================

/// A mounted surface plus the controllers of every plugin.
///
/// Derefs to the surface. `mount`/`unmount` here include hook invocation;
/// the surface's own methods do not.
pub struct ContextWrapper<S: Surface> {
    surface: S,
    controllers: Controllers,
    lifecycle: Lifecycle<S>,
    warnings: Arc<WarnOnce>,
}

impl<S: Surface> ContextWrapper<S> {
    /// Run every hook unmounter (first call only), then unmount the surface.
    pub fn unmount(&self) {
        self.lifecycle.unmount(&self.surface);
    }

    /// Remount after [`ContextWrapper::unmount`], re-running every hook.
    pub fn mount(&self) {
        self.lifecycle.remount(&self.surface);
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_mounted()
    }

    /// Controller of plugin `name`, downcast to `T`.
    pub fn controller<T: 'static>(&self, name: &str) -> Option<Rc<T>> {
        self.controllers.get_as(name)
    }

    pub fn controller_handle(&self, name: &str) -> Option<&Handle> {
        self.controllers.get(name)
    }

    pub fn controllers(&self) -> &Controllers {
        &self.controllers
    }

    /// The raw surface. Its own `mount`/`unmount` skip the plugin hooks;
    /// [`ContextWrapper::mount`] resyncs if the surface was unmounted this way.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[deprecated(note = "use the wrapper directly, it derefs to the surface")]
    pub fn component(&self) -> &S {
        self.warnings.warn(Deprecation::COMPONENT_ALIAS);
        &self.surface
    }
}

impl<S: Surface> Deref for ContextWrapper<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.surface
    }
}

impl<S: Surface> Drop for ContextWrapper<S> {
    fn drop(&mut self) {
        if self.lifecycle.is_mounted() {
            self.lifecycle.unmount(&self.surface);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pipeline::PluginOutput;
    use crate::types::{Cleanup, Value};
    use std::cell::Cell;

    type Output = Result<PluginOutput<HeadlessSurface>>;

    fn counting(
        mounts: Rc<Cell<usize>>,
        unmounts: Rc<Cell<usize>>,
    ) -> impl Fn(Element, &MountOptions) -> Output {
        move |tree: Element, _: &MountOptions| -> Output {
            let mounts = mounts.clone();
            let unmounts = unmounts.clone();
            let hook = move |_: &HeadlessSurface| -> Cleanup {
                mounts.set(mounts.get() + 1);
                let unmounts = unmounts.clone();
                Box::new(move || unmounts.set(unmounts.get() + 1))
            };
            Ok(PluginOutput::new(tree, Handle::unit()).on_mount(hook))
        }
    }

    fn counting_mount(
        mounts: &Rc<Cell<usize>>,
        unmounts: &Rc<Cell<usize>>,
    ) -> Mount<HeadlessRenderer> {
        let plugin = counting(mounts.clone(), unmounts.clone());
        create_mount(PluginRegistry::new().register("c", plugin))
    }

    #[test]
    fn test_mount_applies_plugins_and_renders() {
        let mount = create_mount(PluginRegistry::new().register(
            "tag",
            |tree: Element, _: &MountOptions| -> Output {
                Ok(PluginOutput::new(tree.with_prop("tagged", true), Handle::new(7_i64)))
            },
        ));

        let wrapper = mount.mount(Element::host("div"), MountOptions::new()).unwrap();

        assert!(wrapper.is_mounted());
        assert_eq!(wrapper.prop("tagged"), Some(Value::Bool(true)));
        assert_eq!(wrapper.controller::<i64>("tag").map(|v| *v), Some(7));
        assert!(wrapper.controller::<String>("tag").is_none());
    }

    #[test]
    fn test_unmount_twice_runs_unmounter_once() {
        let mounts = Rc::new(Cell::new(0));
        let unmounts = Rc::new(Cell::new(0));
        let mount = counting_mount(&mounts, &unmounts);

        let wrapper = mount.mount(Element::host("div"), MountOptions::new()).unwrap();
        wrapper.unmount();
        wrapper.unmount();

        assert_eq!((mounts.get(), unmounts.get()), (1, 1));
        assert!(!wrapper.exists());
    }

    #[test]
    fn test_drop_unmounts() {
        let mounts = Rc::new(Cell::new(0));
        let unmounts = Rc::new(Cell::new(0));
        let mount = counting_mount(&mounts, &unmounts);

        let wrapper = mount.mount(Element::host("div"), MountOptions::new()).unwrap();
        drop(wrapper);
        assert_eq!(unmounts.get(), 1);

        let wrapper = mount.mount(Element::host("div"), MountOptions::new()).unwrap();
        wrapper.unmount();
        drop(wrapper);
        assert_eq!((mounts.get(), unmounts.get()), (2, 2));
    }

    #[test]
    fn test_wrapper_mount_recovers_from_raw_surface_unmount() {
        let mounts = Rc::new(Cell::new(0));
        let unmounts = Rc::new(Cell::new(0));
        let mount = counting_mount(&mounts, &unmounts);

        let wrapper = mount.mount(Element::host("div"), MountOptions::new()).unwrap();
        wrapper.surface().unmount();
        assert!(!wrapper.exists());

        wrapper.mount();
        assert!(wrapper.exists());
        assert_eq!((mounts.get(), unmounts.get()), (2, 1));
    }

    #[test]
    fn test_plugin_error_returns_no_wrapper() {
        let mount = create_mount(PluginRegistry::new().register(
            "broken",
            |_: Element, _: &MountOptions| -> Output { Err(Error::plugin("no client")) },
        ));

        let result = mount.mount(Element::host("div"), MountOptions::new());
        assert!(matches!(result, Err(Error::Plugin(_))));
    }

    #[test]
    #[allow(deprecated)]
    fn test_component_alias_warns_once_per_tracker() {
        let warnings = Arc::new(WarnOnce::new());
        let mount = create_mount(PluginRegistry::new()).with_warnings(warnings.clone());
        let wrapper = mount.mount(Element::host("div"), MountOptions::new()).unwrap();

        assert!(wrapper.component().ptr_eq(wrapper.surface()));
        let _ = wrapper.component();

        assert_eq!(warnings.fired(), Deprecation::COMPONENT_ALIAS);
        assert!(!warnings.warn(Deprecation::COMPONENT_ALIAS));
    }
}
