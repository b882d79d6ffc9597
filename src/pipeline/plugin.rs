//! Plugin contract and registry.
//!
//! A plugin is called once per mount with the current tree and the options
//! accumulated so far. It returns a [`PluginOutput`]:
//! - `tree` - the (possibly decorated) tree for the next plugin
//! - `options` - a patch merged into the accumulated options
//! - `controller` - the object exposed to the test under the plugin's name
//! - `updater` - optional lifecycle hook, run on every mount, returning an unmounter
//!
//! Closures with the matching signature are plugins:
//!
//! ```ignore
//! let registry = PluginRegistry::new().register(
//!     "a",
//!     |tree: Element, options: &MountOptions| -> Result<PluginOutput<HeadlessSurface>> {
//!         Ok(PluginOutput::new(tree.with_prop("hasa", "true"), Handle::unit()))
//!     },
//! );
//! ```

use std::fmt;
use std::rc::Rc;

use super::options::MountOptions;
use crate::error::Result;
use crate::primitives::Element;
use crate::renderer::Surface;
use crate::types::{Cleanup, Handle};

/// Lifecycle hook: invoked with the live surface, returns its unmounter.
pub type Updater<S> = Rc<dyn Fn(&S) -> Cleanup>;

// =============================================================================
// Plugin Output
// =============================================================================

pub struct PluginOutput<S> {
    pub tree: Element,
    pub options: MountOptions,
    pub controller: Handle,
    pub updater: Option<Updater<S>>,
}

impl<S: Surface> PluginOutput<S> {
    /// Output with an empty options patch and no hook.
    pub fn new(tree: Element, controller: Handle) -> Self {
        Self {
            tree,
            options: MountOptions::default(),
            controller,
            updater: None,
        }
    }

    pub fn with_options(mut self, options: MountOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_updater(mut self, updater: Updater<S>) -> Self {
        self.updater = Some(updater);
        self
    }

    /// Convenience for closure hooks.
    pub fn on_mount<F>(self, hook: F) -> Self
    where
        F: Fn(&S) -> Cleanup + 'static,
    {
        self.with_updater(Rc::new(hook))
    }
}

// =============================================================================
// Plugin
// =============================================================================

/// The unit of extension.
pub trait Plugin<S> {
    /// Decorate `tree`, patch `options`, and hand back a controller.
    ///
    /// Errors abort the mount and are returned to the caller as-is.
    fn apply(&self, tree: Element, options: &MountOptions) -> Result<PluginOutput<S>>;
}

impl<S, F> Plugin<S> for F
where
    F: Fn(Element, &MountOptions) -> Result<PluginOutput<S>>,
{
    fn apply(&self, tree: Element, options: &MountOptions) -> Result<PluginOutput<S>> {
        self(tree, options)
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Named plugins in application order.
pub struct PluginRegistry<S> {
    entries: Vec<(String, Rc<dyn Plugin<S>>)>,
}

impl<S: Surface> PluginRegistry<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builder form of [`PluginRegistry::insert`].
    pub fn register(mut self, name: impl Into<String>, plugin: impl Plugin<S> + 'static) -> Self {
        self.insert(name, plugin);
        self
    }

    /// Add a plugin at the end.
    ///
    /// Re-using a name replaces that plugin but keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, plugin: impl Plugin<S> + 'static) {
        let name = name.into();
        let plugin: Rc<dyn Plugin<S>> = Rc::new(plugin);

        match self.entries.iter_mut().find(|entry| entry.0 == name) {
            Some(entry) => entry.1 = plugin,
            None => self.entries.push((name, plugin)),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Plugin<S>)> {
        self.entries
            .iter()
            .map(|(name, plugin)| (name.as_str(), plugin.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Surface> Default for PluginRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for PluginRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<S> fmt::Debug for PluginRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}
