//! Plugin execution - fold every registered plugin over a tree and options.

use std::rc::Rc;

use tracing::trace;

use super::options::MountOptions;
use super::plugin::{PluginRegistry, Updater};
use crate::error::Result;
use crate::primitives::Element;
use crate::renderer::Surface;
use crate::types::Handle;

// =============================================================================
// Controllers
// =============================================================================

/// Controllers keyed by plugin name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Controllers {
    entries: Vec<(String, Handle)>,
}

impl Controllers {
    pub fn get(&self, name: &str) -> Option<&Handle> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, handle)| handle)
    }

    /// Controller `name`, downcast to `T`.
    pub fn get_as<T: 'static>(&self, name: &str) -> Option<Rc<T>> {
        self.get(name).and_then(Handle::downcast)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, name: &str, handle: Handle) {
        match self.entries.iter_mut().find(|entry| entry.0 == name) {
            Some(entry) => entry.1 = handle,
            None => self.entries.push((name.to_string(), handle)),
        }
    }
}

// =============================================================================
// Plugin Result
// =============================================================================

/// Everything one mount call needs: produced by [`execute_plugins`], consumed
/// right away by the facade.
pub struct PluginResult<S> {
    pub tree: Element,
    pub options: MountOptions,
    pub controllers: Controllers,
    /// Lifecycle hooks in registration order.
    pub updaters: Vec<Updater<S>>,
}

/// Call every plugin in registration order and aggregate their results.
///
/// Each plugin receives the tree returned by the previous plugin and the
/// options merged so far, so later plugins can react to what earlier ones
/// contributed.
///
/// # Errors
///
/// The first plugin error aborts the fold and is returned unchanged. Plugins
/// that already ran are not rolled back.
pub fn execute_plugins<S: Surface>(
    plugins: &PluginRegistry<S>,
    tree: Element,
    options: MountOptions,
) -> Result<PluginResult<S>> {
    let initial = PluginResult {
        tree,
        options,
        controllers: Controllers::default(),
        updaters: Vec::new(),
    };

    plugins.iter().try_fold(initial, |mut acc, (name, plugin)| {
        trace!(plugin = name, "applying plugin");
        let output = plugin.apply(acc.tree, &acc.options)?;

        acc.tree = output.tree;
        acc.options.merge(output.options);
        acc.controllers.insert(name, output.controller);
        acc.updaters.extend(output.updater);
        Ok(acc)
    })
}

// =============================================================================
// Tests
// =============================================================================
