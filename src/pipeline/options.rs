//! Mount options - what plugins read and patch.

use crate::primitives::Provider;
use crate::types::{merge_props, Props, Value};

/// Options threaded through the plugin pipeline and handed to the renderer.
///
/// Plugins return a patch of this same type. Patches are merged with
/// [`MountOptions::merge`]: maps deep-merge with the patch winning, wrapping
/// providers are appended.
#[derive(Debug, Clone, Default)]
pub struct MountOptions {
    /// Initial root context of the mounted surface.
    pub context: Props,
    /// Providers wrapped around the mounted tree, outermost first.
    pub wrapping: Vec<Provider>,
    /// Plugin-declared mount-time options (`name`, `initial_count`, ...).
    pub props: Props,
}

impl MountOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a plugin option.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Builder: set a root context value.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Builder: wrap the tree in one more provider, inside any existing ones.
    pub fn wrap_with(mut self, provider: Provider) -> Self {
        self.wrapping.push(provider);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    /// Merge a plugin's patch into these options.
    pub fn merge(&mut self, patch: MountOptions) {
        merge_props(&mut self.context, patch.context);
        merge_props(&mut self.props, patch.props);
        self.wrapping.extend(patch.wrapping);
    }
}
