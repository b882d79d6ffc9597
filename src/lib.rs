//! # spark-mount-context
//!
//! Plugin-aware test mounting for reactive component trees.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! A mount call is a fold over a registry of named plugins. Each plugin
//! decorates the tree, patches the mount options, exposes a controller, and
//! may register a lifecycle hook. The facade then renders the result and ties
//! the hooks to mount and unmount:
//! ```text
//! Element + MountOptions → execute_plugins → Renderer::render → Lifecycle → ContextWrapper
//! ```
//!
//! Ambient context that changes after mount (a store update, a navigation)
//! is observed with a [`ContextWatcher`] and pushed into the live surface by
//! [`bind_context`].
//!
//! ## Modules
//!
//! - [`types`] - Core types (Value, Props, Handle, ContextShape)
//! - [`primitives`] - Element tree: hosts, components, providers
//! - [`renderer`] - Surface contract and the headless renderer
//! - [`watch`] - Value and context watchers, context binding
//! - [`pipeline`] - Plugin contract, execution, lifecycle, mount facade
//! - [`error`] - Error type

pub mod error;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod types;
pub mod watch;

// Re-export commonly used items
pub use types::*;

pub use error::{Error, Result};

pub use primitives::{Component, Element, ElementKind, Provider, RenderCx};

pub use renderer::{HeadlessRenderer, HeadlessSurface, Node, RenderMode, Renderer, Surface};

pub use watch::{
    bind_context, bind_context_to_wrapper, context_from_provider, ContextWatcher, ValueWatcher,
};

pub use pipeline::{
    create_mount, create_shallow, execute_plugins, ContextWrapper, Controllers, Deprecation,
    Lifecycle, Mount, MountOptions, Plugin, PluginOutput, PluginRegistry, PluginResult, Updater,
    WarnOnce,
};
