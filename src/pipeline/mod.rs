//! Plugin Pipeline
//!
//! This module turns a plain mount into a plugin-aware one.
//!
//! # Pipeline Architecture
//!
//! ```text
//! tree + options → plugin 1 → plugin 2 → … → render → lifecycle hooks
//! ```
//!
//! ## Data Flow
//!
//! 1. **execute_plugins** - Folds the registry; each plugin decorates the tree,
//!    patches the options, and hands back a controller and an optional hook
//! 2. **Renderer::render** - Renders the final tree with the merged options
//! 3. **Lifecycle** - Runs every hook on mount, every unmounter on unmount
//!
//! ## Key Design Principles
//!
//! - **Ordered**: Plugins run in registration order, later patches win
//! - **Serialized**: The fold is the only place plugins touch shared options
//! - **Explicit Wrapper**: `ContextWrapper` defines mount/unmount up front

mod deprecation;
mod execute;
mod lifecycle;
mod mount;
mod options;
mod plugin;

// Re-exports
pub use deprecation::{Deprecation, WarnOnce};
pub use execute::{execute_plugins, Controllers, PluginResult};
pub use lifecycle::Lifecycle;
pub use mount::{create_mount, create_shallow, ContextWrapper, Mount};
pub use options::MountOptions;
pub use plugin::{Plugin, PluginOutput, PluginRegistry, Updater};
