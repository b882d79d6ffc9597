//! Watchers - observable values and ambient context observation.
//!
//! - [`ValueWatcher`] - a value plus listeners, notified synchronously on `set`
//! - [`ContextWatcher`] - observes a provider's context through a headless render
//! - [`bind_context_to_wrapper`] / [`bind_context`] - forward context changes into a mounted surface

mod context_watcher;
mod value_watcher;

pub use context_watcher::{
    bind_context, bind_context_to_wrapper, context_from_provider, ContextWatcher,
};
pub use value_watcher::{Listener, ValueWatcher};
