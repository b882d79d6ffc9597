//! Lifecycle - connects plugin hooks to mount and unmount transitions.
//!
//! # State
//!
//! ```text
//!   attach / remount            unmount
//! ──────────────────▶ MOUNTED ──────────▶ UNMOUNTED
//!   hooks run, unmounters       unmounters run in registration order,
//!   captured                    then the surface unmounts
//! ```
//!
//! - `unmount` while unmounted skips the unmounters but still delegates to the surface
//! - `remount` while mounted does nothing
//! - `remount` after the surface was unmounted directly settles the pending
//!   unmounters first, then mounts as usual

use std::cell::{Cell, RefCell};

use tracing::{debug, trace};

use super::plugin::Updater;
use crate::renderer::Surface;
use crate::types::Cleanup;

pub struct Lifecycle<S> {
    hooks: Vec<Updater<S>>,
    unmounters: RefCell<Vec<Cleanup>>,
    mounted: Cell<bool>,
}

impl<S: Surface> Lifecycle<S> {
    pub fn new(hooks: Vec<Updater<S>>) -> Self {
        Self {
            hooks,
            unmounters: RefCell::new(Vec::new()),
            mounted: Cell::new(false),
        }
    }

    /// Run every hook against a freshly rendered surface.
    pub fn attach(&self, surface: &S) {
        self.arm(surface);
    }

    /// Run every unmounter (once), then unmount the surface.
    pub fn unmount(&self, surface: &S) {
        if self.mounted.replace(false) {
            self.disarm();
        }
        surface.unmount();
    }

    /// Mount the surface again and re-run every hook. No-op while mounted.
    pub fn remount(&self, surface: &S) {
        if self.mounted.get() {
            if surface.is_mounted() {
                return;
            }
            // Surface was unmounted directly, settle its hooks first
            self.mounted.set(false);
            self.disarm();
        }
        surface.mount();
        debug!(hooks = self.hooks.len(), "remounting");
        self.arm(surface);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    fn arm(&self, surface: &S) {
        let unmounters: Vec<Cleanup> = self
            .hooks
            .iter()
            .enumerate()
            .map(|(index, hook)| {
                trace!(hook = index, "running lifecycle hook");
                hook(surface)
            })
            .collect();

        *self.unmounters.borrow_mut() = unmounters;
        self.mounted.set(true);
    }

    fn disarm(&self) {
        let unmounters = std::mem::take(&mut *self.unmounters.borrow_mut());
        debug!(unmounters = unmounters.len(), "unmounting");
        for unmounter in unmounters {
            unmounter();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
