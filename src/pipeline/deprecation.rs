//! Deprecation warnings, each emitted at most once per tracker.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use bitflags::bitflags;
use tracing::warn;

bitflags! {
    /// Deprecated API surfaces.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Deprecation: u8 {
        /// `ContextWrapper::component()` - use the wrapper directly.
        const COMPONENT_ALIAS = 1 << 0;
    }
}

impl Deprecation {
    pub fn message(self) -> &'static str {
        if self.contains(Deprecation::COMPONENT_ALIAS) {
            "ContextWrapper::component() is deprecated; \
             use the wrapper directly, it derefs to the surface"
        } else {
            "deprecated API"
        }
    }
}

/// Tracks which deprecations have already been reported.
#[derive(Debug, Default)]
pub struct WarnOnce {
    fired: AtomicU8,
}

static GLOBAL: OnceLock<Arc<WarnOnce>> = OnceLock::new();

impl WarnOnce {
    pub const fn new() -> Self {
        Self {
            fired: AtomicU8::new(0),
        }
    }

    /// Process-wide tracker shared by every mount that does not inject its own.
    pub fn global() -> Arc<WarnOnce> {
        GLOBAL.get_or_init(|| Arc::new(WarnOnce::new())).clone()
    }

    /// Emit the warning for `which` unless already emitted.
    ///
    /// Returns `true` when this call emitted it.
    pub fn warn(&self, which: Deprecation) -> bool {
        let bits = self.fired.fetch_or(which.bits(), Ordering::Relaxed);
        if Deprecation::from_bits_truncate(bits).contains(which) {
            return false;
        }
        warn!(deprecation = ?which, "{}", which.message());
        true
    }

    pub fn fired(&self) -> Deprecation {
        Deprecation::from_bits_truncate(self.fired.load(Ordering::Relaxed))
    }
}
