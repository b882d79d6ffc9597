//! Render surfaces.
//!
//! The facade never renders anything itself. It hands the decorated tree
//! and merged options to a [`Renderer`] and drives the resulting [`Surface`]
//! through mount and unmount.
//!
//! [`HeadlessRenderer`] is the built-in surface: it resolves element trees
//! into inspectable [`Node`]s inside a reactive effect, so provider changes
//! and pushed context re-render on their own.

mod headless;

pub use headless::{HeadlessRenderer, HeadlessSurface, Node, RenderMode};

use crate::pipeline::MountOptions;
use crate::primitives::Element;
use crate::types::Props;

/// A live render result.
///
/// Surfaces are shared handles: clones refer to the same rendered tree, so
/// a listener can hold one and push context into it later.
pub trait Surface: Clone + 'static {
    /// Re-render after an unmount. No-op while mounted.
    fn mount(&self);

    /// Tear the rendered tree down. No-op while unmounted.
    fn unmount(&self);

    fn is_mounted(&self) -> bool;

    /// Push a context snapshot into the surface's root context slot.
    ///
    /// Each top-level key of `context` replaces the stored one wholesale.
    /// Keys the snapshot does not mention are kept.
    fn set_context(&self, context: Props);
}

/// Something that turns a tree plus options into a mounted [`Surface`].
pub trait Renderer {
    type Surface: Surface;

    fn render(&self, tree: Element, options: &MountOptions) -> Self::Surface;
}
