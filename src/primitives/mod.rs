//! Element primitives - the component tree plugins decorate.
//!
//! This module provides the tree building blocks:
//! - [`Element`] - a node description (host tag, component or provider) with props and children
//! - [`Component`] - a named render closure receiving props, ambient context and children
//! - [`Provider`] - a named `Signal<Props>` merged into the ambient context of its subtree
//!
//! # Ambient Context
//!
//! Context flows strictly downward. A provider's value is merged over the
//! context it receives, and every descendant component sees the result in
//! [`RenderCx::context`]. Providers are explicit objects, so anything that
//! holds one (a plugin controller, a test) can push new context with
//! [`Provider::set`] and every mounted subtree re-renders.
//!
//! ```ignore
//! let state = signal(Props::new());
//! let store = Provider::new("StoreProvider", state.clone())
//!     .with_shape(ContextShape::new(["store"]));
//!
//! let tree = Element::provider(&store).child(Element::component(&counter));
//! ```

mod element;

pub use element::*;
