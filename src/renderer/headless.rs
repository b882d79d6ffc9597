//! Headless renderer - resolves element trees without any output target.
//!
//! The whole tree is resolved inside ONE effect. Everything the resolution
//! reads reactively (the root context slot, every provider value on the
//! way down) becomes a dependency, so:
//! - `Provider::set` re-renders every mounted subtree below that provider
//! - `Surface::set_context` re-renders the surface
//! - `unmount` stops the effect and drops the output
//!
//! # Modes
//!
//! - [`RenderMode::Full`] - root node is the mounted element, every component expanded
//! - [`RenderMode::Shallow`] - root node is the root component's output,
//!   nested components are left as leaves

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_signals::{effect, signal, Signal};
use tracing::trace;

use super::{Renderer, Surface};
use crate::pipeline::MountOptions;
use crate::primitives::{Element, ElementKind, Provider, RenderCx};
use crate::types::{merge_props, Cleanup, Props, Value};

// =============================================================================
// Render Mode
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Full,
    Shallow,
}

// =============================================================================
// Node
// =============================================================================

/// One resolved node of a rendered tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub props: Props,
    pub children: Vec<Node>,
}

impl Node {
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// First node named `name`, depth-first, starting with this one.
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

// =============================================================================
// Renderer
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessRenderer {
    mode: RenderMode,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shallow() -> Self {
        Self {
            mode: RenderMode::Shallow,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }
}

impl Renderer for HeadlessRenderer {
    type Surface = HeadlessSurface;

    fn render(&self, tree: Element, options: &MountOptions) -> HeadlessSurface {
        let surface = HeadlessSurface::new(
            tree,
            options.wrapping.clone(),
            options.context.clone(),
            self.mode,
        );
        surface.mount();
        surface
    }
}

// =============================================================================
// Surface
// =============================================================================

struct SurfaceInner {
    tree: Element,
    /// Providers wrapped around the tree, outermost first.
    wrapping: Vec<Provider>,
    mode: RenderMode,
    context: Signal<Props>,
    /// Untracked copy of `context`, so pushes never subscribe the caller.
    context_shadow: RefCell<Props>,
    output: Rc<RefCell<Option<Node>>>,
    renders: Rc<Cell<usize>>,
    stop: RefCell<Option<Cleanup>>,
}

impl Drop for SurfaceInner {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.get_mut().take() {
            stop();
        }
    }
}

/// Shared handle to a headless render.
#[derive(Clone)]
pub struct HeadlessSurface {
    inner: Rc<SurfaceInner>,
}

impl HeadlessSurface {
    /// Create an unmounted surface. Call [`Surface::mount`] to render.
    pub fn new(tree: Element, wrapping: Vec<Provider>, context: Props, mode: RenderMode) -> Self {
        Self {
            inner: Rc::new(SurfaceInner {
                tree,
                wrapping,
                mode,
                context: signal(context.clone()),
                context_shadow: RefCell::new(context),
                output: Rc::new(RefCell::new(None)),
                renders: Rc::new(Cell::new(0)),
                stop: RefCell::new(None),
            }),
        }
    }

    /// Rendered root node, `None` while unmounted or if the root rendered nothing.
    pub fn root(&self) -> Option<Node> {
        self.inner.output.borrow().clone()
    }

    pub fn exists(&self) -> bool {
        self.inner.output.borrow().is_some()
    }

    /// Name of the rendered root node.
    pub fn name(&self) -> Option<String> {
        self.inner.output.borrow().as_ref().map(|node| node.name.clone())
    }

    /// Prop of the rendered root node.
    pub fn prop(&self, key: &str) -> Option<Value> {
        self.inner
            .output
            .borrow()
            .as_ref()
            .and_then(|node| node.prop(key).cloned())
    }

    pub fn find(&self, name: &str) -> Option<Node> {
        self.inner
            .output
            .borrow()
            .as_ref()
            .and_then(|node| node.find(name).cloned())
    }

    /// Current root context slot.
    pub fn context(&self) -> Props {
        self.inner.context_shadow.borrow().clone()
    }

    /// How many times the tree has been resolved across all mounts.
    pub fn render_count(&self) -> usize {
        self.inner.renders.get()
    }

    pub fn mode(&self) -> RenderMode {
        self.inner.mode
    }

    pub fn ptr_eq(&self, other: &HeadlessSurface) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Surface for HeadlessSurface {
    fn mount(&self) {
        if self.is_mounted() {
            return;
        }

        let tree = self.inner.tree.clone();
        let wrapping = self.inner.wrapping.clone();
        let context = self.inner.context.clone();
        let output = self.inner.output.clone();
        let renders = self.inner.renders.clone();
        let mode = self.inner.mode;

        let stop = effect(move || {
            let mut scope = context.get();
            for provider in &wrapping {
                merge_props(&mut scope, provider.value());
            }

            let node = render_root(&tree, &scope, mode);
            *output.borrow_mut() = node;
            renders.set(renders.get() + 1);
        });

        *self.inner.stop.borrow_mut() = Some(Box::new(stop));
        trace!(root = self.inner.tree.name(), ?mode, "headless surface mounted");
    }

    fn unmount(&self) {
        let stop = self.inner.stop.borrow_mut().take();
        if let Some(stop) = stop {
            stop();
            *self.inner.output.borrow_mut() = None;
            trace!(root = self.inner.tree.name(), "headless surface unmounted");
        }
    }

    fn is_mounted(&self) -> bool {
        self.inner.stop.borrow().is_some()
    }

    fn set_context(&self, context: Props) {
        let next = {
            let mut shadow = self.inner.context_shadow.borrow_mut();
            shadow.extend(context);
            shadow.clone()
        };
        self.inner.context.set(next);
    }
}

// =============================================================================
// Tree Resolution
// =============================================================================

fn render_root(tree: &Element, context: &Props, mode: RenderMode) -> Option<Node> {
    match (mode, tree.kind()) {
        (RenderMode::Shallow, ElementKind::Component(component)) => {
            let cx = RenderCx {
                props: tree.get_props(),
                context,
                children: tree.get_children(),
            };
            component
                .render(&cx)
                .map(|output| resolve(&output, context, mode))
        }
        _ => Some(resolve(tree, context, mode)),
    }
}

fn resolve(element: &Element, context: &Props, mode: RenderMode) -> Node {
    let children = match element.kind() {
        ElementKind::Host(_) => resolve_all(element.get_children(), context, mode),
        ElementKind::Provider(provider) => {
            let mut scoped = context.clone();
            merge_props(&mut scoped, provider.value());
            resolve_all(element.get_children(), &scoped, mode)
        }
        ElementKind::Component(component) => match mode {
            RenderMode::Full => {
                let cx = RenderCx {
                    props: element.get_props(),
                    context,
                    children: element.get_children(),
                };
                component
                    .render(&cx)
                    .map(|output| resolve(&output, context, mode))
                    .into_iter()
                    .collect()
            }
            RenderMode::Shallow => Vec::new(),
        },
    };

    Node {
        name: element.name().to_string(),
        props: element.get_props().clone(),
        children,
    }
}

fn resolve_all(elements: &[Element], context: &Props, mode: RenderMode) -> Vec<Node> {
    elements
        .iter()
        .map(|element| resolve(element, context, mode))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
