//! Element, Component and Provider.

use std::fmt;
use std::rc::Rc;

use spark_signals::Signal;

use crate::types::{ContextShape, Props, Value};

// =============================================================================
// Render Context
// =============================================================================

/// What a component sees when it renders.
pub struct RenderCx<'a> {
    pub props: &'a Props,
    /// Ambient context merged from every provider above this component.
    pub context: &'a Props,
    pub children: &'a [Element],
}

/// Render function type (Rc so components clone cheaply into trees).
pub type RenderFn = Rc<dyn Fn(&RenderCx<'_>) -> Option<Element>>;

// =============================================================================
// Component
// =============================================================================

/// A named render closure.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: RenderFn,
}

impl Component {
    pub fn new<F>(name: impl Into<String>, render: F) -> Self
    where
        F: Fn(&RenderCx<'_>) -> Option<Element> + 'static,
    {
        Self {
            name: Rc::from(name.into()),
            render: Rc::new(render),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if both handles share the same render closure.
    pub fn ptr_eq(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }

    pub fn render(&self, cx: &RenderCx<'_>) -> Option<Element> {
        (self.render)(cx)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

// =============================================================================
// Provider
// =============================================================================

/// A subtree-scoped source of ambient context.
///
/// The value lives in a signal: renders that read it re-run when it changes.
#[derive(Clone)]
pub struct Provider {
    name: Rc<str>,
    value: Signal<Props>,
    shape: Option<ContextShape>,
}

impl Provider {
    pub fn new(name: impl Into<String>, value: Signal<Props>) -> Self {
        Self {
            name: Rc::from(name.into()),
            value,
            shape: None,
        }
    }

    /// Declare which context keys this provider exposes.
    ///
    /// Watchers can only infer what to observe from providers that declare
    /// a shape.
    pub fn with_shape(mut self, shape: ContextShape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> Option<&ContextShape> {
        self.shape.as_ref()
    }

    /// Current value. Inside a render this creates a dependency.
    pub fn value(&self) -> Props {
        self.value.get()
    }

    /// Replace the provided value wholesale.
    pub fn set(&self, value: Props) {
        self.value.set(value);
    }

    pub fn signal(&self) -> &Signal<Props> {
        &self.value
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish()
    }
}

// =============================================================================
// Element
// =============================================================================

#[derive(Debug, Clone)]
pub enum ElementKind {
    /// Plain tag rendered as-is.
    Host(Rc<str>),
    Component(Component),
    Provider(Provider),
}

/// Description of one node in a component tree.
///
/// Elements are immutable values: decorating one produces a new element.
#[derive(Debug, Clone)]
pub struct Element {
    kind: ElementKind,
    props: Props,
    children: Vec<Element>,
}

impl Element {
    fn with_kind(kind: ElementKind) -> Self {
        Self {
            kind,
            props: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn host(tag: impl Into<String>) -> Self {
        Self::with_kind(ElementKind::Host(Rc::from(tag.into())))
    }

    pub fn component(component: &Component) -> Self {
        Self::with_kind(ElementKind::Component(component.clone()))
    }

    pub fn provider(provider: &Provider) -> Self {
        Self::with_kind(ElementKind::Provider(provider.clone()))
    }

    /// Builder: set a prop.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Builder: set several props at once.
    pub fn props(mut self, props: Props) -> Self {
        self.props.extend(props);
        self
    }

    /// Builder: append a child.
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Clone this element with one extra prop.
    pub fn with_prop(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clone().prop(key, value)
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn get_props(&self) -> &Props {
        &self.props
    }

    pub fn get_prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    pub fn get_children(&self) -> &[Element] {
        &self.children
    }

    /// Display name: the tag, component name or provider name.
    pub fn name(&self) -> &str {
        match &self.kind {
            ElementKind::Host(tag) => &**tag,
            ElementKind::Component(component) => component.name(),
            ElementKind::Provider(provider) => provider.name(),
        }
    }

    /// Context shape declared by this element, if it is a provider with one.
    pub fn declared_shape(&self) -> Option<&ContextShape> {
        match &self.kind {
            ElementKind::Provider(provider) => provider.shape(),
            _ => None,
        }
    }

    pub fn is_provider(&self) -> bool {
        matches!(self.kind, ElementKind::Provider(_))
    }
}

// =============================================================================
// Tests
// =============================================================================
