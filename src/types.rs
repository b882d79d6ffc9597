//! Core types for spark-mount-context.
//!
//! These types define the foundation that everything builds on.
//! Props, mount options and ambient context are all maps of [`Value`], so
//! plugins can patch them without knowing each other's shapes.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by lifecycle hooks and bindings.
///
/// Being `FnOnce`, an unmounter can only ever run once per hook invocation.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Props
// =============================================================================

/// Keyed values: element props, plugin options and ambient context.
pub type Props = BTreeMap<String, Value>;

/// Deep-merge `patch` into `base`.
///
/// Map-into-map recurses. Any other combination is replaced by the patch
/// value, so the patch wins for identical paths.
pub fn merge_props(base: &mut Props, patch: Props) {
    for (key, incoming) in patch {
        match base.get_mut(&key) {
            Some(Value::Map(existing)) if matches!(incoming, Value::Map(_)) => {
                if let Value::Map(incoming) = incoming {
                    merge_props(existing, incoming);
                }
            }
            _ => {
                base.insert(key, incoming);
            }
        }
    }
}

// =============================================================================
// Value
// =============================================================================

/// A dynamic value stored in props, options or context.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(Props),
    /// Opaque shared object (controllers, clients, stores).
    Handle(Handle),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Props> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<&Handle> {
        match self {
            Value::Handle(handle) => Some(handle),
            _ => None,
        }
    }

    /// Downcast a `Handle` value to its concrete type.
    pub fn downcast<T: 'static>(&self) -> Option<Rc<T>> {
        self.as_handle().and_then(Handle::downcast)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Value::List(list)
    }
}

impl From<Props> for Value {
    fn from(map: Props) -> Self {
        Value::Map(map)
    }
}

impl From<Handle> for Value {
    fn from(handle: Handle) -> Self {
        Value::Handle(handle)
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Opaque shared object, compared by identity.
///
/// Controllers are handed to tests as handles and may also travel through
/// ambient context so components can reach them.
#[derive(Clone)]
pub struct Handle(Rc<dyn Any>);

impl Handle {
    /// Wrap a value in a new handle.
    pub fn new<T: 'static>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Share an existing `Rc` without re-allocating.
    pub fn from_rc<T: 'static>(value: Rc<T>) -> Self {
        Self(value)
    }

    /// Handle for plugins that expose nothing.
    pub fn unit() -> Self {
        Self::new(())
    }

    pub fn downcast<T: 'static>(&self) -> Option<Rc<T>> {
        self.0.clone().downcast::<T>().ok()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.0.is::<T>()
    }

    pub fn ptr_eq(&self, other: &Handle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

// =============================================================================
// Context Shape
// =============================================================================

/// The context keys a provider exposes to its descendants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextShape(Vec<String>);

impl ContextShape {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut shape = Self::default();
        for key in keys {
            shape.insert(key);
        }
        shape
    }

    /// Add a key, keeping declaration order and ignoring duplicates.
    pub fn insert(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.contains(&key) {
            self.0.push(key);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Project `context` down to the declared keys.
    ///
    /// Declared keys missing from `context` are absent from the result.
    pub fn pick(&self, context: &Props) -> Props {
        self.0
            .iter()
            .filter_map(|key| context.get(key).map(|value| (key.clone(), value.clone())))
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
