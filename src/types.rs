//! Dynamic event arguments.
//!
//! Listeners receive `&[Value]`. A value is either plain data (any
//! `serde_json::Value`) or a reference to a live object, compared by
//! identity rather than by contents.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// ObjectRef
// ============================================================================

/// A type-erased shared reference to a live object.
///
/// Equality is pointer identity: two `ObjectRef`s are equal only if they
/// refer to the same allocation.
#[derive(Clone)]
pub struct ObjectRef {
    inner: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
    /// Erase the type of `object`, keeping its identity.
    pub fn new<T: Any + Send + Sync>(object: Arc<T>) -> Self {
        Self { inner: object }
    }

    /// Recover the concrete `Arc<T>`, or `None` if the object is another type.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    /// Whether this reference points at `object`.
    pub fn is<T: Any + Send + Sync>(&self, object: &Arc<T>) -> bool {
        self.addr() == Arc::as_ptr(object) as *const () as usize
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({:#x})", self.addr())
    }
}

// ============================================================================
// Value
// ============================================================================

/// A single event argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Data(serde_json::Value),
    Object(ObjectRef),
}

impl Value {
    /// Wrap a shared object as an argument.
    pub fn object<T: Any + Send + Sync>(object: Arc<T>) -> Self {
        Self::Object(ObjectRef::new(object))
    }

    /// JSON `null`.
    pub fn null() -> Self {
        Self::Data(serde_json::Value::Null)
    }

    /// The string, if this is string data.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Data(v) => v.as_str(),
            Self::Object(_) => None,
        }
    }

    /// The number, if this is integer data that fits an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Data(v) => v.as_i64(),
            Self::Object(_) => None,
        }
    }

    /// Interpret the value as a list index.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Data(v) => v.as_u64().and_then(|n| usize::try_from(n).ok()),
            Self::Object(_) => None,
        }
    }

    /// The plain data, or `None` for an object reference.
    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Data(v) => Some(v),
            Self::Object(_) => None,
        }
    }

    /// The referenced object, if this is an object of type `T`.
    pub fn as_object<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Self::Object(o) => o.downcast::<T>(),
            Self::Data(_) => None,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Data(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Self::Object(o)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Data(serde_json::Value::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Data(serde_json::Value::String(s))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Data(serde_json::Value::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Data(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Data(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Data(n.into())
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Data(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Data(n.into())
    }
}
