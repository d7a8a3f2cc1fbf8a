//! Handlers and the objects they can be bound to.
//!
//! A [`Handler`] is either a closure or the name of a method. Method names are
//! resolved on the binding's [`HostRef`] every time the event fires, so a host
//! may swap the implementation behind a name after the binding was made.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::ListenerResult;
use crate::types::Value;

/// Closure type for event listeners.
pub type Callback = Arc<dyn Fn(&[Value]) -> ListenerResult + Send + Sync>;

/// Wrap a closure as a [`Callback`].
///
/// Keep a clone of the returned `Arc` to remove the listener later; handlers
/// are matched by pointer identity.
pub fn callback<F>(f: F) -> Callback
where
    F: Fn(&[Value]) -> ListenerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

// ============================================================================
// Handler
// ============================================================================

#[derive(Clone)]
pub enum Handler {
    Function(Callback),
    /// Looked up on the bound host at fire time.
    Method(String),
}

impl Handler {
    /// The method name, for [`Handler::Method`].
    pub fn method_name(&self) -> Option<&str> {
        match self {
            Self::Method(name) => Some(name),
            Self::Function(_) => None,
        }
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Function(a), Self::Function(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (Self::Method(a), Self::Method(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(cb) => write!(f, "Function({:p})", Arc::as_ptr(cb) as *const ()),
            Self::Method(name) => write!(f, "Method({name:?})"),
        }
    }
}

impl From<Callback> for Handler {
    fn from(cb: Callback) -> Self {
        Self::Function(cb)
    }
}

impl From<&Callback> for Handler {
    fn from(cb: &Callback) -> Self {
        Self::Function(Arc::clone(cb))
    }
}

impl From<&str> for Handler {
    fn from(name: &str) -> Self {
        Self::Method(name.to_string())
    }
}

impl From<String> for Handler {
    fn from(name: String) -> Self {
        Self::Method(name)
    }
}

// ============================================================================
// Host
// ============================================================================

/// An object whose methods can be bound to events by name.
pub trait Host: Send + Sync {
    /// Whether `method` currently names something callable.
    fn responds_to(&self, method: &str) -> bool;

    /// Call `method` with `args`.
    ///
    /// Returns `None` when no such method exists at call time.
    fn invoke(&self, method: &str, args: &[Value]) -> Option<ListenerResult>;
}

/// Non-owning, identity-compared handle to a [`Host`].
///
/// Bindings hold hosts through this handle so an emitter never keeps the
/// objects listening to it alive.
#[derive(Clone)]
pub struct HostRef {
    host: Weak<dyn Host>,
    addr: usize,
}

impl HostRef {
    /// Weak handle to `host`.
    pub fn new<H: Host + 'static>(host: &Arc<H>) -> Self {
        Self::from_weak(Arc::downgrade(host))
    }

    /// Build a handle from a weak pointer, e.g. inside `Arc::new_cyclic`.
    pub fn from_weak<H: Host + 'static>(host: Weak<H>) -> Self {
        let addr = host.as_ptr() as *const () as usize;
        let host: Weak<dyn Host> = host;
        Self { host, addr }
    }

    /// The host, unless it has been dropped.
    pub fn upgrade(&self) -> Option<Arc<dyn Host>> {
        self.host.upgrade()
    }

    /// Whether this handle refers to `host`.
    pub fn is<H: Host + 'static>(&self, host: &Arc<H>) -> bool {
        self.addr == Arc::as_ptr(host) as *const () as usize
    }
}

impl PartialEq for HostRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl Eq for HostRef {}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostRef({:#x})", self.addr)
    }
}

// ============================================================================
// Connection
// ============================================================================

/// One value of a `connect` / `disconnect` map: a handler plus arguments to
/// prepend to every emission.
#[derive(Clone, Debug)]
pub struct Connection {
    pub handler: Handler,
    pub args: Vec<Value>,
}

impl Connection {
    pub fn with_args(handler: impl Into<Handler>, args: Vec<Value>) -> Self {
        Self {
            handler: handler.into(),
            args,
        }
    }
}

impl From<Handler> for Connection {
    fn from(handler: Handler) -> Self {
        Self {
            handler,
            args: Vec::new(),
        }
    }
}

impl From<&str> for Connection {
    fn from(method: &str) -> Self {
        Handler::from(method).into()
    }
}

impl From<String> for Connection {
    fn from(method: String) -> Self {
        Handler::from(method).into()
    }
}

impl From<Callback> for Connection {
    fn from(cb: Callback) -> Self {
        Handler::from(cb).into()
    }
}

impl From<&Callback> for Connection {
    fn from(cb: &Callback) -> Self {
        Handler::from(cb).into()
    }
}
