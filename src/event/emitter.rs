//! EventEmitter: named events with re-entrant, error-isolated dispatch.
//!
//! An `emit` works on the bindings that existed when it started. Unbinding
//! during dispatch does not skip a binding in the current round, and a new
//! binding waits for the next `emit`. A once-binding leaves the store before
//! its handler runs, so a handler that re-emits its own event is not called
//! again.
//!
//! Handlers may bind, unbind and emit on the same emitter; the binding store
//! is only locked between handler calls.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{BindingError, ListenerError, ListenerResult};
use crate::types::Value;

use super::binding::{Binding, BindingStore};
use super::host::{Callback, Connection, Handler, HostRef};
use super::report::{ErrorReporter, TracingReporter};

pub struct EventEmitter {
    bindings: Mutex<BindingStore>,
    reporter: Arc<dyn ErrorReporter>,
}

impl EventEmitter {
    /// Create an emitter that logs listener errors through `tracing`.
    pub fn new() -> Self {
        Self::with_reporter(Arc::new(TracingReporter))
    }

    /// Create an emitter that hands listener errors to `reporter`.
    pub fn with_reporter(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            bindings: Mutex::new(BindingStore::new()),
            reporter,
        }
    }

    /// Where listener errors that are not returned to the caller go.
    pub fn reporter(&self) -> &Arc<dyn ErrorReporter> {
        &self.reporter
    }

    // -----------------------------------------------------------------------
    // Subscription
    // -----------------------------------------------------------------------

    /// Add a listener for `event`.
    pub fn on(&self, event: &str, listener: Callback) -> &Self {
        self.bindings
            .lock()
            .add(event, Handler::Function(listener), Vec::new(), None, false);
        self
    }

    /// Add a listener with prepended arguments and an optional bound host.
    ///
    /// A [`Handler::Method`] needs a `context`, and the host must respond to
    /// the method now; the method itself is looked up again on every emit.
    pub fn on_with(
        &self,
        event: &str,
        handler: impl Into<Handler>,
        args: Vec<Value>,
        context: Option<&HostRef>,
    ) -> Result<&Self, BindingError> {
        let handler = handler.into();
        validate(&handler, context)?;
        self.bindings
            .lock()
            .add(event, handler, args, context.cloned(), false);
        Ok(self)
    }

    /// Add a listener that is removed right before its first call.
    pub fn once(&self, event: &str, listener: Callback) -> &Self {
        self.bindings
            .lock()
            .add(event, Handler::Function(listener), Vec::new(), None, true);
        self
    }

    /// Remove every binding of `event` with this handler and context.
    ///
    /// `context` must match the one used to subscribe; `None` only matches
    /// bindings made without a host. A method name needs a context; if the
    /// host has been dropped its bindings can still be removed by name.
    pub fn off(
        &self,
        event: &str,
        handler: impl Into<Handler>,
        context: Option<&HostRef>,
    ) -> Result<&Self, BindingError> {
        let handler = handler.into();
        validate_unbind(&handler, context)?;
        self.unbind(event, &handler, context);
        Ok(self)
    }

    /// Remove all listeners of `event`.
    pub fn off_event(&self, event: &str) -> &Self {
        self.bindings.lock().remove_event(event);
        self
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Emit `event` to every listener bound at the time of the call.
    ///
    /// Listener errors and panics do not stop dispatch; each one goes to the
    /// reporter. Returns `false` if the event had no listeners.
    pub fn emit(&self, event: &str, args: &[Value]) -> bool {
        let Some(snapshot) = self.snapshot(event) else {
            return false;
        };
        for binding in snapshot {
            if let Err(error) = self.fire(event, &binding, args) {
                self.reporter.report(event, error);
            }
        }
        true
    }

    /// Like [`emit`](Self::emit), but the first listener error is returned
    /// once every listener has run. Later errors go to the reporter.
    pub fn emit_throw(&self, event: &str, args: &[Value]) -> Result<bool, ListenerError> {
        let Some(snapshot) = self.snapshot(event) else {
            return Ok(false);
        };
        let mut first_error = None;
        for binding in snapshot {
            if let Err(error) = self.fire(event, &binding, args) {
                if first_error.is_none() {
                    first_error = Some(error);
                } else {
                    self.reporter.report(event, error);
                }
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(true),
        }
    }

    // -----------------------------------------------------------------------
    // Host connections
    // -----------------------------------------------------------------------

    /// Bind several events to `host` at once.
    ///
    /// Every method name is checked before anything is bound, so a failed
    /// call leaves the emitter unchanged.
    pub fn connect<E, C>(
        &self,
        host: &HostRef,
        methods: impl IntoIterator<Item = (E, C)>,
    ) -> Result<&Self, BindingError>
    where
        E: Into<String>,
        C: Into<Connection>,
    {
        let entries: Vec<(String, Connection)> = methods
            .into_iter()
            .map(|(event, conn)| (event.into(), conn.into()))
            .collect();
        for (_, conn) in &entries {
            validate(&conn.handler, Some(host))?;
        }
        let mut store = self.bindings.lock();
        for (event, conn) in entries {
            store.add(&event, conn.handler, conn.args, Some(host.clone()), false);
        }
        Ok(self)
    }

    /// Remove every binding, on any event, bound to `host`.
    pub fn disconnect(&self, host: &HostRef) -> &Self {
        let removed = self.bindings.lock().remove_context(host);
        tracing::trace!(?host, removed, "disconnected host");
        self
    }

    /// Remove the bindings of `host` named by `methods`.
    ///
    /// Only the handler of each entry is used for matching; prepended
    /// arguments are ignored, so all variations of a binding go at once.
    /// Method names are checked against `host` unless it has been dropped.
    pub fn disconnect_methods<E, C>(
        &self,
        host: &HostRef,
        methods: impl IntoIterator<Item = (E, C)>,
    ) -> Result<&Self, BindingError>
    where
        E: Into<String>,
        C: Into<Connection>,
    {
        let entries: Vec<(String, Handler)> = methods
            .into_iter()
            .map(|(event, conn)| (event.into(), Into::<Connection>::into(conn).handler))
            .collect();
        for (_, handler) in &entries {
            validate_unbind(handler, Some(host))?;
        }
        let mut store = self.bindings.lock();
        for (event, handler) in &entries {
            store.remove_matching(event, handler, Some(host));
        }
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Whether `event` has at least one binding.
    pub fn has_listeners(&self, event: &str) -> bool {
        self.bindings.lock().contains(event)
    }

    /// Number of bindings for `event`, once-bindings included.
    pub fn listener_count(&self, event: &str) -> usize {
        self.bindings.lock().count(event)
    }

    // -----------------------------------------------------------------------
    // Crate-internal binding without validation
    // -----------------------------------------------------------------------

    /// Bind a handler the caller knows to be valid.
    pub(crate) fn bind(
        &self,
        event: &str,
        handler: Handler,
        args: Vec<Value>,
        context: Option<HostRef>,
    ) {
        self.bindings.lock().add(event, handler, args, context, false);
    }

    pub(crate) fn unbind(&self, event: &str, handler: &Handler, context: Option<&HostRef>) {
        self.bindings.lock().remove_matching(event, handler, context);
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn snapshot(&self, event: &str) -> Option<Vec<Arc<Binding>>> {
        self.bindings.lock().snapshot(event)
    }

    fn fire(&self, event: &str, binding: &Binding, args: &[Value]) -> ListenerResult {
        if binding.once {
            self.bindings.lock().remove_id(event, binding.id);
        }

        let joined: Vec<Value>;
        let call_args: &[Value] = if binding.args.is_empty() {
            args
        } else {
            joined = binding.args.iter().chain(args).cloned().collect();
            &joined
        };

        match &binding.handler {
            Handler::Function(cb) => guarded(|| cb(call_args)),
            Handler::Method(name) => {
                let host = binding
                    .context
                    .as_ref()
                    .and_then(HostRef::upgrade)
                    .ok_or_else(|| -> ListenerError {
                        format!("host of method \"{name}\" no longer exists").into()
                    })?;
                guarded(|| {
                    host.invoke(name, call_args)
                        .unwrap_or_else(|| Err(BindingError::NotAMethod(name.clone()).into()))
                })
            }
        }
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("bindings", &*self.bindings.lock())
            .finish_non_exhaustive()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// A method name needs a live context that responds to it.
fn validate(handler: &Handler, context: Option<&HostRef>) -> Result<(), BindingError> {
    let Some(name) = handler.method_name() else {
        return Ok(());
    };
    let host = context.ok_or_else(|| BindingError::NoContext(name.to_string()))?;
    match host.upgrade() {
        Some(host) if host.responds_to(name) => Ok(()),
        _ => Err(BindingError::NotAMethod(name.to_string())),
    }
}

/// Like [`validate`], but a dropped host passes: its bindings must stay
/// removable by name.
fn validate_unbind(handler: &Handler, context: Option<&HostRef>) -> Result<(), BindingError> {
    let Some(name) = handler.method_name() else {
        return Ok(());
    };
    let host = context.ok_or_else(|| BindingError::NoContext(name.to_string()))?;
    match host.upgrade() {
        Some(host) if !host.responds_to(name) => Err(BindingError::NotAMethod(name.to_string())),
        _ => Ok(()),
    }
}

/// Run a listener, turning a panic into an ordinary listener error.
fn guarded(f: impl FnOnce() -> ListenerResult) -> ListenerResult {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(panic_message(payload.as_ref()).into()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    format!("listener panicked: {detail}")
}
