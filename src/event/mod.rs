//! Event core: named events with late-bound handlers.
//!
//! # Modules
//!
//! - [`binding`]: [`Binding`] records and the [`BindingStore`].
//! - [`host`]: [`Handler`], the [`Host`] capability and [`HostRef`].
//! - [`report`]: deferred listener-error reporting.
//! - [`emitter`]: [`EventEmitter`].

pub mod binding;
pub mod emitter;
pub mod host;
pub mod report;

pub use binding::{Binding, BindingId, BindingStore};
pub use emitter::EventEmitter;
pub use host::{callback, Callback, Connection, Handler, Host, HostRef};
pub use report::{DeferredReporter, ErrorReporter, ReportedError, TracingReporter};
