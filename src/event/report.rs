//! Deferred reporting of listener failures.
//!
//! A failing listener never interrupts dispatch. Its error is handed to the
//! emitter's [`ErrorReporter`] instead, outside the control flow of the code
//! that emitted the event.

use std::fmt;

use parking_lot::Mutex;

use crate::error::ListenerError;

/// Receives listener errors that were not propagated to the emitting caller.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, event: &str, error: ListenerError);
}

/// Logs every reported error through `tracing`. The default reporter.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, event: &str, error: ListenerError) {
        tracing::error!(event, error = %error, "unhandled error in event listener");
    }
}

/// A listener error waiting in a [`DeferredReporter`].
pub struct ReportedError {
    pub event: String,
    pub error: ListenerError,
}

impl fmt::Debug for ReportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportedError")
            .field("event", &self.event)
            .field("error", &self.error.to_string())
            .finish()
    }
}

/// Queues reported errors until the host drains them.
///
/// Plays the role of a task queue: errors surface whenever the owner gets
/// around to calling [`take`](Self::take) or [`flush_into`](Self::flush_into).
#[derive(Default)]
pub struct DeferredReporter {
    pending: Mutex<Vec<ReportedError>>,
}

impl DeferredReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything queued so far.
    pub fn take(&self) -> Vec<ReportedError> {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Hand every queued error to `target`.
    pub fn flush_into(&self, target: &dyn ErrorReporter) {
        for reported in self.take() {
            target.report(&reported.event, reported.error);
        }
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl ErrorReporter for DeferredReporter {
    fn report(&self, event: &str, error: ListenerError) {
        self.pending.lock().push(ReportedError {
            event: event.to_string(),
            error,
        });
    }
}
