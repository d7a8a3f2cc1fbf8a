//! Binding records and the per-emitter store that owns them.
//!
//! The store maps event names to bindings in subscription order. An event
//! with no bindings has no entry at all; every removal path drops entries
//! that become empty.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::Value;

use super::host::{Handler, HostRef};

/// Identifies one binding for the lifetime of its emitter.
pub type BindingId = u64;

/// One subscription.
#[derive(Debug)]
pub struct Binding {
    pub id: BindingId,
    pub handler: Handler,
    /// Prepended to the emitted arguments.
    pub args: Vec<Value>,
    pub context: Option<HostRef>,
    pub once: bool,
}

impl Binding {
    fn matches(&self, handler: &Handler, context: Option<&HostRef>) -> bool {
        self.handler == *handler && self.context.as_ref() == context
    }
}

#[derive(Debug, Default)]
pub struct BindingStore {
    entries: HashMap<String, Vec<Arc<Binding>>>,
    next_id: BindingId,
}

impl BindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding for `event` and return its id.
    pub fn add(
        &mut self,
        event: &str,
        handler: Handler,
        args: Vec<Value>,
        context: Option<HostRef>,
        once: bool,
    ) -> BindingId {
        self.next_id += 1;
        let id = self.next_id;
        self.entries
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(Binding {
                id,
                handler,
                args,
                context,
                once,
            }));
        id
    }

    /// Cheap copy of the current bindings for `event`.
    pub fn snapshot(&self, event: &str) -> Option<Vec<Arc<Binding>>> {
        self.entries.get(event).map(|bindings| bindings.to_vec())
    }

    pub fn contains(&self, event: &str) -> bool {
        self.entries.contains_key(event)
    }

    pub fn count(&self, event: &str) -> usize {
        self.entries.get(event).map_or(0, Vec::len)
    }

    /// Drop every binding for `event`.
    pub fn remove_event(&mut self, event: &str) {
        self.entries.remove(event);
    }

    /// Drop the single binding with `id`. Returns whether it was present.
    pub fn remove_id(&mut self, event: &str, id: BindingId) -> bool {
        self.remove_where(event, |b| b.id == id) > 0
    }

    /// Drop every binding of `event` with this handler and context.
    pub fn remove_matching(
        &mut self,
        event: &str,
        handler: &Handler,
        context: Option<&HostRef>,
    ) -> usize {
        self.remove_where(event, |b| b.matches(handler, context))
    }

    /// Drop every binding, across all events, bound to `context`.
    pub fn remove_context(&mut self, context: &HostRef) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, bindings| {
            let before = bindings.len();
            bindings.retain(|b| b.context.as_ref() != Some(context));
            removed += before - bindings.len();
            !bindings.is_empty()
        });
        removed
    }

    fn remove_where(&mut self, event: &str, pred: impl Fn(&Binding) -> bool) -> usize {
        let Some(bindings) = self.entries.get_mut(event) else {
            return 0;
        };
        let before = bindings.len();
        bindings.retain(|b| !pred(b));
        let removed = before - bindings.len();
        if bindings.is_empty() {
            self.entries.remove(event);
        }
        removed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
