//! EmitterList<T>: an ordered set of items that re-emits their events.
//!
//! The list owns an [`EventEmitter`] and emits its own lifecycle events:
//!
//! | event    | arguments                    |
//! |----------|------------------------------|
//! | `add`    | `(item, index)`              |
//! | `move`   | `(item, new_index, old_index)` |
//! | `remove` | `(item, index)`              |
//! | `clear`  | `()`                         |
//!
//! Through [`EmitterList::aggregate`] it also forwards selected events of its
//! members under new names, with the member prepended to the arguments.
//! Forwarding is a `"emit"` method binding on each member's emitter, bound to
//! the list as host, so it can be torn down with a plain `disconnect`.
//!
//! The state lock is released before any event is emitted; listeners may
//! call back into the list.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::error::{ListError, ListenerResult};
use crate::event::{ErrorReporter, EventEmitter, Handler, Host, HostRef, TracingReporter};
use crate::types::Value;

pub const ADD: &str = "add";
pub const MOVE: &str = "move";
pub const REMOVE: &str = "remove";
pub const CLEAR: &str = "clear";

/// Host method that re-emits `(event, ...args)` on the list.
const EMIT_METHOD: &str = "emit";

/// Called with each newly inserted item and its index.
pub type InsertHook<T> = Arc<dyn Fn(&Arc<T>, usize) + Send + Sync>;

/// Something that can live in an [`EmitterList`].
pub trait Item: Send + Sync + 'static {
    /// The item's own emitter. Items without one are stored but their
    /// events cannot be aggregated.
    fn emitter(&self) -> Option<&EventEmitter> {
        None
    }
}

// ============================================================================
// List state (held behind a Mutex)
// ============================================================================

struct ListState<T> {
    items: Vec<Arc<T>>,
    /// Aggregated events as `(item event, list event)`, in registration order.
    aggregate: Vec<(String, String)>,
}

impl<T> ListState<T> {
    fn index_of(&self, item: &Arc<T>) -> Option<usize> {
        self.items.iter().position(|i| Arc::ptr_eq(i, item))
    }

    /// Move the item at `from` to `to`, compensating for the removal.
    fn relocate(&mut self, from: usize, to: Option<usize>) -> usize {
        let mut to = normalize_index(self.items.len(), to);
        let item = self.items.remove(from);
        if from < to {
            to -= 1;
        }
        self.items.insert(to, item);
        to
    }
}

/// `None` and out-of-range indexes mean "append".
fn normalize_index(len: usize, index: Option<usize>) -> usize {
    match index {
        Some(i) if i < len => i,
        _ => len,
    }
}

// ============================================================================
// EmitterList
// ============================================================================

pub struct EmitterList<T: Item> {
    emitter: EventEmitter,
    state: Mutex<ListState<T>>,
    on_insert: RwLock<Option<InsertHook<T>>>,
    this: Weak<Self>,
}

impl<T: Item> EmitterList<T> {
    /// Create an empty list that logs listener errors through `tracing`.
    pub fn new() -> Arc<Self> {
        Self::with_reporter(Arc::new(TracingReporter))
    }

    /// Create a list whose emitter hands listener errors to `reporter`.
    pub fn with_reporter(reporter: Arc<dyn ErrorReporter>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            emitter: EventEmitter::with_reporter(reporter),
            state: Mutex::new(ListState {
                items: Vec::new(),
                aggregate: Vec::new(),
            }),
            on_insert: RwLock::new(None),
            this: this.clone(),
        })
    }

    /// The list's own emitter: subscribe here for lifecycle and aggregated events.
    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    /// Handle identifying this list as the host of its forwarding bindings.
    pub fn host_ref(&self) -> HostRef {
        HostRef::from_weak(self.this.clone())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Copy of the items in order; changing it does not affect the list.
    pub fn get_items(&self) -> Vec<Arc<T>> {
        self.state.lock().items.clone()
    }

    /// Position of `item`, matched by identity.
    pub fn get_item_index(&self, item: &Arc<T>) -> Option<usize> {
        self.state.lock().index_of(item)
    }

    /// Number of items in the list.
    pub fn get_item_count(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    // -----------------------------------------------------------------------
    // Aggregation
    // -----------------------------------------------------------------------

    /// Start or stop forwarding member events.
    ///
    /// Each entry maps an item event to the list event it is re-emitted as;
    /// `None` (or an empty name) stops forwarding that item event. An event
    /// that is already aggregated cannot be aggregated again, even under the
    /// same name. The whole map is checked before anything changes.
    pub fn aggregate(&self, events: &[(&str, Option<&str>)]) -> Result<(), ListError> {
        let host = self.host_ref();
        let mut st = self.state.lock();

        {
            let mut active: Vec<&str> = st.aggregate.iter().map(|(s, _)| s.as_str()).collect();
            for &(source, target) in events {
                let present = active.contains(&source);
                match (present, target.filter(|t| !t.is_empty())) {
                    (true, Some(_)) => {
                        return Err(ListError::DuplicateAggregation(source.to_string()))
                    }
                    (true, None) => active.retain(|s| *s != source),
                    (false, Some(_)) => active.push(source),
                    (false, None) => {}
                }
            }
        }

        let forward = Handler::from(EMIT_METHOD);
        for &(source, target) in events {
            if let Some(pos) = st.aggregate.iter().position(|(s, _)| s == source) {
                for item in &st.items {
                    if let Some(em) = item.emitter() {
                        em.unbind(source, &forward, Some(&host));
                    }
                }
                st.aggregate.remove(pos);
                tracing::debug!(event = source, "stopped aggregating item event");
            }
            if let Some(target) = target.filter(|t| !t.is_empty()) {
                for item in &st.items {
                    if let Some(em) = item.emitter() {
                        em.bind(
                            source,
                            forward.clone(),
                            forward_args(target, item),
                            Some(host.clone()),
                        );
                    }
                }
                st.aggregate.push((source.to_string(), target.to_string()));
                tracing::debug!(event = source, target, "aggregating item event");
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Add items starting at `index` (`None` or out of range: append).
    ///
    /// Items already in the list are moved instead, emitting `move`; new ones
    /// emit `add`. A batch ends up contiguous from the requested index.
    pub fn add_items(&self, items: impl IntoIterator<Item = Arc<T>>, index: Option<usize>) -> &Self {
        let items: Vec<Arc<T>> = items.into_iter().collect();
        if items.is_empty() {
            return self;
        }

        let mut index = normalize_index(self.get_item_count(), index);
        for item in items {
            let moved_from = {
                let mut st = self.state.lock();
                match st.index_of(&item) {
                    Some(old_index) => {
                        index = st.relocate(old_index, Some(index));
                        Some(old_index)
                    }
                    None => {
                        index = self.insert_locked(&mut st, Arc::clone(&item), Some(index));
                        None
                    }
                }
            };
            match moved_from {
                Some(old_index) => {
                    let args = [Value::object(item), index.into(), old_index.into()];
                    self.emitter.emit(MOVE, &args);
                }
                None => {
                    self.run_insert_hook(&item, index);
                    self.emitter.emit(ADD, &[Value::object(item), index.into()]);
                }
            }
            index += 1;
        }
        self
    }

    /// Insert a new item and wire up its aggregated events. Returns the
    /// index it was inserted at.
    ///
    /// Runs the insert hook but emits nothing, and does not check for
    /// duplicates; use [`add_items`](Self::add_items) unless building another
    /// list on top.
    pub fn insert_item(&self, item: Arc<T>, index: Option<usize>) -> usize {
        let index = {
            let mut st = self.state.lock();
            self.insert_locked(&mut st, Arc::clone(&item), index)
        };
        self.run_insert_hook(&item, index);
        index
    }

    /// Install a hook that runs for every newly inserted item, whether it
    /// came through [`add_items`](Self::add_items), [`insert_item`](Self::insert_item)
    /// or a list built on top. It runs after aggregation is wired up and
    /// before `add` is emitted, with no lock held. Moves do not trigger it.
    ///
    /// Replaces any previous hook.
    pub fn set_insert_hook(&self, hook: impl Fn(&Arc<T>, usize) + Send + Sync + 'static) {
        *self.on_insert.write() = Some(Arc::new(hook));
    }

    pub fn clear_insert_hook(&self) {
        *self.on_insert.write() = None;
    }

    /// Move an item already in the list. Returns its new index.
    pub fn move_item(&self, item: &Arc<T>, new_index: Option<usize>) -> Result<usize, ListError> {
        let mut st = self.state.lock();
        let old_index = st.index_of(item).ok_or(ListError::NotInList)?;
        Ok(st.relocate(old_index, new_index))
    }

    /// Remove items, emitting `remove` for each one that was present.
    pub fn remove_items(&self, items: impl IntoIterator<Item = Arc<T>>) -> &Self {
        let host = self.host_ref();
        for item in items {
            let removed = {
                let mut st = self.state.lock();
                match st.index_of(&item) {
                    Some(index) => {
                        if let Some(em) = item.emitter() {
                            em.disconnect(&host);
                        }
                        st.items.remove(index);
                        Some(index)
                    }
                    None => None,
                }
            };
            if let Some(index) = removed {
                self.emitter.emit(REMOVE, &[Value::object(item), index.into()]);
            }
        }
        self
    }

    /// Remove every item, then emit a single `clear`.
    pub fn clear_items(&self) -> &Self {
        let cleared = std::mem::take(&mut self.state.lock().items);
        let host = self.host_ref();
        for item in &cleared {
            if let Some(em) = item.emitter() {
                em.disconnect(&host);
            }
        }
        self.emitter.emit(CLEAR, &[]);
        self
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Register an aggregation on a list that has no items yet.
    pub(crate) fn reserve_aggregate(&self, source: &str, target: &str) {
        self.state
            .lock()
            .aggregate
            .push((source.to_string(), target.to_string()));
    }

    fn run_insert_hook(&self, item: &Arc<T>, index: usize) {
        let hook = self.on_insert.read().clone();
        if let Some(hook) = hook {
            hook(item, index);
        }
    }

    fn insert_locked(&self, st: &mut ListState<T>, item: Arc<T>, index: Option<usize>) -> usize {
        if let Some(em) = item.emitter() {
            let host = self.host_ref();
            for (source, target) in &st.aggregate {
                em.bind(
                    source,
                    Handler::from(EMIT_METHOD),
                    forward_args(target, &item),
                    Some(host.clone()),
                );
            }
        }
        let index = normalize_index(st.items.len(), index);
        st.items.insert(index, item);
        index
    }
}

fn forward_args<T: Item>(target: &str, item: &Arc<T>) -> Vec<Value> {
    vec![Value::from(target), Value::object(Arc::clone(item))]
}

impl<T: Item> Host for EmitterList<T> {
    fn responds_to(&self, method: &str) -> bool {
        method == EMIT_METHOD
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Option<ListenerResult> {
        if method != EMIT_METHOD {
            return None;
        }
        let result = match args.split_first() {
            Some((event, rest)) => match event.as_str() {
                Some(event) => {
                    self.emitter.emit(event, rest);
                    Ok(())
                }
                None => Err("emit expects an event name as its first argument".into()),
            },
            None => Err("emit expects an event name as its first argument".into()),
        };
        Some(result)
    }
}

impl<T: Item> Drop for EmitterList<T> {
    fn drop(&mut self) {
        // Forwarding bindings hold their item; drop them with the list.
        let host = self.host_ref();
        for item in &self.state.get_mut().items {
            if let Some(em) = item.emitter() {
                em.disconnect(&host);
            }
        }
    }
}
