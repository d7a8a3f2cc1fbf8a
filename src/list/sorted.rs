//! SortedEmitterList<T>: an [`EmitterList`] kept in comparator order.
//!
//! Positions are decided by the comparator alone. An item whose sort key
//! changes must emit [`SORT_CHANGE`] on its own emitter; the list aggregates
//! that event internally and moves the item to its new place.
//!
//! Adding an item that compares equal to the one already at its insertion
//! point replaces that item.

use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{ListError, ListenerResult};
use crate::event::{ErrorReporter, EventEmitter, Handler, Host, HostRef, TracingReporter};
use crate::types::Value;
use crate::util::binary_search;

use super::emitter_list::{EmitterList, Item, ADD};

/// Emitted by an item whose sort position may have changed.
pub const SORT_CHANGE: &str = "sortChange";

const ITEM_SORT_CHANGE: &str = "itemSortChange";
const ON_ITEM_SORT_CHANGE: &str = "onItemSortChange";

/// Orders two items; `Equal` means "the same entry".
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

pub struct SortedEmitterList<T: Item> {
    list: Arc<EmitterList<T>>,
    comparator: RwLock<Comparator<T>>,
}

impl<T: Item> SortedEmitterList<T> {
    /// Create an empty list ordered by `comparator`.
    pub fn new(comparator: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Arc<Self> {
        Self::with_reporter(comparator, Arc::new(TracingReporter))
    }

    /// Like [`new`](Self::new), with listener errors going to `reporter`.
    pub fn with_reporter(
        comparator: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Arc<Self> {
        let list = EmitterList::with_reporter(reporter);
        list.reserve_aggregate(SORT_CHANGE, ITEM_SORT_CHANGE);

        Arc::new_cyclic(|this| {
            list.emitter().bind(
                ITEM_SORT_CHANGE,
                Handler::from(ON_ITEM_SORT_CHANGE),
                Vec::new(),
                Some(HostRef::from_weak(this.clone())),
            );
            Self {
                list,
                comparator: RwLock::new(Arc::new(comparator)),
            }
        })
    }

    /// The underlying list. Moving or inserting through it directly can
    /// break the sort order.
    pub fn list(&self) -> &Arc<EmitterList<T>> {
        &self.list
    }

    /// The inner list's emitter, which carries every list event.
    pub fn emitter(&self) -> &EventEmitter {
        self.list.emitter()
    }

    // -----------------------------------------------------------------------
    // Sorted insertion
    // -----------------------------------------------------------------------

    /// Add items at their sorted positions, emitting `add` for each.
    pub fn add_items(&self, items: impl IntoIterator<Item = Arc<T>>) -> &Self {
        for item in items {
            let comparator = self.comparator();
            let current = self.list.get_items();
            let mut at = insertion_index(&current, &comparator, &item);

            if let Some(occupant) = current.get(at) {
                if comparator(&**occupant, &*item) == Ordering::Equal {
                    self.list.remove_items([Arc::clone(occupant)]);
                    // `remove` listeners may have changed the list.
                    at = self.find_insertion_index(&item);
                }
            }

            let index = self.list.insert_item(Arc::clone(&item), Some(at));
            self.list
                .emitter()
                .emit(ADD, &[Value::object(item), index.into()]);
        }
        self
    }

    /// Index at which `item` would be inserted. If an equal item is
    /// present, that item's index.
    pub fn find_insertion_index(&self, item: &T) -> usize {
        insertion_index(&self.list.get_items(), &self.comparator(), item)
    }

    /// Replace the comparator and re-add every item under it.
    pub fn set_sorting_callback(
        &self,
        comparator: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    ) {
        let items = self.list.get_items();
        *self.comparator.write() = Arc::new(comparator);
        self.list.clear_items();
        self.add_items(items);
    }

    fn on_item_sort_change(&self, item: Arc<T>) {
        self.list.remove_items([Arc::clone(&item)]);
        self.add_items([item]);
    }

    fn comparator(&self) -> Comparator<T> {
        Arc::clone(&self.comparator.read())
    }

    // -----------------------------------------------------------------------
    // Delegated list operations
    // -----------------------------------------------------------------------

    pub fn get_items(&self) -> Vec<Arc<T>> {
        self.list.get_items()
    }

    pub fn get_item_index(&self, item: &Arc<T>) -> Option<usize> {
        self.list.get_item_index(item)
    }

    pub fn get_item_count(&self) -> usize {
        self.list.get_item_count()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn remove_items(&self, items: impl IntoIterator<Item = Arc<T>>) -> &Self {
        self.list.remove_items(items);
        self
    }

    pub fn clear_items(&self) -> &Self {
        self.list.clear_items();
        self
    }

    pub fn aggregate(&self, events: &[(&str, Option<&str>)]) -> Result<(), ListError> {
        self.list.aggregate(events)
    }
}

fn insertion_index<T: Item>(items: &[Arc<T>], comparator: &Comparator<T>, item: &T) -> usize {
    binary_search(items, |other| comparator(item, &**other), true).unwrap_or(items.len())
}

impl<T: Item> Host for SortedEmitterList<T> {
    fn responds_to(&self, method: &str) -> bool {
        method == ON_ITEM_SORT_CHANGE
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Option<ListenerResult> {
        if method != ON_ITEM_SORT_CHANGE {
            return None;
        }
        let result = match args.first().and_then(Value::as_object::<T>) {
            Some(item) => {
                self.on_item_sort_change(item);
                Ok(())
            }
            None => Err(format!("{ITEM_SORT_CHANGE} expects an item as its first argument").into()),
        };
        Some(result)
    }
}
