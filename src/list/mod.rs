//! Item lists built on [`EventEmitter`](crate::event::EventEmitter).
//!
//! - [`emitter_list`]: [`EmitterList<T>`], ordered by insertion, with event
//!   aggregation.
//! - [`sorted`]: [`SortedEmitterList<T>`], ordered by a comparator.

pub mod emitter_list;
pub mod sorted;

pub use emitter_list::{EmitterList, InsertHook, Item, ADD, CLEAR, MOVE, REMOVE};
pub use sorted::{Comparator, SortedEmitterList, SORT_CHANGE};
