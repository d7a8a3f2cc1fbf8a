//! Registry<V>: symbolic names mapped to shared data.
//!
//! Emits `register(name, data)` for every name registered and
//! `unregister(name, data)` for every name actually removed. `data` is passed
//! as an object argument holding the registry's `Arc<V>`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::event::{ErrorReporter, EventEmitter, TracingReporter};
use crate::types::Value;

pub const REGISTER: &str = "register";
pub const UNREGISTER: &str = "unregister";

/// One name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Names(Vec<String>);

impl IntoIterator for Names {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<&str> for Names {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for Names {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for Names {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for Names {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Names {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Names {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

pub struct Registry<V> {
    emitter: EventEmitter,
    entries: RwLock<HashMap<String, Arc<V>>>,
}

impl<V: Send + Sync + 'static> Registry<V> {
    /// Create an empty registry that logs listener errors through `tracing`.
    pub fn new() -> Self {
        Self::with_reporter(Arc::new(TracingReporter))
    }

    /// Create an empty registry whose listener errors go to `reporter`.
    pub fn with_reporter(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            emitter: EventEmitter::with_reporter(reporter),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe here for `register` and `unregister`.
    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    /// Associate every name in `names` with `data`, replacing existing entries.
    pub fn register(&self, names: impl Into<Names>, data: V) {
        self.register_shared(names, Arc::new(data));
    }

    /// Like [`register`](Self::register) for data that is already shared.
    pub fn register_shared(&self, names: impl Into<Names>, data: Arc<V>) {
        for name in names.into() {
            self.entries.write().insert(name.clone(), Arc::clone(&data));
            self.emitter
                .emit(REGISTER, &[Value::from(name), Value::object(Arc::clone(&data))]);
        }
    }

    /// Remove names. Names that are not registered are skipped silently.
    pub fn unregister(&self, names: impl Into<Names>) {
        for name in names.into() {
            let removed = self.entries.write().remove(&name);
            if let Some(data) = removed {
                self.emitter
                    .emit(UNREGISTER, &[Value::from(name), Value::object(data)]);
            }
        }
    }

    /// Data registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<Arc<V>> {
        self.entries.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<V: Send + Sync + 'static> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}
