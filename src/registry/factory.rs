//! Factory<T>: create values from a registered key.

use std::sync::Arc;

use crate::error::RegistryError;
use crate::event::ErrorReporter;
use crate::types::Value;

use super::registry::Registry;

/// Builds a `T` from creation arguments.
pub type Constructor<T> = Arc<dyn Fn(&[Value]) -> T + Send + Sync>;

/// A type that declares its own factory key.
pub trait Creatable<T> {
    const KEY: &'static str;

    fn create(args: &[Value]) -> T;
}

pub struct Factory<T> {
    registry: Registry<Constructor<T>>,
}

impl<T: 'static> Factory<T> {
    /// Create a factory with no constructors.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    pub fn with_reporter(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            registry: Registry::with_reporter(reporter),
        }
    }

    /// The underlying registry; its emitter reports (un)registrations.
    pub fn registry(&self) -> &Registry<Constructor<T>> {
        &self.registry
    }

    /// Register `constructor` under `key`, replacing any previous one.
    pub fn register(
        &self,
        key: &str,
        constructor: impl Fn(&[Value]) -> T + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        check_key(key)?;
        let constructor: Constructor<T> = Arc::new(constructor);
        self.registry.register(key, constructor);
        Ok(())
    }

    /// Register `C` under the key it declares.
    pub fn register_type<C: Creatable<T> + 'static>(&self) -> Result<(), RegistryError> {
        self.register(C::KEY, C::create)
    }

    /// Remove the constructor under `key`. Unknown keys are ignored.
    pub fn unregister(&self, key: &str) -> Result<(), RegistryError> {
        check_key(key)?;
        self.registry.unregister(key);
        Ok(())
    }

    /// Remove `C` by the key it declares.
    pub fn unregister_type<C: Creatable<T> + 'static>(&self) -> Result<(), RegistryError> {
        self.unregister(C::KEY)
    }

    /// Create a value with the constructor registered under `key`.
    pub fn create(&self, key: &str, args: &[Value]) -> Result<T, RegistryError> {
        let constructor = self
            .registry
            .lookup(key)
            .ok_or_else(|| RegistryError::UnknownKey(key.to_string()))?;
        Ok(constructor(args))
    }
}

impl<T: 'static> Default for Factory<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_key(key: &str) -> Result<(), RegistryError> {
    if key.is_empty() {
        return Err(RegistryError::EmptyKey);
    }
    Ok(())
}
