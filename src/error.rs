use thiserror::Error;

/// Error produced by a listener body, either returned or recovered from a panic.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// What every listener returns.
pub type ListenerResult = std::result::Result<(), ListenerError>;

// ---------------------------------------------------------------------------
// BindingError
// ---------------------------------------------------------------------------

/// Invalid arguments to `on` / `off` / `connect` / `disconnect`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("Method name \"{0}\" has no context.")]
    NoContext(String),

    #[error("Property \"{0}\" is not a function")]
    NotAMethod(String),
}

// ---------------------------------------------------------------------------
// ListError
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListError {
    #[error("Item cannot be moved, because it is not in the list.")]
    NotInList,

    #[error("Duplicate item event aggregation for {0}")]
    DuplicateAggregation(String),
}

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("key must be a non-empty string")]
    EmptyKey,

    #[error("No class registered by that key: {0}")]
    UnknownKey(String),
}

// ---------------------------------------------------------------------------
// OoError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum OoError {
    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    List(#[from] ListError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Listener error: {0}")]
    Listener(ListenerError),
}

/// Result with `OoError` as the default error.
pub type Result<T, E = OoError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
