//! Event emitters with late-bound handlers, emitter lists that aggregate the
//! events of their members, and small registries built on top.

pub mod error;
pub mod types;

pub mod event;
pub mod list;
pub mod registry;
pub mod util;

pub use error::{BindingError, ListError, ListenerError, ListenerResult, OoError, RegistryError};
pub use event::{callback, Callback, Connection, EventEmitter, Handler, Host, HostRef};
pub use list::{EmitterList, Item, SortedEmitterList};
pub use registry::{Creatable, Factory, Registry};
pub use types::{ObjectRef, Value};
