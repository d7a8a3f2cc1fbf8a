//! Name → data registries, and factories built on them.

pub mod factory;
#[allow(clippy::module_inception)]
pub mod registry;

pub use factory::{Constructor, Creatable, Factory};
pub use registry::{Names, Registry, REGISTER, UNREGISTER};
