//! Tool catalogue and the registry the dispatcher calls through
//!
//! Provides the declarative tool descriptors, the executor capability and the
//! built-in tool bindings.

pub mod registry;
pub mod schema;
pub mod tools;
pub mod utils;
