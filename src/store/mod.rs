//! Identity types and the variable index space.
pub mod error;
pub mod registry;
pub mod types;

pub use error::RegistryError;
pub use registry::{VariableRegistry, VariableSpec};
pub use types::{NodeId, ResultKind, VariableKind};
