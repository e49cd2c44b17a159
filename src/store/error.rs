//! Defines the error types for the variable registry.
use super::types::VariableKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Variable '{0}' is already declared")]
    DuplicateName(String),
    #[error("Variable index {index} is bound by both '{first}' and '{second}'")]
    DuplicateIndex { index: usize, first: String, second: String },
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("Variable '{name}' is a {actual} variable, not a {expected} variable")]
    KindMismatch { name: String, expected: VariableKind, actual: VariableKind },
    #[error("Rotation variable '{0}' needs a non-zero axis")]
    DegenerateAxis(String),
    #[error("Invalid registry configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Cannot read registry configuration: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
