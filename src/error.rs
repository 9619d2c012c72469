//! Error types for the console.
//!
//! [`DispatchError`] covers everything that can go wrong while executing one
//! input line. None of its variants are fatal: the console prints the message
//! and keeps reading. [`RegistrationError`] is raised while the registry is
//! being built, before any input is read.

use crate::value::TypeTag;
use thiserror::Error;

/// A raw argument that could not be parsed as its parameter's declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("The value '{raw_value}' passed for argument '{parameter}' cannot be parsed to type '{declared_type}'")]
pub struct CoercionError {
    pub parameter: String,
    pub declared_type: TypeTag,
    pub raw_value: String,
}

/// Failure of a single `execute` call.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The qualifier before `.` (or the default library) names no registered library.
    #[error("Unrecognized library '{0}'.")]
    UnknownLibrary(String),

    /// The library exists but has no such command.
    #[error("Unrecognized command '{library}.{command}'.")]
    UnknownCommand { library: String, command: String },

    /// Fewer arguments than required parameters.
    #[error("Missing required argument. {required} required, {optional} optional, {provided} provided")]
    Arity {
        required: usize,
        optional: usize,
        provided: usize,
    },

    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// A parameter declares a type the coercer does not implement.
    #[error("Argument '{parameter}' has type '{declared_type}', which cannot be passed from the console")]
    UnsupportedType {
        parameter: String,
        declared_type: TypeTag,
    },

    /// The operation ran and reported its own failure; the message is passed through.
    #[error("{0}")]
    OperationFailure(String),
}

/// Rejected operation registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Library, command and parameter names must be non-empty, contain no
    /// whitespace and no `.`.
    #[error("invalid {kind} name '{name}'")]
    InvalidName { kind: &'static str, name: String },

    #[error("command '{library}.{command}' is already registered")]
    DuplicateCommand { library: String, command: String },

    #[error("command '{command}' declares parameter '{parameter}' twice")]
    DuplicateParameter { command: String, parameter: String },

    #[error("command '{command}': required parameter '{parameter}' follows an optional one")]
    RequiredAfterOptional { command: String, parameter: String },

    #[error("command '{command}': default for '{parameter}' is {actual}, expected {expected}")]
    DefaultTypeMismatch {
        command: String,
        parameter: String,
        expected: TypeTag,
        actual: TypeTag,
    },
}
