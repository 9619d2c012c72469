//! An interactive console that dispatches text lines to registered operations.
//!
//! Operations are grouped into libraries and registered once, with a typed
//! parameter list, in a [`Registry`]. A line such as `Math.add 2 40` is split
//! into tokens (double quotes keep spaces inside one token), resolved
//! case-insensitively to `library.command`, and its arguments are checked
//! against the parameters and coerced to their declared primitive types
//! before the operation runs. A name without a `Library.` qualifier refers to
//! the default library.
//!
//! The main entry point is [`Interpreter`]. The public modules [`command`] and
//! [`value`] expose the types needed to implement your own operations.

pub mod builtin;
mod coerce;
pub mod command;
pub mod error;
mod interpreter;
mod lexer;
pub mod parser;
pub mod registry;
pub mod value;

pub use error::{CoercionError, DispatchError, RegistrationError};
pub use interpreter::{Interpreter, ShellConfig};
pub use registry::{Registry, RegistryBuilder};
