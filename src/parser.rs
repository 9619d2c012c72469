//! Turns the lexer's tokens into a [`Descriptor`].

use crate::lexer;

/// Library used when the command name carries no `Library.` qualifier.
pub const DEFAULT_LIBRARY: &str = "DefaultCommands";

/// One parsed input line: which command of which library to run, and with
/// which positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    library: String,
    command: String,
    arguments: Vec<String>,
}

impl Descriptor {
    /// Build a descriptor from the name token and its arguments.
    ///
    /// A name with exactly one `.` is read as `library.command`. Any other name
    /// is a command of [`DEFAULT_LIBRARY`].
    pub fn new(name: &str, arguments: Vec<String>) -> Self {
        let (library, command) = match name.split_once('.') {
            Some((library, command)) if !command.contains('.') => (library, command),
            _ => (DEFAULT_LIBRARY, name),
        };
        Self {
            library: library.to_string(),
            command: command.to_string(),
            arguments,
        }
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

/// Parse a raw input line.
///
/// Returns `None` for blank lines, which the console treats as a no-op.
pub fn parse_line(line: &str) -> Option<Descriptor> {
    let mut tokens = lexer::split_into_tokens(line).into_iter();
    let name = tokens.next()?;
    Some(Descriptor::new(&name, tokens.collect()))
}
