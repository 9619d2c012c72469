//! Registry of the operations the console can dispatch to.
//!
//! Operations are grouped into named libraries. Both library and command names
//! are matched case-insensitively, while the casing used at registration is
//! kept for display. A [`Registry`] is assembled once with a
//! [`RegistryBuilder`] and never changes afterwards.

use crate::command::{Operation, Signature};
use crate::error::{DispatchError, RegistrationError};
use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashSet;
use tracing::{debug, info};

/// A registered operation together with the signature captured at registration.
pub struct Entry {
    signature: Signature,
    operation: Box<dyn Operation>,
}

impl Entry {
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn operation(&self) -> &dyn Operation {
        self.operation.as_ref()
    }
}

/// A named group of commands. Never empty.
pub struct Library {
    name: String,
    commands: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Library {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            commands: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Commands in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &Entry> {
        self.commands.iter()
    }

    pub fn command(&self, name: &str) -> Option<&Entry> {
        self.index.get(&fold(name)).map(|&i| &self.commands[i])
    }
}

/// Immutable two-level mapping `library -> command -> operation`.
pub struct Registry {
    libraries: Vec<Library>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Libraries in registration order.
    pub fn libraries(&self) -> impl Iterator<Item = &Library> {
        self.libraries.iter()
    }

    pub fn library(&self, name: &str) -> Option<&Library> {
        self.index.get(&fold(name)).map(|&i| &self.libraries[i])
    }

    /// Resolve `library.command`.
    ///
    /// The library is looked up first, so a miss reports exactly which of the
    /// two names is unknown.
    pub fn lookup(&self, library: &str, command: &str) -> Result<(&Library, &Entry), DispatchError> {
        let lib = self
            .library(library)
            .ok_or_else(|| DispatchError::UnknownLibrary(library.to_string()))?;
        let entry = lib.command(command).ok_or_else(|| DispatchError::UnknownCommand {
            library: lib.name.clone(),
            command: command.to_string(),
        })?;
        Ok((lib, entry))
    }
}

/// Collects operations before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    libraries: Vec<Library>,
    index: HashMap<String, usize>,
}

impl RegistryBuilder {
    /// Add `operation` to `library`, creating the library on first use.
    ///
    /// The operation's signature is validated here, so everything the
    /// dispatcher later sees is well formed.
    pub fn register(
        &mut self,
        library: &str,
        operation: impl Operation + 'static,
    ) -> Result<&mut Self, RegistrationError> {
        let signature = operation.signature();
        validate_name("library", library)?;
        validate_signature(&signature)?;

        let slot = match self.index.entry(fold(library)) {
            MapEntry::Occupied(e) => *e.get(),
            MapEntry::Vacant(e) => {
                self.libraries.push(Library::new(library));
                *e.insert(self.libraries.len() - 1)
            }
        };
        let lib = &mut self.libraries[slot];
        match lib.index.entry(fold(signature.name())) {
            MapEntry::Occupied(_) => {
                return Err(RegistrationError::DuplicateCommand {
                    library: lib.name.clone(),
                    command: signature.name().to_string(),
                });
            }
            MapEntry::Vacant(e) => {
                e.insert(lib.commands.len());
            }
        }
        debug!(library = %lib.name, command = signature.name(), "registered command");
        lib.commands.push(Entry {
            signature,
            operation: Box::new(operation),
        });
        Ok(self)
    }

    pub fn build(self) -> Registry {
        info!(
            libraries = self.libraries.len(),
            commands = self.libraries.iter().map(|l| l.commands.len()).sum::<usize>(),
            "command registry ready"
        );
        Registry {
            libraries: self.libraries,
            index: self.index,
        }
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

fn validate_name(kind: &'static str, name: &str) -> Result<(), RegistrationError> {
    if name.is_empty() || name.contains('.') || name.chars().any(char::is_whitespace) {
        return Err(RegistrationError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn validate_signature(signature: &Signature) -> Result<(), RegistrationError> {
    let command = signature.name();
    validate_name("command", command)?;

    let mut seen = HashSet::new();
    let mut optional_seen = false;
    for p in signature.parameters() {
        validate_name("parameter", p.name())?;
        if !seen.insert(fold(p.name())) {
            return Err(RegistrationError::DuplicateParameter {
                command: command.to_string(),
                parameter: p.name().to_string(),
            });
        }
        if p.is_optional() {
            optional_seen = true;
        } else if optional_seen {
            return Err(RegistrationError::RequiredAfterOptional {
                command: command.to_string(),
                parameter: p.name().to_string(),
            });
        }
        if let Some(default) = p.default_value() {
            if default.type_tag() != p.declared_type() {
                return Err(RegistrationError::DefaultTypeMismatch {
                    command: command.to_string(),
                    parameter: p.name().to_string(),
                    expected: p.declared_type(),
                    actual: default.type_tag(),
                });
            }
        }
    }
    Ok(())
}
