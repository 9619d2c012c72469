use crate::command::{Arguments, Signature};
use crate::error::DispatchError;
use crate::parser::{self, DEFAULT_LIBRARY, Descriptor};
use crate::registry::Registry;
use crate::value::Value;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Settings of the interactive loop.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub prompt: String,
    /// Print the command listing before the first prompt.
    pub banner: bool,
    /// File the line editor history is loaded from and saved to.
    pub history: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "console> ".to_string(),
            banner: true,
            history: None,
        }
    }
}

/// Dispatches console lines to the operations of a [`Registry`].
///
/// Each line is tokenized, resolved to a `library.command`, its arguments are
/// checked against the command's parameters and coerced to their declared
/// types, and the operation is invoked. Calls are independent of each other;
/// the registry is only read.
///
/// Example
/// ```
/// use command_console::builtin;
/// use command_console::Interpreter;
/// use std::sync::Arc;
///
/// let sh = Interpreter::new(Arc::new(builtin::default_registry().unwrap()));
/// let mut out = Vec::new();
/// sh.run_line("math.ADD 2 40", &mut out).unwrap();
/// assert_eq!(out, b"42\n");
/// ```
pub struct Interpreter {
    registry: Arc<Registry>,
}

impl Interpreter {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Run one parsed command and return the operation's output.
    pub fn execute(&self, descriptor: &Descriptor) -> Result<String, DispatchError> {
        let (library, entry) = self
            .registry
            .lookup(descriptor.library(), descriptor.command())?;
        debug!(
            library = library.name(),
            command = entry.signature().name(),
            "resolved command"
        );

        let arguments = bind(entry.signature(), descriptor.arguments())?;
        entry
            .operation()
            .invoke(&arguments)
            .map_err(|e| DispatchError::OperationFailure(format!("{:#}", e)))
    }

    /// Handle one console line, writing whatever should be shown to `out`.
    ///
    /// `help` prints the command listing. Blank lines and blank results print
    /// nothing. Dispatch errors are printed as their message; they never end
    /// the session.
    pub fn run_line(&self, line: &str, out: &mut dyn Write) -> io::Result<()> {
        if line.trim().eq_ignore_ascii_case("help") {
            return out.write_all(self.help().as_bytes());
        }
        let Some(descriptor) = parser::parse_line(line) else {
            return Ok(());
        };

        let message = match self.execute(&descriptor) {
            Ok(output) => output,
            Err(e) => {
                debug!(error = ?e, "command failed");
                e.to_string()
            }
        };
        if !message.trim().is_empty() {
            writeln!(out, "{}", message.trim_end_matches(['\r', '\n']))?;
        }
        Ok(())
    }

    /// Listing of every registered command and its parameters.
    pub fn help(&self) -> String {
        let mut text = String::new();
        for library in self.registry.libraries() {
            for entry in library.commands() {
                render_signature(&mut text, library.name(), entry.signature());
            }
        }
        text
    }

    /// Read-eval-print loop on the terminal. Returns on Ctrl-C or Ctrl-D.
    pub fn repl(&self, config: &ShellConfig) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new()?;
        if let Some(path) = &config.history {
            if let Err(e) = rl.load_history(path) {
                debug!(path = %path.display(), error = %e, "no history loaded");
            }
        }

        let mut stdout = io::stdout();
        if config.banner {
            stdout.write_all(self.help().as_bytes())?;
        }

        loop {
            match rl.readline(&config.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    self.run_line(&line, &mut stdout)?;
                    stdout.flush()?;
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        if let Some(path) = &config.history {
            if let Err(e) = rl.save_history(path) {
                warn!(path = %path.display(), error = %e, "failed to save history");
            }
        }
        Ok(())
    }
}

/// Match raw arguments to parameters by position and coerce them.
///
/// Slots start out as the parameters' defaults. Arguments past the last
/// parameter are dropped. Nothing is returned unless every provided argument
/// coerces.
fn bind(signature: &Signature, raw: &[String]) -> Result<Arguments, DispatchError> {
    let parameters = signature.parameters();
    let required = signature.required_count();
    if raw.len() < required {
        return Err(DispatchError::Arity {
            required,
            optional: signature.optional_count(),
            provided: raw.len(),
        });
    }
    if raw.len() > parameters.len() {
        warn!(
            command = signature.name(),
            ignored = raw.len() - parameters.len(),
            "ignoring surplus arguments"
        );
    }

    let mut values: Vec<Option<Value>> = parameters
        .iter()
        .map(|p| p.default_value().cloned())
        .collect();
    for (slot, (parameter, arg)) in values.iter_mut().zip(parameters.iter().zip(raw)) {
        *slot = Some(parameter.coerce(arg)?);
    }
    Ok(Arguments::new(parameters, values))
}

fn render_signature(text: &mut String, library: &str, signature: &Signature) {
    if library == DEFAULT_LIBRARY {
        let _ = write!(text, "command: {}", signature.name());
    } else {
        let _ = write!(text, "command: {}.{}", library, signature.name());
    }
    for p in signature.parameters() {
        let _ = write!(text, " <{}>", p.name());
    }
    text.push('\n');
    for p in signature.parameters() {
        let _ = writeln!(
            text,
            "parameter <{}>: type = {}; {}",
            p.name(),
            p.declared_type(),
            if p.is_optional() { "optional" } else { "" }
        );
    }
    text.push('\n');
}
