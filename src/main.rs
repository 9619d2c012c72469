use argh::FromArgs;
use command_console::{Interpreter, ShellConfig, builtin};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(FromArgs)]
/// Interactive console for the stock command libraries. Type `help` to list commands.
struct ConsoleArgs {
    /// log dispatch details to stderr
    #[argh(switch)]
    debug: bool,

    /// don't list the commands on start-up
    #[argh(switch)]
    no_banner: bool,

    /// prompt shown before each line
    #[argh(option)]
    prompt: Option<String>,

    /// file to load and save line history
    #[argh(option)]
    history: Option<PathBuf>,

    /// run this line and exit instead of starting the console; may be repeated
    #[argh(option, short = 'c')]
    command: Vec<String>,
}

/// Logs go to stderr. `--debug` wins over `RUST_LOG`; by default only warnings are shown.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("command_console=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("command_console=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args: ConsoleArgs = argh::from_env();
    init_tracing(args.debug);

    let registry = builtin::default_registry()?;
    let sh = Interpreter::new(Arc::new(registry));

    if !args.command.is_empty() {
        let mut stdout = io::stdout().lock();
        for line in &args.command {
            sh.run_line(line, &mut stdout)?;
        }
        stdout.flush()?;
        return Ok(());
    }

    let defaults = ShellConfig::default();
    let config = ShellConfig {
        prompt: args.prompt.unwrap_or(defaults.prompt),
        banner: !args.no_banner,
        history: args.history,
    };
    sh.repl(&config)
}
