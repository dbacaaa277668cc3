/*!
# Dreamlog

Command-line front end of the dreamlog journal.

This file wires the pieces together: logging, configuration, the storage
adapter, the PIN gate and command dispatch.

## Usage

```text
dreamlog [OPTIONS] <COMMAND>

Commands:
  new        Write a new entry
  list       List entries, newest first
  show       Show one entry in full
  edit       Change an existing entry
  delete     Delete an entry
  clear      Delete every entry
  stats      Streak, mood and type statistics and the mood heatmap
  flashback  Resurface a past entry
  moods      Manage moods
  export     Export all entries to a JSON backup
  import     Import entries from a JSON backup
  pin        Set or remove the PIN lock
  theme      Show or change the display theme

Options:
  -v, --verbose  Print verbose output (debug logging)
```

## Configuration

- `DREAMLOG_DIR`: data directory (defaults to `~/.local/share/dreamlog`)
- `DREAMLOG_BRIDGE`: optional SQLite database used as the primary store
- `DREAMLOG_LOG_FORMAT`: `text` or `json`
- `DREAMLOG_LOG_LEVEL`: default log filter when `RUST_LOG` is unset
- `DREAMLOG_PIN`: PIN digits for non-interactive unlocking
*/

use chrono::Local;
use clap::Parser;
use dreamlog::cli::commands::{self, Io};
use dreamlog::cli::{output, CliArgs};
use dreamlog::config::Config;
use dreamlog::constants::{TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME};
use dreamlog::errors::AppResult;
use dreamlog::gate::prompt::default_source;
use dreamlog::gate::Gate;
use dreamlog::ops::TerminalConfirm;
use dreamlog::session::Session;
use dreamlog::storage::{Repository, SafeStorage};
use std::io;
use std::process::ExitCode;
use tracing::{debug, error, info, info_span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

fn init_logging(config: &Config, verbose: bool) {
    let default_level = if verbose { "debug" } else { config.log_level.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);
    if config.json_logs() {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Runs one invocation.
///
/// # Errors
///
/// Configuration, storage, validation and PIN errors from the command; the
/// caller reports them.
fn run(args: CliArgs, config: &Config) -> AppResult<()> {
    let repo = Repository::new(SafeStorage::open(config));
    let mut pins = default_source();

    let gate = if args.command.needs_unlock() {
        commands::unlock(&repo, pins.as_mut())
    } else {
        Ok(Gate::default())
    };

    let result = gate.and_then(|gate| {
        let mut session = Session::new(gate);
        let mut confirm = TerminalConfirm::stdio();
        let stdout = io::stdout();
        let mut out = stdout.lock();
        commands::execute(
            args.command,
            &repo,
            &mut session,
            Io {
                confirm: &mut confirm,
                pins: pins.as_mut(),
                out: &mut out,
            },
            Local::now(),
        )
    });

    eprint!("{}", output::notices(&repo.take_notices()));
    result
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config = match Config::load().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config, args.verbose);
    let span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service = TRACING_SERVICE_NAME,
        correlation_id = %Uuid::new_v4()
    );
    let _guard = span.enter();

    debug!("CLI arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    match run(args, &config) {
        Ok(()) => {
            info!("Command completed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
