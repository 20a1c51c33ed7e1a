#![forbid(unsafe_code)]

mod commands;
mod helpers;

use cardex_core::env::env_bool;
use cardex_core::{ExitCode, MachineError, ENV_CARDEX_LOG_JSON, ENV_CARDEX_LOG_LEVEL};
use clap::{error::ErrorKind, ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const CRATE_NAME: &str = "cardex-cli";

#[derive(Parser)]
#[command(name = "cardex")]
#[command(about = "Cardex catalog operations CLI")]
#[command(
    after_help = "Environment:\n  CARDEX_LOG_LEVEL   Log filter (default: warn)\n  CARDEX_LOG_JSON    Emit logs as JSON lines\n  CARDEX_MAX_LIMIT   Largest accepted page size"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Filter parameters, given as repeated `--param key=value` and/or a single
/// `--query "a=1&b=2"`. Later values win.
#[derive(clap::Args, Clone, Default)]
pub(crate) struct ParamArgs {
    #[arg(long = "param", short = 'p')]
    pub(crate) params: Vec<String>,
    #[arg(long)]
    pub(crate) query: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile parameters into a query plan without touching a database.
    Plan {
        #[command(flatten)]
        params: ParamArgs,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = 30)]
        limit: usize,
    },
    /// Load cards from a JSON array or JSON-lines file into a SQLite catalog.
    Import {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        cards: PathBuf,
    },
    /// Run one page of a query against a SQLite catalog.
    Query {
        #[arg(long)]
        db: PathBuf,
        #[command(flatten)]
        params: ParamArgs,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = 30)]
        limit: usize,
    },
    /// Simulate a browse session: load incrementally, leave for a detail
    /// view, come back and restore the scroll position.
    Browse {
        #[arg(long)]
        db: PathBuf,
        #[command(flatten)]
        params: ParamArgs,
        /// Rows to load before leaving the list.
        #[arg(long, default_value_t = 60)]
        rows: usize,
        #[arg(long, default_value_t = 40.0)]
        row_height: f64,
        #[arg(long, default_value_t = 0.0)]
        scroll: f64,
        #[arg(long, default_value_t = 600.0)]
        viewport: f64,
    },
}

#[derive(Clone, Copy)]
pub(crate) struct OutputMode {
    pub(crate) json: bool,
}

#[derive(Debug)]
struct CliError {
    exit_code: ExitCode,
    machine: MachineError,
}

impl CliError {
    fn usage(message: &str) -> Self {
        Self {
            exit_code: ExitCode::Usage,
            machine: MachineError::new("usage_error", message),
        }
    }

    fn validation(message: String) -> Self {
        Self {
            exit_code: ExitCode::Validation,
            machine: MachineError::new("validation_error", &message),
        }
    }

    fn dependency(message: String) -> Self {
        Self {
            exit_code: ExitCode::DependencyFailure,
            machine: MachineError::new("dependency_failure", &message),
        }
    }
}

impl From<commands::CommandError> for CliError {
    fn from(value: commands::CommandError) -> Self {
        match value {
            commands::CommandError::Input(message) => Self::validation(message),
            commands::CommandError::Source(message) => Self::dependency(message),
        }
    }
}

pub fn main_entry() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code as u8)
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => {
                return Err(CliError {
                    exit_code: ExitCode::Usage,
                    machine: MachineError::new("usage_error", "invalid command line arguments")
                        .with_detail("error", &err.to_string()),
                });
            }
        },
    };
    let output_mode = OutputMode { json: cli.json };
    let command = cli
        .command
        .ok_or_else(|| CliError::usage("missing command; see --help"))?;
    init_tracing(cli.quiet, cli.verbose);

    match command {
        Commands::Plan {
            params,
            offset,
            limit,
        } => commands::plan(&params, offset, limit, output_mode)?,
        Commands::Import { db, cards } => commands::import(&db, &cards, output_mode)?,
        Commands::Query {
            db,
            params,
            offset,
            limit,
        } => commands::query(&db, &params, offset, limit, output_mode)?,
        Commands::Browse {
            db,
            params,
            rows,
            row_height,
            scroll,
            viewport,
        } => commands::browse(
            &db,
            &params,
            commands::BrowseShape {
                rows,
                row_height,
                scroll,
                viewport,
            },
            output_mode,
        )?,
    }
    Ok(())
}

fn init_tracing(quiet: bool, verbose: u8) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = std::env::var(ENV_CARDEX_LOG_LEVEL)
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);
    // Logs go to stderr; stdout carries command output.
    if env_bool(ENV_CARDEX_LOG_JSON, false) {
        let _ = registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init();
    } else {
        let _ = registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init();
    }
}

fn emit_error(error: &CliError, machine_json: bool) {
    if machine_json {
        match serde_json::to_string(&error.machine) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!(
                "{{\"code\":\"internal_error\",\"message\":\"failed to encode structured error\",\"details\":{{}}}}"
            ),
        }
    } else {
        eprintln!("{}", error.machine.message);
    }
}
