// labelcheck CLI - find bibliographic records citing an authority identifier
// whose label was reused by a different authority.

mod client;
mod credentials;
mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "labelcheck")]
#[command(about = "Find records that cite authority identifiers under someone else's label")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reused label check and write the CSV report
    #[command(after_help = "\
Examples:
  labelcheck run lc-names.toml
  labelcheck run lc-names.toml --out reports/dodgy.csv --summary reports/summary.json
  RUST_LOG=labelcheck_recon=debug labelcheck run lc-names.toml")]
    Run {
        /// Path to the TOML config file
        config: PathBuf,

        /// CSV report path
        #[arg(long, short = 'o', default_value = "dodgy.csv")]
        out: PathBuf,

        /// Also write a JSON run summary to this path
        #[arg(long)]
        summary: Option<PathBuf>,

        /// aws CLI used for secrets manager credentials (default: `aws` on PATH)
        #[arg(long, env = "LABELCHECK_AWS_CLI")]
        aws_cli: Option<PathBuf>,

        /// Only log warnings and errors; no summary on stderr
        #[arg(long, short = 'q', conflicts_with = "verbose")]
        quiet: bool,

        /// Log every query issued
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Parse and validate a config without querying anything
    #[command(after_help = "\
Examples:
  labelcheck validate lc-names.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },

    /// Print the wildcard pattern used to find each identifier in field content
    #[command(after_help = "\
Examples:
  labelcheck wildcard n79021164 sh85076502")]
    Wildcard {
        /// Authority identifiers
        #[arg(required = true)]
        identifiers: Vec<String>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  labelcheck-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

/// Logs go to stderr; stdout is reserved for command output.
fn init_logging(default_level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, out, summary, aws_cli, quiet, verbose } => {
            let level = if verbose {
                Level::DEBUG
            } else if quiet {
                Level::WARN
            } else {
                Level::INFO
            };
            init_logging(level);
            recon::cmd_run(config, out, summary, aws_cli, quiet)
        }
        Commands::Validate { config } => {
            init_logging(Level::WARN);
            recon::cmd_validate(config)
        }
        Commands::Wildcard { identifiers } => {
            init_logging(Level::WARN);
            recon::cmd_wildcard(identifiers)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
