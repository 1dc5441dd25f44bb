//! presize CLI - Estimate media download sizes before downloading.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod display;
mod source;

use source::SourceArgs;

#[derive(Parser)]
#[command(name = "presize")]
#[command(about = "Estimate media download sizes before downloading", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (errors only, no spinner)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the download size of a media URL or saved info JSON
    Estimate {
        #[command(flatten)]
        source: SourceArgs,

        /// Print a JSON document instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List audio and video quality tiers
    Qualities,

    /// Print the format selection expression for a target
    Format {
        /// Audio target
        #[arg(long, conflicts_with = "video", required_unless_present = "video")]
        audio: bool,

        /// Video target
        #[arg(long)]
        video: bool,

        /// Quality tier (e.g. 192, high, 1080, 4k)
        #[arg(short, long)]
        quality: Option<String>,
    },

    /// Compare an estimate against the size a download actually had
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Actual downloaded size in bytes
        #[arg(long)]
        actual: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Estimate { source, json } => {
            commands::estimate::estimate(&source, json, cli.quiet).await
        }
        Commands::Qualities => {
            commands::qualities::list_qualities();
            Ok(())
        }
        Commands::Format { audio, quality, .. } => {
            commands::format::show_format(audio, quality.as_deref())
        }
        Commands::Check { source, actual } => {
            commands::check::check(&source, actual, cli.quiet).await
        }
    }
}

/// Installs the `tracing` subscriber. `RUST_LOG` applies unless `-v` or
/// `--quiet` is given.
fn init_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(Level::WARN.as_str())),
            1 => EnvFilter::new("presize=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose > 0),
        )
        .init();
}
