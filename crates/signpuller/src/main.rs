mod run;
mod sidebar_file;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shop_capture::{
    claim_for_view, classify_raw, ordered_lines, ConfigError, SidebarView, DEFAULT_LOG_LEVEL,
};
use thiserror::Error;
use tracing_subscriber::{filter::ParseError, EnvFilter};

use crate::sidebar_file::{SidebarFile, SidebarFileError};

#[derive(Debug, Parser)]
#[command(name = "signpuller")]
#[command(about = "Capture shop sign readouts from a chat transcript")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Feed chat lines (stdin or `--input`) through the capture pipeline.
    Run(run::Args),
    /// Print how a single chat line is classified.
    Classify {
        /// Raw chat line; formatting codes are stripped first.
        line: String,
    },
    /// Print the rendered sidebar and the claim resolved from it.
    Claim {
        #[arg(long)]
        sidebar: PathBuf,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sidebar(#[from] SidebarFileError),
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("failed to open chat input `{path}`: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode event: {0}")]
    Json(#[from] serde_json::Error),
    #[error("internal error: join failure: {0}")]
    Join(String),
}

/// `RUST_LOG` wins; otherwise `level` applies. Output goes to stderr so stdout
/// stays reserved for events.
pub(crate) fn init_tracing(level: &str) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run::run(args).await,
        Command::Classify { line } => {
            init_tracing(DEFAULT_LOG_LEVEL)?;
            println!("{:?}", classify_raw(&line));
            Ok(())
        }
        Command::Claim { sidebar } => {
            init_tracing(DEFAULT_LOG_LEVEL)?;
            let view = SidebarFile::new(Some(sidebar)).load()?;
            if let SidebarView::Shown(entries) = &view {
                for line in ordered_lines(entries) {
                    println!("{line}");
                }
            }
            println!("Claim: {}", claim_for_view(&view));
            Ok(())
        }
    }
}
