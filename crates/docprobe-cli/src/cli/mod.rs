//! CLI for docprobe.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docprobe_core::{config, CancelToken};
use std::path::PathBuf;
use std::process::ExitCode;

use commands::{run_config, run_inspect, run_resolve};

/// Top-level CLI for docprobe.
#[derive(Debug, Parser)]
#[command(name = "docprobe")]
#[command(
    about = "docprobe: check that a record's linked document resolves to a stored file",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Follow a record to its first linked document and fetch the stored file.
    Resolve {
        /// Record identifier (opaque; passed to the data service as-is).
        record_id: String,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
        /// Save the fetched file to PATH on success.
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Sample one row from each table and list its columns.
    Inspect {
        /// Table names.
        #[arg(required = true)]
        tables: Vec<String>,
        /// Print the reports as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the config file path and the effective configuration.
    Config,
}

/// Exit code for a probe that ran but found a broken chain or unreachable table.
pub const EXIT_PROBE_FAILED: u8 = 2;

impl CliCommand {
    pub async fn run_from_args() -> Result<ExitCode> {
        let cli = Cli::parse();
        // `config` must still show a config that fails validation.
        let cfg = config::load_unchecked()?;
        tracing::debug!("loaded config: {:?}", cfg.redacted());
        if !matches!(cli.command, CliCommand::Config) {
            cfg.validate()?;
        }

        match cli.command {
            CliCommand::Resolve {
                record_id,
                json,
                output,
            } => run_resolve(&cfg, &record_id, json, output.as_deref(), cancel_on_ctrl_c()).await,
            CliCommand::Inspect { tables, json } => {
                run_inspect(&cfg, tables, json, cancel_on_ctrl_c()).await
            }
            CliCommand::Config => run_config(&cfg),
        }
    }
}

/// Token that trips on the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancelToken {
    let token = CancelToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling in-flight request");
            on_signal.cancel();
        }
    });
    token
}

#[cfg(test)]
mod tests;
