//! `docprobe inspect <table>...`: reachability and columns per table.

use anyhow::{Context, Result};
use docprobe_core::config::ProbeConfig;
use docprobe_core::data_service::RestDataService;
use docprobe_core::inspect::{inspect_tables, TableOutcome};
use docprobe_core::CancelToken;
use std::process::ExitCode;

use crate::cli::EXIT_PROBE_FAILED;

pub async fn run_inspect(
    cfg: &ProbeConfig,
    tables: Vec<String>,
    json: bool,
    cancel: CancelToken,
) -> Result<ExitCode> {
    let tables: Vec<String> = tables
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if tables.is_empty() {
        anyhow::bail!("no table names given");
    }
    let data = RestDataService::from_config(cfg)?;

    let reports = tokio::task::spawn_blocking(move || inspect_tables(&data, &tables, &cancel))
        .await
        .context("inspect task failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{report}");
        }
    }

    let any_failed = reports
        .iter()
        .any(|r| matches!(r.outcome, TableOutcome::Error { .. }));
    Ok(if any_failed {
        ExitCode::from(EXIT_PROBE_FAILED)
    } else {
        ExitCode::SUCCESS
    })
}
