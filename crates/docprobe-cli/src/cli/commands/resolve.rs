//! `docprobe resolve <id>`: record → linked document → stored file.

use anyhow::{Context, Result};
use docprobe_core::config::ProbeConfig;
use docprobe_core::data_service::RestDataService;
use docprobe_core::object_store::RestObjectStore;
use docprobe_core::save::write_payload;
use docprobe_core::{CancelToken, RecordId, Report, Resolver};
use std::path::Path;
use std::process::ExitCode;

use crate::cli::EXIT_PROBE_FAILED;

pub async fn run_resolve(
    cfg: &ProbeConfig,
    record_id: &str,
    json: bool,
    output: Option<&Path>,
    cancel: CancelToken,
) -> Result<ExitCode> {
    let id = RecordId::parse(record_id)?;
    let resolver = Resolver::new(
        RestDataService::from_config(cfg)?,
        RestObjectStore::from_config(cfg)?,
    );

    let resolution = tokio::task::spawn_blocking(move || resolver.resolve_keep(&id, &cancel))
        .await
        .context("resolver task failed")?;

    print_report(&resolution.report, json)?;

    if let Some(path) = output {
        match &resolution.payload {
            Some(payload) => write_payload(path, payload)?,
            None => eprintln!("no payload fetched; {} not written", path.display()),
        }
    }

    Ok(ExitCode::from(exit_status(&resolution.report)))
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

pub(crate) fn exit_status(report: &Report) -> u8 {
    if report.is_success() {
        0
    } else {
        EXIT_PROBE_FAILED
    }
}
