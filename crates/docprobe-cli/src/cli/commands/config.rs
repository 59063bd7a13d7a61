//! `docprobe config`: where configuration and logs live, and what is in effect.

use anyhow::Result;
use docprobe_core::config::{self, ProbeConfig};
use docprobe_core::logging;
use std::process::ExitCode;

/// Prints the effective config even when it is invalid; exits 1 in that case.
pub fn run_config(cfg: &ProbeConfig) -> Result<ExitCode> {
    println!("# config: {}", config::config_path()?.display());
    println!("# log:    {}", logging::log_file_path()?.display());
    let (text, valid) = render_config(cfg)?;
    print!("{text}");
    Ok(if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Env override names, the validation verdict, and the redacted TOML.
pub(crate) fn render_config(cfg: &ProbeConfig) -> Result<(String, bool)> {
    let mut out = format!(
        "# env overrides: {}, {}, {}\n",
        config::ENV_URL,
        config::ENV_API_KEY,
        config::ENV_BUCKET
    );
    let valid = match cfg.validate() {
        Ok(()) => true,
        Err(e) => {
            out.push_str(&format!("# invalid: {e:#}\n"));
            false
        }
    };
    out.push_str(&toml::to_string_pretty(&cfg.redacted())?);
    Ok((out, valid))
}
