//! Write a fetched payload to disk atomically.
//!
//! Bytes go to a temp file in the destination directory which is then renamed
//! over the final path, so a cancelled or failed write never leaves a
//! truncated file behind.

use crate::model::Payload;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

pub fn write_payload(path: &Path, payload: &Payload) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".docprobe-")
        .suffix(".part")
        .tempfile_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    tmp.write_all(&payload.bytes)
        .with_context(|| format!("write {}", tmp.path().display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("sync {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("rename into {}", path.display()))?;
    tracing::info!("wrote {} bytes to {}", payload.size, path.display());
    Ok(())
}
