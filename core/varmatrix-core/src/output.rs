//! Streaming output helpers for run reports

use std::io::Write;

use anyhow::Result;

use crate::report::VariantResult;

/// Write results as prettified JSON array.
pub fn write_json_pretty(results: &[VariantResult], mut w: impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    w.write_all(json.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Write results as newline-delimited JSON (NDJSON).
pub fn write_ndjson(results: &[VariantResult], mut w: impl Write) -> Result<()> {
    for item in results {
        let line = serde_json::to_string(item)?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}
