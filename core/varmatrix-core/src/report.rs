//! Per-variant build outcomes and the end-of-run summary

use std::io::Write;
use std::process::ExitStatus;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::naming::VariantId;

/// What happened when a staged variant was handed to the build entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildOutcome {
    Succeeded,
    /// `code` is `None` when the build was killed by a signal.
    Failed { code: Option<i32> },
    /// Dry run: discovered but neither staged nor built.
    Skipped,
}

impl BuildOutcome {
    pub fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            Self::Succeeded
        } else {
            Self::Failed {
                code: status.code(),
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantResult {
    pub group: String,
    pub variant: VariantId,
    /// Zero-padded form passed to the build, e.g. `005`.
    pub label: String,
    pub outcome: BuildOutcome,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub results: Vec<VariantResult>,
}

impl RunReport {
    pub fn push(&mut self, result: VariantResult) {
        self.results.push(result);
    }

    pub fn failures(&self) -> impl Iterator<Item = &VariantResult> {
        self.results.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn succeeded(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == BuildOutcome::Succeeded)
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Human-readable summary naming every variant whose build failed.
    pub fn write_summary(&self, mut w: impl Write) -> Result<()> {
        let failed: Vec<&VariantResult> = self.failures().collect();
        let skipped = self
            .results
            .iter()
            .filter(|r| r.outcome == BuildOutcome::Skipped)
            .count();

        writeln!(
            w,
            "{} variant(s): {} built, {} failed, {} skipped",
            self.results.len(),
            self.succeeded(),
            failed.len(),
            skipped
        )?;

        for result in failed {
            let detail = match result.outcome {
                BuildOutcome::Failed { code: Some(code) } => format!("exit code {code}"),
                _ => "terminated by signal".to_string(),
            };
            writeln!(w, "  FAILED {}/{} ({detail})", result.group, result.label)?;
        }
        Ok(())
    }
}
