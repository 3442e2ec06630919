//! The orchestration loop: every group, every variant, one at a time

use std::fs;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, info_span};

use crate::config::{MatrixConfig, ProjectGroup};
use crate::discovery::{DirDiscovery, VariantDiscovery};
use crate::dispatch::{BuildRunner, Dispatcher};
use crate::error::MatrixError;
use crate::naming::VariantId;
use crate::report::{BuildOutcome, RunReport, VariantResult};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Discover and report, but neither stage nor build.
    pub dry_run: bool,
    /// Restrict the run to these group names; empty means all groups.
    pub groups: Vec<String>,
}

/// Variants discovered for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupPlan {
    pub group: String,
    pub variants: Vec<VariantId>,
}

fn discover_group(
    config: &MatrixConfig,
    group: &ProjectGroup,
) -> Result<Vec<VariantId>, MatrixError> {
    DirDiscovery::new(&group.config_dir, config.naming.clone())
        .discover()
        .map_err(|source| MatrixError::Discovery {
            group: group.name.clone(),
            source,
        })
}

/// Discover the variants of every selected group without touching anything.
pub fn plan(config: &MatrixConfig, options: &RunOptions) -> Result<Vec<GroupPlan>, MatrixError> {
    config.validate()?;
    config
        .select_groups(&options.groups)?
        .into_iter()
        .map(|group| {
            Ok::<_, MatrixError>(GroupPlan {
                group: group.name.clone(),
                variants: discover_group(config, group)?,
            })
        })
        .collect()
}

/// Stage and build every variant of every selected group, in order.
///
/// Discovery, staging and spawn failures abort the run. Builds that run
/// but fail are recorded in the report and the loop moves on.
pub fn run_matrix<R: BuildRunner>(
    config: &MatrixConfig,
    runner: R,
    options: &RunOptions,
) -> Result<RunReport, MatrixError> {
    config.validate()?;
    let groups = config.select_groups(&options.groups)?;

    if let Some(dir) = config.log_dir.as_ref().filter(|_| !options.dry_run) {
        fs::create_dir_all(dir).map_err(|source| MatrixError::LogDir {
            path: dir.clone(),
            source,
        })?;
    }

    let dispatcher = Dispatcher::new(config, runner);
    let mut report = RunReport::default();

    for group in groups {
        let _span = info_span!("group", name = %group.name).entered();
        let variants = discover_group(config, group)?;
        info!(
            count = variants.len(),
            dir = %group.config_dir.display(),
            "discovered variants"
        );

        for id in variants {
            let label = config.naming.label(id);
            let started = Instant::now();

            let outcome = if options.dry_run {
                BuildOutcome::Skipped
            } else {
                info!(variant = %label, "building");
                dispatcher
                    .stage_and_build(group, id)
                    .map_err(|err| MatrixError::from_dispatch(&group.name, label.clone(), err))?
            };

            let duration_ms = started.elapsed().as_millis() as u64;
            info!(variant = %label, ?outcome, duration_ms, "variant done");
            report.push(VariantResult {
                group: group.name.clone(),
                variant: id,
                label,
                outcome,
                duration_ms,
            });
        }
    }

    Ok(report)
}
