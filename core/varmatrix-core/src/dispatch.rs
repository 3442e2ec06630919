//! Staging a variant into the active configuration slot and running the build

use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, warn};

use crate::config::{MatrixConfig, ProjectGroup};
use crate::error::{BuildInvocationError, DispatchError, StagingError};
use crate::naming::VariantId;
use crate::report::BuildOutcome;

/// A fully resolved call to a group's build entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Passed to the child; the orchestrator's own working directory is never changed.
    pub working_dir: PathBuf,
    /// When set, stdout and stderr go here. Otherwise both go to the
    /// orchestrator's stderr, keeping its stdout for the run report.
    pub log_file: Option<PathBuf>,
}

/// Executes a build invocation and blocks until it finishes.
///
/// `Err` means the process could not be started or its log could not be
/// opened; a build that runs and fails is `Ok(BuildOutcome::Failed { .. })`.
pub trait BuildRunner {
    fn run(&self, invocation: &BuildInvocation) -> Result<BuildOutcome, BuildInvocationError>;
}

impl<R: BuildRunner + ?Sized> BuildRunner for &R {
    fn run(&self, invocation: &BuildInvocation) -> Result<BuildOutcome, BuildInvocationError> {
        (**self).run(invocation)
    }
}

/// Runs builds as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner;

impl BuildRunner for CommandRunner {
    fn run(&self, invocation: &BuildInvocation) -> Result<BuildOutcome, BuildInvocationError> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.working_dir);

        match &invocation.log_file {
            Some(path) => {
                let log_err = |source| BuildInvocationError::Log {
                    path: path.clone(),
                    source,
                };
                let log = File::create(path).map_err(log_err)?;
                cmd.stdout(log.try_clone().map_err(log_err)?).stderr(log);
            }
            None => {
                cmd.stdout(io::stderr());
            }
        }

        let status = cmd.status().map_err(|source| BuildInvocationError::Spawn {
            program: invocation.program.clone(),
            working_dir: invocation.working_dir.clone(),
            source,
        })?;
        Ok(BuildOutcome::from_status(status))
    }
}

/// Stages and builds single variants for the groups of one matrix.
#[derive(Debug)]
pub struct Dispatcher<'a, R> {
    config: &'a MatrixConfig,
    runner: R,
}

impl<'a, R: BuildRunner> Dispatcher<'a, R> {
    pub fn new(config: &'a MatrixConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Replace the group's active configuration slot with variant `id`.
    ///
    /// Returns the number of bytes copied. When the source is missing the
    /// slot is left untouched.
    pub fn stage(&self, group: &ProjectGroup, id: VariantId) -> Result<u64, StagingError> {
        let from = group.variant_file(&self.config.naming, id);
        let to = group.slot_path(&self.config.slot);

        match fs::metadata(&from) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(StagingError::NotFound { path: from }),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StagingError::NotFound { path: from })
            }
            Err(source) => {
                return Err(StagingError::Io {
                    from,
                    to,
                    source,
                })
            }
        }

        let bytes = fs::copy(&from, &to).map_err(|source| StagingError::Io {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;

        debug!(
            group = %group.name,
            from = %from.display(),
            to = %to.display(),
            bytes,
            "staged variant configuration"
        );
        Ok(bytes)
    }

    /// The invocation `build` would run for variant `id`.
    pub fn invocation(&self, group: &ProjectGroup, id: VariantId) -> BuildInvocation {
        let label = self.config.naming.label(id);
        let mut args = self.config.build.args.clone();
        args.push(self.config.model_tag.clone());
        args.push(label.clone());

        BuildInvocation {
            program: self.config.build.program.clone(),
            args,
            working_dir: group.build_dir.clone(),
            log_file: self
                .config
                .log_dir
                .as_ref()
                .map(|dir| dir.join(format!("{}-{label}.log", group.name))),
        }
    }

    /// Run the group's build entry point for variant `id`.
    pub fn build(
        &self,
        group: &ProjectGroup,
        id: VariantId,
    ) -> Result<BuildOutcome, BuildInvocationError> {
        let invocation = self.invocation(group, id);
        debug!(
            group = %group.name,
            program = %invocation.program,
            args = ?invocation.args,
            "invoking build"
        );

        let outcome = self.runner.run(&invocation)?;

        if let BuildOutcome::Failed { code } = outcome {
            warn!(
                group = %group.name,
                variant = %self.config.naming.label(id),
                ?code,
                "build reported failure"
            );
        }
        Ok(outcome)
    }

    /// Stage variant `id`, then build it. The build never starts unless
    /// staging completed.
    pub fn stage_and_build(
        &self,
        group: &ProjectGroup,
        id: VariantId,
    ) -> Result<BuildOutcome, DispatchError> {
        self.stage(group, id)?;
        Ok(self.build(group, id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;

    /// Records each invocation together with the slot content visible at that moment.
    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<(Vec<String>, Vec<u8>)>>,
        outcome: Option<BuildOutcome>,
    }

    impl BuildRunner for Recorder {
        fn run(
            &self,
            invocation: &BuildInvocation,
        ) -> Result<BuildOutcome, BuildInvocationError> {
            let slot = fs::read(invocation.working_dir.join("var.h")).unwrap_or_default();
            self.seen
                .borrow_mut()
                .push((invocation.args.clone(), slot));
            Ok(self.outcome.unwrap_or(BuildOutcome::Succeeded))
        }
    }

    fn fixture() -> (tempfile::TempDir, MatrixConfig) {
        let tmp = tempdir().expect("tempdir");
        let vars = tmp.path().join("vars");
        let build = tmp.path().join("build");
        fs::create_dir_all(&vars).expect("mkdir vars");
        fs::create_dir_all(&build).expect("mkdir build");

        let mut config = MatrixConfig::reference();
        config.groups = vec![ProjectGroup::new("g", vars, build)];
        (tmp, config)
    }

    #[test]
    fn invocation_appends_model_tag_and_label() {
        let (_tmp, config) = fixture();
        let dispatcher = Dispatcher::new(&config, CommandRunner);
        let inv = dispatcher.invocation(&config.groups[0], 7);

        assert_eq!(inv.program, "bash");
        assert_eq!(inv.args, ["compile.sh", "D3Q19", "007"]);
        assert_eq!(inv.working_dir, config.groups[0].build_dir);
        assert_eq!(inv.log_file, None);
    }

    #[test]
    fn log_file_is_named_after_group_and_label() {
        let (tmp, mut config) = fixture();
        config.log_dir = Some(tmp.path().join("logs"));
        let dispatcher = Dispatcher::new(&config, CommandRunner);
        let inv = dispatcher.invocation(&config.groups[0], 12);

        assert_eq!(inv.log_file, Some(tmp.path().join("logs").join("g-012.log")));
    }

    #[test]
    fn build_sees_freshly_staged_content() {
        let (_tmp, config) = fixture();
        let group = &config.groups[0];
        fs::write(group.config_dir.join("var_001.h"), b"one").expect("write");
        fs::write(group.config_dir.join("var_002.h"), b"two").expect("write");

        let recorder = Recorder::default();
        let dispatcher = Dispatcher::new(&config, &recorder);
        dispatcher.stage_and_build(group, 1).expect("variant 1");
        dispatcher.stage_and_build(group, 2).expect("variant 2");

        let seen = recorder.seen.borrow();
        assert_eq!(seen[0].0.last().map(String::as_str), Some("001"));
        assert_eq!(seen[0].1, b"one");
        assert_eq!(seen[1].0.last().map(String::as_str), Some("002"));
        assert_eq!(seen[1].1, b"two");
    }

    #[test]
    fn failed_build_is_an_outcome_not_an_error() {
        let (_tmp, config) = fixture();
        let group = &config.groups[0];
        fs::write(group.config_dir.join("var_000.h"), b"x").expect("write");

        let recorder = Recorder {
            outcome: Some(BuildOutcome::Failed { code: Some(3) }),
            ..Recorder::default()
        };
        let outcome = Dispatcher::new(&config, &recorder)
            .stage_and_build(group, 0)
            .expect("dispatch");
        assert_eq!(outcome, BuildOutcome::Failed { code: Some(3) });
    }
}
