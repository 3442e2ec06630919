//! Matrix configuration: project groups, naming schema and build command

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::naming::{VariantId, VariantNaming};

/// File looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "varmatrix.toml";

/// One independently buildable native project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectGroup {
    pub name: String,
    pub config_dir: PathBuf,
    pub build_dir: PathBuf,
}

impl ProjectGroup {
    pub fn new(
        name: impl Into<String>,
        config_dir: impl Into<PathBuf>,
        build_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            config_dir: config_dir.into(),
            build_dir: build_dir.into(),
        }
    }

    pub fn variant_file(&self, naming: &VariantNaming, id: VariantId) -> PathBuf {
        self.config_dir.join(naming.format(id))
    }

    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.build_dir.join(slot)
    }

    fn rooted_at(mut self, base: &Path) -> Self {
        self.config_dir = base.join(self.config_dir);
        self.build_dir = base.join(self.build_dir);
        self
    }
}

/// External build entry point; the model tag and variant label are appended
/// to `args` on every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildCommand {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

fn default_program() -> String {
    "bash".to_string()
}

fn default_args() -> Vec<String> {
    vec!["compile.sh".to_string()]
}

impl Default for BuildCommand {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixConfig {
    #[serde(default = "default_model_tag")]
    pub model_tag: String,
    /// File name of the active configuration slot inside each build dir.
    #[serde(default = "default_slot")]
    pub slot: String,
    #[serde(default)]
    pub naming: VariantNaming,
    #[serde(default)]
    pub build: BuildCommand,
    /// Capture each build's stdout/stderr to `{log_dir}/{group}-{NNN}.log`.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default, rename = "group")]
    pub groups: Vec<ProjectGroup>,
}

fn default_model_tag() -> String {
    "D3Q19".to_string()
}

fn default_slot() -> String {
    "var.h".to_string()
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl MatrixConfig {
    /// The LBM/MLBM matrix, with paths relative to the working directory.
    pub fn reference() -> Self {
        Self {
            model_tag: default_model_tag(),
            slot: default_slot(),
            naming: VariantNaming::default(),
            build: BuildCommand::default(),
            log_dir: None,
            groups: vec![
                ProjectGroup::new("LBM", "LBM/src", "LBM/src/CUDA"),
                ProjectGroup::new("MLBM", "MLBM", "MLBM/src"),
            ],
        }
    }

    /// Load and validate a TOML config; relative paths resolve against the
    /// directory containing `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_toml_str(&raw, base)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(raw: &str, base: &Path) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        let config = config.rooted_at(base);
        config.validate()?;
        Ok(config)
    }

    /// Resolve relative group and log paths against `base`.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        self.groups = self
            .groups
            .into_iter()
            .map(|group| group.rooted_at(base))
            .collect();
        self.log_dir = self.log_dir.map(|dir| base.join(dir));
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.naming.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.naming.extension.is_empty() {
            return Err(ConfigError::EmptyExtension);
        }
        if self.slot.is_empty() {
            return Err(ConfigError::EmptySlot);
        }
        if self.build.program.is_empty() {
            return Err(ConfigError::EmptyProgram);
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.name.is_empty() {
                return Err(ConfigError::EmptyGroupName);
            }
            if !seen.insert(group.name.as_str()) {
                return Err(ConfigError::DuplicateGroup(group.name.clone()));
            }
        }
        Ok(())
    }

    /// Groups to run, in configuration order. An empty `names` selects all.
    pub fn select_groups(&self, names: &[String]) -> Result<Vec<&ProjectGroup>, ConfigError> {
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.groups.iter().any(|g| &g.name == *name))
        {
            return Err(ConfigError::UnknownGroup(unknown.clone()));
        }

        Ok(self
            .groups
            .iter()
            .filter(|g| names.is_empty() || names.contains(&g.name))
            .collect())
    }
}
