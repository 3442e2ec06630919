//! varmatrix-core: build every configuration variant of a native project
//!
//! A native solver is often compiled once per parameter set. Each set lives
//! in its own numbered header (`var_000.h`, `var_001.h`, ...) and the build
//! reads whichever one currently sits in its active configuration slot
//! (`var.h`). This crate walks that matrix for you, one variant at a time.
//!
//! ## The Loop
//!
//! **Discovery**: list the numbered headers of a project group
//! - Only the immediate entries of the configuration directory count
//! - Names must be canonical (`var_007.h`, never `var_7.h`), anything else
//!   that carries the extension stops the run
//!
//! **Staging**: copy the variant over the active configuration slot
//! - Whole-file replace, finished before the build starts
//! - A missing source leaves the slot untouched
//!
//! **Building**: hand the slot to the group's build entry point
//! - `bash compile.sh D3Q19 007`, run inside the group's build directory
//! - The orchestrator's own working directory never changes
//! - Failed builds are recorded and summarized; the loop keeps going
//!
//! ## A Sample Run
//!
//! ```rust,no_run
//! use varmatrix_core::config::MatrixConfig;
//! use varmatrix_core::dispatch::CommandRunner;
//! use varmatrix_core::matrix::{run_matrix, RunOptions};
//!
//! let config = MatrixConfig::reference();
//! let report = run_matrix(&config, CommandRunner, &RunOptions::default())?;
//!
//! for failed in report.failures() {
//!     println!("{}/{} failed", failed.group, failed.label);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`naming`]: the `{prefix}{NNN}{extension}` parse/format pair
//! - [`discovery`]: variant enumeration per configuration directory
//! - [`dispatch`]: staging plus build invocation behind [`dispatch::BuildRunner`]
//! - [`matrix`]: the group-by-group driver and dry-run planning
//! - [`config`]: the matrix as TOML data, with the LBM/MLBM reference default
//! - [`report`] and [`output`]: outcomes, summaries, JSON and NDJSON

pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod matrix;
pub mod naming;
pub mod output;
pub mod report;
