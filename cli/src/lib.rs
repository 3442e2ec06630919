//! varmatrix CLI

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use tracing::info;
use tracing_subscriber::EnvFilter;

use varmatrix_core::config::{MatrixConfig, DEFAULT_CONFIG_FILE};
use varmatrix_core::dispatch::CommandRunner;
use varmatrix_core::matrix::{plan, run_matrix, GroupPlan, RunOptions};
use varmatrix_core::naming::VariantNaming;
use varmatrix_core::output::{write_json_pretty, write_ndjson};
use varmatrix_core::report::RunReport;

/// Exit status when `--strict` is set and at least one build failed.
pub const EXIT_BUILDS_FAILED: i32 = 2;

/// Stage and build every configuration variant of every project group.
///
/// Without arguments the whole matrix runs: `./varmatrix.toml` when present,
/// otherwise the built-in LBM/MLBM layout relative to the current directory.
#[derive(Debug, Parser)]
#[command(
    name = "varmatrix",
    version,
    about = "Build every configuration variant of a native project, one at a time"
)]
pub struct Cli {
    /// Matrix configuration file (TOML)
    #[arg(
        short = 'c',
        long = "config",
        env = "VARMATRIX_CONFIG",
        value_hint = ValueHint::FilePath
    )]
    config: Option<PathBuf>,

    /// Only run these project groups (repeatable or comma-separated)
    #[arg(short = 'g', long = "group", value_delimiter = ',')]
    groups: Vec<String>,

    /// Discover and report variants without staging or building
    #[arg(long = "dry-run", action = ArgAction::SetTrue)]
    dry_run: bool,

    /// Print the discovered variants of each group and exit
    #[arg(long = "list", action = ArgAction::SetTrue, conflicts_with = "dry_run")]
    list: bool,

    /// Capture each build's output to DIR/<group>-<NNN>.log
    #[arg(long = "log-dir", value_hint = ValueHint::DirPath)]
    log_dir: Option<PathBuf>,

    /// Emit results as a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue, conflicts_with = "ndjson")]
    json: bool,

    /// Emit results as newline-delimited JSON
    #[arg(long = "ndjson", action = ArgAction::SetTrue)]
    ndjson: bool,

    /// Exit with status 2 when any build reported failure
    #[arg(long = "strict", action = ArgAction::SetTrue)]
    strict: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,
}

/// Parse CLI args, run the matrix and return the process exit status.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let cwd = env::current_dir().context("cannot determine current directory")?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    execute(&cli, &cwd, &mut handle)
}

fn init_logging(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn execute(cli: &Cli, cwd: &Path, mut out: impl Write) -> Result<i32> {
    let mut config = resolve_config(cli.config.as_deref(), cwd)?;
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(cwd.join(dir));
    }

    let options = RunOptions {
        dry_run: cli.dry_run,
        groups: cli.groups.clone(),
    };

    if cli.list {
        let plans = plan(&config, &options)?;
        write_plans(&plans, &config.naming, cli.json || cli.ndjson, &mut out)?;
        return Ok(0);
    }

    let report = run_matrix(&config, CommandRunner, &options)?;
    write_report(cli, &report, &mut out)?;

    if cli.strict && !report.is_success() {
        return Ok(EXIT_BUILDS_FAILED);
    }
    Ok(0)
}

/// Explicit path, then `./varmatrix.toml`, then the built-in reference matrix.
fn resolve_config(explicit: Option<&Path>, cwd: &Path) -> Result<MatrixConfig> {
    if let Some(path) = explicit {
        let path = cwd.join(path);
        info!(config = %path.display(), "loading matrix configuration");
        return MatrixConfig::load(&path);
    }

    let local = cwd.join(DEFAULT_CONFIG_FILE);
    if local.is_file() {
        info!(config = %local.display(), "loading matrix configuration");
        return MatrixConfig::load(&local);
    }

    info!("no configuration file, using the reference LBM/MLBM matrix");
    Ok(MatrixConfig::reference().rooted_at(cwd))
}

fn write_report(cli: &Cli, report: &RunReport, mut w: impl Write) -> Result<()> {
    if cli.ndjson {
        write_ndjson(&report.results, &mut w)
    } else if cli.json {
        write_json_pretty(&report.results, &mut w)
    } else {
        report.write_summary(&mut w)
    }
}

fn write_plans(
    plans: &[GroupPlan],
    naming: &VariantNaming,
    as_json: bool,
    mut w: impl Write,
) -> Result<()> {
    if as_json {
        let json = serde_json::to_string_pretty(plans)?;
        writeln!(w, "{json}")?;
        return Ok(());
    }

    for group in plans {
        let labels: Vec<String> = group.variants.iter().map(|&id| naming.label(id)).collect();
        if labels.is_empty() {
            writeln!(w, "{}: (no variants)", group.group)?;
        } else {
            writeln!(w, "{}: {}", group.group, labels.join(" "))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
