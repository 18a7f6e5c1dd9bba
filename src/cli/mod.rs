//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod check;
mod finalize;
mod plan;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::config::loader::{
    default_config, find_config, load_config, merge_cli_overrides, project_root, CliOverrides,
};
use crate::plan::PlanContext;
use crate::profile::{self, BuildProfile};

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Bundleplan - build profiles, chunking and manifests for front-end assets
#[derive(Parser)]
#[command(name = "bundleplan")]
#[command(about = "Bundleplan - resolve build profiles, chunk layouts and asset manifests")]
#[command(version)]
pub struct Cli {
    /// Enable verbose (debug) logging; RUST_LOG takes precedence
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that builds a plan.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Path to bundle.toml (default: searched upward from the current directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Build profile (default: read from the configured environment variable)
    #[arg(long, value_enum)]
    pub profile: Option<BuildProfile>,

    /// Override the output directory
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Override the source directory
    #[arg(long)]
    pub src: Option<PathBuf>,

    /// Override the dev server host
    #[arg(long)]
    pub host: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the build plan as JSON
    Plan {
        #[command(flatten)]
        project: ProjectArgs,

        /// Module graph to lay out and name alongside the plan
        #[arg(long)]
        graph: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the chunk every module of a graph is assigned to
    Chunks {
        #[command(flatten)]
        project: ProjectArgs,

        /// Module graph (JSON) produced by the resolver
        #[arg(long)]
        graph: PathBuf,

        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Run post-compile and post-write plugins on an engine build report
    Finalize {
        #[command(flatten)]
        project: ProjectArgs,

        /// Build report (JSON) written by the engine
        #[arg(long)]
        report: PathBuf,
    },

    /// Validate bundle.toml and the plans of both profiles
    Check {
        #[command(flatten)]
        project: ProjectArgs,

        /// Treat source files without a matching rule as errors
        #[arg(long)]
        strict: bool,
    },
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` selects debug and the default is
/// warnings only.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "bundleplan=debug" } else { "warn" })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load configuration and resolve the profile for a command.
///
/// The profile is resolved exactly once here: `--profile` if given,
/// otherwise the configured environment variable.
pub(crate) fn load_context(args: &ProjectArgs) -> Result<PlanContext, ExitCode> {
    let config_path = args.config.clone().or_else(find_config);
    let (mut config, root) = match config_path {
        Some(path) => {
            tracing::debug!(config = %path.display(), "using config");
            let cfg = load_config(Some(&path)).map_err(|e| {
                eprintln!("Error loading config: {}", e);
                ExitCode::from(EXIT_ERROR)
            })?;
            let root = project_root(&path)
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
            (cfg, root)
        }
        None => {
            tracing::debug!("no bundle.toml found, using defaults");
            (default_config(), std::env::current_dir().unwrap_or_default())
        }
    };

    let overrides = CliOverrides {
        out: args.out.clone(),
        src: args.src.clone(),
        host: args.host.clone(),
        profile: args.profile,
        ..Default::default()
    };
    merge_cli_overrides(&mut config, &overrides);

    let profile = overrides.profile.unwrap_or_else(|| profile::from_env_var(&config.profile.env_var));
    Ok(PlanContext::new(config, root, profile))
}

/// Main CLI entry point
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Plan { project, graph, pretty } => {
            plan::run_plan(&project, graph.as_deref(), pretty)
        }
        Commands::Chunks { project, graph, format } => {
            plan::run_chunks(&project, &graph, &format)
        }
        Commands::Finalize { project, report } => finalize::run_finalize(&project, &report),
        Commands::Check { project, strict } => check::run_check(&project, strict),
    }
}
