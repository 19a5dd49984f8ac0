//! # Taxon CLI Module
//!
//! This module implements the CLI interface for Taxon.
//!
//! ## Available Commands
//!
//! - `replay` - Replay a fixture and print the final statuses
//! - `verify` - Replay a fixture and compare with expected statuses
//! - `tree` - Print the hierarchy built from a fixture
//! - `summary` - Print per-status counts of a replay

mod commands;

use crate::config::TaxonConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use taxon_core::TaxonError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Taxon - taxonomy staleness tracker
///
/// Replays a build list, an extract and an edit list through the taxonomy
/// store and reports which images became stale.
#[derive(Parser, Debug)]
#[command(name = "taxon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress headers, footers and success messages (text output only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Output switches for whichever command runs.
    pub fn output(&self) -> Output {
        Output {
            json_mode: self.json_mode,
            quiet: self.quiet,
        }
    }
}

/// The three documents every replay needs.
#[derive(Args, Debug, Clone)]
pub struct FixtureArgs {
    /// Build list: [[name, parent-or-null], ...]
    #[arg(short, long)]
    pub build: PathBuf,

    /// Extract: {"image": ["node", ...], ...}
    #[arg(short = 'x', long)]
    pub extract: PathBuf,

    /// Edit list, same shape as the build list
    #[arg(short, long)]
    pub edits: PathBuf,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a fixture and print the final statuses
    Replay {
        #[command(flatten)]
        fixture: FixtureArgs,
    },

    /// Replay a fixture and compare with expected statuses
    Verify {
        #[command(flatten)]
        fixture: FixtureArgs,

        /// Expected statuses: {"image": "status", ...}
        #[arg(short = 'E', long)]
        expected: PathBuf,
    },

    /// Print the hierarchy built from a build list (and optional edits)
    Tree {
        /// Build list: [[name, parent-or-null], ...]
        #[arg(short, long)]
        build: PathBuf,

        /// Edit list applied after the build
        #[arg(short, long)]
        edits: Option<PathBuf>,
    },

    /// Print per-status counts of a replay
    Summary {
        #[command(flatten)]
        fixture: FixtureArgs,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), TaxonError> {
    let config = TaxonConfig::load(cli.config.as_deref())?;
    let output = cli.output();

    match cli.command {
        Commands::Replay { fixture } => cmd_replay(&config, &fixture, output),
        Commands::Verify { fixture, expected } => cmd_verify(&config, &fixture, &expected, output),
        Commands::Tree { build, edits } => cmd_tree(&config, &build, edits.as_deref(), output),
        Commands::Summary { fixture } => cmd_summary(&config, &fixture, output),
    }
}
