//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Each command has a `run_*` half that returns data (used by tests) and a
//! `cmd_*` half that prints it.

use super::FixtureArgs;
use crate::config::TaxonConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use taxon_core::{
    Fixture, ImageId, ImageStatus, SerializableHierarchy, StatusMismatch, StatusSummary,
    TaxonError, TaxonomyStore, diff_statuses, parse_expected, parse_node_list,
};

// =============================================================================
// FILE HELPERS
// =============================================================================

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), TaxonError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| TaxonError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(TaxonError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate an input path.
///
/// Canonicalizes the path (resolving symlinks and "..") and requires a
/// regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, TaxonError> {
    let canonical = path.canonicalize().map_err(|e| {
        TaxonError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(TaxonError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read one fixture document after path and size checks.
pub fn read_document(path: &Path, config: &TaxonConfig) -> Result<Vec<u8>, TaxonError> {
    let validated = validate_file_path(path)?;
    validate_file_size(&validated, config.limits.max_fixture_bytes)?;

    tracing::debug!(path = %validated.display(), "reading fixture document");
    std::fs::read(&validated)
        .map_err(|e| TaxonError::IoError(format!("Read file '{}': {}", path.display(), e)))
}

/// Read and decode the build, extract and edits documents.
pub fn load_fixture(args: &FixtureArgs, config: &TaxonConfig) -> Result<Fixture, TaxonError> {
    Fixture::from_documents(
        &read_document(&args.build, config)?,
        &read_document(&args.extract, config)?,
        &read_document(&args.edits, config)?,
    )
}

/// Output switches shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    /// Print JSON instead of text
    pub json_mode: bool,
    /// Drop headers, footers and success messages from text output
    pub quiet: bool,
}

impl Output {
    fn header(&self, title: &str) {
        if !self.quiet {
            println!("{}", title);
            println!("{}", "=".repeat(title.len()));
        }
    }

    fn footer(&self, line: &str) {
        if !self.quiet {
            println!();
            println!("{}", line);
        }
    }
}

fn print_json(value: &impl serde::Serialize) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// REPLAY COMMAND
// =============================================================================

/// Replay a fixture and return the final store (`None` for an empty build).
pub fn run_replay(
    config: &TaxonConfig,
    args: &FixtureArgs,
) -> Result<Option<TaxonomyStore>, TaxonError> {
    let fixture = load_fixture(args, config)?;
    tracing::info!(
        build = fixture.build.len(),
        images = fixture.extract.len(),
        edits = fixture.edits.len(),
        "replaying fixture"
    );
    fixture.replay(config.store)
}

/// Final statuses of a replay.
pub fn run_statuses(
    config: &TaxonConfig,
    args: &FixtureArgs,
) -> Result<BTreeMap<ImageId, ImageStatus>, TaxonError> {
    load_fixture(args, config)?.replay_statuses(config.store)
}

/// Print the final statuses of a replay.
pub fn cmd_replay(
    config: &TaxonConfig,
    args: &FixtureArgs,
    output: Output,
) -> Result<(), TaxonError> {
    let statuses = run_statuses(config, args)?;

    if output.json_mode {
        print_json(&statuses);
        return Ok(());
    }

    output.header("Image Statuses");
    for (image, status) in &statuses {
        println!("{:<24} {}", image, status);
    }
    output.footer(&format!("{} images", statuses.len()));

    Ok(())
}

// =============================================================================
// VERIFY COMMAND
// =============================================================================

/// Replay a fixture and diff against an expected-status document.
pub fn run_verify(
    config: &TaxonConfig,
    args: &FixtureArgs,
    expected: &Path,
) -> Result<Vec<StatusMismatch>, TaxonError> {
    let expected = parse_expected(&read_document(expected, config)?)?;
    let actual = run_statuses(config, args)?;
    Ok(diff_statuses(&expected, &actual))
}

/// Verify a fixture. Fails when any image differs.
pub fn cmd_verify(
    config: &TaxonConfig,
    args: &FixtureArgs,
    expected: &Path,
    output: Output,
) -> Result<(), TaxonError> {
    let mismatches = run_verify(config, args, expected)?;

    if output.json_mode {
        print_json(&serde_json::json!({
            "ok": mismatches.is_empty(),
            "mismatches": mismatches,
        }));
    } else if mismatches.is_empty() {
        if !output.quiet {
            println!("All statuses match");
        }
    } else {
        output.header("Status mismatches");
        for m in &mismatches {
            println!(
                "{:<24} expected {:<20} actual {}",
                m.image,
                m.expected.map_or("-", ImageStatus::as_str),
                m.actual.map_or("-", ImageStatus::as_str)
            );
        }
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(TaxonError::Fixture(format!(
            "{} image(s) differ from expected statuses",
            mismatches.len()
        )))
    }
}

// =============================================================================
// TREE COMMAND
// =============================================================================

/// Build the hierarchy from a build list and optional edits.
pub fn run_tree(
    config: &TaxonConfig,
    build: &Path,
    edits: Option<&Path>,
) -> Result<Option<TaxonomyStore>, TaxonError> {
    let fixture = Fixture {
        build: parse_node_list(&read_document(build, config)?)?,
        extract: BTreeMap::new(),
        edits: match edits {
            Some(path) => parse_node_list(&read_document(path, config)?)?,
            None => Vec::new(),
        },
    };
    fixture.replay(config.store)
}

/// Print the hierarchy as an indented tree.
///
/// Text and JSON output share the `MAX_RENDER_DEPTH` bound of `walk`.
pub fn cmd_tree(
    config: &TaxonConfig,
    build: &Path,
    edits: Option<&Path>,
    output: Output,
) -> Result<(), TaxonError> {
    let Some(store) = run_tree(config, build, edits)? else {
        if !output.quiet {
            println!("Build list is empty");
        }
        return Ok(());
    };

    let hierarchy = store.hierarchy();
    if output.json_mode {
        print_json(&SerializableHierarchy::bounded(hierarchy));
        return Ok(());
    }

    let walked = hierarchy.walk(hierarchy.root());
    for (depth, name) in &walked {
        println!("{}{}", "  ".repeat(*depth), name);
    }
    output.footer(&format!("{} of {} nodes shown", walked.len(), store.node_count()));

    Ok(())
}

// =============================================================================
// SUMMARY COMMAND
// =============================================================================

/// Per-status counts of a replay.
pub fn run_summary(config: &TaxonConfig, args: &FixtureArgs) -> Result<StatusSummary, TaxonError> {
    Ok(run_replay(config, args)?
        .map(|store| store.summary())
        .unwrap_or_default())
}

/// Print per-status counts of a replay.
pub fn cmd_summary(
    config: &TaxonConfig,
    args: &FixtureArgs,
    output: Output,
) -> Result<(), TaxonError> {
    let summary = run_summary(config, args)?;

    if output.json_mode {
        print_json(&summary);
        return Ok(());
    }

    output.header("Taxon Replay Summary");
    println!("Nodes:  {}", summary.node_count);
    println!("Images: {}", summary.image_count);
    println!();
    for status in ImageStatus::ALL {
        println!("  {:<20} {}", status, summary.count(status));
    }
    output.footer(&format!("Staged for review: {}", summary.staged()));

    Ok(())
}
