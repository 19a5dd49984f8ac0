//! # Taxon - taxonomy staleness tracker
//!
//! The main binary for the Taxon taxonomy store.
//!
//! ## Usage
//!
//! ```bash
//! # Print final statuses
//! taxon replay -b graph_build.json -x img_extract.json -e graph_edits.json
//!
//! # Compare with expected statuses (non-zero exit on mismatch)
//! taxon verify -b graph_build.json -x img_extract.json -e graph_edits.json \
//!     -E expected_status.json
//!
//! # Show the hierarchy
//! taxon tree -b graph_build.json -e graph_edits.json
//! ```

use clap::Parser;
use taxon::{cli, logging};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing: TAXON_LOG_FORMAT=json enables machine-parseable output.
    logging::init(cli.verbose);

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
