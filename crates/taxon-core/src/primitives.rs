//! # Primitives
//!
//! Hardcoded constants for the Taxon store.
//!
//! These values are compiled into the binary and are immutable at runtime.

/// Root name used when a caller does not name one.
pub const DEFAULT_ROOT_NAME: &str = "core";

/// Maximum depth rendered by hierarchy walks.
///
/// Every walk over the hierarchy is bounded so a pathological taxonomy
/// cannot produce unbounded output.
pub const MAX_RENDER_DEPTH: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_root_is_core() {
        assert_eq!(DEFAULT_ROOT_NAME, "core");
    }
}
