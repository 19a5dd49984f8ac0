//! # Formats Module
//!
//! Serialization formats for Taxon.
//!
//! Pure transformations from bytes to store inputs. File I/O operations are
//! in the app layer.

mod fixture;

pub use fixture::*;
