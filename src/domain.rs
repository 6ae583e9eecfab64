//! Core domain types and the pure normalization pipeline.
//!
//! Everything here is a synchronous, side-effect-free computation over one
//! raw citation string: extraction, classification, and assembly of the
//! normalized record. I/O belongs to callers.

/// Structured CFR references and validated part ranges.
pub mod reference;
pub use reference::{InvalidRangeError, Part, Reference};

/// Parse-quality status taxonomy.
pub mod status;
pub use status::ParseStatus;

/// The reference extractor.
pub mod extract;
pub use extract::{Extraction, extract};

/// The status classifier.
pub mod classify;
pub use classify::classify;

/// Normalized citations and the record builder.
pub mod citation;
pub use citation::{InvariantError, NormalizeError, NormalizedCitation, normalize};

mod config;
pub use config::{Config, RangeMode};
