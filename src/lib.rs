//! CFR citation normalization.
//!
//! Regulatory document records carry a free-text "CFR Part" field in wildly
//! inconsistent formats:
//!
//! - `42 CFR Part 412`
//! - `42 CFR 412`
//! - `42 CFR Parts 405, 412, and 489`
//! - `42 CFR Parts 410-415`
//! - `42 CFR Part 412; 45 CFR Part 155`
//!
//! This crate extracts structured `{title, part}` references from that
//! text, assigns a parse-quality status, and keeps the raw value untouched
//! for downstream review and rule iteration.

pub mod domain;
pub use domain::{
    Config, Extraction, InvalidRangeError, InvariantError, NormalizeError, NormalizedCitation,
    ParseStatus, Part, RangeMode, Reference, classify, extract, normalize,
};

/// Batch folds over many document records.
pub mod batch;
pub use batch::{
    AggregateOptions, BatchOutcome, DocumentRecord, NormalizedRecord, PartRow, StatusSummary,
    aggregate, normalize_records, select,
};
