//! Folds over many normalized records.
//!
//! Each citation is normalized independently, so batch work is
//! embarrassingly parallel; the triage selector and the aggregator are
//! read-only single-pass folds over their input.

mod record;
pub use record::{
    BatchOutcome, DocumentRecord, Failure, NormalizedRecord, RawTypeError, RecordError,
    normalize_records,
};

mod triage;
pub use triage::{StatusSummary, select, select_records};

mod aggregate;
pub use aggregate::{AgencyCount, AggregateOptions, PartRow, aggregate};
