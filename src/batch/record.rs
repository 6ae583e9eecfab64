//! Document records and parallel batch normalization.

use chrono::{DateTime, Utc};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{NormalizeError, NormalizedCitation, normalize};

/// One regulatory document record as received from the upstream store.
///
/// The core reads only the citation field and the identifiers needed for
/// triage and aggregation; everything else about the record's lifecycle
/// belongs to the ingest pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Upstream document identifier.
    pub document_id: String,

    /// Agency that published the document.
    #[serde(default)]
    pub agency_id: Option<String>,

    /// Document type, e.g. "Rule" or "Proposed Rule".
    #[serde(default)]
    pub document_type: Option<String>,

    /// When the document was posted.
    #[serde(default)]
    pub posted_date: Option<DateTime<Utc>>,

    /// The raw "CFR Part" field. Kept loosely typed because upstream
    /// records occasionally leak structured values into this column; those
    /// are rejected by [`Self::citation`] rather than coerced.
    #[serde(default)]
    pub cfr_part: Value,
}

impl DocumentRecord {
    /// The citation field as a raw string, or `None` for a null field.
    ///
    /// # Errors
    ///
    /// Returns [`RawTypeError`] when the field holds anything other than a
    /// string or null. The check runs before any pattern matching so a
    /// structured value leaking in from upstream cannot masquerade as
    /// citation text.
    pub fn citation(&self) -> Result<Option<&str>, RawTypeError> {
        match &self.cfr_part {
            Value::Null => Ok(None),
            Value::String(raw) => Ok(Some(raw)),
            other => Err(RawTypeError {
                kind: json_kind(other),
                value: other.to_string(),
            }),
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Error returned when the citation field is not a string or null.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("cfr_part must be a string or null, got {kind}: {value}")]
pub struct RawTypeError {
    kind: &'static str,
    value: String,
}

/// A document record joined with its normalization result: the unit
/// consumed by triage and aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Upstream document identifier.
    pub document_id: String,
    /// Agency that published the document.
    #[serde(default)]
    pub agency_id: Option<String>,
    /// Document type, e.g. "Rule" or "Proposed Rule".
    #[serde(default)]
    pub document_type: Option<String>,
    /// When the document was posted.
    #[serde(default)]
    pub posted_date: Option<DateTime<Utc>>,
    /// The normalization result.
    pub citation: NormalizedCitation,
}

/// Why one record could not be normalized.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    /// The citation field was not a string or null.
    #[error(transparent)]
    RawType(#[from] RawTypeError),

    /// Normalization surfaced a rule-set defect.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// A record that failed to normalize, with enough context for triage.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("failed to normalize document {document_id}: {error}")]
pub struct Failure {
    /// Upstream document identifier.
    pub document_id: String,
    /// The offending citation field, verbatim.
    pub cfr_part: Value,
    /// What went wrong.
    #[source]
    pub error: RecordError,
}

/// The outcome of normalizing a batch.
#[derive(Debug, Default, PartialEq)]
pub struct BatchOutcome {
    /// Successfully normalized records, input order not guaranteed.
    pub normalized: Vec<NormalizedRecord>,
    /// Records whose citation field could not be normalized.
    pub failures: Vec<Failure>,
}

/// Normalizes a batch of document records in parallel.
///
/// Every record is processed independently; a failure is collected, never
/// fatal, so the batch always completes with a defined outcome for each
/// record.
#[must_use]
pub fn normalize_records(records: Vec<DocumentRecord>) -> BatchOutcome {
    let (normalized, failures): (Vec<_>, Vec<_>) = records
        .into_par_iter()
        .map(normalize_record)
        .partition(Result::is_ok);

    BatchOutcome {
        normalized: normalized.into_iter().map(Result::unwrap).collect(),
        failures: failures.into_iter().map(Result::unwrap_err).collect(),
    }
}

fn normalize_record(record: DocumentRecord) -> Result<NormalizedRecord, Failure> {
    let outcome = record
        .citation()
        .map_err(RecordError::from)
        .and_then(|raw| normalize(raw).map_err(RecordError::from));

    match outcome {
        Ok(citation) => Ok(NormalizedRecord {
            document_id: record.document_id,
            agency_id: record.agency_id,
            document_type: record.document_type,
            posted_date: record.posted_date,
            citation,
        }),
        Err(error) => Err(Failure {
            document_id: record.document_id,
            cfr_part: record.cfr_part,
            error,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParseStatus;

    fn record(id: &str, cfr_part: Value) -> DocumentRecord {
        DocumentRecord {
            document_id: id.to_string(),
            agency_id: Some("CMS".to_string()),
            document_type: Some("Rule".to_string()),
            posted_date: None,
            cfr_part,
        }
    }

    #[test]
    fn string_citation_is_accepted() {
        let record = record("CMS-2024-0001", Value::String("42 CFR Part 412".to_string()));
        assert_eq!(record.citation().unwrap(), Some("42 CFR Part 412"));
    }

    #[test]
    fn null_citation_is_accepted() {
        let record = record("CMS-2024-0001", Value::Null);
        assert_eq!(record.citation().unwrap(), None);
    }

    #[test]
    fn structured_citation_is_rejected() {
        let record = record("CMS-2024-0001", serde_json::json!({"title": 42}));
        let error = record.citation().unwrap_err();
        assert!(error.to_string().contains("object"));
    }

    #[test]
    fn missing_fields_default_on_deserialize() {
        let record: DocumentRecord =
            serde_json::from_str(r#"{"document_id": "EPA-1"}"#).unwrap();
        assert_eq!(record.agency_id, None);
        assert_eq!(record.cfr_part, Value::Null);
        assert_eq!(record.citation().unwrap(), None);
    }

    #[test]
    fn batch_partitions_failures_without_dropping_successes() {
        let records = vec![
            record("A", Value::String("42 CFR Part 412".to_string())),
            record("B", serde_json::json!(412)),
            record("C", Value::String("42 CFR 415-410".to_string())),
            record("D", Value::Null),
        ];

        let outcome = normalize_records(records);

        assert_eq!(outcome.normalized.len(), 2);
        assert_eq!(outcome.failures.len(), 2);

        let mut failed_ids: Vec<_> = outcome
            .failures
            .iter()
            .map(|f| f.document_id.as_str())
            .collect();
        failed_ids.sort_unstable();
        assert_eq!(failed_ids, ["B", "C"]);

        let parsed = outcome
            .normalized
            .iter()
            .find(|r| r.document_id == "A")
            .unwrap();
        assert_eq!(parsed.citation.status(), ParseStatus::Parsed);

        let empty = outcome
            .normalized
            .iter()
            .find(|r| r.document_id == "D")
            .unwrap();
        assert_eq!(empty.citation.status(), ParseStatus::Empty);
    }

    #[test]
    fn failure_keeps_the_offending_value() {
        let outcome = normalize_records(vec![record("B", serde_json::json!(412))]);
        assert_eq!(outcome.failures[0].cfr_part, serde_json::json!(412));
    }

    #[test]
    fn normalized_record_round_trips() {
        let outcome = normalize_records(vec![record(
            "A",
            Value::String("42 CFR Parts 410-415".to_string()),
        )]);
        let json = serde_json::to_string(&outcome.normalized[0]).unwrap();
        let back: NormalizedRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome.normalized[0]);
    }
}
