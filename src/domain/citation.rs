//! Normalized citations and the record builder.

use serde::{Deserialize, Serialize};

use super::{
    classify::classify,
    extract::extract,
    reference::{InvalidRangeError, Reference},
    status::ParseStatus,
};

/// The structured result of normalizing one raw citation string.
///
/// The raw text is never discarded; the references are what was extracted
/// from it and the status records how confidently. Invariants between the
/// status and the references (see [`NormalizedCitation::new`]) are checked
/// at construction and re-checked on deserialization, so a value in hand is
/// always coherent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CitationRepr", into = "CitationRepr")]
pub struct NormalizedCitation {
    raw: Option<String>,
    status: ParseStatus,
    references: Vec<Reference>,
}

impl NormalizedCitation {
    /// Builds a citation, enforcing the status/references invariants:
    ///
    /// - `empty`, `unparsed`, and `no_cfr` carry no references;
    /// - `parsed` carries at least one reference, every one titled;
    /// - `missing_title` references include at least one without a title.
    ///
    /// This is the single point where the invariants are checked, so a
    /// defective extraction rule surfaces here instead of propagating
    /// malformed data into storage.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantError`] describing the violated rule.
    pub fn new(
        raw: Option<String>,
        status: ParseStatus,
        references: Vec<Reference>,
    ) -> Result<Self, InvariantError> {
        match status {
            ParseStatus::Empty | ParseStatus::Unparsed | ParseStatus::NoCfr => {
                if !references.is_empty() {
                    return Err(InvariantError::UnexpectedReferences { status });
                }
            }
            ParseStatus::Parsed => {
                if references.is_empty() {
                    return Err(InvariantError::MissingReferences);
                }
                if references.iter().any(|r| r.title.is_none()) {
                    return Err(InvariantError::UntitledReference);
                }
            }
            ParseStatus::MissingTitle => {
                if !references.is_empty() && references.iter().all(|r| r.title.is_some()) {
                    return Err(InvariantError::FullyTitledReferences);
                }
            }
        }

        Ok(Self {
            raw,
            status,
            references,
        })
    }

    /// The raw citation text as received, or `None` for a null field.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// The parse-quality status.
    #[must_use]
    pub const fn status(&self) -> ParseStatus {
        self.status
    }

    /// The extracted references, in extraction order: within a segment
    /// ranges precede single parts, duplicates collapsed to their first
    /// appearance.
    #[must_use]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }
}

/// Normalizes one raw citation field into a [`NormalizedCitation`].
///
/// Composes extraction and classification, then constructs the result
/// through the sole validating constructor. Pure and idempotent:
/// re-running on the same input (or on an already-normalized record's raw
/// value) yields the same result.
///
/// ```
/// use cfrnorm::{normalize, ParseStatus};
///
/// let citation = normalize(Some("42 CFR Parts 412 and 413")).unwrap();
/// assert_eq!(citation.status(), ParseStatus::Parsed);
/// assert_eq!(citation.references().len(), 2);
/// ```
///
/// # Errors
///
/// Returns [`NormalizeError`] with the offending raw value attached when
/// extraction produces an inverted range or the assembled value violates
/// the status/references invariants. Either case is a rule-set defect; it
/// aborts this record only, never a batch.
pub fn normalize(raw: Option<&str>) -> Result<NormalizedCitation, NormalizeError> {
    let Some(raw) = raw else {
        return Ok(NormalizedCitation {
            raw: None,
            status: ParseStatus::Empty,
            references: Vec::new(),
        });
    };

    let extraction = extract(raw).map_err(|source| NormalizeError::MalformedReference {
        raw: raw.to_string(),
        source,
    })?;
    let status = classify(raw, &extraction);

    NormalizedCitation::new(Some(raw.to_string()), status, extraction.references).map_err(
        |source| NormalizeError::Invariant {
            raw: raw.to_string(),
            source,
        },
    )
}

/// Errors from normalizing a single citation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// Extraction produced a reference violating the range invariant.
    #[error("malformed reference in citation '{raw}'")]
    MalformedReference {
        /// The raw citation text that triggered the defect.
        raw: String,
        /// The violated range invariant.
        #[source]
        source: InvalidRangeError,
    },

    /// The assembled citation violated a status/references invariant.
    #[error("invariant violation normalizing citation '{raw}'")]
    Invariant {
        /// The raw citation text that triggered the defect.
        raw: String,
        /// The violated invariant.
        #[source]
        source: InvariantError,
    },
}

/// A status/references invariant violation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvariantError {
    /// A reference-free status was paired with references.
    #[error("status '{status}' must not carry references")]
    UnexpectedReferences {
        /// The offending status.
        status: ParseStatus,
    },

    /// `parsed` was paired with an empty reference list.
    #[error("status 'parsed' requires at least one reference")]
    MissingReferences,

    /// `parsed` was paired with an untitled reference.
    #[error("status 'parsed' requires every reference to carry a title")]
    UntitledReference,

    /// `missing_title` was paired with fully titled references.
    #[error("status 'missing_title' requires a reference without a title")]
    FullyTitledReferences,
}

/// Serialized shape of a [`NormalizedCitation`]; conversion back through
/// `TryFrom` re-runs the invariant checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CitationRepr {
    raw: Option<String>,
    status: ParseStatus,
    references: Vec<Reference>,
}

impl From<NormalizedCitation> for CitationRepr {
    fn from(citation: NormalizedCitation) -> Self {
        Self {
            raw: citation.raw,
            status: citation.status,
            references: citation.references,
        }
    }
}

impl TryFrom<CitationRepr> for NormalizedCitation {
    type Error = InvariantError;

    fn try_from(repr: CitationRepr) -> Result<Self, Self::Error> {
        Self::new(repr.raw, repr.status, repr.references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reference::Part;

    #[test]
    fn null_input_is_empty() {
        let citation = normalize(None).unwrap();
        assert_eq!(citation.raw(), None);
        assert_eq!(citation.status(), ParseStatus::Empty);
        assert!(citation.references().is_empty());
    }

    #[test]
    fn blank_input_is_empty_but_keeps_raw() {
        let citation = normalize(Some("   ")).unwrap();
        assert_eq!(citation.raw(), Some("   "));
        assert_eq!(citation.status(), ParseStatus::Empty);
        assert!(citation.references().is_empty());
    }

    #[test]
    fn simple_citation_parses() {
        let citation = normalize(Some("42 CFR Part 412")).unwrap();
        assert_eq!(citation.status(), ParseStatus::Parsed);
        assert_eq!(
            citation.references(),
            &[Reference::titled(42, Part::single(412))]
        );
        assert_eq!(citation.raw(), Some("42 CFR Part 412"));
    }

    #[test]
    fn missing_title_keeps_untitled_references() {
        let citation = normalize(Some("Part 488")).unwrap();
        assert_eq!(citation.status(), ParseStatus::MissingTitle);
        assert_eq!(
            citation.references(),
            &[Reference::untitled(Part::single(488))]
        );
    }

    #[test]
    fn inverted_range_reports_the_raw_value() {
        let error = normalize(Some("42 CFR 415-410")).unwrap_err();
        match error {
            NormalizeError::MalformedReference { raw, .. } => {
                assert_eq!(raw, "42 CFR 415-410");
            }
            NormalizeError::Invariant { .. } => panic!("expected a malformed reference error"),
        }
    }

    #[test]
    fn constructor_rejects_references_on_unparsed() {
        let error = NormalizedCitation::new(
            Some("junk".to_string()),
            ParseStatus::Unparsed,
            vec![Reference::titled(42, Part::single(412))],
        )
        .unwrap_err();
        assert_eq!(
            error,
            InvariantError::UnexpectedReferences {
                status: ParseStatus::Unparsed
            }
        );
    }

    #[test]
    fn constructor_rejects_empty_parsed() {
        let error = NormalizedCitation::new(Some("x".to_string()), ParseStatus::Parsed, Vec::new())
            .unwrap_err();
        assert_eq!(error, InvariantError::MissingReferences);
    }

    #[test]
    fn constructor_rejects_untitled_parsed() {
        let error = NormalizedCitation::new(
            Some("x".to_string()),
            ParseStatus::Parsed,
            vec![Reference::untitled(Part::single(412))],
        )
        .unwrap_err();
        assert_eq!(error, InvariantError::UntitledReference);
    }

    #[test]
    fn constructor_rejects_fully_titled_missing_title() {
        let error = NormalizedCitation::new(
            Some("x".to_string()),
            ParseStatus::MissingTitle,
            vec![Reference::titled(42, Part::single(412))],
        )
        .unwrap_err();
        assert_eq!(error, InvariantError::FullyTitledReferences);
    }

    #[test]
    fn serializes_to_the_documented_shape() {
        let citation = normalize(Some("42 CFR 410-415")).unwrap();
        let json = serde_json::to_value(&citation).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "raw": "42 CFR 410-415",
                "status": "parsed",
                "references": [{"title": 42, "part_range": [410, 415]}],
            })
        );
    }

    #[test]
    fn round_trips_through_json() {
        for raw in [
            None,
            Some("42 CFR Part 412"),
            Some("42 CFR Parts 405, 410-415, and 489"),
            Some("Part 488"),
            Some("See attached comment letter"),
            Some("RIN 0938-AV01"),
        ] {
            let citation = normalize(raw).unwrap();
            let json = serde_json::to_string(&citation).unwrap();
            let back: NormalizedCitation = serde_json::from_str(&json).unwrap();
            assert_eq!(citation, back);
        }
    }

    #[test]
    fn deserialization_rejects_incoherent_values() {
        let json =
            r#"{"raw": "junk", "status": "no_cfr", "references": [{"title": 42, "part": 412}]}"#;
        let result: Result<NormalizedCitation, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn normalization_is_idempotent_on_parsed_records() {
        let first = normalize(Some("42 CFR Part 412")).unwrap();
        let again = normalize(first.raw()).unwrap();
        assert_eq!(first, again);
    }
}
