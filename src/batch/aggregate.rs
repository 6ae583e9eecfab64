//! Part-frequency aggregation across a corpus.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::domain::{Config, RangeMode, Reference};

use super::NormalizedRecord;

/// What to count and how to attribute ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Only records with exactly this document type are counted.
    pub document_type: String,
    /// When set, only references citing this title contribute.
    pub title: Option<u32>,
    /// How a range reference is spread over part rows.
    pub range_mode: RangeMode,
    /// Ranges wider than this fall back to endpoint attribution.
    pub max_range_span: u32,
}

impl AggregateOptions {
    /// Options for the given document type with configured defaults.
    #[must_use]
    pub fn new(document_type: impl Into<String>, config: &Config) -> Self {
        Self {
            document_type: document_type.into(),
            title: None,
            range_mode: config.range_mode(),
            max_range_span: config.max_range_span(),
        }
    }
}

/// One row of the aggregation report: a part number, how many documents
/// cited it, and the per-agency breakdown of those documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartRow {
    /// The cited part number.
    pub part: u32,
    /// How many documents cited this part.
    pub count: u64,
    /// Citing agencies, most frequent first.
    pub agencies: Vec<AgencyCount>,
}

impl PartRow {
    /// The agency breakdown as a single line, e.g. `CMS(150) CDC(32)`.
    #[must_use]
    pub fn agencies_display(&self) -> String {
        let tokens: Vec<String> = self
            .agencies
            .iter()
            .map(|a| format!("{}({})", a.agency, a.count))
            .collect();
        tokens.join(" ")
    }
}

/// Document count for one agency within a part row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgencyCount {
    /// Agency identifier, or `unknown` for records without one.
    pub agency: String,
    /// Documents from this agency citing the part.
    pub count: u64,
}

/// Counts how often each part number is cited across the corpus.
///
/// Each document contributes at most once per part, no matter how many of
/// its references mention it. Range references are attributed per
/// [`RangeMode`]: either every covered part, or the two endpoints. A range
/// wider than `max_range_span` always falls back to its endpoints, so one
/// malformed "1-9999" citation cannot swamp the report.
///
/// Rows are sorted by descending count, ties broken by ascending part
/// number; agencies within a row likewise by descending count, then name.
#[must_use = "the report rows are the only output"]
pub fn aggregate<'a, I>(records: I, options: &AggregateOptions) -> Vec<PartRow>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut by_part: BTreeMap<u32, HashMap<String, u64>> = BTreeMap::new();

    for record in records {
        if record.document_type.as_deref() != Some(options.document_type.as_str()) {
            continue;
        }

        let parts = cited_parts(record.citation.references(), options);
        if parts.is_empty() {
            continue;
        }

        let agency = record.agency_id.as_deref().unwrap_or("unknown");
        for part in parts {
            *by_part.entry(part).or_default().entry(agency.to_string()).or_default() += 1;
        }
    }

    let mut rows: Vec<PartRow> = by_part
        .into_iter()
        .map(|(part, agencies)| {
            let count = agencies.values().sum();
            let mut agencies: Vec<AgencyCount> = agencies
                .into_iter()
                .map(|(agency, count)| AgencyCount { agency, count })
                .collect();
            agencies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.agency.cmp(&b.agency)));
            PartRow {
                part,
                count,
                agencies,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.part.cmp(&b.part)));
    rows
}

/// The distinct parts one record cites, after title filtering and range
/// attribution.
fn cited_parts(references: &[Reference], options: &AggregateOptions) -> BTreeSet<u32> {
    let mut parts = BTreeSet::new();
    for reference in references {
        if let Some(title) = options.title {
            if reference.title != Some(title) {
                continue;
            }
        }

        let part = reference.part;
        // The span guard compares endpoint distance, not covered count.
        let expand = options.range_mode == RangeMode::PerPart
            && part.high() - part.low() <= options.max_range_span;
        if expand {
            parts.extend(part.parts());
        } else {
            parts.insert(part.low());
            parts.insert(part.high());
        }
    }
    parts
}
