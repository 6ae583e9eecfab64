//! Selecting citations that deserve human review.
//!
//! Rule iteration is driven from here: the selector pulls out the statuses
//! a rule change could still fix, and the summary shows how the whole
//! corpus distributes across statuses with a few raw samples per bucket.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{NormalizedCitation, ParseStatus};

use super::NormalizedRecord;

/// Picks the identifiers whose citations are worth another look.
///
/// A citation is recoverable when its status is `unparsed` or
/// `missing_title`: the text plausibly contains CFR material that the
/// current rules failed to fully resolve. Empty fields and non-CFR text
/// are excluded because no rule change can improve them.
///
/// Input order is preserved.
#[must_use = "selection has no effect unless the ids are acted on"]
pub fn select<'a, Id, I>(records: I) -> Vec<Id>
where
    I: IntoIterator<Item = (Id, &'a NormalizedCitation)>,
{
    records
        .into_iter()
        .filter(|(_, citation)| citation.status().is_recoverable())
        .map(|(id, _)| id)
        .collect()
}

/// [`select`] specialized to batch output: returns document identifiers.
#[must_use]
pub fn select_records(records: &[NormalizedRecord]) -> Vec<&str> {
    select(
        records
            .iter()
            .map(|record| (record.document_id.as_str(), &record.citation)),
    )
}

/// Status distribution over a corpus, with sample raw strings per bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    counts: BTreeMap<ParseStatus, usize>,
    samples: BTreeMap<ParseStatus, Vec<String>>,
    #[serde(skip)]
    sample_limit: usize,
}

impl StatusSummary {
    /// An empty summary keeping at most `sample_limit` raw strings per
    /// non-parsed status.
    #[must_use]
    pub fn new(sample_limit: usize) -> Self {
        Self {
            counts: BTreeMap::new(),
            samples: BTreeMap::new(),
            sample_limit,
        }
    }

    /// Folds one citation into the summary.
    pub fn observe(&mut self, citation: &NormalizedCitation) {
        let status = citation.status();
        *self.counts.entry(status).or_default() += 1;

        if status == ParseStatus::Parsed {
            return;
        }
        let Some(raw) = citation.raw() else {
            return;
        };
        let samples = self.samples.entry(status).or_default();
        if samples.len() < self.sample_limit {
            samples.push(raw.to_string());
        }
    }

    /// How many citations carried the given status.
    #[must_use]
    pub fn count(&self, status: ParseStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or_default()
    }

    /// How many citations were observed in total.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Sample raw strings collected for the given status.
    #[must_use]
    pub fn samples(&self, status: ParseStatus) -> &[String] {
        self.samples.get(&status).map_or(&[], Vec::as_slice)
    }
}
