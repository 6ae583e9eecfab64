use std::fmt;

use serde::{Deserialize, Serialize};

/// A CFR part citation: either a single part number or an inclusive range.
///
/// Ranges are preserved as written (`410-415` stays one value) rather than
/// being exploded into individual parts; expansion is an aggregation-time
/// decision, not a parsing-time one.
///
/// The range invariant (`low <= high`, endpoints non-negative) is enforced
/// at construction and on deserialization, so a `Part` in hand is always
/// well formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PartRepr", into = "PartRepr")]
pub struct Part {
    low: u32,
    high: u32,
}

impl Part {
    /// Creates a single part number.
    #[must_use]
    pub const fn single(part: u32) -> Self {
        Self {
            low: part,
            high: part,
        }
    }

    /// Creates an inclusive range of part numbers.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRangeError`] if `low > high`. Inverted ranges are a
    /// rule-set defect and must not be silently reordered.
    pub const fn range(low: u32, high: u32) -> Result<Self, InvalidRangeError> {
        if low > high {
            Err(InvalidRangeError { low, high })
        } else {
            Ok(Self { low, high })
        }
    }

    /// The low endpoint (equal to [`Self::high`] for a single part).
    #[must_use]
    pub const fn low(&self) -> u32 {
        self.low
    }

    /// The high endpoint (equal to [`Self::low`] for a single part).
    #[must_use]
    pub const fn high(&self) -> u32 {
        self.high
    }

    /// Whether this is a genuine range rather than a single part number.
    #[must_use]
    pub const fn is_range(&self) -> bool {
        self.low != self.high
    }

    /// Number of integer part numbers covered by this value.
    #[must_use]
    pub const fn span(&self) -> u32 {
        self.high - self.low + 1
    }

    /// Iterates every integer part number covered, low to high inclusive.
    pub fn parts(&self) -> impl Iterator<Item = u32> {
        self.low..=self.high
    }

    /// Whether the given part number falls within this value.
    #[must_use]
    pub const fn contains(&self, part: u32) -> bool {
        self.low <= part && part <= self.high
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_range() {
            write!(f, "{}-{}", self.low, self.high)
        } else {
            write!(f, "{}", self.low)
        }
    }
}

/// The serialized shape of a [`Part`].
///
/// A single part serializes under the `part` key, a range under
/// `part_range`, so consumers never have to guess whether a lone integer
/// stands for a collapsed range. Conversion back through `TryFrom`
/// re-validates the range invariant.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum PartRepr {
    Single { part: u32 },
    Range { part_range: [u32; 2] },
}

impl From<Part> for PartRepr {
    fn from(part: Part) -> Self {
        if part.is_range() {
            Self::Range {
                part_range: [part.low, part.high],
            }
        } else {
            Self::Single { part: part.low }
        }
    }
}

impl TryFrom<PartRepr> for Part {
    type Error = InvalidRangeError;

    fn try_from(repr: PartRepr) -> Result<Self, Self::Error> {
        match repr {
            PartRepr::Single { part } => Ok(Self::single(part)),
            PartRepr::Range {
                part_range: [low, high],
            } => Self::range(low, high),
        }
    }
}

/// Error returned when a part range's endpoints are inverted.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid part range {low}-{high}: low endpoint exceeds high")]
pub struct InvalidRangeError {
    low: u32,
    high: u32,
}

impl InvalidRangeError {
    /// The offending low endpoint.
    #[must_use]
    pub const fn low(&self) -> u32 {
        self.low
    }

    /// The offending high endpoint.
    #[must_use]
    pub const fn high(&self) -> u32 {
        self.high
    }
}

/// One structured CFR reference extracted from a citation string.
///
/// `title` is absent when no title could be associated with the part (the
/// citation said "Part 488" with no surrounding title context).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// The CFR title number, when one could be associated.
    pub title: Option<u32>,
    /// The part number or part range.
    #[serde(flatten)]
    pub part: Part,
}

impl Reference {
    /// Creates a reference with a known title.
    #[must_use]
    pub const fn titled(title: u32, part: Part) -> Self {
        Self {
            title: Some(title),
            part,
        }
    }

    /// Creates a reference whose title could not be determined.
    #[must_use]
    pub const fn untitled(part: Part) -> Self {
        Self { title: None, part }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.title {
            Some(title) => write!(f, "{title} CFR {}", self.part),
            None => write!(f, "Part {} (no title)", self.part),
        }
    }
}
