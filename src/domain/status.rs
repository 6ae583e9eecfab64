use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// How confidently a raw citation string was parsed.
///
/// Exactly one status applies per citation, and assignment is a total
/// function of the raw input and the extraction result: there is no
/// "unknown error" escape hatch, so every record in a batch always has a
/// defined status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    /// Raw input was null or blank.
    Empty,
    /// One or more complete (title, part) references were extracted.
    Parsed,
    /// A part number was found but no title could be associated with it.
    MissingTitle,
    /// Non-empty, citation-like input from which no structure was extracted.
    Unparsed,
    /// Non-empty input that recognizably does not describe a CFR citation.
    NoCfr,
}

impl ParseStatus {
    /// All statuses, in taxonomy order.
    pub const ALL: [Self; 5] = [
        Self::Empty,
        Self::Parsed,
        Self::MissingTitle,
        Self::Unparsed,
        Self::NoCfr,
    ];

    /// The serialized (snake_case) name of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Parsed => "parsed",
            Self::MissingTitle => "missing_title",
            Self::Unparsed => "unparsed",
            Self::NoCfr => "no_cfr",
        }
    }

    /// Whether this status represents a recoverable parsing failure.
    ///
    /// `unparsed` and `missing_title` records are worth revisiting after a
    /// rule change; `no_cfr` is not applicable and `empty`/`parsed` have
    /// nothing to improve.
    #[must_use]
    pub const fn is_recoverable(self) -> bool {
        matches!(self, Self::Unparsed | Self::MissingTitle)
    }
}

impl fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParseStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatusError(s.to_string()))
    }
}

/// Error returned when a string does not name one of the five statuses.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown parse status '{0}'")]
pub struct UnknownStatusError(String);
