//! The reference extractor.
//!
//! Raw "CFR Part" strings are scanned left to right with an ordered set of
//! pattern rules, most specific first: title markers (`42 CFR`, `Title 42`)
//! open segments, numeric ranges inside a segment are kept as ranges, and
//! bare part numbers associate with the nearest preceding title marker.
//! Text no rule recognizes is surfaced as residue rather than discarded.

use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

use super::reference::{InvalidRangeError, Part, Reference};

/// A title marker: `42 CFR` (periods optional, any case) or `Title 42`.
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(?P<cfr>\d{1,3})\s*C\.?\s?F\.?\s?R\b\.?|title\s+(?P<title>\d{1,3})\b)")
        .expect("hard-coded pattern must compile")
});

/// An inclusive numeric range such as `410-415` or `410 through 415`.
///
/// Decimal section suffixes are consumed so they cannot be re-read as
/// separate part numbers.
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,4})(?:\.\d+)?\s*(?:-|to|through|thru)\s*(\d{1,4})(?:\.\d+)?\b")
        .expect("hard-coded pattern must compile")
});

/// A bare part number, with an optional decimal section suffix.
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,4})(?:\.\d+)?\b").expect("hard-coded pattern must compile")
});

/// The `Part`/`Parts` cue that introduces part numbers.
static PART_HINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bparts?\b").expect("hard-coded pattern must compile"));

/// Vocabulary that signals the text has wandered away from part numbers.
///
/// A `U.S.C.` mention swallows the title number in front of it, so "42
/// U.S.C. 1395" contributes nothing.
static STOP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:subchapter|chapter|section|parts?\s+of|(?:\d{1,4}\s+)?u\.?s\.?c\.?|fr\s+doc|rins?)\b",
    )
    .expect("hard-coded pattern must compile")
});

/// Connective tokens that are recognized but carry no information of their
/// own, so they never count as residue.
static CONNECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bparts?\b|\band\b|[,;:()&]").expect("hard-coded pattern must compile")
});

/// How far into a titled segment numbers are read when no `Part(s)` cue is
/// present. Keeps long prose after a stray `42 CFR` mention from being
/// scraped for numbers.
const UNHINTED_SCAN_LIMIT: usize = 120;

/// Everything recovered from one citation string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Structured references. Within a segment ranges precede single
    /// parts; duplicate `(title, part)` pairs are emitted once, first
    /// appearance wins.
    pub references: Vec<Reference>,
    /// Text no rule recognized, surfaced for classification.
    pub residue: String,
}

/// Parses one raw citation string into structured references plus residue.
///
/// Returns an empty extraction for blank input. Pure function: no side
/// effects, deterministic over its input.
///
/// # Errors
///
/// Returns [`InvalidRangeError`] when the text contains an inverted range
/// (`415-410`). Inverted ranges are surfaced rather than reordered so that
/// rule-set defects are caught instead of stored.
pub fn extract(raw: &str) -> Result<Extraction, InvalidRangeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Extraction::default());
    }

    // En and em dashes appear in human-written ranges.
    let text = trimmed.replace(['\u{2013}', '\u{2014}'], "-");

    let markers: Vec<(usize, usize, u32)> = TITLE_RE
        .captures_iter(&text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let digits = caps.name("cfr").or_else(|| caps.name("title"))?;
            let title = digits.as_str().parse().ok()?;
            Some((whole.start(), whole.end(), title))
        })
        .collect();

    let mut extractor = Extractor::default();

    if let Some(&(first_start, _, _)) = markers.first() {
        extractor.scan_segment(&text[..first_start], None)?;
        for (index, &(_, body_start, title)) in markers.iter().enumerate() {
            let body_end = markers
                .get(index + 1)
                .map_or(text.len(), |&(next_start, _, _)| next_start);
            extractor.scan_segment(&text[body_start..body_end], Some(title))?;
        }
    } else {
        extractor.scan_segment(&text, None)?;
    }

    Ok(extractor.finish())
}

/// Accumulates references and residue pieces across segments.
#[derive(Debug, Default)]
struct Extractor {
    references: Vec<Reference>,
    seen: HashSet<Reference>,
    residue: Vec<String>,
}

impl Extractor {
    /// Scans the text owned by one title marker (or the titleless region
    /// before the first marker).
    fn scan_segment(&mut self, body: &str, title: Option<u32>) -> Result<(), InvalidRangeError> {
        let body = body.trim();
        if body.is_empty() {
            return Ok(());
        }

        let hint = PART_HINT_RE.find(body);
        let mut candidate = match (title, hint) {
            // Titleless text is only scanned when it carries an explicit
            // Part cue; anything else is residue, not a part number.
            (None, None) => {
                self.push_residue(body);
                return Ok(());
            }
            (_, Some(cue)) => {
                self.push_residue(&body[..cue.start()]);
                &body[cue.start()..]
            }
            (Some(_), None) => {
                let cut = floor_char_boundary(body, UNHINTED_SCAN_LIMIT);
                self.push_residue(&body[cut..]);
                &body[..cut]
            }
        };

        if let Some(stop) = STOP_RE.find(candidate) {
            self.push_residue(&candidate[stop.start()..]);
            candidate = &candidate[..stop.start()];
        }

        // Ranges first; their matched spans are blanked so the endpoints
        // are not re-read as standalone part numbers.
        let mut remaining = candidate.to_string();
        for caps in RANGE_RE.captures_iter(candidate) {
            let whole = caps.get(0).expect("group 0 is the whole match");
            let part = Part::range(parse_number(&caps[1]), parse_number(&caps[2]))?;
            blank(&mut remaining, whole.start(), whole.end());
            self.push_reference(title, part);
        }

        let snapshot = remaining.clone();
        for caps in NUMBER_RE.captures_iter(&snapshot) {
            let whole = caps.get(0).expect("group 0 is the whole match");
            blank(&mut remaining, whole.start(), whole.end());
            self.push_reference(title, Part::single(parse_number(&caps[1])));
        }

        self.push_residue(&remaining);
        Ok(())
    }

    fn push_reference(&mut self, title: Option<u32>, part: Part) {
        let reference = title.map_or_else(
            || Reference::untitled(part),
            |title| Reference::titled(title, part),
        );
        if self.seen.insert(reference) {
            self.references.push(reference);
        }
    }

    fn push_residue(&mut self, text: &str) {
        let stripped = CONNECTIVE_RE.replace_all(text, " ");
        let cleaned = stripped
            .split_whitespace()
            .filter(|token| token.chars().any(char::is_alphanumeric))
            .collect::<Vec<_>>()
            .join(" ");
        if !cleaned.is_empty() {
            self.residue.push(cleaned);
        }
    }

    fn finish(self) -> Extraction {
        Extraction {
            references: self.references,
            residue: self.residue.join(" "),
        }
    }
}

/// Parses digits already constrained by the pattern to at most four chars.
fn parse_number(digits: &str) -> u32 {
    digits.parse().expect("pattern captures at most four digits")
}

/// Overwrites a matched span with spaces, preserving byte offsets.
fn blank(text: &mut String, start: usize, end: usize) {
    text.replace_range(start..end, &" ".repeat(end - start));
}

/// Largest char boundary at or below `index`.
fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut index = index;
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
