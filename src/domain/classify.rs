//! The status classifier.

use std::sync::LazyLock;

use regex::Regex;

use super::{extract::Extraction, status::ParseStatus};

/// Vocabulary that marks text as citation-like even when nothing could be
/// extracted from it.
static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:c\.?\s?f\.?\s?r|titles?|parts?)\b")
        .expect("hard-coded pattern must compile")
});

/// Assigns a parse-quality status to one citation.
///
/// The rules are ordered from most to least confident and the first match
/// wins; new rules slot in ahead of the catch-all without disturbing
/// existing classifications:
///
/// 1. blank raw input is `empty`;
/// 2. references present and all titled is `parsed`;
/// 3. references present, any untitled, is `missing_title`;
/// 4. no references, no digits, and no regulatory keyword is `no_cfr`;
/// 5. everything else is `unparsed`.
///
/// Total over all inputs: there is no error path, so every record in a
/// batch resolves to a status. Deterministic and idempotent.
#[must_use]
pub fn classify(raw: &str, extraction: &Extraction) -> ParseStatus {
    if raw.trim().is_empty() {
        return ParseStatus::Empty;
    }

    if !extraction.references.is_empty() {
        if extraction
            .references
            .iter()
            .all(|reference| reference.title.is_some())
        {
            return ParseStatus::Parsed;
        }
        return ParseStatus::MissingTitle;
    }

    let has_digit = raw.chars().any(|c| c.is_ascii_digit());
    if !has_digit && !KEYWORD_RE.is_match(raw) {
        return ParseStatus::NoCfr;
    }

    ParseStatus::Unparsed
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::extract::extract;

    fn classified(raw: &str) -> ParseStatus {
        classify(raw, &extract(raw).unwrap())
    }

    #[test_case("", ParseStatus::Empty; "empty string")]
    #[test_case("   ", ParseStatus::Empty; "whitespace only")]
    #[test_case("42 CFR Part 412", ParseStatus::Parsed; "simple citation")]
    #[test_case("42 CFR Parts 405, 417, 422, and 460", ParseStatus::Parsed; "list")]
    #[test_case("42 CFR 410-415", ParseStatus::Parsed; "range")]
    #[test_case("42 CFR Part 412; 45 CFR Part 155", ParseStatus::Parsed; "two titles")]
    #[test_case("Part 488", ParseStatus::MissingTitle; "part without title")]
    #[test_case("Parts 70 and 71; 42 CFR Part 412", ParseStatus::MissingTitle; "mixed")]
    #[test_case("See attached comment letter", ParseStatus::NoCfr; "free text")]
    #[test_case("Not applicable", ParseStatus::NoCfr; "not applicable")]
    #[test_case("RIN 0938-AV01", ParseStatus::Unparsed; "digits but no structure")]
    #[test_case("42 CFR", ParseStatus::Unparsed; "title with no parts")]
    #[test_case("CFR parts pending", ParseStatus::Unparsed; "keyword without digits")]
    fn statuses(raw: &str, expected: ParseStatus) {
        assert_eq!(classified(raw), expected);
    }

    #[test]
    fn is_idempotent() {
        let raw = "42 CFR Parts 410-415 and other text";
        let extraction = extract(raw).unwrap();
        assert_eq!(classify(raw, &extraction), classify(raw, &extraction));
    }

    #[test]
    fn every_input_gets_a_status() {
        // No escape hatch: arbitrary junk still resolves.
        for raw in ["?????", "42", "-", "\u{2013}", "cfr cfr cfr", "0"] {
            let _ = classified(raw);
        }
    }
}
