//! Compiled patterns for transcript parsing.
//!
//! Headers and field labels only count at the start of a line, after optional
//! markdown decoration (`#`, `*`, `_`, `>`). Matching is case-insensitive.

use regex::Regex;
use std::sync::LazyLock;

macro_rules! transcript_pattern {
    ($name:ident, $regex_str:expr) => {
        pub(crate) static $name: LazyLock<Option<Regex>> =
            LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// Any header that closes a vulnerability or optimization block.
transcript_pattern!(
    SECTION_BOUNDARY,
    r"(?im)^[ \t>#*_]*(?:vulnerability|optimization|quality|executive|risk[ \t]+level|(?:priority[ \t]+|security[ \t]+)?recommendations)\b"
);

transcript_pattern!(
    VULNERABILITY_HEADER,
    r"(?im)^[ \t>#*_]*vulnerability[ \t]*#?[ \t]*\d+[ \t*_]*:(.*)$"
);
transcript_pattern!(
    OPTIMIZATION_HEADER,
    r"(?im)^[ \t>#*_]*optimization[ \t]*#?[ \t]*\d+[ \t*_]*:(.*)$"
);

// `Type - Severity`; greedy so the last dash wins for types that contain one.
transcript_pattern!(TYPE_SEVERITY_SPLIT, r"^(.*\S)\s+[-\x{2013}\x{2014}]\s+(.+)$");

transcript_pattern!(DESCRIPTION_LABEL, r"(?im)^[ \t>*_-]*description[ \t*_]*:[ \t*_]*");
transcript_pattern!(
    FIX_LABEL,
    r"(?im)^[ \t>*_-]*(?:fix|recommendation|remediation)[ \t*_]*:[ \t*_]*"
);
// A field label that shares the header line, e.g. `Reentrancy - High Description: ...`.
transcript_pattern!(
    INLINE_FIELD_LABEL,
    r"(?i)(?:^|\s)[*_]*(?:description|fix|recommendation|remediation|location|technique|(?:estimated[ \t]+)?savings)[*_]*[ \t]*:"
);
transcript_pattern!(LOCATION_LABEL, r"(?im)^[ \t>*_-]*location[ \t*_]*:[ \t*_]*");
transcript_pattern!(TECHNIQUE_LABEL, r"(?im)^[ \t>*_-]*technique[ \t*_]*:[ \t*_]*");
transcript_pattern!(
    SAVINGS_LABEL,
    r"(?im)^[ \t>*_-]*(?:estimated[ \t]+)?savings[ \t*_]*:[ \t*_]*"
);

transcript_pattern!(
    QUALITY_SCORE,
    r"(?i)quality[ \t]+score[ \t*_]*:[ \t*_\[]*(\d+)"
);
transcript_pattern!(
    RISK_LEVEL,
    r"(?im)^[ \t>#*_]*(?:overall[ \t]+)?risk[ \t]+level[ \t*_]*:[ \t*_]*(.*)$"
);
transcript_pattern!(
    EXECUTIVE_SUMMARY,
    r"(?im)^[ \t>#*_]*executive[ \t]+summary[ \t*_]*:[ \t*_]*"
);
// Upper-case `LABEL:` lines that end the executive summary paragraph.
transcript_pattern!(UPPERCASE_LABEL, r"(?m)^[ \t>#*_]*[A-Z][A-Z \t]{2,}[ \t*_]*:");

transcript_pattern!(
    RECOMMENDATIONS_HEADER,
    r"(?im)^[ \t>#*_]*(?:priority[ \t]+|security[ \t]+)?recommendations[ \t*_]*:"
);
transcript_pattern!(
    RECOMMENDATIONS_END,
    r"(?im)^[ \t>#*_]*(?:compliance|executive)\b"
);
// `1.` or `2)` followed by whitespace, at line start or after whitespace.
// A leading bullet belongs to the marker, not to the previous item.
transcript_pattern!(
    LIST_ITEM_MARKER,
    r"(?m)(?:^|\s)[>#*_-]*[ \t]*\d+[.)][*_]*\s+"
);
