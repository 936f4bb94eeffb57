use regex::Regex;

use super::patterns::{
    DESCRIPTION_LABEL, EXECUTIVE_SUMMARY, FIX_LABEL, INLINE_FIELD_LABEL, LOCATION_LABEL,
    OPTIMIZATION_HEADER, QUALITY_SCORE, RISK_LEVEL, SAVINGS_LABEL, SECTION_BOUNDARY,
    TECHNIQUE_LABEL, TYPE_SEVERITY_SPLIT, UPPERCASE_LABEL, VULNERABILITY_HEADER,
};
use crate::core::{GasOptimization, Severity, Vulnerability};

pub const DEFAULT_QUALITY_SCORE: u8 = 70;
pub const MAX_QUALITY_SCORE: u8 = 100;

/// A numbered header and the text up to the next section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Block<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

pub(crate) fn blocks<'a>(text: &'a str, header: &Regex) -> Vec<Block<'a>> {
    let boundary = SECTION_BOUNDARY.as_ref();

    header
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let title = caps.get(1).map_or("", |m| m.as_str());
            let body_start = whole.end();
            let body_end = boundary
                .and_then(|re| re.find_at(text, body_start))
                .map_or(text.len(), |m| m.start());
            Some(Block {
                title,
                body: &text[body_start..body_end],
            })
        })
        .collect()
}

/// Values for each label, in label order.
///
/// Labels are searched in sequence; a missing label yields an empty value and
/// does not move the cursor. Each value runs to the next label found, or to
/// the end of the block.
pub(crate) fn extract_fields(body: &str, labels: &[Option<&Regex>]) -> Vec<String> {
    let mut spans: Vec<Option<(usize, usize)>> = Vec::with_capacity(labels.len());
    let mut cursor = 0;

    for label in labels {
        let found = label
            .and_then(|re| re.find_at(body, cursor))
            .map(|m| (m.start(), m.end()));
        if let Some((_, end)) = found {
            cursor = end;
        }
        spans.push(found);
    }

    spans
        .iter()
        .enumerate()
        .map(|(i, span)| match span {
            Some((_, value_start)) => {
                let value_end = spans[i + 1..]
                    .iter()
                    .flatten()
                    .map(|(start, _)| *start)
                    .next()
                    .unwrap_or(body.len());
                clean_value(&body[*value_start..value_end])
            }
            None => String::new(),
        })
        .collect()
}

fn clean_value(raw: &str) -> String {
    raw.trim().trim_end_matches(['*', '_']).trim().to_string()
}

fn clean_title(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '[' | ']' | '`'))
}

/// Splits `Type - Severity`. A title without a separator is not a finding.
pub(crate) fn split_type_and_severity(title: &str) -> Option<(String, Severity)> {
    let title = clean_title(title);
    let caps = TYPE_SEVERITY_SPLIT.as_ref()?.captures(title)?;
    let vuln_type = clean_title(caps.get(1)?.as_str());
    if vuln_type.is_empty() {
        return None;
    }
    Some((
        vuln_type.to_string(),
        Severity::normalize(caps.get(2)?.as_str()),
    ))
}

/// Separates a header title from any field labels written on the same line.
///
/// Returns the bare title and the field text that follows it, with every
/// label moved to the start of its own line.
pub(crate) fn split_inline_fields(title: &str) -> (&str, String) {
    let Some(inline) = INLINE_FIELD_LABEL.as_ref() else {
        return (title, String::new());
    };
    match inline.find(title) {
        Some(first) => {
            let rest = inline.replace_all(&title[first.start()..], |caps: &regex::Captures| {
                format!("\n{}", caps[0].trim_start())
            });
            (&title[..first.start()], rest.into_owned())
        }
        None => (title, String::new()),
    }
}

/// Vulnerability blocks that follow the `Type - Severity` header grammar and
/// carry at least one of the `Description:` or `Fix:` fields. Bare header
/// lines, such as a later stage echoing an earlier finding, are skipped.
pub(crate) fn vulnerabilities(text: &str) -> Vec<Vulnerability> {
    let Some(header) = VULNERABILITY_HEADER.as_ref() else {
        return Vec::new();
    };
    let labels = [DESCRIPTION_LABEL.as_ref(), FIX_LABEL.as_ref()];

    blocks(text, header)
        .into_iter()
        .filter_map(|block| {
            let (title, inline_fields) = split_inline_fields(block.title);
            let (vuln_type, severity) = split_type_and_severity(title)?;
            let fields_text = inline_fields + block.body;
            let found = labels
                .iter()
                .any(|label| label.is_some_and(|re| re.is_match(&fields_text)));
            if !found {
                return None;
            }
            let mut fields = extract_fields(&fields_text, &labels).into_iter();
            Some(Vulnerability {
                vuln_type,
                severity,
                description: fields.next().unwrap_or_default(),
                recommendation: fields.next().unwrap_or_default(),
            })
        })
        .collect()
}

pub(crate) fn gas_optimizations(text: &str) -> Vec<GasOptimization> {
    let Some(header) = OPTIMIZATION_HEADER.as_ref() else {
        return Vec::new();
    };
    let labels = [
        LOCATION_LABEL.as_ref(),
        TECHNIQUE_LABEL.as_ref(),
        SAVINGS_LABEL.as_ref(),
    ];

    blocks(text, header)
        .into_iter()
        .map(|block| {
            let (title, inline_fields) = split_inline_fields(block.title);
            let fields_text = inline_fields + block.body;
            let mut fields = extract_fields(&fields_text, &labels).into_iter();
            GasOptimization {
                issue: clean_title(title).to_string(),
                location: fields.next().unwrap_or_default(),
                technique: fields.next().unwrap_or_default(),
                estimated_savings: fields.next().unwrap_or_default(),
            }
        })
        .collect()
}

/// First `QUALITY SCORE:` value, clamped to 100. Defaults to 70 when absent
/// or unreadable.
pub(crate) fn quality_score(text: &str) -> u8 {
    QUALITY_SCORE
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .map_or(DEFAULT_QUALITY_SCORE, |score| {
            score.min(u64::from(MAX_QUALITY_SCORE)) as u8
        })
}

pub(crate) fn risk_level(text: &str) -> Option<Severity> {
    let value = RISK_LEVEL
        .as_ref()?
        .captures(text)?
        .get(1)?
        .as_str();
    let value = clean_title(value);
    if value.is_empty() {
        return None;
    }
    Some(Severity::normalize(value))
}

/// Paragraph after `EXECUTIVE SUMMARY:` up to the next upper-case label.
pub(crate) fn executive_summary(text: &str) -> Option<String> {
    let start = EXECUTIVE_SUMMARY.as_ref()?.find(text)?.end();
    let end = UPPERCASE_LABEL
        .as_ref()
        .and_then(|re| re.find_at(text, start))
        .map_or(text.len(), |m| m.start());

    let summary = clean_value(&text[start..end]);
    if summary.is_empty() {
        None
    } else {
        Some(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_type_and_severity() {
        let (vuln_type, severity) = split_type_and_severity(" Reentrancy - Critical").unwrap();
        assert_eq!(vuln_type, "Reentrancy");
        assert_eq!(severity, Severity::Critical);

        let (vuln_type, severity) = split_type_and_severity("Front-running - Medium").unwrap();
        assert_eq!(vuln_type, "Front-running");
        assert_eq!(severity, Severity::Medium);

        let (vuln_type, severity) =
            split_type_and_severity("** Denial of Service - DoS – High**").unwrap();
        assert_eq!(vuln_type, "Denial of Service - DoS");
        assert_eq!(severity, Severity::High);
    }

    #[test]
    fn test_split_without_separator() {
        assert_eq!(split_type_and_severity("Unchecked call"), None);
        assert_eq!(split_type_and_severity("None found"), None);
    }

    #[test]
    fn test_unknown_severity_kept_verbatim() {
        let (_, severity) = split_type_and_severity("Oracle manipulation - Severe").unwrap();
        assert_eq!(severity, Severity::Unrecognized("Severe".to_string()));
    }

    #[test]
    fn test_split_inline_fields() {
        let (title, fields) =
            split_inline_fields(" Reentrancy - Critical Description: call first. Fix: use CEI.");
        assert_eq!(title, " Reentrancy - Critical");
        assert_eq!(fields, "\nDescription: call first.\nFix: use CEI.");

        let (title, fields) = split_inline_fields(" Reentrancy - Critical");
        assert_eq!(title, " Reentrancy - Critical");
        assert!(fields.is_empty());
    }

    #[test]
    fn test_fields_on_header_line() {
        let found = vulnerabilities(
            "VULNERABILITY 1: Reentrancy - Critical Description: call first. Fix: use CEI.",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].vuln_type, "Reentrancy");
        assert_eq!(found[0].severity, Severity::Critical);
        assert_eq!(found[0].description, "call first.");
        assert_eq!(found[0].recommendation, "use CEI.");
    }

    #[test]
    fn test_bare_header_is_not_a_finding() {
        let text = "VULNERABILITY 1: Reentrancy - Critical
Description: External call before state update.
Fix: Use checks-effects-interactions.

EXECUTIVE SUMMARY:
The vault is exposed to:
VULNERABILITY 1: Reentrancy - Critical";
        let found = vulnerabilities(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "External call before state update.");
    }

    #[test]
    fn test_none_found_header_is_not_a_finding() {
        let text = "VULNERABILITY 1: None found\nNo issues were identified.";
        assert!(vulnerabilities(text).is_empty());
        assert!(vulnerabilities("VULNERABILITY 1: None found\nDescription: nothing").is_empty());
    }

    #[test]
    fn test_fields_in_order() {
        let body = "\nDescription: first line\nsecond line\nFix: do it\n";
        let labels = [DESCRIPTION_LABEL.as_ref(), FIX_LABEL.as_ref()];
        let fields = extract_fields(body, &labels);
        assert_eq!(fields, vec!["first line\nsecond line", "do it"]);
    }

    #[test]
    fn test_missing_field_is_empty() {
        let body = "\nDescription: only a description\n";
        let labels = [DESCRIPTION_LABEL.as_ref(), FIX_LABEL.as_ref()];
        let fields = extract_fields(body, &labels);
        assert_eq!(fields, vec!["only a description", ""]);

        let body = "\nFix: only a fix\n";
        let fields = extract_fields(body, &labels);
        assert_eq!(fields, vec!["", "only a fix"]);
    }

    #[test]
    fn test_markdown_labels() {
        let body = "\n- **Description:** bold label\n- **Fix:** bold fix\n";
        let labels = [DESCRIPTION_LABEL.as_ref(), FIX_LABEL.as_ref()];
        let fields = extract_fields(body, &labels);
        assert_eq!(fields, vec!["bold label", "bold fix"]);
    }

    #[test]
    fn test_blocks_stop_at_next_header() {
        let text = "VULNERABILITY 1: A - High\nDescription: a\n\nOPTIMIZATION 1: B\nLocation: x";
        let header = VULNERABILITY_HEADER.as_ref().unwrap();
        let found = blocks(text, header);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, " A - High");
        assert!(!found[0].body.contains("OPTIMIZATION"));
    }

    #[test]
    fn test_gas_optimization_fields() {
        let text = "OPTIMIZATION 1: Cache length\nLocation: loop()\nTechnique: use memory\nSavings: 200 gas";
        let opts = gas_optimizations(text);
        assert_eq!(opts.len(), 1);
        assert_eq!(opts[0].issue, "Cache length");
        assert_eq!(opts[0].location, "loop()");
        assert_eq!(opts[0].technique, "use memory");
        assert_eq!(opts[0].estimated_savings, "200 gas");
    }

    #[test]
    fn test_quality_score_variants() {
        assert_eq!(quality_score("QUALITY SCORE: 85"), 85);
        assert_eq!(quality_score("**Quality Score:** 91/100"), 91);
        assert_eq!(quality_score("QUALITY SCORE: [64]"), 64);
        assert_eq!(quality_score("QUALITY SCORE: 150"), 100);
        assert_eq!(quality_score("QUALITY SCORE: 99999999999999999999999"), 70);
        assert_eq!(quality_score("no score here"), 70);
        assert_eq!(quality_score("QUALITY SCORE: 10\nQUALITY SCORE: 20"), 10);
    }

    #[test]
    fn test_risk_level() {
        assert_eq!(risk_level("RISK LEVEL: High"), Some(Severity::High));
        assert_eq!(risk_level("**Overall Risk Level:** critical."), Some(Severity::Critical));
        assert_eq!(risk_level("nothing"), None);
    }

    #[test]
    fn test_executive_summary_stops_at_next_label() {
        let text = "EXECUTIVE SUMMARY:\nThe vault is unsafe.\nFunds can be drained.\n\nRISK LEVEL: Critical";
        assert_eq!(
            executive_summary(text).as_deref(),
            Some("The vault is unsafe.\nFunds can be drained.")
        );
        assert_eq!(executive_summary("EXECUTIVE SUMMARY:\n\nRISK LEVEL: Low"), None);
    }
}
