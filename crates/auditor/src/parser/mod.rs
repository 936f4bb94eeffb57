//! Transcript parsing
//!
//! Turns the free-form concatenated stage outputs into typed findings. The
//! parser never fails: text it cannot read falls back to empty fields, empty
//! lists, or the default quality score. It is a pure function of its input.

mod patterns;
pub mod recommendations;
pub mod sections;

use serde::{Deserialize, Serialize};

use crate::core::severity_calculator::severity_score;
use crate::core::{GasOptimization, Severity, Vulnerability};

pub use sections::{DEFAULT_QUALITY_SCORE, MAX_QUALITY_SCORE};

/// Everything recovered from one transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAudit {
    pub vulnerabilities: Vec<Vulnerability>,
    pub gas_optimizations: Vec<GasOptimization>,
    pub recommendations: Vec<String>,
    pub quality_score: u8,
    pub severity_score: u8,
    pub risk_level: Option<Severity>,
    pub executive_summary: Option<String>,
}

impl Default for ParsedAudit {
    fn default() -> Self {
        Self {
            vulnerabilities: Vec::new(),
            gas_optimizations: Vec::new(),
            recommendations: Vec::new(),
            quality_score: DEFAULT_QUALITY_SCORE,
            severity_score: 0,
            risk_level: None,
            executive_summary: None,
        }
    }
}

pub fn parse(transcript: &str) -> ParsedAudit {
    let vulnerabilities = sections::vulnerabilities(transcript);
    let severity_score = severity_score(&vulnerabilities);

    ParsedAudit {
        gas_optimizations: sections::gas_optimizations(transcript),
        recommendations: recommendations::recommendations(transcript),
        quality_score: sections::quality_score(transcript),
        risk_level: sections::risk_level(transcript),
        executive_summary: sections::executive_summary(transcript),
        vulnerabilities,
        severity_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock_provider::{
        MOCK_GAS_OUTPUT, MOCK_QUALITY_OUTPUT, MOCK_SUMMARY_OUTPUT, MOCK_VULNERABILITY_OUTPUT,
    };

    const REFERENCE_TRANSCRIPT: &str = "VULNERABILITY 1: Reentrancy - Critical
Description: External call before state update.
Fix: Use checks-effects-interactions.

QUALITY SCORE: 85

RECOMMENDATIONS:
1. Add reentrancy guard
2. Increase test coverage";

    fn full_mock_transcript() -> String {
        [
            MOCK_VULNERABILITY_OUTPUT,
            MOCK_GAS_OUTPUT,
            MOCK_QUALITY_OUTPUT,
            MOCK_SUMMARY_OUTPUT,
        ]
        .join("\n\n")
    }

    #[test]
    fn test_reference_transcript() {
        let parsed = parse(REFERENCE_TRANSCRIPT);

        assert_eq!(
            parsed.vulnerabilities,
            vec![Vulnerability {
                vuln_type: "Reentrancy".to_string(),
                severity: Severity::Critical,
                description: "External call before state update.".to_string(),
                recommendation: "Use checks-effects-interactions.".to_string(),
            }]
        );
        assert_eq!(parsed.quality_score, 85);
        assert_eq!(parsed.severity_score, 4);
        assert_eq!(
            parsed.recommendations,
            vec!["Add reentrancy guard", "Increase test coverage"]
        );
        assert!(parsed.gas_optimizations.is_empty());
    }

    #[test]
    fn test_empty_transcript() {
        assert_eq!(parse(""), ParsedAudit::default());
        assert_eq!(parse("").quality_score, 70);
    }

    #[test]
    fn test_full_mock_transcript() {
        let parsed = parse(&full_mock_transcript());

        assert_eq!(parsed.vulnerabilities.len(), 2);
        assert_eq!(parsed.vulnerabilities[1].vuln_type, "Missing Access Control");
        assert_eq!(parsed.vulnerabilities[1].severity, Severity::High);
        assert_eq!(
            parsed.vulnerabilities[1].recommendation,
            "Restrict setOwner() with an onlyOwner modifier."
        );
        assert_eq!(parsed.severity_score, 7);

        assert_eq!(parsed.gas_optimizations.len(), 1);
        assert_eq!(parsed.gas_optimizations[0].estimated_savings, "~2,100 gas per iteration");

        assert_eq!(parsed.quality_score, 78);
        assert_eq!(
            parsed.recommendations,
            vec![
                "Document all external functions with NatSpec",
                "Replace magic numbers with named constants"
            ]
        );
        assert_eq!(parsed.risk_level, Some(Severity::Critical));
        assert!(parsed
            .executive_summary
            .as_deref()
            .is_some_and(|s| s.starts_with("The contract holds user funds")));
    }

    #[test]
    fn test_sections_out_of_order() {
        let transcript = "QUALITY SCORE: 60\n\nOPTIMIZATION 1: Pack structs\nLocation: User\nTechnique: reorder fields\nSavings: 1 slot\n\nVULNERABILITY 1: Overflow - Low\nDescription: unchecked math\nFix: use 0.8";
        let parsed = parse(transcript);

        assert_eq!(parsed.quality_score, 60);
        assert_eq!(parsed.gas_optimizations.len(), 1);
        assert_eq!(parsed.gas_optimizations[0].estimated_savings, "1 slot");
        assert_eq!(parsed.vulnerabilities.len(), 1);
        assert_eq!(parsed.vulnerabilities[0].recommendation, "use 0.8");
        assert_eq!(parsed.severity_score, 1);
    }

    #[test]
    fn test_truncated_final_section() {
        let transcript = "VULNERABILITY 1: Reentrancy - High\nDescription: call before upd";
        let parsed = parse(transcript);

        assert_eq!(parsed.vulnerabilities.len(), 1);
        assert_eq!(parsed.vulnerabilities[0].description, "call before upd");
        assert_eq!(parsed.vulnerabilities[0].recommendation, "");
    }

    #[test]
    fn test_markdown_decorated_transcript() {
        let transcript = "## VULNERABILITY 1: **Unchecked Call - Medium**\n**Description:** return value ignored\n**Fix:** check the bool\n\n### QUALITY SCORE: **72**";
        let parsed = parse(transcript);

        assert_eq!(parsed.vulnerabilities.len(), 1);
        assert_eq!(parsed.vulnerabilities[0].vuln_type, "Unchecked Call");
        assert_eq!(parsed.vulnerabilities[0].severity, Severity::Medium);
        assert_eq!(parsed.vulnerabilities[0].description, "return value ignored");
        assert_eq!(parsed.quality_score, 72);
    }

    #[test]
    fn test_summary_restating_a_finding() {
        let transcript = format!(
            "{REFERENCE_TRANSCRIPT}\n\nEXECUTIVE SUMMARY: One critical issue.\nVULNERABILITY 1: Reentrancy - Critical\n"
        );
        let parsed = parse(&transcript);

        assert_eq!(parsed.vulnerabilities.len(), 1);
        assert_eq!(parsed.severity_score, 4);
    }

    #[test]
    fn test_none_found_is_not_a_finding() {
        let transcript = "VULNERABILITY 1: None found\n\nQUALITY SCORE: 90";
        let parsed = parse(transcript);

        assert!(parsed.vulnerabilities.is_empty());
        assert_eq!(parsed.severity_score, 0);
    }

    #[test]
    fn test_inline_mentions_are_not_headers() {
        let transcript = "The vulnerability 1: mention inside prose is ignored.";
        assert!(parse(transcript).vulnerabilities.is_empty());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let transcript = full_mock_transcript();
        assert_eq!(parse(&transcript), parse(&transcript));
    }
}
