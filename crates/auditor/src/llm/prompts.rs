//! The four fixed audit stages
//!
//! Each stage is plain data: a persona that becomes the system prompt, an
//! instruction template that becomes the user prompt, and a short description
//! of the output it should produce. Templates state the literal section
//! headers the parser later looks for, so any wording change here must keep
//! those headers intact.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    VulnerabilityScan,
    GasOptimization,
    QualityReview,
    SummaryReport,
}

impl StageKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::VulnerabilityScan => "Vulnerability Scan",
            Self::GasOptimization => "Gas Optimization",
            Self::QualityReview => "Code Quality Review",
            Self::SummaryReport => "Summary Report",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Persona {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

impl Persona {
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}.\n\nYour goal: {}\n\n{}",
            self.role, self.goal, self.backstory
        )
    }
}

pub type InstructionTemplate = fn(code_prefix: &str, language: &str) -> String;

#[derive(Debug, Clone, Copy)]
pub struct StageDefinition {
    pub kind: StageKind,
    pub persona: Persona,
    pub instruction_template: InstructionTemplate,
    pub expected_output: &'static str,
}

impl StageDefinition {
    /// System and user prompt for this stage, with the source cut to
    /// `max_code_chars` characters.
    pub fn build_prompt(
        &self,
        source_code: &str,
        language: &str,
        max_code_chars: usize,
    ) -> (String, String) {
        let code_prefix = truncate_code(source_code, max_code_chars);
        let user_prompt = format!(
            "{}\n\nExpected output: {}",
            (self.instruction_template)(code_prefix, language),
            self.expected_output
        );
        (self.persona.system_prompt(), user_prompt)
    }
}

/// Longest prefix of `source` holding at most `max_chars` characters.
///
/// Counts Unicode scalar values so the cut never splits a code point.
pub fn truncate_code(source: &str, max_chars: usize) -> &str {
    match source.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &source[..byte_index],
        None => source,
    }
}

/// Stages in execution order. The transcript is concatenated in this order
/// and the parser relies on it to tell sections apart.
pub const STAGES: [StageDefinition; 4] = [
    StageDefinition {
        kind: StageKind::VulnerabilityScan,
        persona: Persona {
            role: "Smart Contract Vulnerability Expert",
            goal: "Identify security vulnerabilities including reentrancy, integer overflow, access control issues, and front-running risks",
            backstory: "You are a legendary smart contract security researcher who has discovered numerous critical vulnerabilities in production contracts. You have deep knowledge of common attack vectors and emerging threats.",
        },
        instruction_template: vulnerability_instructions,
        expected_output: "List of vulnerabilities with severity and fixes",
    },
    StageDefinition {
        kind: StageKind::GasOptimization,
        persona: Persona {
            role: "Gas Optimization Engineer",
            goal: "Analyze code for gas inefficiencies and suggest optimizations to reduce transaction costs",
            backstory: "You are a performance optimization expert specializing in blockchain gas efficiency. You know every trick to minimize gas costs while maintaining security.",
        },
        instruction_template: gas_instructions,
        expected_output: "List of gas optimizations with savings estimates",
    },
    StageDefinition {
        kind: StageKind::QualityReview,
        persona: Persona {
            role: "Smart Contract Code Quality Reviewer",
            goal: "Assess code quality, best practices, maintainability, and documentation",
            backstory: "You are a senior blockchain architect with expertise in clean code principles applied to smart contracts. You ensure code is readable, maintainable, and well-documented.",
        },
        instruction_template: quality_instructions,
        expected_output: "Code quality score and recommendations",
    },
    StageDefinition {
        kind: StageKind::SummaryReport,
        persona: Persona {
            role: "Security Report Specialist",
            goal: "Compile comprehensive security audit reports with actionable recommendations",
            backstory: "You are a technical writer specializing in security documentation. You transform complex security findings into clear, actionable reports.",
        },
        instruction_template: summary_instructions,
        expected_output: "Executive summary and priority recommendations",
    },
];

fn vulnerability_instructions(code: &str, language: &str) -> String {
    format!(
        r#"Analyze this {language} smart contract for security vulnerabilities.

Contract Code:
```
{code}
```

Identify vulnerabilities like:
1. Reentrancy vulnerabilities
2. Integer overflow/underflow risks
3. Access control issues
4. Unchecked external calls
5. Front-running possibilities

For each vulnerability, provide:
- Type and severity (Critical/High/Medium/Low)
- Description
- How to fix it

Respond in this format:
VULNERABILITY 1: [Type] - [Severity]
Description: [details]
Fix: [recommendation]

VULNERABILITY 2: [Type] - [Severity]
...and so on"#
    )
}

fn gas_instructions(code: &str, language: &str) -> String {
    format!(
        r#"Analyze this {language} smart contract for gas optimization opportunities.

Contract Code:
```
{code}
```

Find optimization opportunities like:
1. Inefficient storage patterns
2. Redundant operations
3. Expensive loops

For each optimization, provide:
- Location in code
- Current issue
- Optimization technique
- Estimated savings

Respond in this format:
OPTIMIZATION 1: [Issue]
Location: [where]
Technique: [how to fix]
Savings: [estimate]

OPTIMIZATION 2: ...and so on"#
    )
}

fn quality_instructions(code: &str, language: &str) -> String {
    format!(
        r#"Review this {language} smart contract for code quality.

Contract Code:
```
{code}
```

Evaluate:
1. Code organization and structure
2. Naming conventions
3. Documentation
4. Best practices

Provide:
- Quality score (0-100)
- Issues found
- Recommendations

Respond in this format:
QUALITY SCORE: [0-100]

ISSUES:
1. [Issue description]
2. [Issue description]

RECOMMENDATIONS:
1. [Recommendation]
2. [Recommendation]"#
    )
}

// The summary works from earlier findings, not from the code itself.
fn summary_instructions(_code: &str, language: &str) -> String {
    format!(
        r#"Create a comprehensive security audit summary for this {language} smart contract.

Based on all previous findings, provide:
1. Executive summary
2. Overall risk level (Critical/High/Medium/Low)
3. Top 3 priority recommendations
4. Compliance notes

Respond in this format:
EXECUTIVE SUMMARY:
[2-3 sentence overview]

RISK LEVEL: [Critical/High/Medium/Low]

PRIORITY RECOMMENDATIONS:
1. [Most critical action]
2. [Second priority]
3. [Third priority]

COMPLIANCE: [Any standards compliance notes]"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_is_fixed() {
        let kinds: Vec<StageKind> = STAGES.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StageKind::VulnerabilityScan,
                StageKind::GasOptimization,
                StageKind::QualityReview,
                StageKind::SummaryReport,
            ]
        );
    }

    #[test]
    fn test_truncate_code_is_char_bounded() {
        assert_eq!(truncate_code("abcdef", 3), "abc");
        assert_eq!(truncate_code("ab", 10), "ab");
        assert_eq!(truncate_code("", 10), "");
        // multi-byte characters are never split
        assert_eq!(truncate_code("ééé", 2), "éé");
    }

    #[test]
    fn test_templates_state_output_grammar() {
        let (_, vuln) = STAGES[0].build_prompt("contract A {}", "Solidity", 2000);
        assert!(vuln.contains("VULNERABILITY 1: [Type] - [Severity]"));
        assert!(vuln.contains("Description:"));
        assert!(vuln.contains("Fix:"));

        let (_, gas) = STAGES[1].build_prompt("contract A {}", "Solidity", 2000);
        assert!(gas.contains("OPTIMIZATION 1: [Issue]"));
        assert!(gas.contains("Savings:"));

        let (_, quality) = STAGES[2].build_prompt("contract A {}", "Solidity", 2000);
        assert!(quality.contains("QUALITY SCORE:"));
        assert!(quality.contains("RECOMMENDATIONS:"));

        let (_, summary) = STAGES[3].build_prompt("contract A {}", "Solidity", 2000);
        assert!(summary.contains("EXECUTIVE SUMMARY:"));
        assert!(summary.contains("COMPLIANCE:"));
    }

    #[test]
    fn test_language_interpolated_verbatim() {
        let (_, prompt) = STAGES[0].build_prompt("x", "Cairo 2.x", 2000);
        assert!(prompt.contains("Analyze this Cairo 2.x smart contract"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let code = "pragma solidity ^0.8.0;\n".repeat(500);
        let first = STAGES[1].build_prompt(&code, "Solidity", 2000);
        let second = STAGES[1].build_prompt(&code, "Solidity", 2000);
        assert_eq!(first, second);
    }

    #[test]
    fn test_persona_in_system_prompt() {
        let (system, _) = STAGES[3].build_prompt("", "Solidity", 2000);
        assert!(system.contains("Security Report Specialist"));
    }
}
