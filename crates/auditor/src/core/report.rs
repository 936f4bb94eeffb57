use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::severity::Severity;
use super::severity_calculator::count_severity;
use crate::llm::prompts::StageKind;
use crate::parser::ParsedAudit;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    #[serde(rename = "type")]
    pub vuln_type: String,

    pub severity: Severity,

    pub description: String,

    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasOptimization {
    pub issue: String,

    pub location: String,

    pub technique: String,

    pub estimated_savings: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: StageKind,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub contract_name: String,

    pub timestamp: DateTime<Utc>,

    pub severity_score: u8,

    pub vulnerabilities: Vec<Vulnerability>,

    pub gas_optimizations: Vec<GasOptimization>,

    pub recommendations: Vec<String>,

    pub code_quality_score: u8,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub risk_level: Option<Severity>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub executive_summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub stage_timings: Vec<StageTiming>,

    /// Full concatenated transcript the findings were parsed from.
    pub detailed_report: String,
}

impl AuditReport {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_stage_timings(mut self, timings: Vec<StageTiming>) -> Self {
        self.stage_timings = timings;
        self
    }

    pub fn count_by_severity(&self, severity: &Severity) -> usize {
        count_severity(&self.vulnerabilities, severity)
    }

    pub fn has_findings(&self) -> bool {
        !self.vulnerabilities.is_empty() || !self.gas_optimizations.is_empty()
    }
}

/// Composes parsed fields and request metadata into the final report.
pub struct ReportAssembler;

impl ReportAssembler {
    /// The timestamp is taken here, at assembly time.
    pub fn assemble(
        contract_name: impl Into<String>,
        parsed: ParsedAudit,
        detailed_report: impl Into<String>,
    ) -> AuditReport {
        AuditReport {
            contract_name: contract_name.into(),
            timestamp: Utc::now(),
            severity_score: parsed.severity_score,
            vulnerabilities: parsed.vulnerabilities,
            gas_optimizations: parsed.gas_optimizations,
            recommendations: parsed.recommendations,
            code_quality_score: parsed.quality_score,
            risk_level: parsed.risk_level,
            executive_summary: parsed.executive_summary,
            model: None,
            stage_timings: Vec::new(),
            detailed_report: detailed_report.into(),
        }
    }
}
