use std::sync::Arc;
use tracing::info;

use crate::core::{AuditError, AuditReport, AuditRequest, ReportAssembler, Severity};
use crate::llm::config::{AuditorConfig, PipelineSettings};
use crate::llm::prompts::{StageKind, STAGES};
use crate::llm::provider::{GatewayError, ModelGateway, OpenAICompatibleGateway};
use crate::parser::parse;
use crate::pipeline::Orchestrator;

/// Entry point for running audits: orchestrate, parse, assemble.
pub struct AuditEngine {
    orchestrator: Orchestrator,
}

impl AuditEngine {
    /// Builds the engine against the configured provider.
    ///
    /// A missing credential is reported here, before any stage can run.
    pub fn from_config(config: &AuditorConfig) -> Result<Self, AuditError> {
        let gateway = OpenAICompatibleGateway::from_config(config).map_err(|e| match e {
            GatewayError::Configuration(msg) => AuditError::Configuration(msg),
            other => AuditError::Configuration(other.to_string()),
        })?;

        Ok(Self::with_gateway(Arc::new(gateway), config.pipeline.clone()))
    }

    pub fn with_gateway(gateway: Arc<dyn ModelGateway>, settings: PipelineSettings) -> Self {
        Self {
            orchestrator: Orchestrator::new(gateway, settings),
        }
    }

    pub fn model_name(&self) -> &str {
        self.orchestrator.model_name()
    }

    pub fn list_stages(&self) -> Vec<StageInfo> {
        STAGES
            .iter()
            .map(|stage| StageInfo {
                kind: stage.kind,
                role: stage.persona.role.to_string(),
                expected_output: stage.expected_output.to_string(),
            })
            .collect()
    }

    /// Runs a full audit. Either every stage succeeds and a report comes
    /// back, or the first failing stage's error does.
    pub async fn audit(&self, request: &AuditRequest) -> Result<AuditReport, AuditError> {
        info!(
            "Auditing {} ({}, {} chars) with {}",
            request.contract_name(),
            request.language(),
            request.source_code().chars().count(),
            self.model_name()
        );

        let transcript = self.orchestrator.run(request).await?;
        let detailed_report = transcript.text();
        let parsed = parse(&detailed_report);

        let report = ReportAssembler::assemble(request.contract_name(), parsed, detailed_report)
            .with_model(self.model_name())
            .with_stage_timings(transcript.stage_timings());

        info!(
            "Audit of {} complete: {} vulnerabilities ({} critical, {} high), {} optimizations, severity {}/10, quality {}/100",
            report.contract_name,
            report.vulnerabilities.len(),
            report.count_by_severity(&Severity::Critical),
            report.count_by_severity(&Severity::High),
            report.gas_optimizations.len(),
            report.severity_score,
            report.code_quality_score
        );

        Ok(report)
    }
}

#[derive(Debug, Clone)]
pub struct StageInfo {
    pub kind: StageKind,
    pub role: String,
    pub expected_output: String,
}
