use thiserror::Error;

use crate::llm::prompts::StageKind;
use crate::llm::provider::GatewayError;

#[derive(Debug, Error)]
pub enum AuditError {
    /// Missing credential or invalid settings. Raised before any stage runs.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid audit request: {0}")]
    InvalidRequest(String),

    #[error("Audit failed during {stage} stage (stage {index} of 4): {source}")]
    StageFailed {
        stage: StageKind,
        index: usize,
        #[source]
        source: GatewayError,
    },
}

impl AuditError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// The stage that failed, if the audit got far enough to call the model.
    pub fn failed_stage(&self) -> Option<StageKind> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

