//! Vigil Auditor - Multi-Stage Smart Contract Audit Pipeline
//!
//! This crate runs a smart contract through four model-backed analysis stages
//! (vulnerabilities, gas, code quality, summary) and parses the free-text
//! transcript into a typed report with a computed severity score.
//!
//! ```no_run
//! use vigil_auditor::{AuditEngine, AuditRequest, AuditorConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = AuditorConfig::from_env()?;
//! let engine = AuditEngine::from_config(&config)?;
//! let request = AuditRequest::new("Vault", "Solidity", "contract Vault {}")?;
//! let report = engine.audit(&request).await?;
//! println!("severity {}/10", report.severity_score);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod llm;
pub mod parser;
pub mod pipeline;
pub mod runner;

pub use core::{
    AuditError, AuditReport, AuditRequest, GasOptimization, ReportAssembler, Severity,
    StageTiming, Vulnerability,
};

pub use llm::{
    AuditorConfig, ContextMode, GatewayError, MockGateway, ModelGateway,
    OpenAICompatibleGateway, PipelineSettings, ProviderConfig, StageKind,
};

pub use parser::{parse, ParsedAudit};

pub use pipeline::{Orchestrator, Transcript};

pub use runner::{AuditEngine, StageInfo};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
