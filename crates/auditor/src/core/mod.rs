//! Core data model for an audit
//!
//! The request that enters the pipeline, the typed findings extracted from the
//! model transcript, the severity scoring rule, and the report handed back to
//! the caller. None of these types perform I/O.

pub mod error;
pub mod report;
pub mod request;
pub mod severity;
pub mod severity_calculator;

pub use error::AuditError;
pub use report::{AuditReport, GasOptimization, ReportAssembler, StageTiming, Vulnerability};
pub use request::AuditRequest;
pub use severity::Severity;
pub use severity_calculator::{severity_score, MAX_SEVERITY_SCORE};
