//! Sequential stage execution
//!
//! The orchestrator walks the fixed stage list, calls the model once per
//! stage, and collects the raw outputs into a transcript. A failed stage ends
//! the run immediately.

pub mod orchestrator;
pub mod transcript;

pub use orchestrator::{Orchestrator, PipelineState, StageEvent, STAGE_COUNT};
pub use transcript::{StageResult, Transcript};
