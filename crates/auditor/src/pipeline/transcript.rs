use std::time::Duration;

use crate::core::StageTiming;
use crate::llm::prompts::StageKind;

/// Raw output of one stage.
#[derive(Debug, Clone)]
pub struct StageResult {
    /// 1-based position in the pipeline.
    pub stage_index: usize,
    pub stage: StageKind,
    pub raw_text: String,
    pub elapsed: Duration,
}

/// Stage outputs in execution order.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    results: Vec<StageResult>,
}

pub const STAGE_SEPARATOR: &str = "\n\n";

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: StageResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[StageResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Concatenated raw text, the sole input to the parser.
    pub fn text(&self) -> String {
        self.results
            .iter()
            .map(|r| r.raw_text.as_str())
            .collect::<Vec<_>>()
            .join(STAGE_SEPARATOR)
    }

    pub fn stage_timings(&self) -> Vec<StageTiming> {
        self.results
            .iter()
            .map(|r| StageTiming {
                stage: r.stage,
                elapsed_ms: r.elapsed.as_millis() as u64,
            })
            .collect()
    }
}
