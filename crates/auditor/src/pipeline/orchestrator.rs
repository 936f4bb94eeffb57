use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::transcript::{StageResult, Transcript};
use crate::core::{AuditError, AuditRequest};
use crate::llm::config::{ContextMode, PipelineSettings};
use crate::llm::prompts::{StageDefinition, STAGES};
use crate::llm::provider::{GenerationRequest, ModelGateway};

pub const STAGE_COUNT: usize = STAGES.len();

/// Progress of one pipeline run. Stage numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Running(usize),
    Done(usize),
    Complete,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    Start,
    Succeed,
    Fail,
    Finish,
}

impl PipelineState {
    /// Next state, or `None` if the event is not allowed here.
    pub fn on_event(self, event: StageEvent) -> Option<Self> {
        match (self, event) {
            (Self::Pending, StageEvent::Start) => Some(Self::Running(1)),
            (Self::Done(k), StageEvent::Start) if k < STAGE_COUNT => Some(Self::Running(k + 1)),
            (Self::Running(k), StageEvent::Succeed) => Some(Self::Done(k)),
            (Self::Running(_), StageEvent::Fail) => Some(Self::Failed),
            (Self::Done(k), StageEvent::Finish) if k == STAGE_COUNT => Some(Self::Complete),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

fn advance(state: PipelineState, event: StageEvent) -> PipelineState {
    match state.on_event(event) {
        Some(next) => {
            debug!("Pipeline {:?} -> {:?}", state, next);
            next
        }
        None => {
            warn!("Invalid pipeline transition from {:?} on {:?}", state, event);
            PipelineState::Failed
        }
    }
}

/// Runs the four stages one after another against a single gateway.
///
/// Holds no per-audit state, so one orchestrator can serve concurrent audits.
pub struct Orchestrator {
    gateway: Arc<dyn ModelGateway>,
    settings: PipelineSettings,
    stages: &'static [StageDefinition],
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn ModelGateway>, settings: PipelineSettings) -> Self {
        Self {
            gateway,
            settings,
            stages: &STAGES,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn model_name(&self) -> &str {
        self.gateway.model_name()
    }

    /// Executes every stage in order.
    ///
    /// The first failing stage aborts the run: later stages are never called
    /// and no partial transcript is returned.
    pub async fn run(&self, request: &AuditRequest) -> Result<Transcript, AuditError> {
        let mut state = PipelineState::Pending;
        let mut transcript = Transcript::new();

        for (position, stage) in self.stages.iter().enumerate() {
            let stage_index = position + 1;
            state = advance(state, StageEvent::Start);

            let generation = self.stage_request(stage, request, &transcript);
            info!(
                "Stage {}/{} ({}) started",
                stage_index,
                self.stages.len(),
                stage.kind
            );

            let started = Instant::now();
            match self.gateway.generate(generation).await {
                Ok(response) => {
                    let elapsed = started.elapsed();
                    state = advance(state, StageEvent::Succeed);
                    info!(
                        "Stage {} ({}) finished in {:?}, {} chars, {} tokens",
                        stage_index,
                        stage.kind,
                        elapsed,
                        response.content.len(),
                        response.usage.total_tokens
                    );
                    transcript.push(StageResult {
                        stage_index,
                        stage: stage.kind,
                        raw_text: response.content,
                        elapsed,
                    });
                }
                Err(source) => {
                    state = advance(state, StageEvent::Fail);
                    warn!(
                        "Stage {} ({}) failed, pipeline {:?}: {}",
                        stage_index, stage.kind, state, source
                    );
                    return Err(AuditError::StageFailed {
                        stage: stage.kind,
                        index: stage_index,
                        source,
                    });
                }
            }
        }

        state = advance(state, StageEvent::Finish);
        debug!("Pipeline finished in state {:?}", state);

        Ok(transcript)
    }

    fn stage_request(
        &self,
        stage: &StageDefinition,
        request: &AuditRequest,
        transcript: &Transcript,
    ) -> GenerationRequest {
        let (system_prompt, mut user_prompt) = stage.build_prompt(
            request.source_code(),
            request.language(),
            self.settings.code_prefix_chars,
        );

        if self.settings.context_mode == ContextMode::Chained && !transcript.is_empty() {
            user_prompt.push_str(&prior_stage_context(request, transcript));
        }

        GenerationRequest {
            system_prompt,
            user_prompt,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            dump_prompt: self.settings.dump_prompts,
        }
    }
}

fn prior_stage_context(request: &AuditRequest, transcript: &Transcript) -> String {
    let mut context = format!(
        "\n\nContext from previous analysis stages of {} ({}):",
        request.contract_name(),
        request.language()
    );
    for result in transcript.results() {
        context.push_str(&format!(
            "\n\n--- {} ---\n{}",
            result.stage.title(),
            result.raw_text.trim()
        ));
    }
    context
}
