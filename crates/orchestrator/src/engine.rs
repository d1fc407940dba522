use contentforge_core::{Blackboard, WorkerStatus};
use events::{Event, EventBus};
use tracing::{error, info, warn};

use crate::error::{FailureKind, RunFailure};
use crate::selector::select_next;
use crate::worker::Worker;

const DEFAULT_MAX_STEPS: u32 = 20;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_MIN_FAQ: usize = 15;

/// Bounds for one pipeline run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard iteration budget; the guard against infinite loops
    pub max_steps: u32,
    /// Reflexion retry budget for failed validation
    pub max_retries: u32,
    /// Minimum FAQ entries the content must carry to validate
    pub min_faq: usize,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_retries: DEFAULT_MAX_RETRIES,
            min_faq: DEFAULT_MIN_FAQ,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_min_faq(mut self, min_faq: usize) -> Self {
        self.min_faq = min_faq;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Final state of a run: the board snapshot plus the failure, if any.
#[derive(Debug)]
pub struct RunOutcome {
    pub blackboard: Blackboard,
    pub failure: Option<RunFailure>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Single-threaded pipeline driver.
///
/// Workers run strictly sequentially; the loop never proceeds until the
/// current worker's `run` returns. The board is exclusively owned by the
/// engine for the duration of the run.
pub struct PipelineEngine {
    workers: Vec<Box<dyn Worker>>,
    config: EngineConfig,
    event_bus: Option<EventBus>,
}

impl PipelineEngine {
    pub fn new(workers: Vec<Box<dyn Worker>>) -> Self {
        Self {
            workers,
            config: EngineConfig::default(),
            event_bus: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn emit(&self, board: &Blackboard, event: Event) {
        if let Some(bus) = &self.event_bus {
            bus.emit(board.trace_id, event);
        }
    }

    fn fail(&self, board: Blackboard, kind: FailureKind, message: String) -> RunOutcome {
        error!(trace_id = %board.trace_id, kind = kind.as_str(), message = %message, "Run failed");
        self.emit(
            &board,
            Event::RunFailed {
                kind: kind.as_str().to_string(),
                message: message.clone(),
            },
        );
        RunOutcome {
            blackboard: board,
            failure: Some(RunFailure::new(kind, message)),
        }
    }

    /// Feedback string for the reflexion retry. Count-aware when the FAQ
    /// deficit is the problem, otherwise the first recorded validation
    /// error.
    fn build_feedback(&self, board: &Blackboard, report_message: &str) -> String {
        let produced = board.content.faq.len();
        let required = self.config.min_faq;
        if produced < required {
            format!(
                "produced {} of required {} questions; deficit = {}",
                produced,
                required,
                required - produced
            )
        } else if let Some(first) = board.validation_errors.first() {
            first.clone()
        } else {
            report_message.to_string()
        }
    }

    /// Drive the board from its current stage to the terminal stage.
    pub async fn run(&self, mut board: Blackboard) -> RunOutcome {
        info!(
            trace_id = %board.trace_id,
            product = %board.product.name,
            "Pipeline run started"
        );

        let mut steps: u32 = 0;
        let mut consecutive_misses: u32 = 0;

        loop {
            if board.stage.is_terminal() {
                info!(
                    trace_id = %board.trace_id,
                    steps,
                    retries = board.retry_count,
                    "Pipeline run completed"
                );
                self.emit(
                    &board,
                    Event::RunCompleted {
                        steps,
                        retries: board.retry_count,
                    },
                );
                return RunOutcome {
                    blackboard: board,
                    failure: None,
                };
            }

            if steps >= self.config.max_steps {
                let message = format!("step budget of {} exhausted", self.config.max_steps);
                return self.fail(board, FailureKind::StuckRun, message);
            }
            steps += 1;

            let Some(worker) = select_next(&self.workers, &board) else {
                if consecutive_misses >= 1 {
                    let message = format!(
                        "no applicable worker at stage '{}' and no progress since the last iteration",
                        board.stage.as_str()
                    );
                    return self.fail(board, FailureKind::StuckRun, message);
                }
                consecutive_misses += 1;

                // Nothing left to do at this stage; advance once and give
                // the next stage a chance to match.
                let from = board.stage;
                let Some(next) = from.next() else {
                    let message = format!("no forward stage from '{}'", from.as_str());
                    return self.fail(board, FailureKind::StuckRun, message);
                };
                if let Err(e) = board.advance_stage(next) {
                    return self.fail(board, FailureKind::Error, e.to_string());
                }
                warn!(
                    trace_id = %board.trace_id,
                    from = from.as_str(),
                    to = next.as_str(),
                    "No applicable worker, advancing stage unconditionally"
                );
                self.emit(
                    &board,
                    Event::StageChanged {
                        from: from.as_str().to_string(),
                        to: next.as_str().to_string(),
                    },
                );
                continue;
            };
            consecutive_misses = 0;

            let worker_name = worker.name().to_string();
            let stage_before = board.stage;
            info!(
                trace_id = %board.trace_id,
                worker = %worker_name,
                stage = stage_before.as_str(),
                step = steps,
                "Worker selected"
            );
            self.emit(
                &board,
                Event::WorkerStarted {
                    worker: worker_name.clone(),
                    stage: stage_before.as_str().to_string(),
                },
            );
            board.log_step(format!("{}:start", worker_name));

            let report = worker.run(&mut board).await;

            board.log_step(format!("{}:{}", worker_name, report.status.as_str()));
            self.emit(
                &board,
                Event::WorkerFinished {
                    worker: report.worker.clone(),
                    status: report.status.as_str().to_string(),
                    message: report.message.clone(),
                },
            );
            if board.stage != stage_before {
                self.emit(
                    &board,
                    Event::StageChanged {
                        from: stage_before.as_str().to_string(),
                        to: board.stage.as_str().to_string(),
                    },
                );
            }

            match report.status {
                WorkerStatus::Complete => {}
                WorkerStatus::Error => {
                    let message =
                        format!("worker '{}' failed: {}", report.worker, report.message);
                    return self.fail(board, FailureKind::Error, message);
                }
                WorkerStatus::ValidationFailed => {
                    if board.retry_count >= self.config.max_retries {
                        let message = format!(
                            "validation failed after {} retries: {}",
                            board.retry_count,
                            board.validation_errors.join("; ")
                        );
                        return self.fail(board, FailureKind::ValidationExhausted, message);
                    }

                    let feedback = self.build_feedback(&board, &report.message);
                    board.set_feedback(feedback.clone());

                    let from = board.stage;
                    let Some(target) = from.retry_target() else {
                        let message = format!(
                            "worker '{}' reported failed validation at stage '{}', which has no retry target",
                            report.worker,
                            from.as_str()
                        );
                        return self.fail(board, FailureKind::Error, message);
                    };
                    if let Err(e) = board.advance_stage(target) {
                        return self.fail(board, FailureKind::Error, e.to_string());
                    }

                    info!(
                        trace_id = %board.trace_id,
                        retry_count = board.retry_count,
                        feedback = %feedback,
                        target = target.as_str(),
                        "Validation failed, scheduling reflexion retry"
                    );
                    self.emit(
                        &board,
                        Event::RetryScheduled {
                            retry_count: board.retry_count,
                            feedback,
                            target_stage: target.as_str().to_string(),
                        },
                    );
                    self.emit(
                        &board,
                        Event::StageChanged {
                            from: from.as_str().to_string(),
                            to: target.as_str().to_string(),
                        },
                    );
                }
            }
        }
    }
}
