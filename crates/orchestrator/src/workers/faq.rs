use std::sync::Arc;

use async_trait::async_trait;
use contentforge_core::{Blackboard, Stage, WorkerReport};
use provider::{FaqRequest, GenerationBackend};
use tracing::info;

use crate::worker::Worker;

const NAME: &str = "FaqWorker";

/// Generates the FAQ section through the gated provider. Reflexion
/// feedback left on the board by a failed validation pass is threaded into
/// the request so the backend can close the gap.
pub struct FaqWorker {
    backend: Arc<dyn GenerationBackend>,
    min_faq: usize,
}

impl FaqWorker {
    pub fn new(backend: Arc<dyn GenerationBackend>, min_faq: usize) -> Self {
        Self { backend, min_faq }
    }
}

#[async_trait]
impl Worker for FaqWorker {
    fn name(&self) -> &str {
        NAME
    }

    fn can_handle(&self, board: &Blackboard) -> bool {
        board.stage == Stage::Drafting && board.content.faq.len() < self.min_faq
    }

    async fn run(&self, board: &mut Blackboard) -> WorkerReport {
        let mut request = FaqRequest::new(board.product.clone(), self.min_faq, board.trace_id);
        if let Some(feedback) = board.take_feedback() {
            info!(
                trace_id = %board.trace_id,
                feedback = %feedback,
                "Regenerating FAQ with feedback"
            );
            request = request.with_feedback(feedback);
        }

        // Short output is accepted here; the verification stage decides
        // whether the count is sufficient.
        let entries = match self.backend.generate_faq(&request).await {
            Ok(entries) => entries,
            Err(e) => return WorkerReport::error(NAME, e.to_string()),
        };

        let count = entries.len();
        board.content.faq = entries;

        if let Err(e) = board.advance_stage(Stage::Assembly) {
            return WorkerReport::error(NAME, e.to_string());
        }
        WorkerReport::complete(NAME, format!("generated {} questions", count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentforge_core::{FaqEntry, ProductInput, WorkerStatus};
    use provider::{GenerationRequest, ProviderError};
    use std::sync::Mutex;

    /// Backend scripted to return a fixed sequence of FAQ counts.
    struct ScriptedBackend {
        counts: Mutex<Vec<usize>>,
        last_feedback: Mutex<Option<String>>,
    }

    impl ScriptedBackend {
        fn new(counts: Vec<usize>) -> Self {
            Self {
                counts: Mutex::new(counts),
                last_feedback: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, _request: &GenerationRequest) -> provider::Result<String> {
            Ok("text".to_string())
        }

        async fn generate_faq(
            &self,
            request: &FaqRequest,
        ) -> provider::Result<Vec<FaqEntry>> {
            *self.last_feedback.lock().unwrap() = request.feedback.clone();
            let count = self
                .counts
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| ProviderError::Unavailable("script exhausted".to_string()))?;
            Ok(vec![FaqEntry::new("Q", "A", "General"); count])
        }
    }

    fn board() -> Blackboard {
        let mut board = Blackboard::new(ProductInput::new("Serum", "Acme"));
        board.advance_stage(Stage::Drafting).unwrap();
        board
    }

    #[tokio::test]
    async fn test_generates_and_advances() {
        let backend = Arc::new(ScriptedBackend::new(vec![15]));
        let worker = FaqWorker::new(backend, 15);
        let mut board = board();
        assert!(worker.can_handle(&board));

        let report = worker.run(&mut board).await;
        assert_eq!(report.status, WorkerStatus::Complete);
        assert_eq!(board.content.faq.len(), 15);
        assert_eq!(board.stage, Stage::Assembly);
    }

    #[tokio::test]
    async fn test_feedback_is_consumed_and_forwarded() {
        let backend = Arc::new(ScriptedBackend::new(vec![15]));
        let worker = FaqWorker::new(Arc::clone(&backend) as Arc<dyn GenerationBackend>, 15);

        let mut board = board();
        board.set_feedback("produced 12 of required 15 questions; deficit = 3");

        worker.run(&mut board).await;
        assert!(board.feedback.is_none());
        let seen = backend.last_feedback.lock().unwrap().clone();
        assert_eq!(
            seen.as_deref(),
            Some("produced 12 of required 15 questions; deficit = 3")
        );
    }

    #[tokio::test]
    async fn test_backend_failure_is_error() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));
        let worker = FaqWorker::new(backend, 15);
        let mut board = board();

        let report = worker.run(&mut board).await;
        assert_eq!(report.status, WorkerStatus::Error);
        assert_eq!(board.stage, Stage::Drafting);
    }

    #[tokio::test]
    async fn test_not_applicable_when_faq_sufficient() {
        let backend = Arc::new(ScriptedBackend::new(vec![15]));
        let worker = FaqWorker::new(backend, 2);
        let mut board = board();
        board.content.faq = vec![FaqEntry::new("Q", "A", "General"); 2];

        assert!(!worker.can_handle(&board));
    }
}
