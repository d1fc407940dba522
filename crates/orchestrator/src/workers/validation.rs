use async_trait::async_trait;
use contentforge_core::{Blackboard, Stage, WorkerReport};
use tracing::{info, warn};

use crate::worker::Worker;

const NAME: &str = "ValidationWorker";

/// Final gate before completion: checks the board carries a named product
/// and enough FAQ entries. On failure it records the errors and leaves the
/// stage untouched; the engine decides whether to retry.
pub struct ValidationWorker {
    min_faq: usize,
}

impl ValidationWorker {
    pub fn new(min_faq: usize) -> Self {
        Self { min_faq }
    }

    fn check(&self, board: &Blackboard) -> Vec<String> {
        let mut errors = Vec::new();

        if board.product.name.trim().is_empty() {
            errors.push("missing product name".to_string());
        }

        let count = board.content.faq.len();
        if count < self.min_faq {
            errors.push(format!(
                "FAQ must have {}+ questions, found {}",
                self.min_faq, count
            ));
        }

        errors
    }
}

#[async_trait]
impl Worker for ValidationWorker {
    fn name(&self) -> &str {
        NAME
    }

    fn can_handle(&self, board: &Blackboard) -> bool {
        board.stage == Stage::Verification && !board.is_valid
    }

    async fn run(&self, board: &mut Blackboard) -> WorkerReport {
        board.reset_validation();
        let errors = self.check(board);

        if errors.is_empty() {
            board.is_valid = true;
            info!(trace_id = %board.trace_id, "Validation passed");
            if let Err(e) = board.advance_stage(Stage::Complete) {
                return WorkerReport::error(NAME, e.to_string());
            }
            return WorkerReport::complete(NAME, "validation passed");
        }

        warn!(
            trace_id = %board.trace_id,
            errors = errors.len(),
            first = %errors[0],
            "Validation failed"
        );
        let message = errors.join("; ");
        board.validation_errors = errors;
        WorkerReport::validation_failed(NAME, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentforge_core::{FaqEntry, ProductInput, WorkerStatus};

    fn board_at_verification(faq_count: usize) -> Blackboard {
        let mut board = Blackboard::new(ProductInput::new("Serum", "Acme"));
        board.content.faq = vec![FaqEntry::new("Q", "A", "General"); faq_count];
        board.advance_stage(Stage::Drafting).unwrap();
        board.advance_stage(Stage::Assembly).unwrap();
        board.advance_stage(Stage::Verification).unwrap();
        board
    }

    #[tokio::test]
    async fn test_passes_with_enough_faq() {
        let worker = ValidationWorker::new(15);
        let mut board = board_at_verification(15);
        assert!(worker.can_handle(&board));

        let report = worker.run(&mut board).await;
        assert_eq!(report.status, WorkerStatus::Complete);
        assert!(board.is_valid);
        assert_eq!(board.stage, Stage::Complete);
        assert!(board.validation_errors.is_empty());
    }

    #[tokio::test]
    async fn test_fails_on_faq_deficit() {
        let worker = ValidationWorker::new(15);
        let mut board = board_at_verification(12);

        let report = worker.run(&mut board).await;
        assert_eq!(report.status, WorkerStatus::ValidationFailed);
        assert!(!board.is_valid);
        // Stage untouched; the engine owns the retry decision
        assert_eq!(board.stage, Stage::Verification);
        assert_eq!(board.validation_errors.len(), 1);
        assert!(board.validation_errors[0].contains("found 12"));
    }

    #[tokio::test]
    async fn test_fails_on_missing_product_name() {
        let worker = ValidationWorker::new(1);
        let mut board = board_at_verification(5);
        board.product.name = "  ".to_string();

        let report = worker.run(&mut board).await;
        assert_eq!(report.status, WorkerStatus::ValidationFailed);
        assert!(board
            .validation_errors
            .iter()
            .any(|e| e.contains("product name")));
    }

    #[tokio::test]
    async fn test_not_applicable_once_valid() {
        let worker = ValidationWorker::new(1);
        let mut board = board_at_verification(5);
        worker.run(&mut board).await;
        assert!(!worker.can_handle(&board));
    }
}
