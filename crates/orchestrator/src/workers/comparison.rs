use async_trait::async_trait;
use contentforge_core::{Blackboard, ComparisonReport, ProductInput, Stage, WorkerReport};
use tracing::info;

use crate::worker::Worker;

const NAME: &str = "ComparisonWorker";

/// Deterministic head-to-head comparison of the product against its rival.
/// Only applicable when a rival was supplied with the run.
pub struct ComparisonWorker;

impl ComparisonWorker {
    pub fn new() -> Self {
        Self
    }

    fn lowered(items: &[String]) -> Vec<String> {
        items.iter().map(|s| s.to_lowercase()).collect()
    }

    fn compare(product: &ProductInput, rival: &ProductInput) -> ComparisonReport {
        let ours = Self::lowered(&product.key_ingredients);
        let theirs = Self::lowered(&rival.key_ingredients);

        let shared_ingredients: Vec<String> = ours
            .iter()
            .filter(|i| theirs.contains(i))
            .cloned()
            .collect();
        let unique_to_product: Vec<String> = ours
            .iter()
            .filter(|i| !theirs.contains(i))
            .cloned()
            .collect();
        let unique_to_rival: Vec<String> = theirs
            .iter()
            .filter(|i| !ours.contains(i))
            .cloned()
            .collect();

        let (price_verdict, cheaper) = match (product.price, rival.price) {
            (Some(ours_price), Some(rival_price)) => {
                let difference = (ours_price - rival_price).abs();
                let cheaper = if ours_price <= rival_price {
                    &product.name
                } else {
                    &rival.name
                };
                (
                    format!(
                        "{} is cheaper by {:.2} {}",
                        cheaper, difference, product.currency
                    ),
                    cheaper.clone(),
                )
            }
            _ => (
                "Price data incomplete, no value verdict".to_string(),
                product.name.clone(),
            ),
        };

        // Cheaper wins on a tie in ingredient coverage.
        let winner = if product.key_ingredients.len() > rival.key_ingredients.len() {
            product.name.clone()
        } else if rival.key_ingredients.len() > product.key_ingredients.len() {
            rival.name.clone()
        } else {
            cheaper
        };

        let recommendation = format!(
            "{} suits buyers focused on {}; {} counters with {}. Overall pick: {}.",
            product.name,
            if product.benefits.is_empty() {
                "its ingredient profile".to_string()
            } else {
                product.benefits.join(", ").to_lowercase()
            },
            rival.name,
            if unique_to_rival.is_empty() {
                "a similar formula".to_string()
            } else {
                unique_to_rival.join(", ")
            },
            winner,
        );

        ComparisonReport {
            shared_ingredients,
            unique_to_product,
            unique_to_rival,
            price_verdict,
            winner,
            recommendation,
        }
    }
}

impl Default for ComparisonWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Worker for ComparisonWorker {
    fn name(&self) -> &str {
        NAME
    }

    fn can_handle(&self, board: &Blackboard) -> bool {
        board.stage == Stage::Assembly
            && board.comparison.is_some()
            && board.content.comparison.is_none()
    }

    async fn run(&self, board: &mut Blackboard) -> WorkerReport {
        let Some(rival) = board.comparison.clone() else {
            return WorkerReport::error(NAME, "no comparison input on the board");
        };

        let report = Self::compare(&board.product, &rival);
        info!(
            trace_id = %board.trace_id,
            rival = %rival.name,
            winner = %report.winner,
            "Comparison complete"
        );
        board.content.comparison = Some(report);

        if let Err(e) = board.advance_stage(Stage::Verification) {
            return WorkerReport::error(NAME, e.to_string());
        }
        WorkerReport::complete(NAME, format!("compared against {}", rival.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentforge_core::WorkerStatus;

    fn product() -> ProductInput {
        ProductInput::new("Alpha Serum", "Acme")
            .with_ingredients(vec![
                "Vitamin C".to_string(),
                "Ferulic Acid".to_string(),
                "Hyaluronic Acid".to_string(),
            ])
            .with_benefits(vec!["Brightening".to_string()])
            .with_price(699.0)
    }

    fn rival() -> ProductInput {
        ProductInput::new("Beta Serum", "Rival Labs")
            .with_ingredients(vec!["Vitamin C".to_string(), "Niacinamide".to_string()])
            .with_price(899.0)
    }

    #[test]
    fn test_ingredient_overlap() {
        let report = ComparisonWorker::compare(&product(), &rival());
        assert_eq!(report.shared_ingredients, vec!["vitamin c"]);
        assert!(report.unique_to_product.contains(&"ferulic acid".to_string()));
        assert_eq!(report.unique_to_rival, vec!["niacinamide"]);
    }

    #[test]
    fn test_price_verdict_and_winner() {
        let report = ComparisonWorker::compare(&product(), &rival());
        assert!(report.price_verdict.contains("Alpha Serum is cheaper by 200.00"));
        // More ingredients wins
        assert_eq!(report.winner, "Alpha Serum");
    }

    #[test]
    fn test_missing_price_is_not_fatal() {
        let no_price = ProductInput::new("Gamma", "Acme");
        let report = ComparisonWorker::compare(&no_price, &rival());
        assert!(report.price_verdict.contains("incomplete"));
    }

    #[tokio::test]
    async fn test_run_requires_comparison_input() {
        let worker = ComparisonWorker::new();
        let mut board = Blackboard::new(product());
        board.advance_stage(Stage::Drafting).unwrap();
        board.advance_stage(Stage::Assembly).unwrap();

        // No rival: not applicable, the engine advances past assembly
        assert!(!worker.can_handle(&board));

        let mut board = Blackboard::new(product()).with_comparison(rival());
        board.advance_stage(Stage::Drafting).unwrap();
        board.advance_stage(Stage::Assembly).unwrap();
        assert!(worker.can_handle(&board));

        let report = worker.run(&mut board).await;
        assert_eq!(report.status, WorkerStatus::Complete);
        assert_eq!(board.stage, Stage::Verification);
        assert!(board.content.comparison.is_some());
        assert!(!worker.can_handle(&board));
    }
}
