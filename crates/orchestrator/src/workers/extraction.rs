use async_trait::async_trait;
use contentforge_core::{Blackboard, ProductInput, Stage, WorkerReport};
use tracing::info;

use crate::worker::Worker;

const NAME: &str = "ExtractionWorker";

/// Derives benefit statements and usage instructions from the raw product
/// data. Fully deterministic, no backend involved.
pub struct ExtractionWorker;

impl ExtractionWorker {
    pub fn new() -> Self {
        Self
    }

    /// Listed benefits plus benefits inferred from known ingredients,
    /// deduplicated, listed order first.
    fn extract_benefits(product: &ProductInput) -> Vec<String> {
        let mut benefits = product.benefits.clone();

        let inferred: [(&str, &str); 6] = [
            ("vitamin c", "Brightening and antioxidant protection"),
            ("hyaluronic", "Deep hydration and plumping"),
            ("niacinamide", "Pore refinement and oil control"),
            ("retinol", "Anti-aging and cell renewal"),
            ("salicylic", "Acne treatment and exfoliation"),
            ("ceramide", "Skin barrier repair"),
        ];

        for ingredient in &product.key_ingredients {
            let lower = ingredient.to_lowercase();
            for (key, benefit) in inferred {
                if lower.contains(key) && !benefits.iter().any(|b| b == benefit) {
                    benefits.push(benefit.to_string());
                }
            }
        }

        benefits
    }

    /// Explicit instructions win; otherwise a template keyed on the
    /// product name.
    fn extract_usage(product: &ProductInput) -> String {
        if let Some(usage) = &product.usage_instructions {
            return usage.clone();
        }

        let templates: [(&str, &str); 6] = [
            ("serum", "Apply 2-3 drops to clean skin before moisturizer."),
            ("moisturizer", "Apply to clean skin morning and evening."),
            ("cleanser", "Massage onto damp skin, then rinse thoroughly."),
            ("toner", "Apply to clean skin with a cotton pad or hands."),
            ("mask", "Apply to clean skin, leave for 10-15 minutes, then rinse."),
            ("sunscreen", "Apply generously 15 minutes before sun exposure."),
        ];

        let name = product.name.to_lowercase();
        for (key, template) in templates {
            if name.contains(key) {
                return template.to_string();
            }
        }
        "Follow product instructions for best results.".to_string()
    }
}

impl Default for ExtractionWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Worker for ExtractionWorker {
    fn name(&self) -> &str {
        NAME
    }

    fn can_handle(&self, board: &Blackboard) -> bool {
        board.stage == Stage::Extraction
            && (board.content.benefits.is_empty() || board.content.usage.is_empty())
    }

    async fn run(&self, board: &mut Blackboard) -> WorkerReport {
        let benefits = Self::extract_benefits(&board.product);
        let usage = Self::extract_usage(&board.product);
        info!(
            trace_id = %board.trace_id,
            benefits = benefits.len(),
            "Extracted benefits and usage"
        );

        board.content.benefits = benefits;
        board.content.usage = usage;

        if let Err(e) = board.advance_stage(Stage::Drafting) {
            return WorkerReport::error(NAME, e.to_string());
        }
        WorkerReport::complete(
            NAME,
            format!("extracted {} benefits and usage", board.content.benefits.len()),
        )
    }
}
