use async_trait::async_trait;
use contentforge_core::{FaqEntry, ProductInput};
use tracing::debug;

use crate::backend::{FaqRequest, GenerationBackend, GenerationRequest};
use crate::error::Result;

/// Deterministic rule-based backend.
///
/// Generates content by interpolating the actual product attributes into
/// templates; it holds no canned product copy and never fails, which is
/// what makes it a safe circuit-breaker fallback.
pub struct RuleBackend;

impl RuleBackend {
    pub fn new() -> Self {
        Self
    }

    fn extract_themes(text: &str) -> Vec<&'static str> {
        let lower = text.to_lowercase();
        let patterns: [(&str, &[&str]); 5] = [
            ("faq", &["faq", "question", "q&a"]),
            ("benefit", &["benefit", "advantage", "help"]),
            ("compare", &["compare", "versus", "vs", "difference"]),
            ("usage", &["use", "apply", "how to"]),
            ("safety", &["safe", "side effect", "sensitive"]),
        ];

        patterns
            .iter()
            .filter(|(_, needles)| needles.iter().any(|needle| lower.contains(needle)))
            .map(|(theme, _)| *theme)
            .collect()
    }

    fn ingredient_benefit(ingredient: &str) -> String {
        let lower = ingredient.to_lowercase();
        let table: [(&str, &str); 8] = [
            (
                "vitamin c",
                "Vitamin C is a powerful antioxidant that brightens skin and reduces dark spots.",
            ),
            (
                "hyaluronic",
                "Hyaluronic Acid provides deep hydration and plumps the skin.",
            ),
            ("retinol", "Retinol promotes cell turnover and reduces fine lines."),
            (
                "niacinamide",
                "Niacinamide minimizes pores and controls oil production.",
            ),
            ("salicylic", "Salicylic Acid unclogs pores and treats acne."),
            ("glycolic", "Glycolic Acid exfoliates for smoother, brighter skin."),
            (
                "ferulic",
                "Ferulic Acid enhances antioxidant stability and protection.",
            ),
            (
                "vitamin e",
                "Vitamin E moisturizes and protects against environmental damage.",
            ),
        ];

        for (key, benefit) in table {
            if lower.contains(key) {
                return benefit.to_string();
            }
        }
        format!("{} provides targeted skincare benefits.", ingredient)
    }

    fn build_faq(product: &ProductInput) -> Vec<FaqEntry> {
        let name = &product.name;
        let mut entries = Vec::new();

        entries.push(FaqEntry::new(
            format!("What is {}?", name),
            format!(
                "{} is a skincare product by {} containing {}.",
                name,
                product.brand,
                if product.key_ingredients.is_empty() {
                    "active ingredients".to_string()
                } else {
                    product.key_ingredients.join(", ")
                }
            ),
            "Informational",
        ));

        if !product.key_ingredients.is_empty() {
            entries.push(FaqEntry::new(
                format!("What are the key ingredients in {}?", name),
                format!("The key ingredients are: {}.", product.key_ingredients.join(", ")),
                "Informational",
            ));
            for ingredient in &product.key_ingredients {
                entries.push(FaqEntry::new(
                    format!("What does {} do for my skin?", ingredient),
                    Self::ingredient_benefit(ingredient),
                    "Informational",
                ));
            }
        }

        if !product.benefits.is_empty() {
            entries.push(FaqEntry::new(
                format!("What are the benefits of using {}?", name),
                format!("{} provides: {}.", name, product.benefits.join(", ")),
                "Informational",
            ));
            entries.push(FaqEntry::new(
                "How long until I see results?".to_string(),
                format!(
                    "Most users notice {} within 2-4 weeks of consistent use.",
                    product.benefits[0].to_lowercase()
                ),
                "Results",
            ));
        }

        if let Some(usage) = &product.usage_instructions {
            entries.push(FaqEntry::new(
                format!("How do I use {}?", name),
                usage.clone(),
                "Usage",
            ));
            entries.push(FaqEntry::new(
                format!("When should I apply {}?", name),
                format!("For best results: {}", usage),
                "Usage",
            ));
        }

        entries.push(FaqEntry::new(
            format!("Can I layer {} with other products?", name),
            format!(
                "Yes, {} can be used with complementary products in your routine.",
                name
            ),
            "Usage",
        ));

        if !product.skin_types.is_empty() {
            entries.push(FaqEntry::new(
                format!("Is {} suitable for my skin type?", name),
                format!("{} is formulated for: {}.", name, product.skin_types.join(", ")),
                "Safety",
            ));
        }

        if let Some(side_effects) = &product.side_effects {
            entries.push(FaqEntry::new(
                "Are there any side effects?".to_string(),
                side_effects.clone(),
                "Safety",
            ));
            entries.push(FaqEntry::new(
                format!("Is {} safe for sensitive skin?", name),
                format!("For sensitive skin: {}. Patch test recommended.", side_effects),
                "Safety",
            ));
        }

        if let Some(price) = product.price {
            entries.push(FaqEntry::new(
                format!("How much does {} cost?", name),
                format!("{} is priced at {} {}.", name, price, product.currency),
                "Purchase",
            ));
            entries.push(FaqEntry::new(
                format!("How long does one bottle of {} last?", name),
                format!(
                    "With typical use, one bottle of {} lasts approximately 2-3 months.",
                    name
                ),
                "Purchase",
            ));
        }

        entries.push(FaqEntry::new(
            format!("Where can I buy {}?", name),
            "Available at authorized retailers and online stores.".to_string(),
            "Purchase",
        ));
        entries.push(FaqEntry::new(
            format!("What is the texture of {}?", name),
            format!(
                "{} has a lightweight, fast-absorbing texture suitable for daily use.",
                name
            ),
            "Usage",
        ));
        entries.push(FaqEntry::new(
            format!("Can I use {} with retinol?", name),
            format!(
                "Consult a dermatologist before combining {} with retinol or other actives.",
                name
            ),
            "Safety",
        ));
        entries.push(FaqEntry::new(
            format!("How should I store {}?", name),
            format!(
                "Store {} in a cool, dry place away from direct sunlight to maintain efficacy.",
                name
            ),
            "Usage",
        ));
        entries.push(FaqEntry::new(
            format!("Can I use {} during pregnancy?", name),
            format!(
                "Consult your healthcare provider before using {} during pregnancy or breastfeeding.",
                name
            ),
            "Safety",
        ));
        entries.push(FaqEntry::new(
            format!("How often should I use {}?", name),
            format!(
                "For best results, use {} consistently as directed in the usage instructions.",
                name
            ),
            "Usage",
        ));

        entries
    }
}

impl Default for RuleBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for RuleBackend {
    fn name(&self) -> &str {
        "rule"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let themes = Self::extract_themes(&request.prompt);
        debug!(themes = ?themes, "Rule backend handling prompt");

        let response = if themes.contains(&"faq") {
            "Generate categorized questions from product attributes"
        } else if themes.contains(&"benefit") {
            "Extract benefits from ingredient properties"
        } else if themes.contains(&"compare") {
            "Analyze differences between product attributes"
        } else if themes.contains(&"usage") {
            "Derive application guidance from usage instructions"
        } else if themes.contains(&"safety") {
            "Summarize cautions from side-effect data"
        } else {
            "Process product data"
        };
        Ok(response.to_string())
    }

    async fn generate_faq(&self, request: &FaqRequest) -> Result<Vec<FaqEntry>> {
        Ok(Self::build_faq(&request.product))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn rich_product() -> ProductInput {
        ProductInput::new("Vitamin C Serum", "GlowLabs")
            .with_ingredients(vec![
                "Vitamin C".to_string(),
                "Ferulic Acid".to_string(),
                "Hyaluronic Acid".to_string(),
            ])
            .with_benefits(vec!["Brightening".to_string(), "Hydration".to_string()])
            .with_price(699.0)
            .with_usage("Apply 2-3 drops every morning before sunscreen.")
            .with_skin_types(vec!["Oily".to_string(), "Normal".to_string()])
            .with_side_effects("Mild tingling may occur during the first week.")
    }

    #[tokio::test]
    async fn test_faq_derived_from_product_data() {
        let backend = RuleBackend::new();
        let request = FaqRequest::new(rich_product(), 15, Uuid::new_v4());

        let entries = backend.generate_faq(&request).await.unwrap();
        assert!(entries.len() >= 15, "got {} entries", entries.len());
        assert!(entries.iter().any(|e| e.question.contains("Vitamin C Serum")));
        assert!(entries.iter().any(|e| e.category == "Safety"));
        assert!(entries.iter().any(|e| e.answer.contains("699")));
    }

    #[tokio::test]
    async fn test_faq_is_deterministic() {
        let backend = RuleBackend::new();
        let request = FaqRequest::new(rich_product(), 15, Uuid::new_v4());

        let first = backend.generate_faq(&request).await.unwrap();
        let second = backend.generate_faq(&request).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_sparse_product_yields_fewer_entries() {
        let backend = RuleBackend::new();
        let request = FaqRequest::new(ProductInput::new("Mist", "Acme"), 15, Uuid::new_v4());

        let entries = backend.generate_faq(&request).await.unwrap();
        assert!(!entries.is_empty());
        assert!(entries.len() < 15);
    }

    #[tokio::test]
    async fn test_theme_extraction() {
        let backend = RuleBackend::new();
        let request = GenerationRequest::new(
            "Please generate FAQ questions for this product",
            Uuid::new_v4(),
        );
        let response = backend.generate(&request).await.unwrap();
        assert!(response.contains("categorized questions"));
    }

    #[test]
    fn test_ingredient_benefit_lookup() {
        assert!(RuleBackend::ingredient_benefit("Niacinamide 5%").contains("pores"));
        assert!(RuleBackend::ingredient_benefit("Snail Mucin").contains("Snail Mucin"));
    }
}
