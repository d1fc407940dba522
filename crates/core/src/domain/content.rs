use serde::{Deserialize, Serialize};

/// One FAQ question-answer pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "General".to_string()
}

impl FaqEntry {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            category: category.into(),
        }
    }
}

/// Outcome of the deterministic product comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonReport {
    pub shared_ingredients: Vec<String>,
    pub unique_to_product: Vec<String>,
    pub unique_to_rival: Vec<String>,
    pub price_verdict: String,
    pub winner: String,
    pub recommendation: String,
}

/// Mutable accumulator written incrementally by workers.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneratedContent {
    pub benefits: Vec<String>,
    pub usage: String,
    pub faq: Vec<FaqEntry>,
    pub comparison: Option<ComparisonReport>,
}

impl GeneratedContent {
    pub fn is_empty(&self) -> bool {
        self.benefits.is_empty()
            && self.usage.is_empty()
            && self.faq.is_empty()
            && self.comparison.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faq_entry_category_default() {
        let json = r#"{"question":"What is it?","answer":"A serum."}"#;
        let entry: FaqEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.category, "General");
    }

    #[test]
    fn test_generated_content_empty() {
        let mut content = GeneratedContent::default();
        assert!(content.is_empty());

        content.benefits.push("Brightens skin".to_string());
        assert!(!content.is_empty());
    }
}
