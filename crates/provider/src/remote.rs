use async_trait::async_trait;
use contentforge_core::FaqEntry;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error};

use crate::backend::{FaqRequest, GenerationBackend, GenerationRequest};
use crate::error::{ProviderError, Result};

const DEFAULT_MODEL: &str = "open-mistral-7b";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Remote generation backend speaking the chat-completions wire format.
///
/// Each attempt carries its own request timeout; retry and backoff live in
/// the [`GatedProvider`](crate::GatedProvider), not here.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, api_key, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn chat(&self, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": temperature,
        });

        debug!(url = %url, model = %self.model, "Sending generation request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Parse("response contained no choices".to_string()))
    }

    /// Strip markdown code fences the model tends to wrap JSON in.
    fn strip_fences(text: &str) -> &str {
        text.trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    }

    fn faq_prompt(request: &FaqRequest) -> String {
        let product = &request.product;
        let mut prompt = format!(
            "Generate {} FAQ questions and answers for this skincare product.\n\n\
             Product: {}\n\
             Brand: {}\n\
             Ingredients: {}\n\
             Benefits: {}\n\
             Usage: {}\n\
             Price: {} {}\n\n\
             Return a JSON array: [{{\"question\": \"...\", \"answer\": \"...\", \"category\": \"...\"}}]\n\
             Categories: Informational, Usage, Safety, Purchase, Results",
            request.min_questions,
            product.name,
            product.brand,
            product.key_ingredients.join(", "),
            product.benefits.join(", "),
            product.usage_instructions.as_deref().unwrap_or("N/A"),
            product.price.unwrap_or(0.0),
            product.currency,
        );

        if let Some(feedback) = &request.feedback {
            prompt.push_str("\n\nFeedback from the previous attempt: ");
            prompt.push_str(feedback);
        }

        prompt
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.chat(&request.prompt, request.temperature).await
    }

    async fn generate_faq(&self, request: &FaqRequest) -> Result<Vec<FaqEntry>> {
        let prompt = Self::faq_prompt(request);
        let text = self.chat(&prompt, 0.7).await?;

        let entries: Vec<FaqEntry> =
            serde_json::from_str(Self::strip_fences(&text)).map_err(|e| {
                error!(error = %e, "FAQ response was not a valid JSON array");
                ProviderError::Parse(format!("invalid FAQ array: {}", e))
            })?;

        // Short output is returned as-is; the verification stage decides
        // whether the count is acceptable.
        Ok(entries
            .into_iter()
            .filter(|entry| !entry.question.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentforge_core::ProductInput;
    use uuid::Uuid;

    #[test]
    fn test_strip_fences() {
        assert_eq!(HttpBackend::strip_fences("```json\n[1,2]\n```"), "[1,2]");
        assert_eq!(HttpBackend::strip_fences("[1,2]"), "[1,2]");
        assert_eq!(HttpBackend::strip_fences("```\n{}\n```"), "{}");
    }

    #[test]
    fn test_faq_prompt_includes_feedback() {
        let product = ProductInput::new("Serum", "Acme");
        let request = FaqRequest::new(product, 15, Uuid::new_v4())
            .with_feedback("produced 12 of required 15 questions; deficit = 3");

        let prompt = HttpBackend::faq_prompt(&request);
        assert!(prompt.contains("Generate 15 FAQ questions"));
        assert!(prompt.contains("deficit = 3"));
    }

    #[test]
    fn test_faq_prompt_without_feedback() {
        let product = ProductInput::new("Serum", "Acme").with_price(699.0);
        let request = FaqRequest::new(product, 15, Uuid::new_v4());

        let prompt = HttpBackend::faq_prompt(&request);
        assert!(prompt.contains("699"));
        assert!(!prompt.contains("previous attempt"));
    }
}
