use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use contentforge_core::FaqEntry;
use events::{Event, EventBus};
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::{FaqRequest, GenerationBackend, GenerationRequest};
use crate::breaker::CircuitBreaker;
use crate::error::{ProviderError, Result};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Exponential backoff policy for calls to the primary backend.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay before the given retry (attempt numbering starts at 1; no
    /// delay before the first attempt). Doubles each retry.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        self.base_delay * 2u32.saturating_pow(attempt - 2)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

/// Generation backend wrapped with retry, circuit breaking and fallback.
///
/// A call first consults the breaker: if it rejects the call, the request
/// goes straight to the fallback backend. Otherwise the primary is tried
/// up to `retry.max_attempts` times with exponential backoff; the whole
/// exhausted call counts as ONE breaker failure. With no fallback
/// configured, exhaustion surfaces as [`ProviderError::Exhausted`].
pub struct GatedProvider {
    primary: Arc<dyn GenerationBackend>,
    fallback: Option<Arc<dyn GenerationBackend>>,
    breaker: Arc<CircuitBreaker>,
    retry: RetryPolicy,
    event_bus: Option<EventBus>,
}

impl GatedProvider {
    pub fn new(primary: Arc<dyn GenerationBackend>) -> Self {
        Self {
            primary,
            fallback: None,
            breaker: Arc::new(CircuitBreaker::new()),
            retry: RetryPolicy::default(),
            event_bus: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn GenerationBackend>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = breaker;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    fn emit_fallback(&self, trace_id: Uuid, reason: &str) {
        if let Some(bus) = &self.event_bus {
            bus.emit(
                trace_id,
                Event::ProviderFallback {
                    reason: reason.to_string(),
                },
            );
        }
    }

    /// Run one call through the breaker, retry loop and fallback routing.
    async fn call<T, F, Fut, G, Gut>(
        &self,
        trace_id: Uuid,
        primary_call: F,
        fallback_call: G,
    ) -> Result<T>
    where
        F: Fn(Arc<dyn GenerationBackend>) -> Fut,
        Fut: Future<Output = Result<T>>,
        G: Fn(Arc<dyn GenerationBackend>) -> Gut,
        Gut: Future<Output = Result<T>>,
    {
        if !self.breaker.should_allow() {
            warn!(
                trace_id = %trace_id,
                primary = self.primary.name(),
                "Circuit open, primary backend skipped"
            );
            return match &self.fallback {
                Some(fallback) => {
                    self.emit_fallback(trace_id, "circuit open");
                    fallback_call(Arc::clone(fallback)).await
                }
                None => Err(ProviderError::Unavailable(format!(
                    "circuit open for backend '{}'",
                    self.primary.name()
                ))),
            };
        }

        let mut last_error = None;
        for attempt in 1..=self.retry.max_attempts {
            let delay = self.retry.delay_for(attempt);
            if !delay.is_zero() {
                info!(
                    trace_id = %trace_id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying primary backend after backoff"
                );
                tokio::time::sleep(delay).await;
            }

            match primary_call(Arc::clone(&self.primary)).await {
                Ok(value) => {
                    self.breaker.record_success();
                    return Ok(value);
                }
                Err(error) => {
                    warn!(
                        trace_id = %trace_id,
                        attempt,
                        error = %error,
                        "Primary backend call failed"
                    );
                    last_error = Some(error);
                }
            }
        }

        // All attempts on this call failed: one breaker failure.
        self.breaker.record_failure();

        let last_error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());

        match &self.fallback {
            Some(fallback) => {
                self.emit_fallback(trace_id, &last_error);
                info!(
                    trace_id = %trace_id,
                    fallback = fallback.name(),
                    "Primary exhausted, serving from fallback"
                );
                fallback_call(Arc::clone(fallback)).await
            }
            None => Err(ProviderError::Exhausted {
                attempts: self.retry.max_attempts,
                last_error,
            }),
        }
    }
}

#[async_trait]
impl GenerationBackend for GatedProvider {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.call(
            request.trace_id,
            |backend| {
                let request = request.clone();
                async move { backend.generate(&request).await }
            },
            |backend| {
                let request = request.clone();
                async move { backend.generate(&request).await }
            },
        )
        .await
    }

    async fn generate_faq(&self, request: &FaqRequest) -> Result<Vec<FaqEntry>> {
        self.call(
            request.trace_id,
            |backend| {
                let request = request.clone();
                async move { backend.generate_faq(&request).await }
            },
            |backend| {
                let request = request.clone();
                async move { backend.generate_faq(&request).await }
            },
        )
        .await
    }
}
