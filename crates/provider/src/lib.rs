//! Circuit-breaker-gated generation provider
//!
//! Workers never talk to a remote backend directly. They go through the
//! [`GatedProvider`], which wraps any [`GenerationBackend`] with retry,
//! exponential backoff, and a circuit breaker that routes to a
//! deterministic rule-based fallback once the remote side proves
//! unreliable. Breaker state may be shared process-wide across runs.

mod backend;
mod breaker;
mod error;
mod fallback;
mod gated;
mod remote;

pub use backend::{FaqRequest, GenerationBackend, GenerationRequest};
pub use breaker::{BreakerPhase, CircuitBreaker};
pub use error::{ProviderError, Result};
pub use fallback::RuleBackend;
pub use gated::{GatedProvider, RetryPolicy};
pub use remote::HttpBackend;
