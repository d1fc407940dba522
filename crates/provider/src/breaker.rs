use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{info, warn};

const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerPhase {
    Closed,
    Open,
    /// One probe call is in flight; all other calls are rejected until it
    /// resolves.
    HalfOpen,
}

#[derive(Debug)]
struct BreakerState {
    consecutive_failures: u32,
    phase: BreakerPhase,
    opened_at: Option<Instant>,
}

/// Failure-count-gated switch shared by all callers of a backend.
///
/// Counts consecutive failed calls (not per-call retries). Once the
/// threshold is crossed the breaker opens and `should_allow` rejects
/// everything until `reset_timeout` elapses, after which exactly one probe
/// call is let through. A successful probe closes the breaker; a failed
/// one reopens it and restarts the timeout.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    reset_timeout: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_FAILURE_THRESHOLD, DEFAULT_RESET_TIMEOUT)
    }

    pub fn with_settings(failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            reset_timeout,
            state: Mutex::new(BreakerState {
                consecutive_failures: 0,
                phase: BreakerPhase::Closed,
                opened_at: None,
            }),
        }
    }

    /// Whether the next call may go to the primary backend. Flipping to
    /// half-open reserves the probe slot for the caller.
    pub fn should_allow(&self) -> bool {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match state.phase {
            BreakerPhase::Closed => true,
            BreakerPhase::HalfOpen => false,
            BreakerPhase::Open => {
                let elapsed = state
                    .opened_at
                    .map(|at| at.elapsed())
                    .unwrap_or(Duration::ZERO);
                if elapsed >= self.reset_timeout {
                    info!("Circuit half-open, allowing one probe call");
                    state.phase = BreakerPhase::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful call: closes the breaker and resets the counter.
    pub fn record_success(&self) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.consecutive_failures = 0;
        state.phase = BreakerPhase::Closed;
        state.opened_at = None;
    }

    /// Record a failed call (one per exhausted call, not per retry).
    pub fn record_failure(&self) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.consecutive_failures += 1;

        let failed_probe = state.phase == BreakerPhase::HalfOpen;
        if failed_probe || state.consecutive_failures >= self.failure_threshold {
            state.phase = BreakerPhase::Open;
            state.opened_at = Some(Instant::now());
            warn!(
                consecutive_failures = state.consecutive_failures,
                reopened = failed_probe,
                "Circuit breaker open"
            );
        }
    }

    pub fn phase(&self) -> BreakerPhase {
        match self.state.lock() {
            Ok(guard) => guard.phase,
            Err(poisoned) => poisoned.into_inner().phase,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        match self.state.lock() {
            Ok(guard) => guard.consecutive_failures,
            Err(poisoned) => poisoned.into_inner().consecutive_failures,
        }
    }

    pub fn is_open(&self) -> bool {
        self.phase() == BreakerPhase::Open
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opens_after_threshold() {
        let breaker = CircuitBreaker::with_settings(3, Duration::from_secs(60));

        breaker.record_failure();
        breaker.record_failure();
        assert!(!breaker.is_open());
        assert!(breaker.should_allow());

        breaker.record_failure();
        assert!(breaker.is_open());
        assert!(!breaker.should_allow());
    }

    #[test]
    fn test_success_resets_counter() {
        let breaker = CircuitBreaker::with_settings(3, Duration::from_secs(60));

        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        assert_eq!(breaker.consecutive_failures(), 0);

        // Two more failures stay below threshold again
        breaker.record_failure();
        breaker.record_failure();
        assert!(!breaker.is_open());
    }

    #[test]
    fn test_half_open_allows_exactly_one_probe() {
        let breaker = CircuitBreaker::with_settings(1, Duration::from_millis(10));

        breaker.record_failure();
        assert!(breaker.is_open());

        std::thread::sleep(Duration::from_millis(20));
        assert!(breaker.should_allow());
        assert_eq!(breaker.phase(), BreakerPhase::HalfOpen);

        // Second caller is rejected while the probe is in flight
        assert!(!breaker.should_allow());
    }

    #[test]
    fn test_probe_success_closes() {
        let breaker = CircuitBreaker::with_settings(1, Duration::from_millis(10));

        breaker.record_failure();
        std::thread::sleep(Duration::from_millis(20));
        assert!(breaker.should_allow());

        breaker.record_success();
        assert_eq!(breaker.phase(), BreakerPhase::Closed);
        assert!(breaker.should_allow());
    }

    #[test]
    fn test_probe_failure_reopens() {
        let breaker = CircuitBreaker::with_settings(2, Duration::from_millis(10));

        breaker.record_failure();
        breaker.record_failure();
        std::thread::sleep(Duration::from_millis(20));
        assert!(breaker.should_allow());

        // Failed probe reopens immediately even though the counter is
        // below the threshold reset point
        breaker.record_failure();
        assert!(breaker.is_open());
        assert!(!breaker.should_allow());
    }
}
