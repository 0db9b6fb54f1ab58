use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// Breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, calls pass through.
    Closed,
    /// Failing fast, calls are rejected until the reset timeout elapses.
    Open,
    /// Probing, the next call outcome decides between `Closed` and `Open`.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half_open"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the breaker opens.
    pub fail_max: u32,
    /// How long the breaker stays open before admitting a probe.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            fail_max: 3,
            reset_timeout: Duration::from_secs(60),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fail_max(mut self, fail_max: u32) -> Self {
        self.fail_max = fail_max;
        self
    }

    pub fn with_reset_timeout(mut self, reset_timeout: Duration) -> Self {
        self.reset_timeout = reset_timeout;
        self
    }
}

/// Point-in-time view of breaker state for observability.
#[derive(Debug, Clone)]
pub struct CircuitBreakerSnapshot {
    pub state: CircuitState,
    pub failure_count: u32,
    /// Remaining open time, if currently open.
    pub open_remaining: Option<Duration>,
}

#[derive(Debug)]
struct State {
    state: CircuitState,
    failure_count: u32,
    opened_at: Option<Instant>,
}

/// Failure-isolating state machine for a single upstream endpoint.
///
/// All reads and writes funnel through [`allow`](Self::allow) and
/// [`after_call`](Self::after_call); the state lives behind a mutex so a
/// client instance can be shared across threads.
///
/// While `HalfOpen`, every concurrent caller is admitted as a probe; the
/// first reported outcome wins the race to close or reopen. Stricter
/// single-probe admission is deliberately not implemented.
pub struct CircuitBreaker {
    cfg: CircuitBreakerConfig,
    state: Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(cfg: CircuitBreakerConfig) -> Self {
        Self {
            cfg,
            state: Mutex::new(State {
                state: CircuitState::Closed,
                failure_count: 0,
                opened_at: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // State updates cannot panic mid-write, so recover from poison.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Whether a call may proceed. The only side effect is the
    /// `Open -> HalfOpen` transition once the reset timeout has elapsed.
    pub fn allow(&self) -> bool {
        let mut st = self.lock();
        if st.state != CircuitState::Open {
            return true;
        }
        match st.opened_at {
            Some(opened_at) if opened_at.elapsed() >= self.cfg.reset_timeout => {
                st.state = CircuitState::HalfOpen;
                debug!(state = %st.state, "circuit breaker admitting probe");
                true
            }
            _ => false,
        }
    }

    /// Record a call outcome. The only writer of breaker state.
    pub fn after_call(&self, success: bool) {
        let mut st = self.lock();
        if success {
            if st.state != CircuitState::Closed || st.failure_count != 0 {
                debug!(state = "closed", "circuit breaker reset");
            }
            st.state = CircuitState::Closed;
            st.failure_count = 0;
            st.opened_at = None;
            return;
        }

        st.failure_count = st.failure_count.saturating_add(1);
        if st.state == CircuitState::HalfOpen || st.failure_count >= self.cfg.fail_max {
            st.state = CircuitState::Open;
            st.opened_at = Some(Instant::now());
            st.failure_count = self.cfg.fail_max;
            debug!(
                fail_max = self.cfg.fail_max,
                reset_timeout_ms = self.cfg.reset_timeout.as_millis() as u64,
                "circuit breaker opened"
            );
        }
    }

    pub fn snapshot(&self) -> CircuitBreakerSnapshot {
        let st = self.lock();
        let open_remaining = match (st.state, st.opened_at) {
            (CircuitState::Open, Some(opened_at)) => {
                self.cfg.reset_timeout.checked_sub(opened_at.elapsed())
            }
            _ => None,
        };
        CircuitBreakerSnapshot {
            state: st.state,
            failure_count: st.failure_count,
            open_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn breaker(fail_max: u32, reset: Duration) -> CircuitBreaker {
        CircuitBreaker::new(
            CircuitBreakerConfig::new()
                .with_fail_max(fail_max)
                .with_reset_timeout(reset),
        )
    }

    #[test]
    fn starts_closed_and_allows() {
        let cb = breaker(3, Duration::from_secs(60));
        assert!(cb.allow());
        let snap = cb.snapshot();
        assert_eq!(snap.state, CircuitState::Closed);
        assert_eq!(snap.failure_count, 0);
        assert!(snap.open_remaining.is_none());
    }

    #[test]
    fn opens_once_failures_reach_threshold() {
        let cb = breaker(3, Duration::from_secs(60));
        cb.after_call(false);
        cb.after_call(false);
        assert!(cb.allow());
        assert_eq!(cb.snapshot().state, CircuitState::Closed);

        cb.after_call(false);
        assert!(!cb.allow());
        let snap = cb.snapshot();
        assert_eq!(snap.state, CircuitState::Open);
        assert_eq!(snap.failure_count, 3);
        assert!(snap.open_remaining.is_some());

        // Further failures keep it open with the count pinned.
        cb.after_call(false);
        cb.after_call(false);
        assert!(!cb.allow());
        assert_eq!(cb.snapshot().failure_count, 3);
    }

    #[test]
    fn success_resets_failure_count() {
        let cb = breaker(5, Duration::from_secs(60));
        cb.after_call(false);
        cb.after_call(false);
        assert_eq!(cb.snapshot().failure_count, 2);

        cb.after_call(true);
        let snap = cb.snapshot();
        assert_eq!(snap.state, CircuitState::Closed);
        assert_eq!(snap.failure_count, 0);
    }

    #[test]
    fn half_open_after_reset_timeout_then_success_closes() {
        let cb = breaker(2, Duration::from_millis(50));
        cb.after_call(false);
        cb.after_call(false);
        assert!(!cb.allow());

        thread::sleep(Duration::from_millis(60));

        // allow() performs the Open -> HalfOpen transition.
        assert!(cb.allow());
        assert_eq!(cb.snapshot().state, CircuitState::HalfOpen);

        cb.after_call(true);
        let snap = cb.snapshot();
        assert_eq!(snap.state, CircuitState::Closed);
        assert_eq!(snap.failure_count, 0);
    }

    #[test]
    fn half_open_failure_reopens_immediately() {
        let cb = breaker(5, Duration::from_millis(50));
        for _ in 0..5 {
            cb.after_call(false);
        }
        thread::sleep(Duration::from_millis(60));
        assert!(cb.allow());
        assert_eq!(cb.snapshot().state, CircuitState::HalfOpen);

        // A single probe failure reopens, regardless of fail_max.
        cb.after_call(false);
        assert_eq!(cb.snapshot().state, CircuitState::Open);
        assert!(!cb.allow());
    }

    #[test]
    fn shared_across_threads() {
        use std::sync::Arc;

        let cb = Arc::new(breaker(100, Duration::from_secs(60)));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cb = Arc::clone(&cb);
            handles.push(thread::spawn(move || {
                for _ in 0..5 {
                    cb.after_call(false);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cb.snapshot().failure_count, 40);
        assert_eq!(cb.snapshot().state, CircuitState::Closed);
    }
}
