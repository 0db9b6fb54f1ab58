//! # Resilience Primitives Module
//!
//! Failure isolation and recovery for the API client.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`circuit_breaker`] | Circuit breaker state machine for failure isolation |
//! | [`retry`] | Exponential-backoff retry wrapper for transient errors |
//!
//! The circuit breaker stops sending requests to a consistently failing
//! endpoint:
//! - **Closed**: normal operation, requests pass through
//! - **Open**: failures hit the threshold, requests fail fast
//! - **Half-Open**: cooldown elapsed, a probe tests recovery
//!
//! ```rust
//! use ai_client_core::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
//! use std::time::Duration;
//!
//! let breaker = CircuitBreaker::new(
//!     CircuitBreakerConfig::new()
//!         .with_fail_max(3)
//!         .with_reset_timeout(Duration::from_secs(60)),
//! );
//! if breaker.allow() {
//!     // make the call...
//!     breaker.after_call(true);
//! }
//! ```

pub mod circuit_breaker;
pub mod retry;

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSnapshot, CircuitState,
};
pub use retry::RetryPolicy;
