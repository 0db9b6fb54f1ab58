use std::time::Duration;
use thiserror::Error;

/// Unified error type for the client core.
///
/// Classification happens exactly once, at the transport boundary
/// (`client::classify`); everything downstream — the retry policy, the
/// circuit breaker, the cache layer — matches on these kinds and never
/// re-inspects raw transport errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport deadline exceeded.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The endpoint could not be reached at all.
    #[error("could not connect to API server: {0}")]
    ConnectionFailed(String),

    /// Endpoint reachable, but upstream reports the model/engine is not
    /// ready. Callers should prompt the user to start the model rather
    /// than retry.
    #[error("model is not loaded: {0}")]
    ModelNotLoaded(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("authentication failed; check your API key")]
    AuthenticationFailed,

    #[error("API endpoint not found; check your base URL")]
    EndpointNotFound,

    /// Any other non-success HTTP status, with upstream detail when the
    /// body carried one.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Response body did not parse or lacked expected fields.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Fast-fail issued before any transport attempt. Distinct from the
    /// transport kinds so callers can tell "give up now" apart from
    /// "upstream is unwell".
    #[error("circuit breaker open{}", format_retry_after(.retry_after))]
    CircuitOpen { retry_after: Option<Duration> },

    /// A call submitted to the background loop was dropped before its
    /// result slot was fulfilled.
    #[error("background task canceled before completion")]
    Canceled,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_retry_after(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!("; retry in {:.1}s", d.as_secs_f64()),
        None => String::new(),
    }
}

impl Error {
    /// Whether the retry policy may re-attempt the operation.
    ///
    /// Only transient transport failures qualify; everything else either
    /// needs caller action (`ModelNotLoaded`, auth, bad request) or is a
    /// deliberate fast-fail (`CircuitOpen`).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::ConnectionFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_kinds() {
        assert!(Error::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(Error::ConnectionFailed("refused".into()).is_retryable());
        assert!(!Error::ModelNotLoaded("engine down".into()).is_retryable());
        assert!(!Error::AuthenticationFailed.is_retryable());
        assert!(!Error::CircuitOpen { retry_after: None }.is_retryable());
        assert!(!Error::Http {
            status: 500,
            message: "boom".into()
        }
        .is_retryable());
    }

    #[test]
    fn circuit_open_display_includes_remaining() {
        let e = Error::CircuitOpen {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert_eq!(e.to_string(), "circuit breaker open; retry in 30.0s");

        let e = Error::CircuitOpen { retry_after: None };
        assert_eq!(e.to_string(), "circuit breaker open");
    }
}
