//! Error classification at the transport boundary.
//!
//! Every transport outcome is mapped to an [`Error`] kind exactly once,
//! here; the breaker, the cache layer, and callers all observe the
//! classified kind.

use crate::Error;
use std::time::Duration;

/// Classify a transport-level failure (no HTTP status available).
pub(crate) fn transport_error(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        return Error::Timeout(timeout);
    }
    if err.is_connect() {
        return Error::ConnectionFailed(format!("{}; is the server running?", err));
    }
    Error::ConnectionFailed(err.to_string())
}

/// Classify a non-success HTTP response, consuming its body for detail.
pub(crate) async fn status_error(resp: reqwest::Response) -> Error {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let detail = error_detail(&body);
    match status {
        400 if detail.to_lowercase().contains("not loaded") => Error::ModelNotLoaded(detail),
        400 => Error::BadRequest(detail),
        401 => Error::AuthenticationFailed,
        404 => Error::EndpointNotFound,
        _ => Error::Http {
            status,
            message: detail,
        },
    }
}

/// Pull the upstream error message out of the body.
///
/// Local servers answer `{"message": ...}`, OpenAI-style servers answer
/// `{"error": {"message": ...}}`; anything else falls back to the raw
/// body text.
fn error_detail(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
        if let Some(msg) = json
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
    }
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_flat_message() {
        assert_eq!(
            error_detail(r#"{"message": "Engine is not loaded"}"#),
            "Engine is not loaded"
        );
    }

    #[test]
    fn extracts_nested_error_message() {
        assert_eq!(
            error_detail(r#"{"error": {"message": "invalid model", "type": "invalid_request_error"}}"#),
            "invalid model"
        );
    }

    #[test]
    fn falls_back_to_raw_body() {
        assert_eq!(error_detail("upstream exploded"), "upstream exploded");
        assert_eq!(error_detail(r#"{"code": 7}"#), r#"{"code": 7}"#);
    }
}
