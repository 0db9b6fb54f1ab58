//! # ai-client-core
//!
//! Resilient client core for OpenAI-compatible chat APIs.
//!
//! ## Overview
//!
//! This library turns an unreliable network call to a chat-completion
//! endpoint into a bounded, cacheable, fault-tolerant operation, usable
//! both from async code and from a synchronous caller such as a UI
//! thread. It manages resilience for a single configured upstream
//! endpoint per client instance; request orchestration, configuration
//! loading, and presentation belong to the embedding application.
//!
//! ## Key Features
//!
//! - **Circuit breaker**: consecutive failures open the circuit and
//!   calls fail fast until a cooldown elapses ([`resilience`])
//! - **Layered response cache**: bounded in-memory TTL/LRU tier plus an
//!   optional persistent tier, keyed by a canonical request fingerprint
//!   ([`cache`])
//! - **Retry policy**: exponential backoff around transient transport
//!   errors, applied explicitly by the caller ([`RetryPolicy`])
//! - **Error classification**: one transport-boundary mapping into a
//!   uniform [`Error`] taxonomy
//! - **Sync bridging**: a blocking façade and a background-loop runner
//!   for callers without their own scheduler ([`bridge`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_client_core::{ApiClient, ChatOptions, ClientConfig, Message};
//!
//! #[tokio::main]
//! async fn main() -> ai_client_core::Result<()> {
//!     let mut config = ClientConfig::new("http://localhost:1337/v1", "api-key", "llama-3");
//!     config.cache_enabled = true;
//!
//!     let client = ApiClient::new(config)?;
//!     let reply = client
//!         .chat_completion(&[Message::user("Hello!")], &ChatOptions::default())
//!         .await?;
//!     println!("{}", reply.content()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | The resilient API client and its request/response types |
//! | [`cache`] | Two-tier response cache and request fingerprinting |
//! | [`resilience`] | Circuit breaker and retry policy |
//! | [`bridge`] | Blocking façade and background-loop runner |
//! | [`config`] | Configuration surface consumed from the app's loader |
//! | [`types`] | Chat message types |

pub mod bridge;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod resilience;
pub mod types;

mod transport;

pub use bridge::{AsyncBridge, BlockingClient, TaskHandle};
pub use client::{
    ApiClient, ChatCompletion, ChatOptions, ClientStats, ConnectionStatus, ModelDescriptor, Usage,
};
pub use config::{BreakerConfig, ClientConfig};
pub use error::Error;
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState, RetryPolicy};
pub use types::{Message, MessageRole};

/// Result type alias for the library.
pub type Result<T> = std::result::Result<T, Error>;
