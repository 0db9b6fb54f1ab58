//! # Sync/Async Bridging Module
//!
//! Two adapters over the async core for callers that cannot run a
//! scheduler of their own:
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`BlockingClient`] | Call-scoped blocking façade over [`ApiClient`](crate::ApiClient) |
//! | [`AsyncBridge`] | Long-lived background loop for interactive front ends |
//! | [`TaskHandle`] | Result slot returned by [`AsyncBridge::submit`] |
//!
//! `BlockingClient` is for sequential callers (scripts, tests, simple
//! tools): each call runs to completion on a private runtime that is
//! reused while the client is open. `AsyncBridge` is for UI threads that
//! must never block: work is handed to a dedicated worker thread and the
//! caller polls or blocks on the returned handle at its own pace.

pub mod blocking;
pub mod worker;

pub use blocking::BlockingClient;
pub use worker::{AsyncBridge, TaskHandle};
