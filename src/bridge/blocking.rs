//! Blocking façade over the async client.

use crate::client::{ApiClient, ChatCompletion, ChatOptions, ConnectionStatus, ModelDescriptor};
use crate::config::ClientConfig;
use crate::types::Message;
use crate::Result;
use std::time::Duration;

/// Synchronous mirror of [`ApiClient`] for callers without a scheduler
/// of their own.
///
/// One private current-thread runtime is created at construction and
/// reused for every call, so the transport's connection pool survives
/// across calls. It is torn down on [`close`](Self::close) (or drop),
/// never implicitly per call.
pub struct BlockingClient {
    inner: ApiClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let inner = ApiClient::new(config)?;
        Ok(Self { inner, runtime })
    }

    pub fn chat_completion(
        &self,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<ChatCompletion> {
        self.runtime
            .block_on(self.inner.chat_completion(messages, options))
    }

    pub fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        self.runtime.block_on(self.inner.list_models())
    }

    pub fn health_check(&self) -> bool {
        self.runtime.block_on(self.inner.health_check())
    }

    pub fn test_connection(&self) -> ConnectionStatus {
        self.runtime.block_on(self.inner.test_connection())
    }

    pub fn clear_cache(&self) {
        self.runtime.block_on(self.inner.clear_cache())
    }

    /// The wrapped async client, for shared accessors (stats, snapshots).
    pub fn client(&self) -> &ApiClient {
        &self.inner
    }

    /// Tear down the private runtime, abandoning any connections still
    /// held by the pool.
    pub fn close(self) {
        let Self { inner, runtime } = self;
        drop(inner);
        runtime.shutdown_timeout(Duration::from_secs(1));
    }
}
