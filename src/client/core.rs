use crate::cache::{fingerprint, CacheStats, DiskStore, ResponseCache, MODELS_KEY};
use crate::client::classify;
use crate::client::types::{
    ChatCompletion, ChatOptions, ClientStats, ConnectionStatus, ModelDescriptor, ModelsResponse,
};
use crate::config::ClientConfig;
use crate::resilience::circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSnapshot,
};
use crate::transport::HttpTransport;
use crate::types::Message;
use crate::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

/// Resilient client for one OpenAI-compatible endpoint.
///
/// Every operation is gated by the circuit breaker and backed by the
/// layered response cache. Operations never retry internally; compose a
/// [`RetryPolicy`](crate::resilience::RetryPolicy) around a call when
/// re-attempts are wanted.
pub struct ApiClient {
    config: ClientConfig,
    transport: HttpTransport,
    cache: ResponseCache,
    breaker: CircuitBreaker,
    requests: AtomicU64,
    errors: AtomicU64,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = config.validate()?;
        let transport = HttpTransport::new(&base_url, &config.api_key, config.timeout())?;

        let mut cache = ResponseCache::new(
            config.cache_size,
            config.cache_ttl(),
            config.cache_enabled,
        );
        if let Some(dir) = &config.cache_dir {
            cache = cache.with_disk(DiskStore::new(dir)?);
        }

        let breaker = CircuitBreaker::new(
            CircuitBreakerConfig::new()
                .with_fail_max(config.circuit_breaker.fail_max)
                .with_reset_timeout(Duration::from_secs(config.circuit_breaker.reset_timeout)),
        );

        Ok(Self {
            config,
            transport,
            cache,
            breaker,
            requests: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a chat completion request.
    ///
    /// Cache hits count as breaker successes and skip the network
    /// entirely; misses go to the transport, and a successful response is
    /// stored in both cache tiers before it is returned.
    pub async fn chat_completion(
        &self,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<ChatCompletion> {
        if !self.breaker.allow() {
            return Err(self.circuit_open());
        }

        let payload = self.chat_payload(messages, options);
        let key = fingerprint(&payload);
        if let Some(cached) = self.cache.get::<ChatCompletion>(&key).await {
            self.breaker.after_call(true);
            debug!(fingerprint = %key, "chat completion served from cache");
            return Ok(cached);
        }

        match self.post_chat(&payload).await {
            Ok(completion) => {
                self.breaker.after_call(true);
                self.cache.put(&key, &completion).await;
                Ok(completion)
            }
            Err(e) => {
                self.breaker.after_call(false);
                self.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    /// List models available from the endpoint.
    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        if !self.breaker.allow() {
            return Err(self.circuit_open());
        }

        if let Some(cached) = self.cache.get::<Vec<ModelDescriptor>>(MODELS_KEY).await {
            self.breaker.after_call(true);
            debug!("model listing served from cache");
            return Ok(cached);
        }

        match self.get_models().await {
            Ok(models) => {
                self.breaker.after_call(true);
                self.cache.put(MODELS_KEY, &models).await;
                Ok(models)
            }
            Err(e) => {
                self.breaker.after_call(false);
                self.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    /// Whether the endpoint currently answers a minimal chat request.
    pub async fn health_check(&self) -> bool {
        self.chat_completion(&[Message::user("hi")], &ChatOptions::default())
            .await
            .is_ok()
    }

    /// Probe the endpoint and report a diagnosis.
    ///
    /// A "model not loaded" outcome still reports `connected = true`: the
    /// endpoint answered, only the model is unavailable.
    pub async fn test_connection(&self) -> ConnectionStatus {
        let start = Instant::now();
        match self
            .chat_completion(&[Message::user("ping")], &ChatOptions::default())
            .await
        {
            Ok(_) => {
                let ms = start.elapsed().as_secs_f64() * 1000.0;
                ConnectionStatus {
                    connected: true,
                    model_loaded: true,
                    latency_ms: Some((ms * 100.0).round() / 100.0),
                    error: None,
                }
            }
            Err(e @ Error::ModelNotLoaded(_)) => ConnectionStatus {
                connected: true,
                model_loaded: false,
                latency_ms: None,
                error: Some(e.to_string()),
            },
            Err(e) => ConnectionStatus {
                connected: false,
                model_loaded: false,
                latency_ms: None,
                error: Some(e.to_string()),
            },
        }
    }

    /// Empty the in-memory cache tier. The persistent tier is untouched;
    /// use [`clear_cache_all`](Self::clear_cache_all) for both.
    pub async fn clear_cache(&self) {
        self.cache.clear_memory().await;
    }

    /// Empty both cache tiers.
    pub async fn clear_cache_all(&self) {
        self.cache.clear_all().await;
    }

    pub fn stats(&self) -> ClientStats {
        ClientStats {
            requests: self.requests.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn breaker_snapshot(&self) -> CircuitBreakerSnapshot {
        self.breaker.snapshot()
    }

    fn circuit_open(&self) -> Error {
        Error::CircuitOpen {
            retry_after: self.breaker.snapshot().open_remaining,
        }
    }

    fn chat_payload(&self, messages: &[Message], options: &ChatOptions) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "stream": false,
            "temperature": options.temperature,
        });
        if let Some(max_tokens) = options.max_tokens {
            payload["max_tokens"] = max_tokens.into();
        }
        payload
    }

    async fn post_chat(&self, payload: &serde_json::Value) -> Result<ChatCompletion> {
        let request_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        self.requests.fetch_add(1, Ordering::Relaxed);

        let resp = self
            .transport
            .post_json("/chat/completions", payload, &request_id)
            .await
            .map_err(|e| classify::transport_error(e, self.config.timeout()))?;

        let http_status = resp.status().as_u16();
        if !resp.status().is_success() {
            let err = classify::status_error(resp).await;
            info!(
                http_status,
                endpoint = "/chat/completions",
                duration_ms = start.elapsed().as_millis() as u64,
                client_request_id = request_id.as_str(),
                error = %err,
                "chat completion request failed"
            );
            return Err(err);
        }

        let completion: ChatCompletion = resp.json().await.map_err(|e| {
            if e.is_decode() {
                Error::InvalidResponse(e.to_string())
            } else {
                classify::transport_error(e, self.config.timeout())
            }
        })?;

        info!(
            http_status,
            endpoint = "/chat/completions",
            duration_ms = start.elapsed().as_millis() as u64,
            client_request_id = request_id.as_str(),
            "chat completion request ok"
        );
        Ok(completion)
    }

    async fn get_models(&self) -> Result<Vec<ModelDescriptor>> {
        let request_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        self.requests.fetch_add(1, Ordering::Relaxed);

        let resp = self
            .transport
            .get("/models", &request_id)
            .await
            .map_err(|e| classify::transport_error(e, self.config.timeout()))?;

        let http_status = resp.status().as_u16();
        if !resp.status().is_success() {
            let err = classify::status_error(resp).await;
            info!(
                http_status,
                endpoint = "/models",
                duration_ms = start.elapsed().as_millis() as u64,
                client_request_id = request_id.as_str(),
                error = %err,
                "model listing request failed"
            );
            return Err(err);
        }

        let listing: ModelsResponse = resp.json().await.map_err(|e| {
            if e.is_decode() {
                Error::InvalidResponse(e.to_string())
            } else {
                classify::transport_error(e, self.config.timeout())
            }
        })?;

        info!(
            http_status,
            endpoint = "/models",
            duration_ms = start.elapsed().as_millis() as u64,
            client_request_id = request_id.as_str(),
            models = listing.data.len(),
            "model listing request ok"
        );
        Ok(listing.data)
    }
}
