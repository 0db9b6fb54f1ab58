//! # Response Caching Module
//!
//! Two-tier response cache keyed by a canonical request fingerprint.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ResponseCache`] | Layered manager: memory tier, optional persistent tier |
//! | [`CacheStore`] | Storage contract implemented by every tier |
//! | [`MemoryStore`] | Bounded TTL tier with LRU eviction |
//! | [`DiskStore`] | Persistent tier, one JSON record per key |
//! | [`fingerprint`] | Canonical request fingerprinting |
//!
//! Entries are visible only while unexpired; the memory tier additionally
//! enforces a maximum entry count with least-recently-used eviction. The
//! tiers share one storage contract, so the client never branches on
//! which tier it is talking to beyond the promote-on-hit step.

pub mod backend;
pub mod disk;
pub mod key;
pub mod manager;

pub use backend::{CacheStore, MemoryStore};
pub use disk::DiskStore;
pub use key::{fingerprint, MODELS_KEY};
pub use manager::{CacheStats, ResponseCache};
