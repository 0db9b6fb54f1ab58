//! Persistent cache tier: one JSON record per key, survives restarts.

use super::backend::CacheStore;
use super::key::storage_hash;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// On-disk record format. `expires_at` is absolute epoch seconds so the
/// expiry decision is valid across process restarts.
#[derive(Serialize, Deserialize)]
struct DiskRecord {
    expires_at: f64,
    value: serde_json::Value,
}

/// Disk-backed tier keyed by a content hash of the fingerprint.
///
/// Reads past expiry delete the record and miss; corrupt or unreadable
/// records are deleted and treated as a miss rather than surfaced as
/// read errors.
pub struct DiskStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl DiskStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", storage_hash(key)))
    }

    fn now_epoch() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        if !path.exists() {
            return Ok(None);
        }

        let record: DiskRecord = match fs::read(&path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        {
            Some(record) => record,
            None => {
                debug!(path = %path.display(), "removing corrupt cache record");
                let _ = fs::remove_file(&path);
                return Ok(None);
            }
        };

        if record.expires_at <= Self::now_epoch() {
            let _ = fs::remove_file(&path);
            return Ok(None);
        }
        Ok(Some(serde_json::to_vec(&record.value)?))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let record = DiskRecord {
            expires_at: Self::now_epoch() + ttl.as_secs_f64(),
            value: serde_json::from_slice(value)?,
        };
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");

        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        fs::write(&tmp, serde_json::to_vec(&record)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key);
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        if path.exists() {
            fs::remove_file(&path)?;
            return Ok(true);
        }
        Ok(false)
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let _ = fs::remove_file(&path);
            }
        }
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let count = fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .count();
        Ok(count)
    }

    fn name(&self) -> &'static str {
        "disk"
    }
}
