//! Checksummed, content-addressed storage for generated plans.
//!
//! Plans are stored serialized together with a SHA-256 checksum of the
//! serialized text. A mismatch on read is treated as a cache miss.

use crate::errors::AppError;
use crate::models::AccountPlan;
use crate::pipeline::PlanRequest;
use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Wrapper for cached data with integrity validation
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidatedCacheEntry {
    /// The actual cached data (JSON string)
    pub data: String,
    /// SHA-256 checksum of the data (hex encoded)
    pub checksum: String,
}

impl ValidatedCacheEntry {
    /// Creates a new validated cache entry with computed checksum
    pub fn new(data: String) -> Self {
        let checksum = sha256_hex(data.as_bytes());
        Self { data, checksum }
    }

    /// Returns true if the checksum matches, false if tampered
    pub fn is_valid(&self) -> bool {
        sha256_hex(self.data.as_bytes()) == self.checksum
    }

    /// Serializes the entry (data and checksum) for storage in cache
    pub fn serialize(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes and validates a cache entry
    ///
    /// Returns Some(data) if valid, None if corrupted or invalid JSON
    pub fn deserialize_and_validate(serialized: &str) -> Option<String> {
        let entry: ValidatedCacheEntry = serde_json::from_str(serialized).ok()?;

        if entry.is_valid() {
            Some(entry.data)
        } else {
            // Checksum mismatch - cache poisoned
            tracing::warn!(
                "Cache validation failed: checksum mismatch. Expected: {}, Data length: {}",
                entry.checksum,
                entry.data.len()
            );
            None
        }
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Content-addressed id for a resolved plan request.
///
/// Identical requests (including `asOf`) always map to the same id.
pub fn plan_id(request: &PlanRequest) -> Result<String, AppError> {
    let canonical = serde_json::to_vec(request)?;
    Ok(sha256_hex(&canonical))
}

/// In-memory store of generated plans keyed by plan id.
#[derive(Clone)]
pub struct PlanCache {
    entries: Cache<String, String>,
}

impl PlanCache {
    /// Creates a cache with the given TTL and maximum number of entries.
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(max_capacity)
                .build(),
        }
    }

    /// Stores a plan under `id`.
    pub async fn insert(&self, id: &str, plan: &AccountPlan) -> Result<(), AppError> {
        let entry = ValidatedCacheEntry::new(serde_json::to_string(plan)?);
        self.entries.insert(id.to_string(), entry.serialize()?).await;
        tracing::debug!("Cached plan {}", id);
        Ok(())
    }

    /// Fetches a plan, treating corrupted entries as missing.
    pub async fn get(&self, id: &str) -> Option<AccountPlan> {
        let serialized = self.entries.get(id).await?;
        let Some(data) = ValidatedCacheEntry::deserialize_and_validate(&serialized) else {
            self.entries.invalidate(id).await;
            return None;
        };

        match serde_json::from_str(&data) {
            Ok(plan) => Some(plan),
            Err(e) => {
                tracing::warn!("Discarding undecodable cached plan {}: {}", id, e);
                self.entries.invalidate(id).await;
                None
            }
        }
    }

    /// Raw access for corruption tests.
    #[cfg(test)]
    pub(crate) async fn insert_raw(&self, id: &str, serialized: String) {
        self.entries.insert(id.to_string(), serialized).await;
    }
}
