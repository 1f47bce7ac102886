//! In-process key-value store with per-entry expiry
//!
//! Used when no Redis instance is configured (`CACHE_BACKEND=memory`) and in tests.
//!
//! Eviction runs only when an insert finds the store full. It drops expired entries
//! and then, if still full, the `1/EVICTION_FRACTION` entries closest to expiry. Each
//! pass is O(n) but frees room for many subsequent inserts.

use crate::core::Result;
use crate::storage::CacheStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Share of capacity freed by one eviction pass.
const EVICTION_FRACTION: usize = 16;

struct StoredValue {
    value: Vec<u8>,
    expires_at: Instant,
}

pub struct MemoryStore {
    entries: RwLock<HashMap<Vec<u8>, StoredValue>>,
    capacity: usize,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes raw bytes under `key`, bypassing any serialization.
    pub fn insert_raw(&self, key: &[u8], value: &[u8], ttl: Duration) {
        let mut entries = self.entries.write();

        if !entries.contains_key(key) && entries.len() >= self.capacity {
            self.evict(&mut entries);
        }

        entries.insert(
            key.to_vec(),
            StoredValue {
                value: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn evict(&self, entries: &mut HashMap<Vec<u8>, StoredValue>) {
        let now = Instant::now();
        entries.retain(|_, stored| stored.expires_at > now);

        if entries.len() < self.capacity {
            return;
        }

        // Still full after dropping expired entries: evict the batch closest to expiry.
        let batch = (self.capacity / EVICTION_FRACTION).max(1).min(entries.len());
        let mut by_expiry: Vec<(Instant, &Vec<u8>)> = entries
            .iter()
            .map(|(key, stored)| (stored.expires_at, key))
            .collect();
        by_expiry.select_nth_unstable_by_key(batch - 1, |(expires_at, _)| *expires_at);
        let victims: Vec<Vec<u8>> = by_expiry[..batch]
            .iter()
            .map(|(_, key)| (*key).clone())
            .collect();

        for key in victims {
            entries.remove(&key);
        }
    }

    /// Removes `key` only if it is still expired under the write lock, so a value
    /// written after the caller's read survives.
    fn remove_if_expired(&self, key: &[u8]) {
        let mut entries = self.entries.write();
        let expired = entries
            .get(key)
            .is_some_and(|stored| stored.expires_at <= Instant::now());
        if expired {
            entries.remove(key);
        }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(stored) if stored.expires_at > Instant::now() => {
                    return Ok(Some(stored.value.clone()))
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        self.remove_if_expired(key);
        Ok(None)
    }

    async fn set_ex(&self, key: &[u8], value: &[u8], ttl: Duration) -> Result<()> {
        self.insert_raw(key, value, ttl);
        Ok(())
    }
}
