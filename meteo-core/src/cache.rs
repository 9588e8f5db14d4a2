//! Generic in-memory cache with a fixed time-to-live per instance.
//!
//! Eviction is lazy: an expired entry is removed the next time it is read,
//! there is no background sweep. The cache knows nothing about what it
//! stores and cannot fail; absence is the normal miss outcome.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: DateTime<Utc>,
}

/// Key-value store whose entries expire `ttl` after they were written.
///
/// Interior mutability lets the owning service hand out `&self` while still
/// overwriting entries; each operation holds the lock for a single map
/// access only.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: TimeDelta,
    clock: Clock,
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").field("ttl", &self.ttl).finish()
    }
}

impl<V: Clone> TtlCache<V> {
    /// Cache backed by the system clock.
    pub fn new(ttl_secs: u64) -> Self {
        Self::with_clock(ttl_secs, Box::new(Utc::now))
    }

    /// Cache with an injected clock, for deterministic expiry tests.
    pub fn with_clock(ttl_secs: u64, clock: Clock) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: TimeDelta::seconds(ttl_secs as i64),
            clock,
        }
    }

    /// Returns the stored value if it is still within its TTL.
    /// An expired entry is evicted and reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = (self.clock)();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get(key) {
            Some(entry) if now - entry.created_at <= self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `value` under `key`, replacing any previous entry and
    /// restarting its TTL.
    pub fn set(&self, key: &str, value: V) {
        let entry = CacheEntry {
            value,
            created_at: (self.clock)(),
        };
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), entry);
    }
}
