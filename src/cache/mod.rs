//! Response Cache
//!
//! Process-local map from a request fingerprint to the last successful
//! upstream result. Entries expire lazily: a read older than the TTL behaves
//! like a miss and the stale value stays until the next write for that key.
//! There is no capacity bound.
//!
//! Concurrent misses for the same key are coalesced in [`ResponseCache::get_or_fetch`]
//! so only one of them reaches the upstream.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Build the cache key for a provider and the raw query text.
pub fn fingerprint(provider: &str, query: &str) -> String {
    format!("{}:{}", provider, query)
}

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Per-key gate shared by every caller currently missing on that key.
#[derive(Default)]
struct Flight {
    gate: Arc<tokio::sync::Mutex<()>>,
    participants: usize,
}

type FlightMap = Mutex<HashMap<String, Flight>>;

/// Leaves the flight for `key` when dropped, including when the caller's
/// future is cancelled mid-fetch. The last one out removes the entry.
struct FlightTicket<'a> {
    in_flight: &'a FlightMap,
    key: &'a str,
}

impl<'a> FlightTicket<'a> {
    fn join(in_flight: &'a FlightMap, key: &'a str) -> (Self, Arc<tokio::sync::Mutex<()>>) {
        let mut map = lock(in_flight);
        let flight = map.entry(key.to_string()).or_default();
        flight.participants += 1;
        let gate = flight.gate.clone();
        (Self { in_flight, key }, gate)
    }
}

impl Drop for FlightTicket<'_> {
    fn drop(&mut self) {
        let mut map = lock(self.in_flight);
        if let Some(flight) = map.get_mut(self.key) {
            flight.participants = flight.participants.saturating_sub(1);
            if flight.participants == 0 {
                map.remove(self.key);
            }
        }
    }
}

pub struct ResponseCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    in_flight: FlightMap,
    ttl: Duration,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Fresh value for `key`, or `None` if missing or expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        lock(&self.entries)
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl, now))
            .map(|entry| entry.value.clone())
    }

    /// Insert or overwrite the entry for `key`, stamped with the current time.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
        };
        lock(&self.entries).insert(key.into(), entry);
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached value for `key`, or run `fetch` and store its result.
    ///
    /// The boolean is `true` when the value came from the cache. Callers that
    /// miss while another fetch for the same key is running wait for it and
    /// then read its result from the cache. Errors are never stored.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<(V, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            debug!(key = %key, "Cache hit");
            return Ok((value, true));
        }

        let (_ticket, gate) = FlightTicket::join(&self.in_flight, key);
        let _turn = gate.lock().await;

        // Another caller may have filled the entry while we waited.
        if let Some(value) = self.get(key) {
            debug!(key = %key, "Cache hit after waiting on in-flight fetch");
            return Ok((value, true));
        }

        debug!(key = %key, "Cache miss, fetching");
        let result = fetch().await;
        if let Ok(value) = &result {
            self.set(key, value.clone());
        }

        result.map(|value| (value, false))
    }
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Critical sections never panic midway, so a poisoned map is still consistent.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
