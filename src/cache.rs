//! Keyed in-memory cache with per-entry TTL and a FIFO bound.
//!
//! Constructed once at startup and handed to the serving layer by reference,
//! so tests can inject their own instance. The lock is held across the
//! producer await in [`Cache::get_or_compute`], so concurrent misses for the
//! same key do not duplicate upstream calls.

use {
    std::{
        collections::VecDeque,
        future::Future,
        time::Instant,
    },
    tokio::sync::Mutex,
    crate::prelude::*,
};

pub(crate) const DEFAULT_MAX_ENTRIES: usize = 16;

struct Entry<V> {
    stored: Instant,
    ttl: Duration,
    value: V,
}

impl<V> Entry<V> {
    fn is_fresh(&self) -> bool {
        self.stored.elapsed() < self.ttl
    }
}

pub(crate) struct Cache<V> {
    inner: Mutex<Inner<V>>,
}

struct Inner<V> {
    entries: HashMap<String, Entry<V>>,
    insertion_order: VecDeque<String>,
    max_entries: usize,
}

impl<V> Inner<V> {
    fn insert(&mut self, key: &str, value: V, ttl: Duration) {
        if !self.entries.contains_key(key) {
            while self.entries.len() >= self.max_entries {
                let Some(oldest) = self.insertion_order.pop_front() else { break };
                self.entries.remove(&oldest);
            }
            self.insertion_order.push_back(key.to_owned());
        }
        self.entries.insert(key.to_owned(), Entry { stored: Instant::now(), value, ttl });
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.insertion_order.retain(|stored_key| stored_key != key);
    }
}

impl<V: Clone> Cache<V> {
    pub(crate) fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::default(),
                insertion_order: VecDeque::default(),
                max_entries,
            }),
        }
    }

    pub(crate) async fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock().await;
        match inner.entries.get(key) {
            Some(entry) if entry.is_fresh() => Some(entry.value.clone()),
            Some(_) => {
                inner.remove(key);
                None
            }
            None => None,
        }
    }

    pub(crate) async fn set(&self, key: &str, value: V, ttl: Duration) {
        self.inner.lock().await.insert(key, value, ttl);
    }

    /// Returns the cached value if present and not expired, otherwise runs
    /// `producer`, stores the result, and returns it.
    pub(crate) async fn get_or_compute<F, Fut>(&self, key: &str, ttl: Duration, producer: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let mut inner = self.inner.lock().await;
        if let Some(entry) = inner.entries.get(key) {
            if entry.is_fresh() {
                return entry.value.clone()
            }
        }
        let value = producer().await;
        inner.insert(key, value.clone(), ttl);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn miss_then_hit() {
        let cache = Cache::new(DEFAULT_MAX_ENTRIES);
        assert_eq!(cache.get("tournaments").await, None::<u32>);
        cache.set("tournaments", 17, TTL).await;
        assert_eq!(cache.get("tournaments").await, Some(17));
    }

    #[tokio::test]
    async fn expired_entries_read_as_misses() {
        let cache = Cache::new(DEFAULT_MAX_ENTRIES);
        cache.set("tournaments", 17, Duration::ZERO).await;
        assert_eq!(cache.get("tournaments").await, None);
    }

    #[tokio::test]
    async fn get_or_compute_runs_the_producer_once() {
        let cache = Cache::new(DEFAULT_MAX_ENTRIES);
        let first = cache.get_or_compute("tournaments", TTL, || async { 1 }).await;
        let second = cache.get_or_compute("tournaments", TTL, || async { 2 }).await;
        assert_eq!((first, second), (1, 1));
    }

    #[tokio::test]
    async fn oldest_entry_is_evicted_past_the_bound() {
        let cache = Cache::new(2);
        cache.set("a", 1, TTL).await;
        cache.set("b", 2, TTL).await;
        cache.set("c", 3, TTL).await;
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, Some(2));
        assert_eq!(cache.get("c").await, Some(3));
    }

    #[tokio::test]
    async fn overwriting_a_key_keeps_its_insertion_slot() {
        let cache = Cache::new(2);
        cache.set("a", 1, TTL).await;
        cache.set("b", 2, TTL).await;
        cache.set("a", 10, TTL).await;
        cache.set("c", 3, TTL).await;
        // "a" was inserted first, so it is the FIFO victim despite the rewrite
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, Some(2));
        assert_eq!(cache.get("c").await, Some(3));
    }
}
