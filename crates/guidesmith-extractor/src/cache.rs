//! Extraction cache keyed by text fingerprint
//!
//! One `ExtractionCache` is built per process and shared by `Arc`. Ready
//! entries and in-flight computations live behind a single
//! `std::sync::Mutex` that is never held across an `.await`.
//!
//! # Concurrency
//!
//! Concurrent `get_or_extract` calls for one fingerprint share a single
//! computation: the first caller runs it, the others wait on the same
//! `tokio::sync::OnceCell`. A failed computation is reported to the caller
//! that ran it and is never stored; a waiting caller then runs its own
//! attempt. A caller dropped mid-computation hands the slot to the next
//! waiter, or frees it when nobody waits.
//!
//! # Eviction
//!
//! Least recently used by entry count, plus an optional time-to-live.
//! Recency is a monotonically increasing access tick; age is measured with
//! `tokio::time::Instant`, so a paused test clock controls expiry.

use crate::config::CacheConfig;
use crate::types::RuleExtraction;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::debug;

/// BLAKE3 hash of normalized guide text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint of `text`
    pub fn of(text: &str) -> Self {
        Self(*blake3::hash(text.as_bytes()).as_bytes())
    }

    /// Full 64-character hex rendering
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }

    /// First 12 hex characters, for logs
    pub fn short(&self) -> String {
        self.to_hex()[..12].to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// How a `get_or_extract` call was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// A stored entry was returned
    Hit,
    /// This call ran the computation
    Miss,
    /// This call waited on another caller's computation
    Shared,
}

impl CacheStatus {
    /// Whether no computation ran on behalf of this call
    pub fn is_cached(&self) -> bool {
        !matches!(self, CacheStatus::Miss)
    }
}

/// A cached or freshly computed extraction
#[derive(Debug, Clone)]
pub struct CacheOutcome {
    /// The extraction
    pub extraction: RuleExtraction,
    /// How it was obtained
    pub status: CacheStatus,
}

/// Counters for observability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently stored
    pub entries: usize,
    /// Computations currently running
    pub in_flight: usize,
    /// Lookups answered from a stored entry
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
    /// Entries removed to respect `max_entries`
    pub evictions: u64,
}

struct CacheEntry {
    extraction: RuleExtraction,
    created: Instant,
    last_access: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<Fingerprint, CacheEntry>,
    in_flight: HashMap<Fingerprint, Arc<OnceCell<RuleExtraction>>>,
    tick: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl CacheState {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

/// In-memory memo of extraction outcomes
pub struct ExtractionCache {
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl ExtractionCache {
    /// Create an empty cache
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The stored extraction for `fingerprint`, if present and not expired
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<RuleExtraction> {
        let mut state = self.state();
        self.lookup_locked(&mut state, fingerprint)
    }

    fn lookup_locked(&self, state: &mut CacheState, fingerprint: &Fingerprint) -> Option<RuleExtraction> {
        let expired = match state.entries.get(fingerprint) {
            None => {
                state.misses += 1;
                return None;
            }
            Some(entry) => self
                .config
                .ttl()
                .is_some_and(|ttl| entry.created.elapsed() >= ttl),
        };

        if expired {
            state.entries.remove(fingerprint);
            state.misses += 1;
            debug!(fingerprint = %fingerprint.short(), "Cache entry expired");
            return None;
        }

        let tick = state.next_tick();
        state.hits += 1;
        state.entries.get_mut(fingerprint).map(|entry| {
            entry.last_access = tick;
            entry.extraction.clone()
        })
    }

    /// Store an extraction, evicting the least recently used entries beyond
    /// `max_entries`
    pub fn store(&self, fingerprint: Fingerprint, extraction: RuleExtraction) {
        let mut state = self.state();
        Self::insert(&mut state, self.config.max_entries, fingerprint, extraction);
    }

    fn insert(
        state: &mut CacheState,
        max_entries: usize,
        fingerprint: Fingerprint,
        extraction: RuleExtraction,
    ) {
        let tick = state.next_tick();
        state.entries.insert(
            fingerprint,
            CacheEntry {
                extraction,
                created: Instant::now(),
                last_access: tick,
            },
        );

        while state.entries.len() > max_entries {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(key, _)| *key);
            match oldest {
                Some(key) => {
                    state.entries.remove(&key);
                    state.evictions += 1;
                    debug!(fingerprint = %key.short(), "Evicted least recently used entry");
                }
                None => break,
            }
        }
    }

    /// Return the stored extraction or compute it once
    ///
    /// Callers arriving while a computation for the same fingerprint runs
    /// wait for it instead of starting their own. Successful results are
    /// stored; errors are returned to the caller that ran the computation
    /// and leave the cache untouched.
    pub async fn get_or_extract<F, Fut, E>(
        &self,
        fingerprint: Fingerprint,
        extract: F,
    ) -> Result<CacheOutcome, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RuleExtraction, E>>,
    {
        // the entry check and the in-flight registration share one guard so
        // a finished computation is never started again
        let cell = {
            let mut state = self.state();
            if let Some(extraction) = self.lookup_locked(&mut state, &fingerprint) {
                debug!(fingerprint = %fingerprint.short(), "Cache hit");
                return Ok(CacheOutcome {
                    extraction,
                    status: CacheStatus::Hit,
                });
            }
            state
                .in_flight
                .entry(fingerprint)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };
        let guard = InFlightGuard {
            cache: self,
            fingerprint,
            cell,
        };

        let mut ran = false;
        let result = guard
            .cell
            .get_or_try_init(|| {
                ran = true;
                extract()
            })
            .await
            .cloned();

        if ran {
            if let Ok(extraction) = &result {
                let mut state = self.state();
                Self::insert(
                    &mut state,
                    self.config.max_entries,
                    fingerprint,
                    extraction.clone(),
                );
            }
        }
        drop(guard);

        result.map(|extraction| CacheOutcome {
            extraction,
            status: if ran {
                CacheStatus::Miss
            } else {
                CacheStatus::Shared
            },
        })
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored entry
    pub fn clear(&self) {
        self.state().entries.clear();
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        let state = self.state();
        CacheStats {
            entries: state.entries.len(),
            in_flight: state.in_flight.len(),
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
        }
    }
}

/// Releases a caller's hold on an in-flight cell, including when the
/// caller's future is dropped mid-computation
struct InFlightGuard<'a> {
    cache: &'a ExtractionCache,
    fingerprint: Fingerprint,
    cell: Arc<OnceCell<RuleExtraction>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.cache.state();
        let ours = state
            .in_flight
            .get(&self.fingerprint)
            .is_some_and(|current| Arc::ptr_eq(current, &self.cell));
        // the map and this guard account for two references; more means
        // another caller still waits on an unfinished cell
        let idle = Arc::strong_count(&self.cell) <= 2;
        if ours && (self.cell.initialized() || idle) {
            state.in_flight.remove(&self.fingerprint);
        }
    }
}

impl Default for ExtractionCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidesmith_domain::FormatRuleSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn extraction(model: &str) -> RuleExtraction {
        RuleExtraction {
            rules: FormatRuleSet::default(),
            used_fallback: false,
            defaulted_fields: Vec::new(),
            model: model.to_string(),
            attempts: 1,
        }
    }

    fn cache(max_entries: usize, ttl_secs: u64) -> ExtractionCache {
        ExtractionCache::new(CacheConfig {
            max_entries,
            ttl_secs,
        })
    }

    #[test]
    fn test_fingerprint() {
        let a = Fingerprint::of("Use Arial 11pt");
        assert_eq!(a, Fingerprint::of("Use Arial 11pt"));
        assert_ne!(a, Fingerprint::of("Use Arial 12pt"));
        assert_eq!(a.to_hex().len(), 64);
        assert_eq!(a.short().len(), 12);
        assert_eq!(a.to_string(), a.to_hex());
    }

    #[tokio::test]
    async fn test_lookup_and_store() {
        let cache = ExtractionCache::default();
        let key = Fingerprint::of("guide");

        assert!(cache.lookup(&key).is_none());
        cache.store(key, extraction("m"));
        assert_eq!(cache.lookup(&key).unwrap().model, "m");

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = cache(2, 0);
        let (a, b, c) = (
            Fingerprint::of("a"),
            Fingerprint::of("b"),
            Fingerprint::of("c"),
        );

        cache.store(a, extraction("a"));
        cache.store(b, extraction("b"));
        // touch a so b becomes least recently used
        assert!(cache.lookup(&a).is_some());
        cache.store(c, extraction("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.lookup(&a).is_some());
        assert!(cache.lookup(&b).is_none());
        assert!(cache.lookup(&c).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let cache = cache(10, 60);
        let key = Fingerprint::of("guide");
        cache.store(key, extraction("m"));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.lookup(&key).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.lookup(&key).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_never_expires() {
        let cache = cache(10, 0);
        let key = Fingerprint::of("guide");
        cache.store(key, extraction("m"));

        tokio::time::advance(Duration::from_secs(365 * 24 * 3600)).await;
        assert!(cache.lookup(&key).is_some());
    }

    #[tokio::test]
    async fn test_get_or_extract_miss_then_hit() {
        let cache = ExtractionCache::default();
        let key = Fingerprint::of("guide");
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_extract(key, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(extraction("m"))
            })
            .await
            .unwrap();
        assert_eq!(first.status, CacheStatus::Miss);

        let second = cache
            .get_or_extract(key, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(extraction("other"))
            })
            .await
            .unwrap();
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(second.extraction.model, "m");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().in_flight, 0);
    }

    #[tokio::test]
    async fn test_errors_not_cached() {
        let cache = ExtractionCache::default();
        let key = Fingerprint::of("guide");

        let failed = cache
            .get_or_extract(key, || async { Err::<RuleExtraction, _>("backend down") })
            .await;
        assert_eq!(failed.unwrap_err(), "backend down");
        assert!(cache.is_empty());
        assert_eq!(cache.stats().in_flight, 0);

        let retried = cache
            .get_or_extract(key, || async { Ok::<_, &str>(extraction("m")) })
            .await
            .unwrap();
        assert_eq!(retried.status, CacheStatus::Miss);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_computation() {
        let cache = Arc::new(ExtractionCache::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = Fingerprint::of("guide");

        let mut handles = Vec::new();
        for _ in 0..5 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_extract(key, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_secs(2)).await;
                        Ok::<_, String>(extraction("m"))
                    })
                    .await
            }));
        }

        let mut statuses = Vec::new();
        for handle in handles {
            statuses.push(handle.await.unwrap().unwrap().status);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            statuses.iter().filter(|s| **s == CacheStatus::Miss).count(),
            1
        );
        assert_eq!(
            statuses.iter().filter(|s| **s == CacheStatus::Shared).count(),
            4
        );
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_retries_after_failure() {
        let cache = Arc::new(ExtractionCache::default());
        let key = Fingerprint::of("guide");
        let calls = Arc::new(AtomicUsize::new(0));

        let failing = {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                cache
                    .get_or_extract(key, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        Err::<RuleExtraction, _>("transient".to_string())
                    })
                    .await
            })
        };
        // let the failing computation start first
        tokio::task::yield_now().await;

        let waiting = {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                cache
                    .get_or_extract(key, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, String>(extraction("second"))
                    })
                    .await
            })
        };

        assert!(failing.await.unwrap().is_err());
        let outcome = waiting.await.unwrap().unwrap();
        assert_eq!(outcome.status, CacheStatus::Miss);
        assert_eq!(outcome.extraction.model, "second");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.lookup(&key).unwrap().model, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_computation_releases_in_flight_slot() {
        let cache = ExtractionCache::default();
        let key = Fingerprint::of("guide");

        let abandoned = tokio::time::timeout(
            Duration::from_secs(1),
            cache.get_or_extract(key, || async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, String>(extraction("slow"))
            }),
        )
        .await;

        assert!(abandoned.is_err());
        assert_eq!(cache.stats().in_flight, 0);
        assert!(cache.is_empty());

        let outcome = cache
            .get_or_extract(key, || async { Ok::<_, String>(extraction("m")) })
            .await
            .unwrap();
        assert_eq!(outcome.status, CacheStatus::Miss);
        assert_eq!(cache.stats().in_flight, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_finished_computation_never_repeats() {
        for round in 0..200 {
            let cache = Arc::new(ExtractionCache::default());
            let calls = Arc::new(AtomicUsize::new(0));
            let key = Fingerprint::of(&format!("guide {}", round));

            let mut handles = Vec::new();
            for _ in 0..4 {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                handles.push(tokio::spawn(async move {
                    cache
                        .get_or_extract(key, || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, String>(extraction("m"))
                        })
                        .await
                }));
            }
            for handle in handles {
                handle.await.unwrap().unwrap();
            }

            assert_eq!(calls.load(Ordering::SeqCst), 1, "round {}", round);
            assert_eq!(cache.stats().in_flight, 0);
        }
    }
}
