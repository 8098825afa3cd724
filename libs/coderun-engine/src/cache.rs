/// Runtime Directory Cache
///
/// Memoizes the execution service's runtime listing for a fixed ttl.
///
/// **Validity:**
/// - Data is served only while `now - fetched_at < ttl`
/// - An expired or empty slot triggers exactly one fetch on the next `get`
/// - The fetched directory and its timestamp are replaced together,
///   even when the service reports no runtimes
///
/// **Failure:**
/// A failed fetch is returned to the caller as-is. There is no stale
/// fallback and no retry, and the slot is left untouched.
///
/// The slot lock is never held across the fetch, so concurrent misses may
/// both hit the service. The last one to finish wins.
use crate::client::{RuntimeDescriptor, RuntimeSource};
use crate::error::ClientError;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    runtimes: Arc<[RuntimeDescriptor]>,
    fetched_at: Instant,
}

pub struct RuntimeCache {
    source: Arc<dyn RuntimeSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    slot: RwLock<Option<CacheEntry>>,
}

impl RuntimeCache {
    pub fn new(source: Arc<dyn RuntimeSource>, ttl: Duration) -> Self {
        Self::with_clock(source, Arc::new(SystemClock), ttl)
    }

    pub fn with_clock(source: Arc<dyn RuntimeSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl,
            slot: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether a `get` right now would be served without a fetch
    pub fn is_valid(&self) -> bool {
        self.fresh().is_some()
    }

    fn fresh(&self) -> Option<Arc<[RuntimeDescriptor]>> {
        let now = self.clock.now();
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);

        slot.as_ref()
            .filter(|entry| now.saturating_duration_since(entry.fetched_at) < self.ttl)
            .map(|entry| Arc::clone(&entry.runtimes))
    }

    #[instrument(skip(self), fields(ttl_secs = self.ttl.as_secs()))]
    pub async fn get(&self) -> Result<Arc<[RuntimeDescriptor]>, ClientError> {
        if let Some(runtimes) = self.fresh() {
            debug!(count = runtimes.len(), "Runtime cache hit");
            return Ok(runtimes);
        }

        info!("Runtime cache miss, fetching runtime directory");
        let runtimes: Arc<[RuntimeDescriptor]> = self.source.fetch_runtimes().await?.into();

        let entry = CacheEntry {
            runtimes: Arc::clone(&runtimes),
            fetched_at: self.clock.now(),
        };
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(entry);

        info!(count = runtimes.len(), "Runtime cache refreshed");
        Ok(runtimes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeClock, FakeSandbox};

    const TTL: Duration = Duration::from_secs(3600);

    fn setup(sandbox: FakeSandbox) -> (Arc<FakeSandbox>, Arc<FakeClock>, RuntimeCache) {
        let sandbox = Arc::new(sandbox);
        let clock = Arc::new(FakeClock::new());
        let cache = RuntimeCache::with_clock(sandbox.clone(), clock.clone(), TTL);
        (sandbox, clock, cache)
    }

    #[tokio::test]
    async fn test_empty_cache_is_invalid() {
        let (sandbox, _clock, cache) = setup(FakeSandbox::with_python());
        assert!(!cache.is_valid());
        assert_eq!(sandbox.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_hit_within_ttl_fetches_once() {
        let (sandbox, clock, cache) = setup(FakeSandbox::with_python());

        let first = cache.get().await.unwrap();
        clock.advance(Duration::from_secs(3599));
        let second = cache.get().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(sandbox.fetch_count(), 1);
        assert!(cache.is_valid());
    }

    #[tokio::test]
    async fn test_expiry_triggers_exactly_one_refetch() {
        let (sandbox, clock, cache) = setup(FakeSandbox::with_python());

        cache.get().await.unwrap();
        clock.advance(TTL);
        assert!(!cache.is_valid());

        cache.get().await.unwrap();
        assert_eq!(sandbox.fetch_count(), 2);

        clock.advance(Duration::from_secs(10));
        cache.get().await.unwrap();
        cache.get().await.unwrap();
        assert_eq!(sandbox.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_refresh_replaces_data() {
        let (sandbox, clock, cache) = setup(FakeSandbox::with_python());

        cache.get().await.unwrap();
        sandbox.set_runtimes(vec![RuntimeDescriptor::new("rust", "1.68.2")]);
        clock.advance(TTL + Duration::from_secs(1));

        let runtimes = cache.get().await.unwrap();
        assert_eq!(runtimes.len(), 1);
        assert_eq!(runtimes[0].language, "rust");
    }

    #[tokio::test]
    async fn test_empty_directory_is_cached() {
        let (sandbox, _clock, cache) = setup(FakeSandbox::new(vec![]));

        assert!(cache.get().await.unwrap().is_empty());
        assert!(cache.get().await.unwrap().is_empty());
        assert_eq!(sandbox.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_and_leaves_slot_empty() {
        let (sandbox, _clock, cache) = setup(FakeSandbox::with_python());
        sandbox.fail_runtimes(true);

        let err = cache.get().await.unwrap_err();
        assert!(err.is_api());
        assert!(!cache.is_valid());

        sandbox.fail_runtimes(false);
        assert_eq!(cache.get().await.unwrap().len(), 1);
        assert_eq!(sandbox.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_expired_failure_has_no_stale_fallback() {
        let (sandbox, clock, cache) = setup(FakeSandbox::with_python());

        cache.get().await.unwrap();
        clock.advance(TTL);
        sandbox.fail_runtimes(true);

        assert!(cache.get().await.is_err());
    }
}
