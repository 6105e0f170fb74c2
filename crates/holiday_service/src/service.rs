//! The holiday service façade.
//!
//! Owns the resolved-list cache and the in-flight request map as explicit
//! instance state (constructed once per process; fresh instances give test
//! isolation). Guarantees that for a given (city, year) key at most one
//! resolution runs at a time and that every concurrent caller receives the
//! identical shared result.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use common::{City, Error, Holiday, ResolutionKey};
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::resolver::HolidayResolver;

type ResolvedList = Arc<Vec<Holiday>>;
type Outcome = Result<ResolvedList, Arc<Error>>;
type InFlightRx = watch::Receiver<Option<Outcome>>;

/// One cached resolution. Read-only once constructed; a refresh replaces
/// the entry wholesale.
struct CacheEntry {
    records: ResolvedList,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

#[derive(Default)]
struct ServiceState {
    cache: HashMap<ResolutionKey, CacheEntry>,
    in_flight: HashMap<ResolutionKey, InFlightRx>,
}

/// What this call has to do for the key, decided under the state lock.
enum Role {
    Leader(watch::Sender<Option<Outcome>>),
    Waiter(InFlightRx),
}

pub struct HolidayService {
    resolver: HolidayResolver,
    ttl: Duration,
    state: Mutex<ServiceState>,
}

impl HolidayService {
    pub fn new(resolver: HolidayResolver, ttl: Duration) -> Self {
        Self {
            resolver,
            ttl,
            state: Mutex::new(ServiceState::default()),
        }
    }

    /// Resolve the holiday list for a city and year.
    ///
    /// Serves from cache when a fresh entry exists, joins an in-flight
    /// resolution when one is running, and otherwise performs the
    /// resolution itself. Never fails outward: a resolution error (which
    /// the resolver's fallbacks make unreachable in practice) degrades to
    /// an empty list and is not cached, so the next caller retries.
    pub async fn get_holidays(&self, city: &str, year: i32) -> ResolvedList {
        let key = ResolutionKey::new(City::parse(city), year);

        let role = {
            let mut state = self.state.lock().await;

            if let Some(entry) = state.cache.get(&key) {
                if entry.is_fresh(self.ttl) {
                    debug!(key = %key, "cache_hit");
                    return entry.records.clone();
                }
            }

            if let Some(rx) = state.in_flight.get(&key) {
                debug!(key = %key, "coalesced");
                Role::Waiter(rx.clone())
            } else {
                debug!(key = %key, "cache_miss");
                let (tx, rx) = watch::channel(None);
                state.in_flight.insert(key, rx);
                Role::Leader(tx)
            }
        };

        match role {
            Role::Waiter(mut rx) => {
                // wait_for checks the current value first, so a result
                // broadcast between map lookup and this await is not lost.
                let outcome = match rx.wait_for(|v| v.is_some()).await {
                    Ok(value) => value.clone(),
                    Err(_) => None,
                };
                match outcome {
                    Some(Ok(records)) => records,
                    Some(Err(_)) | None => Arc::new(Vec::new()),
                }
            }
            Role::Leader(tx) => {
                let outcome: Outcome = self
                    .resolver
                    .resolve(key.city, key.year)
                    .await
                    .map(Arc::new)
                    .map_err(Arc::new);

                {
                    let mut state = self.state.lock().await;
                    // The in-flight entry goes away whatever happened;
                    // caching is a separate step taken only on success.
                    state.in_flight.remove(&key);
                    if let Ok(records) = &outcome {
                        state.cache.insert(
                            key,
                            CacheEntry {
                                records: records.clone(),
                                fetched_at: Instant::now(),
                            },
                        );
                    }
                }

                let result = match &outcome {
                    Ok(records) => records.clone(),
                    Err(e) => {
                        warn!(key = %key, reason = %e, "resolution failed; returning empty list");
                        Arc::new(Vec::new())
                    }
                };
                let _ = tx.send(Some(outcome));
                result
            }
        }
    }

    /// Date-only projection of `get_holidays`, for pure day-classification
    /// consumers.
    pub async fn get_holiday_dates(&self, city: &str, year: i32) -> Vec<NaiveDate> {
        self.get_holidays(city, year)
            .await
            .iter()
            .map(|h| h.date)
            .collect()
    }

    /// Drop all cached and in-flight state. Operational escape hatch, not
    /// part of the normal flow.
    pub async fn clear_cache(&self) {
        let mut state = self.state.lock().await;
        state.cache.clear();
        state.in_flight.clear();
        info!("cache_cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::NationalSource;
    use crate::table;
    use async_trait::async_trait;
    use common::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(3600);

    struct RegistryFake {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl RegistryFake {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NationalSource for RegistryFake {
        async fn national_holidays(&self, year: i32) -> Result<Arc<Vec<Holiday>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay > Duration::ZERO {
                tokio::time::sleep(self.delay).await;
            }
            Ok(Arc::new(table::national_holidays(year)))
        }

        fn name(&self) -> &'static str {
            "registry-fake"
        }
    }

    fn service_with(registry: Arc<RegistryFake>) -> Arc<HolidayService> {
        Arc::new(HolidayService::new(
            HolidayResolver::new(registry),
            TTL,
        ))
    }

    #[tokio::test]
    async fn test_concurrent_requests_coalesce_into_one_fetch() {
        let registry = RegistryFake::slow(Duration::from_millis(50));
        let service = service_with(registry.clone());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.get_holidays("salvador", 2025).await
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(registry.calls(), 1);
        // Every caller got the identical shared list, not a copy.
        for other in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], other));
        }
        assert_eq!(results[0].len(), 12);
    }

    #[tokio::test]
    async fn test_aliases_share_cache_entry() {
        let registry = RegistryFake::new();
        let service = service_with(registry.clone());

        let first = service.get_holidays("rio", 2025).await;
        let second = service.get_holidays("Rio-De-Janeiro", 2025).await;

        assert_eq!(registry.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_concurrent_aliases_never_resolve_twice() {
        let registry = RegistryFake::slow(Duration::from_millis(50));
        let service = service_with(registry.clone());

        let a = {
            let service = service.clone();
            tokio::spawn(async move { service.get_holidays("sp", 2025).await })
        };
        let b = {
            let service = service.clone();
            tokio::spawn(async move { service.get_holidays("sao-paulo", 2025).await })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(registry.calls(), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_expires_after_ttl() {
        let registry = RegistryFake::new();
        let service = service_with(registry.clone());

        service.get_holidays("salvador", 2025).await;
        assert_eq!(registry.calls(), 1);

        tokio::time::advance(Duration::from_secs(59 * 60)).await;
        service.get_holidays("salvador", 2025).await;
        assert_eq!(registry.calls(), 1, "entry still fresh at T+59min");

        tokio::time::advance(Duration::from_secs(2 * 60)).await;
        service.get_holidays("salvador", 2025).await;
        assert_eq!(registry.calls(), 2, "entry expired at T+61min");
    }

    #[tokio::test]
    async fn test_distinct_keys_resolve_independently() {
        let registry = RegistryFake::new();
        let service = service_with(registry.clone());

        service.get_holidays("salvador", 2025).await;
        service.get_holidays("salvador", 2026).await;
        service.get_holidays("rio", 2025).await;

        assert_eq!(registry.calls(), 3);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let registry = RegistryFake::new();
        let service = service_with(registry.clone());

        service.get_holidays("brazil", 2025).await;
        service.get_holidays("brazil", 2025).await;
        assert_eq!(registry.calls(), 1);

        service.clear_cache().await;
        service.get_holidays("brazil", 2025).await;
        assert_eq!(registry.calls(), 2);
    }

    #[tokio::test]
    async fn test_holiday_dates_projection() {
        let service = service_with(RegistryFake::new());

        let dates = service.get_holiday_dates("brazil", 2025).await;
        assert_eq!(dates.len(), 8);
        assert!(dates.contains(&NaiveDate::from_ymd_opt(2025, 9, 7).unwrap()));
        // Projection and full records agree on order.
        let records = service.get_holidays("brazil", 2025).await;
        let record_dates: Vec<_> = records.iter().map(|h| h.date).collect();
        assert_eq!(dates, record_dates);
    }
}
