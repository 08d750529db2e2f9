//! Per-key single-flight cache for resolved weather
//!
//! Concurrency contract: the slot map is guarded by a mutex that is only held
//! long enough to find or create a slot. Each slot is a `OnceCell`, so
//! concurrent callers for the same key wait on one resolution instead of
//! issuing duplicate external lookups. Resolved values are never evicted.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

use crate::WeatherReading;

/// Date if the caller supplied one, otherwise the month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachePeriod {
    Date(NaiveDate),
    Month(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub zip_code: String,
    pub period: CachePeriod,
}

impl CacheKey {
    pub fn new(zip_code: impl Into<String>, date: Option<NaiveDate>, month: u32) -> Self {
        let period = match date {
            Some(d) => CachePeriod::Date(d),
            None => CachePeriod::Month(month),
        };
        Self {
            zip_code: zip_code.into(),
            period,
        }
    }
}

/// Whether a lookup was served from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

#[derive(Default)]
pub struct WeatherCache {
    slots: Mutex<HashMap<CacheKey, Arc<OnceCell<WeatherReading>>>>,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached reading for `key`, running `resolve` at most once
    /// per key for the lifetime of the cache.
    pub async fn get_or_resolve<F, Fut>(&self, key: CacheKey, resolve: F) -> (WeatherReading, CacheStatus)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = WeatherReading>,
    {
        let slot = {
            let mut slots = self.slots.lock().await;
            Arc::clone(slots.entry(key).or_default())
        };

        let ran = AtomicBool::new(false);
        let ran_ref = &ran;
        let reading = slot
            .get_or_init(|| async move {
                ran_ref.store(true, Ordering::Relaxed);
                resolve().await
            })
            .await
            .clone();

        let status = if ran.load(Ordering::Relaxed) {
            CacheStatus::Miss
        } else {
            CacheStatus::Hit
        };
        (reading, status)
    }

    /// Cached reading, if `key` has been resolved
    pub async fn get(&self, key: &CacheKey) -> Option<WeatherReading> {
        let slots = self.slots.lock().await;
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Number of resolved keys
    pub async fn len(&self) -> usize {
        let slots = self.slots.lock().await;
        slots.values().filter(|slot| slot.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
