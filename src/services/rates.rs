//! Rate catalog loading and caching
//!
//! The catalog is read-mostly but admins can edit rates at any time, so the
//! in-process snapshot is only reused within a short TTL. One snapshot is
//! used for the whole of a single pricing computation.

use parking_lot::RwLock;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::rates::{FeatureRate, RateCatalog};

#[derive(Clone)]
pub struct RatesCache {
    inner: Arc<RwLock<Option<CachedSnapshot>>>,
    ttl: Duration,
}

struct CachedSnapshot {
    loaded_at: Instant,
    catalog: Arc<RateCatalog>,
}

impl RatesCache {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Return a catalog snapshot, loading from the database when the cached
    /// one has expired. Concurrent refreshes may both load; last write wins.
    pub async fn snapshot(&self, pool: &PgPool) -> Result<Arc<RateCatalog>, sqlx::Error> {
        if let Some(cached) = self.fresh() {
            return Ok(cached);
        }

        let catalog = Arc::new(load_catalog(pool).await?);
        *self.inner.write() = Some(CachedSnapshot {
            loaded_at: Instant::now(),
            catalog: catalog.clone(),
        });

        tracing::debug!(
            floors = catalog.floor_rates.len(),
            features = catalog.feature_rates.len(),
            cities = catalog.city_rates.len(),
            "Rate catalog refreshed"
        );

        Ok(catalog)
    }

    fn fresh(&self) -> Option<Arc<RateCatalog>> {
        let guard = self.inner.read();
        guard
            .as_ref()
            .filter(|c| c.loaded_at.elapsed() < self.ttl)
            .map(|c| c.catalog.clone())
    }

    /// Drop the cached snapshot so the next read reloads
    #[allow(dead_code)]
    pub fn invalidate(&self) {
        *self.inner.write() = None;
    }
}

/// Load the full catalog in one round of queries
async fn load_catalog(pool: &PgPool) -> Result<RateCatalog, sqlx::Error> {
    let mut catalog = RateCatalog::default();

    let floors: Vec<(String, Decimal)> =
        sqlx::query_as("SELECT name, price FROM floor_rates")
            .fetch_all(pool)
            .await?;
    catalog.floor_rates = floors.into_iter().collect();

    let bedrooms: Vec<(i32, Decimal)> =
        sqlx::query_as("SELECT room_count, price FROM bedroom_rates")
            .fetch_all(pool)
            .await?;
    catalog.bedroom_rates = bedrooms.into_iter().collect();

    let bathrooms: Vec<(i32, Decimal)> =
        sqlx::query_as("SELECT room_count, price FROM bathroom_rates")
            .fetch_all(pool)
            .await?;
    catalog.bathroom_rates = bathrooms.into_iter().collect();

    let styles: Vec<(String, Decimal)> =
        sqlx::query_as("SELECT name, price FROM style_rates")
            .fetch_all(pool)
            .await?;
    catalog.style_rates = styles.into_iter().collect();

    let features: Vec<(i64, String, Decimal)> =
        sqlx::query_as("SELECT id, name, price FROM features")
            .fetch_all(pool)
            .await?;
    catalog.feature_rates = features
        .into_iter()
        .map(|(id, name, price)| (id, FeatureRate { name, price }))
        .collect();

    let cities: Vec<(String, Decimal)> =
        sqlx::query_as("SELECT city, rate FROM city_rates")
            .fetch_all(pool)
            .await?;
    catalog.city_rates = cities.into_iter().collect();

    Ok(catalog)
}
