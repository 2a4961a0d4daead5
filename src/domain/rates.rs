//! Rate catalog domain types
//!
//! The catalog is the admin-managed table of unit prices keyed by
//! configuration category. It is read-only to this service.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// A priced optional feature (balcony, garage, ...)
#[derive(Debug, Clone, Serialize)]
pub struct FeatureRate {
    pub name: String,
    pub price: Decimal,
}

/// Snapshot of all pricing reference data.
///
/// Taken once per pricing computation; a breakdown is always reproducible
/// from a configuration plus one of these.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RateCatalog {
    /// Floor category name -> price ("Bungalow", "Two-Storey", ...)
    pub floor_rates: HashMap<String, Decimal>,

    /// Bedroom count -> price
    pub bedroom_rates: HashMap<i32, Decimal>,

    /// Bathroom count -> price
    pub bathroom_rates: HashMap<i32, Decimal>,

    /// Style name -> price
    pub style_rates: HashMap<String, Decimal>,

    /// Feature id -> name + price
    pub feature_rates: HashMap<i64, FeatureRate>,

    /// City name -> per-sqm rate
    pub city_rates: HashMap<String, Decimal>,
}

impl RateCatalog {
    /// Resolve feature ids to display names, in the order given.
    /// Unknown ids fall back to "Feature #<id>".
    pub fn feature_names(&self, ids: &[i64]) -> Vec<String> {
        ids.iter()
            .map(|id| {
                self.feature_rates
                    .get(id)
                    .map(|f| f.name.clone())
                    .unwrap_or_else(|| format!("Feature #{id}"))
            })
            .collect()
    }
}
