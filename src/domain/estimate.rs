//! Estimate configuration and price breakdown types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, FieldError};

pub const MIN_ROOM_COUNT: i32 = 1;
pub const MAX_ROOM_COUNT: i32 = 6;

/// Bounds on unit size, product-configurable via settings
#[derive(Debug, Clone, Copy)]
pub struct UnitSizeBounds {
    pub min_sqm: u32,
    pub max_sqm: u32,
}

/// A client's house-design choices. Immutable once validated; built fresh
/// for every pricing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub floors: String,
    pub style: String,
    pub unit_size: u32,
    pub city: String,
    #[serde(default)]
    pub features: Vec<i64>,
}

impl Configuration {
    /// Validate field ranges and normalize the feature set (unique,
    /// original order kept). Returns every violation, not just the first.
    pub fn validate(mut self, bounds: UnitSizeBounds) -> Result<Self, ApiError> {
        let mut errors = Vec::new();

        if !(MIN_ROOM_COUNT..=MAX_ROOM_COUNT).contains(&self.bedrooms) {
            errors.push(FieldError::new(
                "bedrooms",
                format!("must be between {MIN_ROOM_COUNT} and {MAX_ROOM_COUNT}"),
            ));
        }
        if !(MIN_ROOM_COUNT..=MAX_ROOM_COUNT).contains(&self.bathrooms) {
            errors.push(FieldError::new(
                "bathrooms",
                format!("must be between {MIN_ROOM_COUNT} and {MAX_ROOM_COUNT}"),
            ));
        }
        if self.floors.trim().is_empty() {
            errors.push(FieldError::new("floors", "floor category is required"));
        }
        if self.style.trim().is_empty() {
            errors.push(FieldError::new("style", "style is required"));
        }
        if self.city.trim().is_empty() {
            errors.push(FieldError::new("city", "city is required"));
        }
        if self.unit_size < bounds.min_sqm || self.unit_size > bounds.max_sqm {
            errors.push(FieldError::new(
                "unit_size",
                format!(
                    "must be between {} and {} sqm",
                    bounds.min_sqm, bounds.max_sqm
                ),
            ));
        }

        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        // Feature ids are a set: drop duplicates, keep first-seen order
        let mut seen = std::collections::HashSet::new();
        self.features.retain(|id| seen.insert(*id));

        Ok(self)
    }
}

/// One display line of a price breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub label: String,
    pub amount: Decimal,
}

impl LineItem {
    pub fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// Derived, never persisted: recomputed from a configuration and a rate
/// catalog snapshot on every request.
#[derive(Debug, Clone, Serialize)]
pub struct PriceBreakdown {
    pub items: Vec<LineItem>,
    pub total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: UnitSizeBounds = UnitSizeBounds {
        min_sqm: 60,
        max_sqm: 1200,
    };

    fn base_config() -> Configuration {
        Configuration {
            bedrooms: 3,
            bathrooms: 2,
            floors: "Two-Storey".into(),
            style: "Modern".into(),
            unit_size: 120,
            city: "Bacoor".into(),
            features: vec![1, 2],
        }
    }

    #[test]
    fn valid_configuration_passes() {
        assert!(base_config().validate(BOUNDS).is_ok());
    }

    #[test]
    fn out_of_range_counts_are_rejected() {
        let mut cfg = base_config();
        cfg.bedrooms = 0;
        cfg.bathrooms = 7;
        let err = cfg.validate(BOUNDS).unwrap_err();
        match err {
            ApiError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["bedrooms", "bathrooms"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn unit_size_bounds_are_enforced() {
        let mut cfg = base_config();
        cfg.unit_size = 59;
        assert!(cfg.clone().validate(BOUNDS).is_err());
        cfg.unit_size = 1201;
        assert!(cfg.clone().validate(BOUNDS).is_err());
        cfg.unit_size = 60;
        assert!(cfg.validate(BOUNDS).is_ok());
    }

    #[test]
    fn duplicate_features_are_deduplicated_in_order() {
        let mut cfg = base_config();
        cfg.features = vec![5, 3, 5, 3, 9];
        let cfg = cfg.validate(BOUNDS).unwrap();
        assert_eq!(cfg.features, vec![5, 3, 9]);
    }
}
