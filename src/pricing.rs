//! Pricing engine
//!
//! Pure computation of a price breakdown from a configuration and a rate
//! catalog snapshot. No I/O, no side effects, deterministic for a given
//! snapshot.
//!
//! Canonical formula: total = floor + bedrooms + bathrooms + style
//! + sum(selected feature rates) + unit_size * city_rate. The city term is
//! always included; an unrecognized city contributes a zero rate.
//!
//! Lookups are fail-soft: a count or name missing from the catalog yields a
//! zero-priced line item rather than an error. Every considered component
//! appears in the breakdown even at zero, so clients can see what was
//! counted.

use rust_decimal::Decimal;

use crate::domain::estimate::{Configuration, LineItem, PriceBreakdown};
use crate::domain::rates::RateCatalog;

pub fn compute_breakdown(config: &Configuration, catalog: &RateCatalog) -> PriceBreakdown {
    let mut items = Vec::with_capacity(config.features.len() + 5);

    let floor_rate = catalog
        .floor_rates
        .get(&config.floors)
        .copied()
        .unwrap_or(Decimal::ZERO);
    items.push(LineItem::new(format!("Floors ({})", config.floors), floor_rate));

    let bedroom_rate = catalog
        .bedroom_rates
        .get(&config.bedrooms)
        .copied()
        .unwrap_or(Decimal::ZERO);
    items.push(LineItem::new(
        format!("Bedrooms ({})", config.bedrooms),
        bedroom_rate,
    ));

    let bathroom_rate = catalog
        .bathroom_rates
        .get(&config.bathrooms)
        .copied()
        .unwrap_or(Decimal::ZERO);
    items.push(LineItem::new(
        format!("Bathrooms ({})", config.bathrooms),
        bathroom_rate,
    ));

    let style_rate = catalog
        .style_rates
        .get(&config.style)
        .copied()
        .unwrap_or(Decimal::ZERO);
    items.push(LineItem::new(format!("Style ({})", config.style), style_rate));

    for feature_id in &config.features {
        match catalog.feature_rates.get(feature_id) {
            Some(rate) => {
                items.push(LineItem::new(format!("Feature - {}", rate.name), rate.price));
            }
            None => {
                // Unknown id still shows up so the client sees it was counted
                items.push(LineItem::new(
                    format!("Feature #{feature_id}"),
                    Decimal::ZERO,
                ));
            }
        }
    }

    let city_rate = catalog
        .city_rates
        .get(&config.city)
        .copied()
        .unwrap_or(Decimal::ZERO);
    let city_amount = Decimal::from(config.unit_size) * city_rate;
    items.push(LineItem::new(
        format!("Unit Size ({} sqm) x City ({})", config.unit_size, config.city),
        city_amount,
    ));

    let total = items.iter().map(|item| item.amount).sum();

    PriceBreakdown { items, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rates::FeatureRate;
    use rust_decimal_macros::dec;

    fn catalog() -> RateCatalog {
        let mut catalog = RateCatalog::default();
        catalog.floor_rates.insert("Two-Storey".into(), dec!(160000));
        catalog.bedroom_rates.insert(3, dec!(175000));
        catalog.bathroom_rates.insert(2, dec!(30000));
        catalog.style_rates.insert("Modern".into(), dec!(500000));
        catalog.feature_rates.insert(
            1,
            FeatureRate {
                name: "Balcony".into(),
                price: dec!(90000),
            },
        );
        catalog.feature_rates.insert(
            2,
            FeatureRate {
                name: "Garage".into(),
                price: dec!(100000),
            },
        );
        catalog.city_rates.insert("Bacoor".into(), dec!(12000));
        catalog
    }

    fn config() -> Configuration {
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
    fn reference_scenario_totals_exactly() {
        // 160000 + 175000 + 30000 + 500000 + 90000 + 100000 + 120*12000
        let breakdown = compute_breakdown(&config(), &catalog());
        assert_eq!(breakdown.total, dec!(2495000));
    }

    #[test]
    fn is_deterministic() {
        let a = compute_breakdown(&config(), &catalog());
        let b = compute_breakdown(&config(), &catalog());
        assert_eq!(a.total, b.total);
        assert_eq!(a.items, b.items);
    }

    #[test]
    fn every_component_appears_even_at_zero() {
        let catalog = RateCatalog::default();
        let breakdown = compute_breakdown(&config(), &catalog);
        // floors, bedrooms, bathrooms, style, 2 features, city term
        assert_eq!(breakdown.items.len(), 7);
        assert!(breakdown.items.iter().all(|i| i.amount == Decimal::ZERO));
        assert_eq!(breakdown.total, Decimal::ZERO);
    }

    #[test]
    fn missing_rate_keys_are_fail_soft() {
        let mut cfg = config();
        cfg.bedrooms = 5; // no rate for 5 bedrooms in the catalog
        let breakdown = compute_breakdown(&cfg, &catalog());
        assert_eq!(breakdown.total, dec!(2495000) - dec!(175000));
        let bedrooms = &breakdown.items[1];
        assert_eq!(bedrooms.label, "Bedrooms (5)");
        assert_eq!(bedrooms.amount, Decimal::ZERO);
    }

    #[test]
    fn unknown_city_contributes_zero() {
        let mut cfg = config();
        cfg.city = "Atlantis".into();
        let breakdown = compute_breakdown(&cfg, &catalog());
        assert_eq!(breakdown.total, dec!(2495000) - dec!(1440000));
    }

    #[test]
    fn adding_a_feature_never_decreases_total() {
        let without = compute_breakdown(&config(), &catalog());
        let mut cfg = config();
        cfg.features.push(999); // unknown, priced at zero
        let with_unknown = compute_breakdown(&cfg, &catalog());
        assert!(with_unknown.total >= without.total);
    }
}
