//! Price calculation
//!
//! Manufacturing is charged by estimated print time per part, scaled by the
//! speed class, floored at the minimum charge and discounted by quantity.
//! Delivery is charged by courier round-trip time.

use crate::config::{DeliveryRates, QuoteConfig};
use crate::model::{DeliveryMode, PriceBreakdown, PrintSettings};

/// Price of a single part before the quantity discount
pub fn unit_price(minutes_per_unit: f64, settings: &PrintSettings, config: &QuoteConfig) -> f64 {
    let time_cost = config.hourly_rate * minutes_per_unit / 60.0;
    let multiplier = config.speed_multipliers.for_class(settings.speed);
    (time_cost * multiplier).max(config.minimum_charge)
}

/// Price of all parts, after the quantity discount
pub fn manufacturing_price(
    minutes_per_unit: f64,
    settings: &PrintSettings,
    config: &QuoteConfig,
) -> f64 {
    let discount = config.discount_for(settings.quantity);
    let discounted = unit_price(minutes_per_unit, settings, config) * (1.0 - discount);
    discounted * f64::from(settings.quantity)
}

/// Courier fee
///
/// Zero for pickup and for a delivery without a known distance.
pub fn delivery_price(delivery: &DeliveryMode, rates: &DeliveryRates) -> f64 {
    match delivery.distance_km() {
        Some(distance_km) => {
            let round_trip_hours = 2.0 * distance_km / rates.average_speed_kmh;
            (round_trip_hours * rates.hourly_rate).max(rates.minimum_charge)
        }
        None => 0.0,
    }
}

/// Full price breakdown, unrounded
pub fn price_breakdown(
    minutes_per_unit: f64,
    settings: &PrintSettings,
    config: &QuoteConfig,
) -> PriceBreakdown {
    let manufacturing = manufacturing_price(minutes_per_unit, settings, config);
    let delivery = delivery_price(&settings.delivery, &config.delivery);

    PriceBreakdown {
        manufacturing,
        delivery,
        total: manufacturing + delivery,
    }
}
