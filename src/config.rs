//! Static tables and pricing configuration
//!
//! Material densities and 3MF unit factors are fixed tables. Pricing rates
//! live in [`QuoteConfig`], whose [`Default`] holds the standard rates; the
//! shared instance returned by [`QuoteConfig::standard`] is built once and
//! never mutated.

use std::sync::LazyLock;

use crate::model::{Material, SpeedClass};

/// Material densities in g/cm³
pub const MATERIAL_DENSITIES: [(Material, f64); 4] = [
    (Material::Pla, 1.24),
    (Material::Petg, 1.27),
    (Material::Abs, 1.04),
    (Material::Tpu, 1.20),
];

/// Millimeters per 3MF model unit
pub const UNIT_FACTORS: [(&str, f64); 6] = [
    ("micron", 0.001),
    ("millimeter", 1.0),
    ("centimeter", 10.0),
    ("inch", 25.4),
    ("foot", 304.8),
    ("meter", 1000.0),
];

/// Unit assumed when a 3MF model has no `unit` attribute
pub const DEFAULT_UNIT: &str = "millimeter";

/// Density of a material in g/cm³
pub fn material_density(material: Material) -> f64 {
    MATERIAL_DENSITIES
        .iter()
        .find(|(m, _)| *m == material)
        .map(|(_, density)| *density)
        .unwrap_or(MATERIAL_DENSITIES[0].1)
}

/// Millimeters per unit for a 3MF `unit` attribute value
///
/// Unrecognized unit strings map to 1.0, i.e. they are treated as millimeters.
pub fn unit_factor(unit: &str) -> f64 {
    UNIT_FACTORS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, factor)| *factor)
        .unwrap_or(1.0)
}

/// A quantity discount tier
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscountTier {
    /// Smallest quantity the tier applies to
    pub min_quantity: u32,
    /// Fraction taken off the per-unit price (0.15 = 15%)
    pub discount: f64,
}

/// Standard discount tiers, largest quantity first
pub const DEFAULT_DISCOUNT_TIERS: [DiscountTier; 3] = [
    DiscountTier {
        min_quantity: 10,
        discount: 0.15,
    },
    DiscountTier {
        min_quantity: 5,
        discount: 0.10,
    },
    DiscountTier {
        min_quantity: 3,
        discount: 0.05,
    },
];

/// Price multipliers per speed class
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedMultipliers {
    /// Multiplier for [`SpeedClass::Instant`]
    pub instant: f64,
    /// Multiplier for [`SpeedClass::Fast`]
    pub fast: f64,
    /// Multiplier for [`SpeedClass::Regular`]
    pub regular: f64,
}

impl SpeedMultipliers {
    /// Multiplier for a speed class
    pub fn for_class(&self, speed: SpeedClass) -> f64 {
        match speed {
            SpeedClass::Instant => self.instant,
            SpeedClass::Fast => self.fast,
            SpeedClass::Regular => self.regular,
        }
    }
}

impl Default for SpeedMultipliers {
    fn default() -> Self {
        Self {
            instant: 5.0,
            fast: 2.5,
            regular: 1.0,
        }
    }
}

/// Courier pricing
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeliveryRates {
    /// Average courier speed in km/h
    pub average_speed_kmh: f64,
    /// Courier cost per hour of round trip
    pub hourly_rate: f64,
    /// Minimum delivery charge
    pub minimum_charge: f64,
}

impl Default for DeliveryRates {
    fn default() -> Self {
        Self {
            average_speed_kmh: 40.0,
            hourly_rate: 25.0,
            minimum_charge: 10.0,
        }
    }
}

/// Pricing and fallback configuration for quotes
///
/// # Example
///
/// ```
/// use printquote::{QuoteConfig, SpeedClass};
///
/// let config = QuoteConfig::new()
///     .with_hourly_rate(18.0)
///     .with_speed_multiplier(SpeedClass::Fast, 2.0);
/// assert_eq!(config.hourly_rate, 18.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuoteConfig {
    /// Price per hour of estimated print time
    pub hourly_rate: f64,
    /// Minimum price per part
    pub minimum_charge: f64,
    /// Speed class multipliers
    pub speed_multipliers: SpeedMultipliers,
    /// Quantity discount tiers; the tier with the largest satisfied
    /// `min_quantity` applies
    pub discount_tiers: Vec<DiscountTier>,
    /// Courier pricing
    pub delivery: DeliveryRates,
    /// Fallback volume in cm³ per megabyte of file size
    pub fallback_cm3_per_mb: f64,
    /// Smallest fallback volume in cm³
    pub fallback_min_cm3: f64,
}

static STANDARD: LazyLock<QuoteConfig> = LazyLock::new(QuoteConfig::new);

impl QuoteConfig {
    /// Create a configuration with the standard rates
    pub fn new() -> Self {
        Self {
            hourly_rate: 15.0,
            minimum_charge: 10.0,
            speed_multipliers: SpeedMultipliers::default(),
            discount_tiers: DEFAULT_DISCOUNT_TIERS.to_vec(),
            delivery: DeliveryRates::default(),
            fallback_cm3_per_mb: 15.0,
            fallback_min_cm3: 0.1,
        }
    }

    /// Shared standard configuration
    pub fn standard() -> &'static QuoteConfig {
        &STANDARD
    }

    /// Set the hourly print rate
    pub fn with_hourly_rate(mut self, rate: f64) -> Self {
        self.hourly_rate = rate;
        self
    }

    /// Set the per-part minimum charge
    pub fn with_minimum_charge(mut self, minimum: f64) -> Self {
        self.minimum_charge = minimum;
        self
    }

    /// Override one speed class multiplier
    pub fn with_speed_multiplier(mut self, speed: SpeedClass, multiplier: f64) -> Self {
        match speed {
            SpeedClass::Instant => self.speed_multipliers.instant = multiplier,
            SpeedClass::Fast => self.speed_multipliers.fast = multiplier,
            SpeedClass::Regular => self.speed_multipliers.regular = multiplier,
        }
        self
    }

    /// Replace the discount tiers
    pub fn with_discount_tiers(mut self, tiers: Vec<DiscountTier>) -> Self {
        self.discount_tiers = tiers;
        self
    }

    /// Replace the courier pricing
    pub fn with_delivery_rates(mut self, delivery: DeliveryRates) -> Self {
        self.delivery = delivery;
        self
    }

    /// Discount fraction for a quantity
    pub fn discount_for(&self, quantity: u32) -> f64 {
        self.discount_tiers
            .iter()
            .filter(|tier| quantity >= tier.min_quantity)
            .max_by_key(|tier| tier.min_quantity)
            .map(|tier| tier.discount)
            .unwrap_or(0.0)
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self::new()
    }
}
