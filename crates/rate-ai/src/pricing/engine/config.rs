use serde::{Deserialize, Serialize};

use crate::pricing::domain::{DayOfWeek, Season};

/// Immutable factor tables injected at engine construction. Modeled as a
/// value object rather than module constants so tenants and test fixtures can
/// carry different tuning without shared mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Nightly rate used when no competitor median applies.
    pub default_base_price: f64,
    pub seasonal: SeasonalMultipliers,
    pub day_of_week: DayOfWeekMultipliers,
    pub demand: DemandCurve,
    pub lead_time: LeadTimeRule,
    /// Tiered multipliers keyed by minimum nights; the engine evaluates the
    /// longest tier first so exactly one applies.
    pub length_of_stay: Vec<LosTier>,
    pub non_refundable_multiplier: f64,
    pub aggressive_multiplier: f64,
    pub conservative_multiplier: f64,
    pub bounds: BoundsPolicy,
    pub variants: VariantPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalMultipliers {
    pub winter: f64,
    pub spring: f64,
    pub summer: f64,
    pub fall: f64,
}

impl SeasonalMultipliers {
    pub fn for_season(&self, season: Season) -> f64 {
        match season {
            Season::Winter => self.winter,
            Season::Spring => self.spring,
            Season::Summer => self.summer,
            Season::Fall => self.fall,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayOfWeekMultipliers {
    pub monday: f64,
    pub tuesday: f64,
    pub wednesday: f64,
    pub thursday: f64,
    pub friday: f64,
    pub saturday: f64,
    pub sunday: f64,
}

impl DayOfWeekMultipliers {
    pub fn for_day(&self, day: DayOfWeek) -> f64 {
        match day {
            DayOfWeek::Monday => self.monday,
            DayOfWeek::Tuesday => self.tuesday,
            DayOfWeek::Wednesday => self.wednesday,
            DayOfWeek::Thursday => self.thursday,
            DayOfWeek::Friday => self.friday,
            DayOfWeek::Saturday => self.saturday,
            DayOfWeek::Sunday => self.sunday,
        }
    }
}

/// Linear demand response: `1 + occupancy_rate * slope`, with a commentary
/// threshold for the high-demand reason.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandCurve {
    pub slope: f64,
    pub high_occupancy_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeadTimeRule {
    /// Bookings strictly inside this window pay the premium.
    pub last_minute_days: i64,
    pub last_minute_multiplier: f64,
    /// Bookings strictly beyond this window earn the discount.
    pub early_booking_days: i64,
    pub early_booking_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LosTier {
    pub min_nights: i64,
    pub multiplier: f64,
}

/// Market-consistent floor/ceiling policy for the bounds enforcer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsPolicy {
    /// Floor as a fraction of `comp_price_p10` when percentiles are present.
    pub floor_percentile_factor: f64,
    /// Ceiling as a multiple of `comp_price_p90` when percentiles are present.
    pub ceiling_percentile_factor: f64,
    /// Floor as a fraction of the raw pipeline price otherwise.
    pub floor_fallback_factor: f64,
    /// Ceiling as a multiple of the raw pipeline price otherwise.
    pub ceiling_fallback_factor: f64,
    /// Positioning commentary thresholds relative to `comp_price_p50`.
    pub premium_threshold: f64,
    pub competitive_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariantPolicy {
    /// Multiplicative steps for the 5-point grid; the middle step must be 1.0
    /// so the middle grid entry equals the recommended price.
    pub grid_steps: [f64; 5],
    /// Half-width of the confidence band, as a fraction of the price.
    pub band_spread: f64,
    /// Half-width of the degraded 3-point grid returned by the fallback path.
    pub fallback_grid_spread: f64,
    /// Half-width of the degraded confidence band.
    pub fallback_band_spread: f64,
}

/// Construction-time configuration failures; fatal at startup, never
/// surfaced per request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("default base price must be a positive finite amount, got {0}")]
    InvalidBasePrice(f64),
    #[error("{table} multiplier '{entry}' must be a positive finite amount, got {value}")]
    InvalidMultiplier {
        table: &'static str,
        entry: String,
        value: f64,
    },
    #[error("length-of-stay tier requires a positive night threshold, got {0}")]
    InvalidLosThreshold(i64),
    #[error("demand curve must have a finite non-negative slope and a threshold in [0, 1]")]
    InvalidDemandCurve,
    #[error("lead-time windows must be non-negative day counts")]
    InvalidLeadTimeWindow,
    #[error("price grid steps must be finite, positive, non-decreasing, with a unit midpoint")]
    InvalidGridSteps,
    #[error("{band} spread must lie in (0, 1), got {value}")]
    InvalidSpread { band: &'static str, value: f64 },
}

impl EngineConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.default_base_price.is_finite() || self.default_base_price <= 0.0 {
            return Err(ConfigurationError::InvalidBasePrice(self.default_base_price));
        }

        let seasonal = [
            ("winter", self.seasonal.winter),
            ("spring", self.seasonal.spring),
            ("summer", self.seasonal.summer),
            ("fall", self.seasonal.fall),
        ];
        for (entry, value) in seasonal {
            check_multiplier("seasonal", entry, value)?;
        }

        let weekdays = [
            ("monday", self.day_of_week.monday),
            ("tuesday", self.day_of_week.tuesday),
            ("wednesday", self.day_of_week.wednesday),
            ("thursday", self.day_of_week.thursday),
            ("friday", self.day_of_week.friday),
            ("saturday", self.day_of_week.saturday),
            ("sunday", self.day_of_week.sunday),
        ];
        for (entry, value) in weekdays {
            check_multiplier("day-of-week", entry, value)?;
        }

        if !self.demand.slope.is_finite()
            || self.demand.slope < 0.0
            || !self.demand.high_occupancy_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.demand.high_occupancy_threshold)
        {
            return Err(ConfigurationError::InvalidDemandCurve);
        }

        if self.lead_time.last_minute_days < 0 || self.lead_time.early_booking_days < 0 {
            return Err(ConfigurationError::InvalidLeadTimeWindow);
        }
        check_multiplier(
            "lead-time",
            "last_minute",
            self.lead_time.last_minute_multiplier,
        )?;
        check_multiplier(
            "lead-time",
            "early_booking",
            self.lead_time.early_booking_multiplier,
        )?;

        for tier in &self.length_of_stay {
            if tier.min_nights <= 0 {
                return Err(ConfigurationError::InvalidLosThreshold(tier.min_nights));
            }
            check_multiplier(
                "length-of-stay",
                &format!("{}+ nights", tier.min_nights),
                tier.multiplier,
            )?;
        }

        check_multiplier(
            "refundability",
            "non_refundable",
            self.non_refundable_multiplier,
        )?;
        check_multiplier("strategy", "aggressive", self.aggressive_multiplier)?;
        check_multiplier("strategy", "conservative", self.conservative_multiplier)?;

        let bounds = [
            ("floor_percentile", self.bounds.floor_percentile_factor),
            ("ceiling_percentile", self.bounds.ceiling_percentile_factor),
            ("floor_fallback", self.bounds.floor_fallback_factor),
            ("ceiling_fallback", self.bounds.ceiling_fallback_factor),
            ("premium_threshold", self.bounds.premium_threshold),
            ("competitive_threshold", self.bounds.competitive_threshold),
        ];
        for (entry, value) in bounds {
            check_multiplier("bounds", entry, value)?;
        }

        let steps = &self.variants.grid_steps;
        let steps_valid = steps.iter().all(|step| step.is_finite() && *step > 0.0)
            && steps.windows(2).all(|pair| pair[0] <= pair[1])
            && steps[2] == 1.0;
        if !steps_valid {
            return Err(ConfigurationError::InvalidGridSteps);
        }

        let spreads = [
            ("confidence band", self.variants.band_spread),
            ("fallback grid", self.variants.fallback_grid_spread),
            ("fallback band", self.variants.fallback_band_spread),
        ];
        for (band, value) in spreads {
            if !value.is_finite() || value <= 0.0 || value >= 1.0 {
                return Err(ConfigurationError::InvalidSpread { band, value });
            }
        }

        Ok(())
    }
}

fn check_multiplier(
    table: &'static str,
    entry: &str,
    value: f64,
) -> Result<(), ConfigurationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigurationError::InvalidMultiplier {
            table,
            entry: entry.to_string(),
            value,
        });
    }
    Ok(())
}
