pub(crate) mod bounds;
mod config;
pub(crate) mod fallback;
pub(crate) mod rules;
pub(crate) mod variants;

pub use config::{
    BoundsPolicy, ConfigurationError, DayOfWeekMultipliers, DemandCurve, EngineConfig,
    LeadTimeRule, LosTier, SeasonalMultipliers, VariantPolicy,
};
pub use fallback::ComputationError;

use crate::pricing::domain::{ExpectedOccupancy, PricingContext, PricingResult, SafetyInfo};
use fallback::ScoringState;
use rules::{BASE_PRICE_STAGE, FACTOR_CHAIN};

/// Stateless scoring engine over an injected, construction-validated factor
/// configuration. Each invocation is a deterministic, single-threaded
/// computation with no I/O and no shared mutable state, so any number of
/// request handlers can share one engine without coordination.
pub struct PricingEngine {
    config: EngineConfig,
}

impl PricingEngine {
    /// Validate the factor tables and fix the length-of-stay tier order. A
    /// configuration failure here is fatal at startup, never per request.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let mut config = config;
        config
            .length_of_stay
            .sort_by(|a, b| b.min_nights.cmp(&a.min_nights));
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score a validated context. This never fails: a computation error
    /// demotes the request through the one-way `Normal -> Fallback` machine
    /// and the caller receives the complete degraded result instead.
    pub fn score(&self, ctx: &PricingContext) -> PricingResult {
        ScoringState::from_attempt(self.attempt(ctx)).into_result(ctx, &self.config)
    }

    fn attempt(&self, ctx: &PricingContext) -> Result<PricingResult, ComputationError> {
        let mut reasons = ctx.normalization_notes.clone();

        let mut price = 0.0;
        let mut base_price_used = self.config.default_base_price;
        for stage in FACTOR_CHAIN {
            let outcome = (stage.apply)(price, ctx, &self.config)?;
            if !outcome.price.is_finite() {
                return Err(ComputationError::NonFinitePrice { stage: stage.name });
            }
            price = outcome.price;
            if stage.name == BASE_PRICE_STAGE {
                base_price_used = price;
            }
            if let Some(reason) = outcome.reason {
                reasons.push(reason);
            }
        }

        let bounded = bounds::enforce(price, ctx, &self.config, &mut reasons)?;
        debug_assert!(bounded.floor <= bounded.price && bounded.price <= bounded.ceiling);

        let occupancy_rate = ctx
            .occupancy_rate()
            .ok_or(ComputationError::DegenerateInventory {
                capacity: ctx.capacity,
            })?;

        Ok(PricingResult {
            price: variants::round2(bounded.price),
            price_grid: variants::price_grid(bounded.price, &self.config.variants.grid_steps),
            conf_band: variants::confidence_band(bounded.price, self.config.variants.band_spread),
            expected: ExpectedOccupancy::project(occupancy_rate, ctx.lead_days),
            reasons,
            safety: SafetyInfo {
                base_price_used: variants::round2(base_price_used),
                occupancy_rate,
                lead_days: ctx.lead_days,
                season: ctx.season,
                day_of_week: ctx.day_of_week,
                error: None,
            },
        })
    }
}
