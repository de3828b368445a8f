use super::config::EngineConfig;
use super::variants::round2;
use crate::pricing::domain::{
    ConfidenceBand, ExpectedOccupancy, PricingContext, PricingResult, SafetyInfo,
};

/// Reason string carried by every degraded result; golden-output tests match
/// it verbatim.
pub(crate) const FALLBACK_REASON: &str = "Fallback pricing due to calculation error";

/// Typed causes that demote a request from the normal path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComputationError {
    #[error("inventory capacity {capacity} cannot produce an occupancy rate")]
    DegenerateInventory { capacity: i64 },
    #[error("price became non-finite during the {stage} stage")]
    NonFinitePrice { stage: &'static str },
    #[error("market bounds inverted: floor {floor:.2} above ceiling {ceiling:.2}")]
    InvertedBounds { floor: f64, ceiling: f64 },
}

/// Per-request scoring state. The transition is one-way: once a computation
/// failure demotes the request, all partial work is discarded and only the
/// degraded result can be produced.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ScoringState {
    Normal(PricingResult),
    Fallback(ComputationError),
}

impl ScoringState {
    pub(crate) fn from_attempt(attempt: Result<PricingResult, ComputationError>) -> Self {
        match attempt {
            Ok(result) => ScoringState::Normal(result),
            Err(cause) => ScoringState::Fallback(cause),
        }
    }

    /// Resolve the state into the response the caller receives; a fallback
    /// never exposes partial computation, only the fixed degraded shape.
    pub(crate) fn into_result(self, ctx: &PricingContext, config: &EngineConfig) -> PricingResult {
        match self {
            ScoringState::Normal(result) => result,
            ScoringState::Fallback(cause) => degraded_result(ctx, config, cause),
        }
    }
}

/// Fixed degraded result: the base price unadjusted, a 3-point grid at the
/// configured fallback spread, a wider confidence band, and the typed cause
/// echoed in `safety.error`.
pub(crate) fn degraded_result(
    ctx: &PricingContext,
    config: &EngineConfig,
    cause: ComputationError,
) -> PricingResult {
    let base = if ctx.toggles.use_competitors {
        ctx.market
            .comp_price_p50
            .unwrap_or(config.default_base_price)
    } else {
        config.default_base_price
    };

    let grid_spread = config.variants.fallback_grid_spread;
    let band_spread = config.variants.fallback_band_spread;
    let price = round2(base);
    let price_grid = vec![
        round2(base * (1.0 - grid_spread)),
        price,
        round2(base * (1.0 + grid_spread)),
    ];
    let conf_band = ConfidenceBand {
        lower: round2(base * (1.0 - band_spread)),
        upper: round2(base * (1.0 + band_spread)),
    };

    let occupancy_rate = ctx.occupancy_rate().unwrap_or(0.0);

    PricingResult {
        price,
        price_grid,
        conf_band,
        expected: ExpectedOccupancy::project(occupancy_rate, ctx.lead_days),
        reasons: vec![FALLBACK_REASON.to_string()],
        safety: SafetyInfo {
            base_price_used: price,
            occupancy_rate,
            lead_days: ctx.lead_days,
            season: ctx.season,
            day_of_week: ctx.day_of_week,
            error: Some(cause.to_string()),
        },
    }
}
