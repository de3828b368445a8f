use super::config::EngineConfig;
use super::fallback::ComputationError;
use crate::pricing::domain::PricingContext;

/// Price and optional commentary produced by one stage. Reasons are emitted
/// only when the stage's effect differs from its neutral case so the trace
/// stays compact.
pub(crate) struct StageOutcome {
    pub(crate) price: f64,
    pub(crate) reason: Option<String>,
}

impl StageOutcome {
    fn neutral(price: f64) -> Self {
        Self {
            price,
            reason: None,
        }
    }

    fn adjusted(price: f64, reason: impl Into<String>) -> Self {
        Self {
            price,
            reason: Some(reason.into()),
        }
    }
}

pub(crate) type StageFn = fn(f64, &PricingContext, &EngineConfig) -> Result<StageOutcome, ComputationError>;

/// One named, independently testable adjustment rule.
pub(crate) struct FactorStage {
    pub(crate) name: &'static str,
    pub(crate) apply: StageFn,
}

pub(crate) const BASE_PRICE_STAGE: &str = "base_price";

/// The factor pipeline. This array is the single source of truth for
/// evaluation order; reordering it changes reason traces and golden outputs,
/// so it is a contract, not an implementation detail.
pub(crate) const FACTOR_CHAIN: &[FactorStage] = &[
    FactorStage {
        name: BASE_PRICE_STAGE,
        apply: base_price,
    },
    FactorStage {
        name: "seasonal",
        apply: seasonal,
    },
    FactorStage {
        name: "day_of_week",
        apply: day_of_week,
    },
    FactorStage {
        name: "demand",
        apply: demand,
    },
    FactorStage {
        name: "lead_time",
        apply: lead_time,
    },
    FactorStage {
        name: "length_of_stay",
        apply: length_of_stay,
    },
    FactorStage {
        name: "refundability",
        apply: refundability,
    },
    FactorStage {
        name: "operator_strategy",
        apply: operator_strategy,
    },
];

fn base_price(
    _price: f64,
    ctx: &PricingContext,
    config: &EngineConfig,
) -> Result<StageOutcome, ComputationError> {
    if ctx.toggles.use_competitors {
        if let Some(median) = ctx.market.comp_price_p50 {
            return Ok(StageOutcome::adjusted(
                median,
                "Base price from competitor median",
            ));
        }
    }
    Ok(StageOutcome::neutral(config.default_base_price))
}

fn seasonal(
    price: f64,
    ctx: &PricingContext,
    config: &EngineConfig,
) -> Result<StageOutcome, ComputationError> {
    if !ctx.toggles.apply_seasonality {
        return Ok(StageOutcome::neutral(price));
    }
    let multiplier = config.seasonal.for_season(ctx.season);
    if multiplier == 1.0 {
        return Ok(StageOutcome::neutral(price));
    }
    Ok(StageOutcome::adjusted(
        price * multiplier,
        format!("Seasonal adjustment ({})", ctx.season.label()),
    ))
}

fn day_of_week(
    price: f64,
    ctx: &PricingContext,
    config: &EngineConfig,
) -> Result<StageOutcome, ComputationError> {
    let multiplier = config.day_of_week.for_day(ctx.day_of_week);
    let price = price * multiplier;
    if multiplier > 1.0 {
        return Ok(StageOutcome::adjusted(price, "Weekend premium"));
    }
    Ok(StageOutcome::neutral(price))
}

fn demand(
    price: f64,
    ctx: &PricingContext,
    config: &EngineConfig,
) -> Result<StageOutcome, ComputationError> {
    let occupancy_rate =
        ctx.occupancy_rate()
            .ok_or(ComputationError::DegenerateInventory {
                capacity: ctx.capacity,
            })?;
    let price = price * (1.0 + occupancy_rate * config.demand.slope);
    if occupancy_rate > config.demand.high_occupancy_threshold {
        return Ok(StageOutcome::adjusted(price, "High demand"));
    }
    Ok(StageOutcome::neutral(price))
}

fn lead_time(
    price: f64,
    ctx: &PricingContext,
    config: &EngineConfig,
) -> Result<StageOutcome, ComputationError> {
    let rule = &config.lead_time;
    if ctx.lead_days < rule.last_minute_days {
        return Ok(StageOutcome::adjusted(
            price * rule.last_minute_multiplier,
            "Last-minute booking premium",
        ));
    }
    if ctx.lead_days > rule.early_booking_days {
        return Ok(StageOutcome::adjusted(
            price * rule.early_booking_multiplier,
            "Early booking discount",
        ));
    }
    Ok(StageOutcome::neutral(price))
}

fn length_of_stay(
    price: f64,
    ctx: &PricingContext,
    config: &EngineConfig,
) -> Result<StageOutcome, ComputationError> {
    // Tiers are sorted longest-first at engine construction, so the first
    // match is the only tier that applies; discounts never compound.
    for tier in &config.length_of_stay {
        if ctx.product.los >= tier.min_nights {
            return Ok(StageOutcome::adjusted(
                price * tier.multiplier,
                format!("Extended stay discount ({}+ nights)", tier.min_nights),
            ));
        }
    }
    Ok(StageOutcome::neutral(price))
}

fn refundability(
    price: f64,
    ctx: &PricingContext,
    config: &EngineConfig,
) -> Result<StageOutcome, ComputationError> {
    if ctx.product.refundable {
        return Ok(StageOutcome::neutral(price));
    }
    Ok(StageOutcome::adjusted(
        price * config.non_refundable_multiplier,
        "Non-refundable rate",
    ))
}

fn operator_strategy(
    price: f64,
    ctx: &PricingContext,
    config: &EngineConfig,
) -> Result<StageOutcome, ComputationError> {
    // Applied last as the operator's final override lever. The validator has
    // already resolved a conflicting toggle pair in favor of aggressive.
    if ctx.toggles.aggressive {
        return Ok(StageOutcome::adjusted(
            price * config.aggressive_multiplier,
            "Aggressive strategy uplift",
        ));
    }
    if ctx.toggles.conservative {
        return Ok(StageOutcome::adjusted(
            price * config.conservative_multiplier,
            "Conservative strategy discount",
        ));
    }
    Ok(StageOutcome::neutral(price))
}
