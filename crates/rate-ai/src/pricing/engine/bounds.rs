use super::config::EngineConfig;
use super::fallback::ComputationError;
use crate::pricing::domain::PricingContext;

/// Raw pipeline output clamped into the market-consistent floor/ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BoundedPrice {
    pub(crate) price: f64,
    pub(crate) floor: f64,
    pub(crate) ceiling: f64,
}

/// Clamp the raw price and record positioning commentary against the
/// competitor median when one is available.
pub(crate) fn enforce(
    raw_price: f64,
    ctx: &PricingContext,
    config: &EngineConfig,
    trace: &mut Vec<String>,
) -> Result<BoundedPrice, ComputationError> {
    let policy = &config.bounds;

    let floor = match ctx.market.comp_price_p10 {
        Some(p10) => p10 * policy.floor_percentile_factor,
        None => raw_price * policy.floor_fallback_factor,
    };
    let ceiling = match ctx.market.comp_price_p90 {
        Some(p90) => p90 * policy.ceiling_percentile_factor,
        None => raw_price * policy.ceiling_fallback_factor,
    };

    // Partial percentile data can invert the range (a p10-only market far
    // above the raw price). `clamp` panics on an inverted range, so this is
    // surfaced as a typed cause for the fallback machine instead.
    if floor > ceiling {
        return Err(ComputationError::InvertedBounds { floor, ceiling });
    }

    let price = raw_price.clamp(floor, ceiling);

    if let Some(median) = ctx.market.comp_price_p50 {
        if price > median * policy.premium_threshold {
            trace.push("Premium pricing vs competitors".to_string());
        } else if price < median * policy.competitive_threshold {
            trace.push("Competitive pricing vs market".to_string());
        }
    }

    Ok(BoundedPrice {
        price,
        floor,
        ceiling,
    })
}
