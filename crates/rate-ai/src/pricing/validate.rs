use chrono::NaiveDateTime;

use super::domain::{MarketSnapshot, PricingContext, ScoreRequest};

/// Malformed or contradictory requests, rejected before any pipeline work.
///
/// Degenerate inventory capacity is deliberately absent: it is routed through
/// the fallback machine so the caller still receives a complete result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInput {
    #[error("stay date {stay_date} is {days_past} day(s) before quote time {quote_date}")]
    StayDateInPast {
        stay_date: chrono::NaiveDate,
        quote_date: chrono::NaiveDate,
        days_past: i64,
    },
    #[error("length of stay must be a positive number of nights, got {0}")]
    NonPositiveLengthOfStay(i64),
    #[error("competitor price {field} must be a positive finite amount, got {value}")]
    NonPositiveCompetitorPrice { field: &'static str, value: f64 },
    #[error("competitor percentiles out of order: {lower_field} {lower} exceeds {upper_field} {upper}")]
    UnorderedCompetitorPercentiles {
        lower_field: &'static str,
        lower: f64,
        upper_field: &'static str,
        upper: f64,
    },
}

/// Normalize a raw request into an immutable [`PricingContext`].
///
/// `now` backs the `quote_time` default so the validator stays a pure
/// function; the service supplies the wall clock.
pub(crate) fn validate(
    request: ScoreRequest,
    now: NaiveDateTime,
) -> Result<PricingContext, InvalidInput> {
    let ScoreRequest {
        entity,
        stay_date,
        quote_time,
        product,
        inventory,
        market,
        context,
        toggles,
        allowed_price_grid,
    } = request;

    let quote_time = quote_time.unwrap_or(now);

    let lead_days = (stay_date - quote_time.date()).num_days();
    if lead_days < 0 {
        // A stay date in the past is a contradiction, never clamped to zero.
        return Err(InvalidInput::StayDateInPast {
            stay_date,
            quote_date: quote_time.date(),
            days_past: -lead_days,
        });
    }

    if product.los <= 0 {
        return Err(InvalidInput::NonPositiveLengthOfStay(product.los));
    }

    check_market(&market)?;

    // Documented tolerance: inventory feeds can be transiently stale, so an
    // out-of-range remaining count is clamped instead of rejected.
    let remaining = inventory.remaining.clamp(0, inventory.capacity.max(0));

    let mut toggles = toggles;
    let mut normalization_notes = Vec::new();
    if toggles.aggressive && toggles.conservative {
        // Deterministic tie-break: aggressive wins, the pair is never both applied.
        toggles.conservative = false;
        normalization_notes
            .push("Aggressive strategy overrides conservative toggle".to_string());
    }

    Ok(PricingContext {
        entity,
        stay_date,
        quote_time,
        lead_days,
        product,
        capacity: inventory.capacity,
        remaining,
        overbook_limit: inventory.overbook_limit,
        market,
        season: context.season,
        day_of_week: context.day_of_week,
        weather: context.weather,
        toggles,
        allowed_price_grid,
        normalization_notes,
    })
}

fn check_market(market: &MarketSnapshot) -> Result<(), InvalidInput> {
    let percentiles = [
        ("comp_price_p10", market.comp_price_p10),
        ("comp_price_p50", market.comp_price_p50),
        ("comp_price_p90", market.comp_price_p90),
    ];

    for (field, value) in percentiles {
        if let Some(value) = value {
            if !value.is_finite() || value <= 0.0 {
                return Err(InvalidInput::NonPositiveCompetitorPrice { field, value });
            }
        }
    }

    // Any present pair must be ordered; a crossed distribution is a
    // contradictory request, not something to price against.
    let ordered_pairs = [
        (
            "comp_price_p10",
            market.comp_price_p10,
            "comp_price_p50",
            market.comp_price_p50,
        ),
        (
            "comp_price_p50",
            market.comp_price_p50,
            "comp_price_p90",
            market.comp_price_p90,
        ),
        (
            "comp_price_p10",
            market.comp_price_p10,
            "comp_price_p90",
            market.comp_price_p90,
        ),
    ];
    for (lower_field, lower, upper_field, upper) in ordered_pairs {
        if let (Some(lower), Some(upper)) = (lower, upper) {
            if lower > upper {
                return Err(InvalidInput::UnorderedCompetitorPercentiles {
                    lower_field,
                    lower,
                    upper_field,
                    upper,
                });
            }
        }
    }

    Ok(())
}
