use super::common::*;
use chrono::NaiveDate;

use crate::pricing::domain::{DayOfWeek, OccupancyBucket, Season};
use crate::pricing::engine::rules::FACTOR_CHAIN;
use crate::pricing::engine::{bounds, ComputationError, ConfigurationError, LosTier, PricingEngine};

#[test]
fn factor_chain_order_is_the_declared_contract() {
    let order: Vec<&str> = FACTOR_CHAIN.iter().map(|stage| stage.name).collect();
    assert_eq!(
        order,
        vec![
            "base_price",
            "seasonal",
            "day_of_week",
            "demand",
            "lead_time",
            "length_of_stay",
            "refundability",
            "operator_strategy",
        ]
    );
}

#[test]
fn neutral_request_prices_at_default_base_with_empty_trace() {
    let result = engine().score(&context_for(score_request()));

    assert_eq!(result.price, 150.0);
    assert_eq!(result.price_grid, vec![135.0, 142.5, 150.0, 157.5, 165.0]);
    assert_eq!(result.conf_band.lower, 135.0);
    assert_eq!(result.conf_band.upper, 165.0);
    assert!(result.reasons.is_empty());
    assert_eq!(result.safety.base_price_used, 150.0);
    assert_eq!(result.safety.lead_days, 14);
    assert!(result.safety.error.is_none());
}

#[test]
fn worked_example_produces_reference_price_and_trace() {
    let mut request = score_request();
    request.stay_date = NaiveDate::from_ymd_opt(2026, 6, 20).expect("valid date");
    request.quote_time = Some(
        NaiveDate::from_ymd_opt(2026, 6, 6)
            .expect("valid date")
            .and_hms_opt(9, 30, 0)
            .expect("valid time"),
    );
    request.context.season = Season::Summer;
    request.context.day_of_week = DayOfWeek::Saturday;
    request.inventory.remaining = 2;
    request.market.comp_price_p50 = Some(200.0);

    let result = engine().score(&context_for(request));

    // 200 -> x1.3 -> x1.25 -> x1.4 = 455, no bounds clamp without p10/p90.
    assert_eq!(result.price, 455.0);
    assert_eq!(result.price_grid[2], result.price);
    assert_eq!(result.safety.base_price_used, 200.0);
    assert_eq!(
        result.reasons,
        vec![
            "Base price from competitor median".to_string(),
            "Seasonal adjustment (summer)".to_string(),
            "Weekend premium".to_string(),
            "High demand".to_string(),
            "Premium pricing vs competitors".to_string(),
        ]
    );
}

#[test]
fn weekend_premium_raises_price_above_neutral_base() {
    let mut request = score_request();
    request.stay_date = NaiveDate::from_ymd_opt(2026, 6, 20).expect("valid date");
    request.context.day_of_week = DayOfWeek::Saturday;

    let result = engine().score(&context_for(request));

    assert!(result.price > 150.0);
    assert!(result
        .reasons
        .iter()
        .any(|reason| reason == "Weekend premium"));
}

#[test]
fn seasonal_multiplier_respects_toggle() {
    let mut request = score_request();
    request.context.season = Season::Summer;
    request.toggles.apply_seasonality = false;

    let result = engine().score(&context_for(request));

    assert_eq!(result.price, 150.0);
    assert!(result.reasons.is_empty());
}

#[test]
fn neutral_seasonal_multiplier_emits_no_reason() {
    let mut request = score_request();
    request.context.season = Season::Spring;

    let result = engine().score(&context_for(request));

    assert!(result
        .reasons
        .iter()
        .all(|reason| !reason.contains("Seasonal")));
}

#[test]
fn lead_time_windows_are_exclusive_at_their_boundaries() {
    let cases = [
        (NaiveDate::from_ymd_opt(2026, 6, 7), 180.0),  // 6 days: premium
        (NaiveDate::from_ymd_opt(2026, 6, 8), 150.0),  // exactly 7: neutral
        (NaiveDate::from_ymd_opt(2026, 8, 30), 150.0), // exactly 90: neutral
        (NaiveDate::from_ymd_opt(2026, 8, 31), 135.0), // 91 days: discount
    ];

    for (stay_date, expected) in cases {
        let mut request = score_request();
        request.stay_date = stay_date.expect("valid date");
        let result = engine().score(&context_for(request));
        assert_eq!(result.price, expected, "stay date {:?}", stay_date);
    }
}

#[test]
fn los_tiers_apply_exactly_one_discount() {
    let cases = [
        (6, 150.0, 0),
        (7, 135.0, 1),
        (14, 127.5, 1),
        (30, 120.0, 1),
        (45, 120.0, 1),
    ];

    for (los, expected, discount_reasons) in cases {
        let mut request = score_request();
        request.product.los = los;
        let result = engine().score(&context_for(request));
        assert_eq!(result.price, expected, "los {los}");
        let count = result
            .reasons
            .iter()
            .filter(|reason| reason.contains("Extended stay discount"))
            .count();
        assert_eq!(count, discount_reasons, "los {los}");
    }
}

#[test]
fn los_tiers_are_sorted_at_construction() {
    let mut config = engine_config();
    // Deliberately unsorted so a 30-night stay would hit the 7-night tier if
    // the engine trusted the supplied order.
    config.length_of_stay = vec![
        LosTier {
            min_nights: 7,
            multiplier: 0.9,
        },
        LosTier {
            min_nights: 30,
            multiplier: 0.8,
        },
        LosTier {
            min_nights: 14,
            multiplier: 0.85,
        },
    ];
    let engine = PricingEngine::new(config).expect("valid config");

    let mut request = score_request();
    request.product.los = 30;
    let result = engine.score(&context_for(request));

    assert_eq!(result.price, 120.0);
}

#[test]
fn non_refundable_rate_discounts_and_explains() {
    let mut request = score_request();
    request.product.refundable = false;

    let result = engine().score(&context_for(request));

    assert_eq!(result.price, 142.5);
    assert_eq!(result.reasons, vec!["Non-refundable rate".to_string()]);
}

#[test]
fn operator_strategy_applies_last() {
    let mut aggressive = score_request();
    aggressive.toggles.aggressive = true;
    let result = engine().score(&context_for(aggressive));
    assert_eq!(result.price, 165.0);
    assert_eq!(
        result.reasons,
        vec!["Aggressive strategy uplift".to_string()]
    );

    let mut conservative = score_request();
    conservative.toggles.conservative = true;
    let result = engine().score(&context_for(conservative));
    assert_eq!(result.price, 135.0);
    assert_eq!(
        result.reasons,
        vec!["Conservative strategy discount".to_string()]
    );
}

#[test]
fn conflicting_toggles_resolve_to_aggressive_with_note_first() {
    let mut request = score_request();
    request.toggles.aggressive = true;
    request.toggles.conservative = true;

    let result = engine().score(&context_for(request));

    assert_eq!(result.price, 165.0);
    assert_eq!(
        result.reasons,
        vec![
            "Aggressive strategy overrides conservative toggle".to_string(),
            "Aggressive strategy uplift".to_string(),
        ]
    );
}

#[test]
fn bounds_clamp_to_market_floor_with_commentary() {
    let mut request = score_request();
    request.market.comp_price_p10 = Some(300.0);
    request.market.comp_price_p50 = Some(350.0);
    request.market.comp_price_p90 = Some(400.0);

    let result = engine().score(&context_for(request));

    // Raw 150 sits below the floor 300 * 0.8 = 240.
    assert_eq!(result.price, 240.0);
    assert!(result
        .reasons
        .iter()
        .any(|reason| reason == "Competitive pricing vs market"));
}

#[test]
fn bounds_clamp_to_market_ceiling_with_commentary() {
    let mut request = score_request();
    request.market.comp_price_p10 = Some(40.0);
    request.market.comp_price_p50 = Some(55.0);
    request.market.comp_price_p90 = Some(60.0);

    let result = engine().score(&context_for(request));

    // Raw 150 sits above the ceiling 60 * 2.0 = 120.
    assert_eq!(result.price, 120.0);
    assert!(result
        .reasons
        .iter()
        .any(|reason| reason == "Premium pricing vs competitors"));
}

#[test]
fn enforce_reports_floor_and_ceiling() {
    let mut request = score_request();
    request.market.comp_price_p10 = Some(60.0);
    request.market.comp_price_p90 = Some(100.0);
    let ctx = context_for(request);
    let config = engine_config();
    let mut trace = Vec::new();

    let bounded = bounds::enforce(150.0, &ctx, &config, &mut trace).expect("bounds hold");

    assert!((bounded.floor - 48.0).abs() < 1e-9);
    assert_eq!(bounded.ceiling, 200.0);
    assert_eq!(bounded.price, 150.0);
    assert!(trace.is_empty(), "no commentary without a median");
}

#[test]
fn enforce_rejects_inverted_bounds() {
    let mut request = score_request();
    request.market.comp_price_p10 = Some(1000.0);
    let ctx = context_for(request);
    let config = engine_config();
    let mut trace = Vec::new();

    let error = bounds::enforce(150.0, &ctx, &config, &mut trace).expect_err("inverted");

    assert!(matches!(error, ComputationError::InvertedBounds { .. }));
}

#[test]
fn grid_stays_monotone_at_small_price_magnitudes() {
    let mut config = engine_config();
    config.default_base_price = 0.04;
    let engine = PricingEngine::new(config).expect("valid config");

    let result = engine.score(&context_for(score_request()));

    assert_eq!(result.price_grid.len(), 5);
    assert_eq!(result.price_grid[2], result.price);
    for pair in result.price_grid.windows(2) {
        assert!(pair[0] <= pair[1], "grid inverted: {:?}", result.price_grid);
    }
}

#[test]
fn confidence_band_contains_price() {
    let mut request = score_request();
    request.context.season = Season::Fall;
    request.inventory.remaining = 4;

    let result = engine().score(&context_for(request));

    assert!(result.conf_band.lower <= result.price);
    assert!(result.price <= result.conf_band.upper);
}

#[test]
fn scoring_is_idempotent() {
    let engine = engine();
    let ctx = context_for(score_request());

    let first = engine.score(&ctx);
    let second = engine.score(&ctx);

    assert_eq!(first, second);
}

#[test]
fn occupancy_projection_buckets_scale_with_lead() {
    let mut full = score_request();
    full.inventory.remaining = 2;
    let result = engine().score(&context_for(full));
    // 0.8 now, 40% of the remainder picked up over a two-week lead.
    assert_eq!(result.expected.occ_end_bucket, OccupancyBucket::High);

    let empty = score_request();
    let result = engine().score(&context_for(empty));
    assert_eq!(result.expected.occ_now, 0.0);
    assert_eq!(result.expected.occ_end_bucket, OccupancyBucket::Moderate);

    let mut short_lead = score_request();
    short_lead.stay_date = NaiveDate::from_ymd_opt(2026, 6, 3).expect("valid date");
    let result = engine().score(&context_for(short_lead));
    assert_eq!(result.expected.occ_end_bucket, OccupancyBucket::Low);
}

#[test]
fn invalid_tables_fail_at_construction() {
    let mut config = engine_config();
    config.aggressive_multiplier = 0.0;
    assert!(matches!(
        PricingEngine::new(config),
        Err(ConfigurationError::InvalidMultiplier { .. })
    ));

    let mut config = engine_config();
    config.default_base_price = f64::NAN;
    assert!(matches!(
        PricingEngine::new(config),
        Err(ConfigurationError::InvalidBasePrice(_))
    ));

    let mut config = engine_config();
    config.variants.grid_steps = [0.9, 0.95, 1.02, 1.05, 1.1];
    assert!(matches!(
        PricingEngine::new(config),
        Err(ConfigurationError::InvalidGridSteps)
    ));

    let mut config = engine_config();
    config.variants.band_spread = 1.5;
    assert!(matches!(
        PricingEngine::new(config),
        Err(ConfigurationError::InvalidSpread { .. })
    ));

    let mut config = engine_config();
    config.length_of_stay.push(LosTier {
        min_nights: 0,
        multiplier: 0.7,
    });
    assert!(matches!(
        PricingEngine::new(config),
        Err(ConfigurationError::InvalidLosThreshold(0))
    ));
}
