use super::common::*;

use crate::pricing::domain::OccupancyBucket;
use crate::pricing::engine::fallback::{ScoringState, FALLBACK_REASON};
use crate::pricing::engine::ComputationError;

#[test]
fn zero_capacity_never_raises_and_returns_the_degraded_shape() {
    let mut request = score_request();
    request.inventory.capacity = 0;
    request.inventory.remaining = 0;

    let result = engine().score(&context_for(request));

    assert_eq!(result.reasons, vec![FALLBACK_REASON.to_string()]);
    assert_eq!(result.price, 150.0);
    assert_eq!(result.price_grid, vec![135.0, 150.0, 165.0]);
    assert_eq!(result.conf_band.lower, 120.0);
    assert_eq!(result.conf_band.upper, 180.0);
    assert_eq!(result.safety.occupancy_rate, 0.0);
    let error = result.safety.error.expect("cause recorded");
    assert!(error.contains("capacity 0"));
}

#[test]
fn negative_capacity_takes_the_same_path() {
    let mut request = score_request();
    request.inventory.capacity = -4;
    request.inventory.remaining = 2;

    let result = engine().score(&context_for(request));

    assert_eq!(result.reasons, vec![FALLBACK_REASON.to_string()]);
    assert!(result.safety.error.is_some());
}

#[test]
fn fallback_base_follows_competitor_median_when_enabled() {
    let mut request = score_request();
    request.inventory.capacity = 0;
    request.market.comp_price_p50 = Some(220.0);

    let result = engine().score(&context_for(request));

    assert_eq!(result.price, 220.0);
    assert_eq!(result.price_grid, vec![198.0, 220.0, 242.0]);
    assert_eq!(result.conf_band.lower, 176.0);
    assert_eq!(result.conf_band.upper, 264.0);
}

#[test]
fn fallback_base_ignores_median_when_competitors_disabled() {
    let mut request = score_request();
    request.inventory.capacity = 0;
    request.market.comp_price_p50 = Some(220.0);
    request.toggles.use_competitors = false;

    let result = engine().score(&context_for(request));

    assert_eq!(result.price, 150.0);
}

#[test]
fn inverted_market_bounds_demote_instead_of_panicking() {
    let mut request = score_request();
    // A p10-only market far above the raw pipeline price inverts the range:
    // floor 800 vs ceiling 300.
    request.market.comp_price_p10 = Some(1000.0);

    let result = engine().score(&context_for(request));

    assert_eq!(result.reasons, vec![FALLBACK_REASON.to_string()]);
    let error = result.safety.error.expect("cause recorded");
    assert!(error.contains("inverted"));
}

#[test]
fn fallback_discards_partial_reason_trace() {
    let mut request = score_request();
    request.inventory.capacity = 0;
    request.toggles.aggressive = true;
    request.toggles.conservative = true;

    let result = engine().score(&context_for(request));

    // The toggle-conflict note was produced before the demand stage failed;
    // the degraded result must not leak it.
    assert_eq!(result.reasons, vec![FALLBACK_REASON.to_string()]);
}

#[test]
fn state_machine_resolves_each_state_to_a_complete_result() {
    let ctx = context_for(score_request());
    let config = engine_config();

    let normal = ScoringState::from_attempt(Ok(engine().score(&ctx)));
    let result = normal.into_result(&ctx, &config);
    assert!(result.safety.error.is_none());

    let demoted = ScoringState::from_attempt(Err(ComputationError::DegenerateInventory {
        capacity: 0,
    }));
    let result = demoted.into_result(&ctx, &config);
    assert_eq!(result.reasons, vec![FALLBACK_REASON.to_string()]);
    assert!(result.safety.error.is_some());
}

#[test]
fn fallback_still_projects_expected_occupancy() {
    let mut request = score_request();
    request.inventory.capacity = 0;

    let result = engine().score(&context_for(request));

    assert_eq!(result.expected.occ_now, 0.0);
    assert_eq!(result.expected.occ_end_bucket, OccupancyBucket::Moderate);
}
