use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};

use crate::pricing::domain::{
    ContextSignals, DayOfWeek, EntityRef, InventorySnapshot, MarketSnapshot, PricingContext,
    ProductSpec, ScoreRequest, Season, StrategyToggles,
};
use crate::pricing::engine::{
    BoundsPolicy, DayOfWeekMultipliers, DemandCurve, EngineConfig, LeadTimeRule, LosTier,
    PricingEngine, SeasonalMultipliers, VariantPolicy,
};
use crate::pricing::outcomes::{OutcomeBatch, OutcomeSink, SinkError};
use crate::pricing::service::ScoringService;
use crate::pricing::validate::validate;

pub(super) fn engine_config() -> EngineConfig {
    EngineConfig {
        default_base_price: 150.0,
        seasonal: SeasonalMultipliers {
            winter: 0.9,
            spring: 1.0,
            summer: 1.3,
            fall: 1.1,
        },
        day_of_week: DayOfWeekMultipliers {
            monday: 1.0,
            tuesday: 1.0,
            wednesday: 1.0,
            thursday: 1.0,
            friday: 1.15,
            saturday: 1.25,
            sunday: 1.1,
        },
        demand: DemandCurve {
            slope: 0.5,
            high_occupancy_threshold: 0.7,
        },
        lead_time: LeadTimeRule {
            last_minute_days: 7,
            last_minute_multiplier: 1.2,
            early_booking_days: 90,
            early_booking_multiplier: 0.9,
        },
        length_of_stay: vec![
            LosTier {
                min_nights: 7,
                multiplier: 0.9,
            },
            LosTier {
                min_nights: 14,
                multiplier: 0.85,
            },
            LosTier {
                min_nights: 30,
                multiplier: 0.8,
            },
        ],
        non_refundable_multiplier: 0.95,
        aggressive_multiplier: 1.1,
        conservative_multiplier: 0.9,
        bounds: BoundsPolicy {
            floor_percentile_factor: 0.8,
            ceiling_percentile_factor: 2.0,
            floor_fallback_factor: 0.5,
            ceiling_fallback_factor: 2.0,
            premium_threshold: 1.1,
            competitive_threshold: 0.9,
        },
        variants: VariantPolicy {
            grid_steps: [0.9, 0.95, 1.0, 1.05, 1.1],
            band_spread: 0.1,
            fallback_grid_spread: 0.1,
            fallback_band_spread: 0.2,
        },
    }
}

pub(super) fn quote_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 6, 1)
        .expect("valid date")
        .and_hms_opt(9, 30, 0)
        .expect("valid time")
}

/// Request with every factor in its neutral case: spring Monday, empty
/// inventory, two-week lead, one refundable night, no competitor data.
pub(super) fn score_request() -> ScoreRequest {
    ScoreRequest {
        entity: EntityRef {
            user_id: "op-17".to_string(),
            property_id: "prop-204".to_string(),
        },
        stay_date: NaiveDate::from_ymd_opt(2026, 6, 15).expect("valid date"),
        quote_time: Some(quote_time()),
        product: ProductSpec {
            kind: "standard".to_string(),
            refundable: true,
            los: 1,
        },
        inventory: InventorySnapshot {
            capacity: 10,
            remaining: 10,
            overbook_limit: 0,
        },
        market: MarketSnapshot::default(),
        context: ContextSignals {
            season: Season::Spring,
            day_of_week: DayOfWeek::Monday,
            weather: None,
        },
        toggles: StrategyToggles::default(),
        allowed_price_grid: None,
    }
}

pub(super) fn context_for(request: ScoreRequest) -> PricingContext {
    validate(request, quote_time()).expect("request validates")
}

pub(super) fn engine() -> PricingEngine {
    PricingEngine::new(engine_config()).expect("valid test config")
}

pub(super) fn service() -> Arc<ScoringService<MemorySink>> {
    Arc::new(
        ScoringService::new(engine_config(), Arc::new(MemorySink::default()))
            .expect("valid test config"),
    )
}

#[derive(Default)]
pub(super) struct MemorySink {
    batches: Mutex<Vec<OutcomeBatch>>,
}

impl MemorySink {
    pub(super) fn recorded(&self) -> Vec<OutcomeBatch> {
        self.batches.lock().expect("sink mutex poisoned").clone()
    }
}

impl OutcomeSink for MemorySink {
    fn record(&self, batch: OutcomeBatch) -> Result<usize, SinkError> {
        let received = batch.outcomes.len();
        self.batches
            .lock()
            .expect("sink mutex poisoned")
            .push(batch);
        Ok(received)
    }
}

pub(super) struct UnavailableSink;

impl OutcomeSink for UnavailableSink {
    fn record(&self, _batch: OutcomeBatch) -> Result<usize, SinkError> {
        Err(SinkError::Unavailable("sink offline".to_string()))
    }
}
