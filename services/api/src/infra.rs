use chrono::{NaiveDate, NaiveDateTime};
use metrics_exporter_prometheus::PrometheusHandle;
use rate_ai::pricing::{
    BoundsPolicy, DayOfWeek, DayOfWeekMultipliers, DemandCurve, EngineConfig, LeadTimeRule,
    LosTier, OutcomeBatch, OutcomeSink, Season, SeasonalMultipliers, SinkError, VariantPolicy,
};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Inert in-process sink for `/learn` batches. Outcomes are retained for
/// inspection only; nothing feeds back into the engine.
#[derive(Default, Clone)]
pub(crate) struct InMemoryOutcomeSink {
    batches: Arc<Mutex<Vec<OutcomeBatch>>>,
}

impl OutcomeSink for InMemoryOutcomeSink {
    fn record(&self, batch: OutcomeBatch) -> Result<usize, SinkError> {
        let received = batch.outcomes.len();
        let mut guard = self.batches.lock().expect("sink mutex poisoned");
        guard.push(batch);
        Ok(received)
    }
}

impl InMemoryOutcomeSink {
    pub(crate) fn batches(&self) -> Vec<OutcomeBatch> {
        self.batches.lock().expect("sink mutex poisoned").clone()
    }
}

/// Production factor tables. The base price is deployment-configurable; the
/// multiplier tables are the tuned defaults shared by every tenant today.
pub(crate) fn default_engine_config(base_price: f64) -> EngineConfig {
    EngineConfig {
        default_base_price: base_price,
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

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).expect("midnight is always valid"));
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .map_err(|err| format!("failed to parse '{raw}' as a date or timestamp ({err})"))
}

pub(crate) fn parse_season(raw: &str) -> Result<Season, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "winter" => Ok(Season::Winter),
        "spring" => Ok(Season::Spring),
        "summer" => Ok(Season::Summer),
        "fall" | "autumn" => Ok(Season::Fall),
        other => Err(format!("unknown season '{other}'")),
    }
}

pub(crate) fn parse_day_of_week(raw: &str) -> Result<DayOfWeek, String> {
    DayOfWeek::parse_name(raw).ok_or_else(|| format!("unknown day of week '{raw}'"))
}
