//! Nightly-rate scoring: request validation, the ordered factor pipeline,
//! bounds enforcement, variant generation, and the fallback state machine
//! that guarantees callers never see a partially-computed result.

pub mod domain;
pub mod engine;
pub mod outcomes;
pub mod router;
pub mod service;
pub(crate) mod validate;

#[cfg(test)]
mod tests;

pub use domain::{
    ConfidenceBand, ContextSignals, DayOfWeek, EntityRef, ExpectedOccupancy, InventorySnapshot,
    MarketSnapshot, OccupancyBucket, PricingContext, PricingResult, ProductSpec, SafetyInfo,
    ScoreRequest, Season, StrategyToggles,
};
pub use engine::{
    BoundsPolicy, ComputationError, ConfigurationError, DayOfWeekMultipliers, DemandCurve,
    EngineConfig, LeadTimeRule, LosTier, PricingEngine, SeasonalMultipliers, VariantPolicy,
};
pub use outcomes::{BookingOutcome, LearnReceipt, OutcomeBatch, OutcomeSink, SinkError};
pub use router::scoring_router;
pub use service::ScoringService;
pub use validate::InvalidInput;
