use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};

use super::domain::{PricingResult, ScoreRequest};
use super::engine::{ConfigurationError, EngineConfig, PricingEngine};
use super::outcomes::{LearnReceipt, OutcomeBatch, OutcomeSink, SinkError};
use super::validate::{validate, InvalidInput};

/// Facade composing the request validator, the scoring engine, and the inert
/// outcome sink behind the `/learn` surface.
pub struct ScoringService<S> {
    engine: PricingEngine,
    sink: Arc<S>,
}

impl<S> ScoringService<S>
where
    S: OutcomeSink + 'static,
{
    pub fn new(config: EngineConfig, sink: Arc<S>) -> Result<Self, ConfigurationError> {
        Ok(Self {
            engine: PricingEngine::new(config)?,
            sink,
        })
    }

    /// Validate and score a request against the current wall clock.
    pub fn score(&self, request: ScoreRequest) -> Result<PricingResult, InvalidInput> {
        self.score_at(request, Utc::now().naive_utc())
    }

    /// Deterministic entry point: the clock backing the `quote_time` default
    /// is supplied by the caller, which is what tests and the CLI use.
    pub fn score_at(
        &self,
        request: ScoreRequest,
        now: NaiveDateTime,
    ) -> Result<PricingResult, InvalidInput> {
        let ctx = validate(request, now)?;
        Ok(self.engine.score(&ctx))
    }

    /// Accept and acknowledge a booking-outcome batch. The batch is counted
    /// into the sink and nothing else happens; scoring is unaffected.
    pub fn learn(&self, batch: OutcomeBatch) -> Result<LearnReceipt, SinkError> {
        let received = self.sink.record(batch)?;
        Ok(LearnReceipt::accepted(received))
    }

    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }
}
