use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One booking outcome reported after the quote window closes. Every field
/// is optional: the learning extension behind this surface is unimplemented,
/// so early integrations may send whatever partial shape they have.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingOutcome {
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub stay_date: Option<NaiveDate>,
    #[serde(default)]
    pub quoted_price: Option<f64>,
    #[serde(default)]
    pub booked: Option<bool>,
    #[serde(default)]
    pub realized_occupancy: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeBatch {
    #[serde(default)]
    pub outcomes: Vec<BookingOutcome>,
}

/// Acknowledgement returned for an accepted batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnReceipt {
    pub status: String,
    pub received: usize,
}

impl LearnReceipt {
    pub fn accepted(received: usize) -> Self {
        Self {
            status: "accepted".to_string(),
            received,
        }
    }
}

/// Seam for the future online-learning extension. Implementations must stay
/// inert with respect to scoring: nothing recorded here may influence the
/// engine's weighting.
pub trait OutcomeSink: Send + Sync {
    fn record(&self, batch: OutcomeBatch) -> Result<usize, SinkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("outcome sink unavailable: {0}")]
    Unavailable(String),
}
