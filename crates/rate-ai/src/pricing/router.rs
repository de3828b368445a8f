use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::domain::ScoreRequest;
use super::outcomes::{OutcomeBatch, OutcomeSink};
use super::service::ScoringService;

/// Router builder exposing the scoring wire contract.
pub fn scoring_router<S>(service: Arc<ScoringService<S>>) -> Router
where
    S: OutcomeSink + 'static,
{
    Router::new()
        .route("/score", post(score_handler::<S>))
        .route("/learn", post(learn_handler::<S>))
        .with_state(service)
}

pub(crate) async fn score_handler<S>(
    State(service): State<Arc<ScoringService<S>>>,
    axum::Json(request): axum::Json<ScoreRequest>,
) -> Response
where
    S: OutcomeSink + 'static,
{
    match service.score(request) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn learn_handler<S>(
    State(service): State<Arc<ScoringService<S>>>,
    axum::Json(batch): axum::Json<OutcomeBatch>,
) -> Response
where
    S: OutcomeSink + 'static,
{
    match service.learn(batch) {
        Ok(receipt) => (StatusCode::ACCEPTED, axum::Json(receipt)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
