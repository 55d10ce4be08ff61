//! HTTP routes over the disambiguation functions.

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    context::AppContext,
    disambiguate::{self, ClassifierPrediction, MaskPrediction},
    error::DisambiguationError,
    model::{MaskScorer, PairClassifier},
    segment::{self, Segment},
};

pub const CLASSIFIER_ROUTE: &str = "/disambiguation/classifier";
pub const MLM_ROUTE: &str = "/disambiguation/mlm";
pub const MLM_ALL_ROUTE: &str = "/disambiguation/mlm/all";

#[derive(Debug, Deserialize)]
pub struct SentenceForm {
    pub sentence: String,
}

/// Registers only the routes whose model is loaded.
pub fn router(context: AppContext) -> Router {
    let mut router = Router::new();

    if let Some(classifier) = context.classifier {
        router = router.merge(
            Router::new()
                .route(CLASSIFIER_ROUTE, post(classify))
                .with_state(classifier),
        );
    }

    if let Some(mlm) = context.mlm {
        router = router.merge(
            Router::new()
                .route(MLM_ROUTE, post(predict_marked))
                .route(MLM_ALL_ROUTE, post(predict_all))
                .with_state(mlm),
        );
    }

    router
}

async fn classify(
    State(classifier): State<Arc<dyn PairClassifier>>,
    Form(form): Form<SentenceForm>,
) -> Result<Json<ClassifierPrediction>, ApiError> {
    run_blocking(move || disambiguate::classify(classifier.as_ref(), &form.sentence)).await
}

async fn predict_marked(
    State(mlm): State<Arc<dyn MaskScorer>>,
    Form(form): Form<SentenceForm>,
) -> Result<Json<MaskPrediction>, ApiError> {
    run_blocking(move || disambiguate::predict_marked(mlm.as_ref(), &form.sentence)).await
}

async fn predict_all(
    State(mlm): State<Arc<dyn MaskScorer>>,
    Form(form): Form<SentenceForm>,
) -> Result<Json<Vec<Segment>>, ApiError> {
    run_blocking(move || segment::segment(mlm.as_ref(), &form.sentence)).await
}

/// Inference is CPU-bound, so it leaves the async workers.
async fn run_blocking<T, F>(work: F) -> Result<Json<T>, ApiError>
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Result<T, DisambiguationError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map(Json).map_err(ApiError::from),
        Err(join) => Err(ApiError::Internal(format!("inference task failed: {join}"))),
    }
}

/// Plain-text error response.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<DisambiguationError> for ApiError {
    fn from(err: DisambiguationError) -> Self {
        if err.is_multiple_masks() {
            warn!(%err, "rejected query");
            return ApiError::BadRequest(err.to_string());
        }
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::Internal(message) => {
                error!(%message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ModelError, QueryError};

    #[test]
    fn multiple_masks_map_to_bad_request() {
        let err = DisambiguationError::Model(ModelError::MultipleMasks { count: 3 });
        match ApiError::from(err) {
            ApiError::BadRequest(message) => {
                assert_eq!(message, "No two queries allowed in one sentence.");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_marker_maps_to_internal_error() {
        let err = DisambiguationError::Query(QueryError::MissingMarker);
        match ApiError::from(err) {
            ApiError::Internal(message) => {
                assert_eq!(message, "'die' or 'dat' should be surrounded by underscores.");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn status_codes() {
        let response = ApiError::BadRequest("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = ApiError::Internal("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
