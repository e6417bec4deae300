//! Legacy single-question endpoint and the plain-text root greeting.

use std::sync::Arc;

use ambel_agent::{FaqError, FaqResponder};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

pub const ROOT_GREETING: &str = "Hello from the Ambel AI Backend! 👋";
const MISSING_QUESTION: &str = "Error: No question provided.";
const SERVER_FAILURE: &str = "An error occurred on the server.";

#[derive(Clone)]
pub struct FaqState {
    responder: Arc<FaqResponder>,
}

#[derive(Debug, Deserialize)]
pub struct FaqRequest {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FaqResponse {
    pub answer: String,
}

pub fn router(responder: Arc<FaqResponder>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/chat", post(ask))
        .with_state(FaqState { responder })
}

async fn root() -> &'static str {
    ROOT_GREETING
}

async fn ask(
    State(state): State<FaqState>,
    payload: Result<Json<FaqRequest>, JsonRejection>,
) -> (StatusCode, Json<FaqResponse>) {
    let question = match payload {
        Ok(Json(request)) => request.question.unwrap_or_default(),
        Err(rejection) => {
            warn!(
                event_name = "faq.request.rejected",
                rejection = %rejection.body_text(),
                "faq request body could not be decoded"
            );
            return (
                StatusCode::BAD_REQUEST,
                Json(FaqResponse { answer: MISSING_QUESTION.to_string() }),
            );
        }
    };

    match state.responder.answer(&question).await {
        Ok(answer) => (StatusCode::OK, Json(FaqResponse { answer })),
        Err(FaqError::EmptyQuestion) => {
            (StatusCode::BAD_REQUEST, Json(FaqResponse { answer: MISSING_QUESTION.to_string() }))
        }
        Err(failure) => {
            error!(
                event_name = "faq.request.failed",
                correlation_id = %Uuid::new_v4(),
                error = %failure,
                "faq request failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FaqResponse { answer: SERVER_FAILURE.to_string() }),
            )
        }
    }
}
