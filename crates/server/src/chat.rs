//! `POST /api/chat`: one routed turn of the slot-filling conversation.

use std::sync::Arc;

use ambel_agent::AgentRuntime;
use ambel_core::{ApplicationError, InterfaceError, Turn};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct ChatState {
    runtime: Arc<AgentRuntime>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct ChatError {
    pub error: String,
}

const INVALID_BODY: &str =
    "request body must be JSON with a string `message` and user/assistant `history` turns";

pub fn router(runtime: Arc<AgentRuntime>) -> Router {
    Router::new().route("/api/chat", post(chat)).with_state(ChatState { runtime })
}

async fn chat(
    State(state): State<ChatState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ChatError>)> {
    let correlation_id = Uuid::new_v4().to_string();
    let span = info_span!("chat_request", correlation_id = %correlation_id);

    async move {
        let request = match payload {
            Ok(Json(request)) => request,
            Err(rejection) => {
                warn!(
                    event_name = "chat.request.rejected",
                    correlation_id = %correlation_id,
                    rejection = %rejection.body_text(),
                    "chat request body could not be decoded"
                );
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ChatError { error: INVALID_BODY.to_string() }),
                ));
            }
        };

        info!(
            event_name = "chat.request.received",
            correlation_id = %correlation_id,
            history_turns = request.history.len(),
            "chat request received"
        );

        match state.runtime.handle_message(&request.history, &request.message).await {
            Ok(reply) => {
                info!(
                    event_name = "chat.request.completed",
                    correlation_id = %correlation_id,
                    "chat reply produced"
                );
                Ok(Json(ChatResponse { reply }))
            }
            Err(router_error) => {
                error!(
                    event_name = "chat.request.failed",
                    correlation_id = %correlation_id,
                    error = %router_error,
                    "chat request failed"
                );
                let interface =
                    ApplicationError::from(router_error).into_interface(correlation_id.as_str());
                Err(error_response(interface))
            }
        }
    }
    .instrument(span)
    .await
}

fn error_response(error: InterfaceError) -> (StatusCode, Json<ChatError>) {
    match error {
        InterfaceError::BadRequest { message, .. } => {
            (StatusCode::BAD_REQUEST, Json(ChatError { error: message }))
        }
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ChatError { error: other.user_message().to_string() }),
        ),
    }
}
