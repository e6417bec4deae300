use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use ambel_db::{
    DbPool, KnowledgeRepository, ProfessionalRepository, RepositoryError, SqlKnowledgeRepository,
    SqlProfessionalRepository,
};
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    professionals: Arc<dyn ProfessionalRepository>,
    knowledge: Arc<dyn KnowledgeRepository>,
}

impl HealthState {
    pub fn new(db_pool: DbPool) -> Self {
        Self {
            professionals: Arc::new(SqlProfessionalRepository::new(db_pool.clone())),
            knowledge: Arc::new(SqlKnowledgeRepository::new(db_pool.clone())),
            db_pool,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CollectionStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
}

impl CollectionStatus {
    fn from_count(count: Result<usize, RepositoryError>) -> Self {
        match count {
            Ok(0) => Self { status: "empty", rows: Some(0) },
            Ok(rows) => Self { status: "ready", rows: Some(rows) },
            Err(_) => Self { status: "unavailable", rows: None },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub professionals: CollectionStatus,
    pub knowledge_base: CollectionStatus,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState::new(db_pool))
}

/// Readiness follows the database ping alone. Collection counts are
/// informational: an unseeded directory still serves `ASK_*` turns.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let reachable =
        sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&state.db_pool).await.is_ok();

    let (professionals, knowledge_base) = if reachable {
        (
            CollectionStatus::from_count(state.professionals.count().await),
            CollectionStatus::from_count(state.knowledge.count().await),
        )
    } else {
        let unavailable = CollectionStatus { status: "unavailable", rows: None };
        (unavailable.clone(), unavailable)
    };

    if !reachable {
        tracing::warn!(
            event_name = "system.health.database_unreachable",
            correlation_id = "health",
            "health probe could not reach the database"
        );
    }

    let payload = HealthResponse {
        status: if reachable { "ready" } else { "degraded" },
        database: if reachable { "ready" } else { "unreachable" },
        professionals,
        knowledge_base,
        checked_at: Utc::now().to_rfc3339(),
    };
    let status_code = if reachable { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (status_code, Json(payload))
}
