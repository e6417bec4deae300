use std::sync::Arc;

use ambel_agent::{AgentRuntime, FaqResponder, GeminiClient, LlmError};
use ambel_core::config::{AppConfig, ConfigError};
use ambel_db::{
    connect_with_settings, migrations, DbPool, SqlKnowledgeRepository, SqlProfessionalRepository,
};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub runtime: Arc<AgentRuntime>,
    pub faq: Arc<FaqResponder>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("llm client setup failed: {0}")]
    Llm(#[source] LlmError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let gemini = Arc::new(GeminiClient::new(&config.llm).map_err(BootstrapError::Llm)?);
    let directory = Arc::new(SqlProfessionalRepository::new(db_pool.clone()));
    let knowledge = Arc::new(SqlKnowledgeRepository::new(db_pool.clone()));

    let runtime = Arc::new(AgentRuntime::new(
        gemini.clone(),
        gemini.clone(),
        gemini.clone(),
        directory,
        config.search.clone(),
    ));
    let faq = Arc::new(FaqResponder::new(knowledge, gemini));
    info!(
        event_name = "system.bootstrap.router_ready",
        correlation_id = "bootstrap",
        chat_model = %config.llm.chat_model,
        embedding_model = %config.llm.embedding_model,
        "conversation router initialized"
    );

    Ok(Application { config, db_pool, runtime, faq })
}

#[cfg(test)]
mod tests {
    use ambel_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use crate::bootstrap::{bootstrap_with_config, Application, BootstrapError};

    async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
        bootstrap_with_config(AppConfig::load(options)?).await
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_without_llm_api_key() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                llm_api_key: Some("   ".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        assert!(result.is_err());
        let message = result.err().expect("error").to_string();
        assert!(message.contains("llm.api_key"));
    }

    #[tokio::test]
    async fn bootstrap_connects_and_applies_migrations() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                llm_api_key: Some("test-gemini-key".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap should succeed with valid overrides");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('professionals', 'knowledge_base')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("schema query");
        assert_eq!(table_count, 2);
        assert_eq!(app.config.search.limit, 3);

        app.db_pool.close().await;
    }
}
