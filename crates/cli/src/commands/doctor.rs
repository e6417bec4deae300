use ambel_core::config::{AppConfig, LoadOptions};
use ambel_db::{
    connect_with_settings, DbPool, KnowledgeRepository, ProfessionalRepository,
    SqlKnowledgeRepository, SqlProfessionalRepository,
};
use secrecy::ExposeSecret;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

impl CheckStatus {
    fn marker(self) -> &'static str {
        match self {
            Self::Pass => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Skipped => "skip",
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn new(name: &'static str, status: CheckStatus, details: impl Into<String>) -> Self {
        Self { name, status, details: details.into() }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const CONFIG_DEPENDENT: &[&str] = &["llm_credentials", "database_connectivity", "data_readiness"];

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":{:?}}}",
                error.to_string()
            )
        });
    }

    let mut lines = vec![report.summary.clone()];
    lines.extend(
        report
            .checks
            .iter()
            .map(|check| format!("- [{}] {}: {}", check.status.marker(), check.name, check.details)),
    );
    lines.join("\n")
}

fn build_report() -> DoctorReport {
    let checks = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            let mut checks = vec![
                DoctorCheck::new(
                    "config_validation",
                    CheckStatus::Pass,
                    "configuration loaded and validated",
                ),
                check_llm_credentials(&config),
            ];
            checks.extend(check_storage(&config));
            checks
        }
        Err(error) => std::iter::once(DoctorCheck::new(
            "config_validation",
            CheckStatus::Fail,
            error.to_string(),
        ))
        .chain(CONFIG_DEPENDENT.iter().map(|&name| {
            DoctorCheck::new(name, CheckStatus::Skipped, "skipped because configuration did not load")
        }))
        .collect(),
    };

    // Warnings (an unseeded directory, say) do not fail readiness.
    let failed = checks
        .iter()
        .any(|check| matches!(check.status, CheckStatus::Fail | CheckStatus::Skipped));
    let (overall_status, summary) = if failed {
        (CheckStatus::Fail, "doctor: one or more readiness checks failed")
    } else {
        (CheckStatus::Pass, "doctor: all readiness checks passed")
    };

    DoctorReport { overall_status, summary: summary.to_string(), checks }
}

/// Offline check: the key is present and the endpoint is an http(s) URL.
fn check_llm_credentials(config: &AppConfig) -> DoctorCheck {
    let has_key = !config.llm.api_key.expose_secret().trim().is_empty();
    let base_url = &config.llm.base_url;
    let url_ok = base_url.starts_with("https://") || base_url.starts_with("http://");

    match (has_key, url_ok) {
        (true, true) => DoctorCheck::new(
            "llm_credentials",
            CheckStatus::Pass,
            format!(
                "api key present; chat model `{}`, embedding model `{}` at {base_url}",
                config.llm.chat_model, config.llm.embedding_model
            ),
        ),
        (false, _) => DoctorCheck::new("llm_credentials", CheckStatus::Fail, "llm.api_key is empty"),
        (true, false) => DoctorCheck::new(
            "llm_credentials",
            CheckStatus::Fail,
            format!("llm.base_url `{base_url}` is not http(s)"),
        ),
    }
}

/// Connectivity plus row counts for the two collections the server reads.
fn check_storage(config: &AppConfig) -> [DoctorCheck; 2] {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return [
                DoctorCheck::new(
                    "database_connectivity",
                    CheckStatus::Fail,
                    format!("failed to initialize async runtime: {error}"),
                ),
                DoctorCheck::new("data_readiness", CheckStatus::Skipped, "no async runtime"),
            ];
        }
    };

    runtime.block_on(async {
        let pool = match connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        {
            Ok(pool) => pool,
            Err(error) => {
                return [
                    DoctorCheck::new(
                        "database_connectivity",
                        CheckStatus::Fail,
                        format!("failed to connect to database: {error}"),
                    ),
                    DoctorCheck::new(
                        "data_readiness",
                        CheckStatus::Skipped,
                        "skipped because the database is unreachable",
                    ),
                ];
            }
        };

        let connectivity = DoctorCheck::new(
            "database_connectivity",
            CheckStatus::Pass,
            format!("connected using `{}`", config.database.url),
        );
        let readiness = check_data_readiness(&pool).await;
        pool.close().await;

        [connectivity, readiness]
    })
}

async fn check_data_readiness(pool: &DbPool) -> DoctorCheck {
    let professionals = SqlProfessionalRepository::new(pool.clone()).count().await;
    let knowledge = SqlKnowledgeRepository::new(pool.clone()).count().await;

    match (professionals, knowledge) {
        (Ok(0), _) => DoctorCheck::new(
            "data_readiness",
            CheckStatus::Warn,
            "professional directory is empty; run `ambel seed`",
        ),
        (Ok(professionals), Ok(0)) => DoctorCheck::new(
            "data_readiness",
            CheckStatus::Warn,
            format!("{professionals} professionals; knowledge base is empty, run `ambel load-knowledge`"),
        ),
        (Ok(professionals), Ok(entries)) => DoctorCheck::new(
            "data_readiness",
            CheckStatus::Pass,
            format!("{professionals} professionals, {entries} knowledge base entries"),
        ),
        (Err(_), _) | (_, Err(_)) => DoctorCheck::new(
            "data_readiness",
            CheckStatus::Warn,
            "schema is not migrated; run `ambel migrate`",
        ),
    }
}
