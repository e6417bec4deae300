use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ambel_core::config::{default_config_paths, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct ConfigField {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(effective_fields(&config).into_iter().map(|field| {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        render_line(field.key, &field.value, source)
    }));

    lines.join("\n")
}

fn effective_fields(config: &AppConfig) -> Vec<ConfigField> {
    let field = |key: &'static str, value: String, env_keys: &'static [&'static str]| {
        ConfigField { key, value, env_keys }
    };

    vec![
        field("database.url", config.database.url.clone(), &["AMBEL_DATABASE_URL"]),
        field(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["AMBEL_DATABASE_MAX_CONNECTIONS"],
        ),
        field(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["AMBEL_DATABASE_TIMEOUT_SECS"],
        ),
        field(
            "llm.api_key",
            redact_key(config.llm.api_key.expose_secret()),
            &["AMBEL_LLM_API_KEY", "GEMINI_API_KEY"],
        ),
        field("llm.base_url", config.llm.base_url.clone(), &["AMBEL_LLM_BASE_URL"]),
        field("llm.chat_model", config.llm.chat_model.clone(), &["AMBEL_LLM_CHAT_MODEL"]),
        field(
            "llm.embedding_model",
            config.llm.embedding_model.clone(),
            &["AMBEL_LLM_EMBEDDING_MODEL"],
        ),
        field("llm.timeout_secs", config.llm.timeout_secs.to_string(), &["AMBEL_LLM_TIMEOUT_SECS"]),
        field(
            "search.num_candidates",
            config.search.num_candidates.to_string(),
            &["AMBEL_SEARCH_NUM_CANDIDATES"],
        ),
        field("search.limit", config.search.limit.to_string(), &["AMBEL_SEARCH_LIMIT"]),
        field(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["AMBEL_SERVER_BIND_ADDRESS"],
        ),
        field("server.port", config.server.port.to_string(), &["AMBEL_SERVER_PORT"]),
        field(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["AMBEL_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        field(
            "logging.level",
            config.logging.level.clone(),
            &["AMBEL_LOGGING_LEVEL", "AMBEL_LOG_LEVEL"],
        ),
        field(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["AMBEL_LOGGING_FORMAT", "AMBEL_LOG_FORMAT"],
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    default_config_paths().into_iter().find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps the last four characters so operators can tell keys apart.
fn redact_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let chars = trimmed.chars().collect::<Vec<_>>();
    if chars.len() <= 8 {
        return "<redacted>".to_string();
    }
    let suffix = chars[chars.len() - 4..].iter().collect::<String>();
    format!("***{suffix}")
}

#[cfg(test)]
mod tests {
    use super::{contains_path, redact_key};

    #[test]
    fn redaction_never_reveals_short_keys() {
        assert_eq!(redact_key(""), "<empty>");
        assert_eq!(redact_key("abc123"), "<redacted>");
        assert_eq!(redact_key("AIzaSyExampleKey9876"), "***9876");
    }

    #[test]
    fn dotted_paths_resolve_through_tables() {
        let doc: toml::Value = "[search]\nlimit = 5\n".parse().expect("toml");
        assert!(contains_path(&doc, "search.limit"));
        assert!(!contains_path(&doc, "search.num_candidates"));
    }
}
