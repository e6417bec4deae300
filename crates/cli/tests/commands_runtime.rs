use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};

use ambel_cli::commands::{config, convert, doctor, load_knowledge, migrate};
use serde_json::Value;

const FAQ_TEXT: &str = "\
What is Ambel?
Ambel is an online platform for booking appointments with verified professionals.
ambel.ca | page 1
How do I pay for a booking?
Payments are accepted by card or mobile wallet during checkout on the website.
";

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(
        &[("AMBEL_LLM_API_KEY", "test-gemini-key"), ("AMBEL_DATABASE_URL", "sqlite::memory:")],
        || {
            let result = migrate::run();
            assert_eq!(result.exit_code, 0, "expected successful migrate run");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "migrate");
            assert_eq!(payload["status"], "ok");
        },
    );
}

#[test]
fn migrate_returns_config_failure_without_api_key() {
    with_env(&[("AMBEL_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
        assert!(payload["message"].as_str().unwrap_or_default().contains("llm.api_key"));
    });
}

#[test]
fn convert_writes_qa_pairs_as_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Ambel.txt");
    let output = dir.path().join("Ambel.json");
    fs::write(&input, FAQ_TEXT).expect("write input");

    let result = convert::run(&input, &output);
    assert_eq!(result.exit_code, 0);
    assert_eq!(parse_payload(&result.output)["status"], "ok");

    let written: Value =
        serde_json::from_str(&fs::read_to_string(&output).expect("read output")).expect("json");
    assert_eq!(written.as_array().map(Vec::len), Some(2));
    assert_eq!(written[0]["question"], "What is Ambel?");
    assert_eq!(written[1]["question"], "How do I pay for a booking?");
}

#[test]
fn convert_without_pairs_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Ambel.txt");
    let output = dir.path().join("Ambel.json");
    fs::write(&input, "ambel.ca | footer only\n").expect("write input");

    let result = convert::run(&input, &output);

    assert_eq!(result.exit_code, 0);
    assert!(parse_payload(&result.output)["message"]
        .as_str()
        .unwrap_or_default()
        .contains("no Q&A pairs"));
    assert!(!output.exists());
}

#[test]
fn convert_reports_missing_input() {
    let dir = tempfile::tempdir().expect("tempdir");

    let result = convert::run(&dir.path().join("missing.txt"), &dir.path().join("out.json"));

    assert_eq!(result.exit_code, 8);
    assert_eq!(parse_payload(&result.output)["error_class"], "input_read");
}

#[test]
fn load_knowledge_without_embeddings_stores_pairs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Ambel.json");
    fs::write(
        &input,
        r#"[{"question":"What is Ambel?","answer":"A booking platform."},
            {"question":"How do I pay?","answer":"By card."}]"#,
    )
    .expect("write input");
    let database_url = format!("sqlite://{}", dir.path().join("ambel.db").display());

    with_env(
        &[("AMBEL_LLM_API_KEY", "test-gemini-key"), ("AMBEL_DATABASE_URL", &database_url)],
        || {
            let first = load_knowledge::run(&input, true);
            assert_eq!(first.exit_code, 0, "unexpected output: {}", first.output);
            let second = load_knowledge::run(&input, true);
            assert_eq!(second.exit_code, 0);

            let payload = parse_payload(&second.output);
            assert_eq!(payload["command"], "load-knowledge");
            let message = payload["message"].as_str().unwrap_or_default();
            assert!(message.starts_with("stored 2 Q&A pairs without embeddings from"));
        },
    );
}

#[test]
fn load_knowledge_rejects_malformed_input_before_touching_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Ambel.json");
    fs::write(&input, "not json").expect("write input");

    with_env(&[], || {
        let result = load_knowledge::run(&input, true);
        assert_eq!(result.exit_code, 8);
        assert_eq!(parse_payload(&result.output)["error_class"], "input_parse");
    });
}

#[test]
fn doctor_reports_pass_with_valid_env() {
    with_env(
        &[("AMBEL_LLM_API_KEY", "test-gemini-key"), ("AMBEL_DATABASE_URL", "sqlite::memory:")],
        || {
            let payload = parse_payload(&doctor::run(true));
            assert_eq!(payload["overall_status"], "pass");

            let names = payload["checks"]
                .as_array()
                .expect("checks array")
                .iter()
                .map(|check| check["name"].as_str().unwrap_or_default().to_string())
                .collect::<Vec<_>>();
            assert_eq!(
                names,
                vec!["config_validation", "llm_credentials", "database_connectivity", "data_readiness"]
            );
            assert_eq!(payload["checks"][3]["status"], "warn");
        },
    );
}

#[test]
fn doctor_skips_dependent_checks_when_config_fails() {
    with_env(&[], || {
        let payload = parse_payload(&doctor::run(true));
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][1]["status"], "skipped");
        assert_eq!(payload["checks"][2]["status"], "skipped");
        assert_eq!(payload["checks"][3]["status"], "skipped");

        let human = doctor::run(false);
        assert!(human.starts_with("doctor: one or more readiness checks failed"));
        assert!(human.contains("- [skip] database_connectivity"));
    });
}

#[test]
fn config_attributes_sources_and_redacts_key() {
    with_env(
        &[("GEMINI_API_KEY", "AIzaSyExampleKey9876"), ("AMBEL_SEARCH_LIMIT", "5")],
        || {
            let output = config::run();

            assert!(output.contains("- llm.api_key = ***9876 (source: env (GEMINI_API_KEY))"));
            assert!(output.contains("- search.limit = 5 (source: env (AMBEL_SEARCH_LIMIT))"));
            assert!(output.contains("- search.num_candidates = 100 (source: default)"));
            assert!(!output.contains("AIzaSyExampleKey9876"));
        },
    );
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "AMBEL_DATABASE_URL",
        "AMBEL_DATABASE_MAX_CONNECTIONS",
        "AMBEL_DATABASE_TIMEOUT_SECS",
        "AMBEL_LLM_API_KEY",
        "GEMINI_API_KEY",
        "AMBEL_LLM_BASE_URL",
        "AMBEL_LLM_CHAT_MODEL",
        "AMBEL_LLM_EMBEDDING_MODEL",
        "AMBEL_LLM_TIMEOUT_SECS",
        "AMBEL_SEARCH_NUM_CANDIDATES",
        "AMBEL_SEARCH_LIMIT",
        "AMBEL_SERVER_BIND_ADDRESS",
        "AMBEL_SERVER_PORT",
        "AMBEL_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "AMBEL_LOGGING_LEVEL",
        "AMBEL_LOGGING_FORMAT",
        "AMBEL_LOG_LEVEL",
        "AMBEL_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
