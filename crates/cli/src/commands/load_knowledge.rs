use std::fs;
use std::path::Path;

use ambel_agent::{Embedder, GeminiClient};
use ambel_core::{KnowledgeEntry, QaPair};
use ambel_db::{KnowledgeRepository, SqlKnowledgeRepository};

use crate::commands::{
    current_thread_runtime, load_config, migrated_pool, CommandResult, StepFailure,
};

pub fn run(input: &Path, skip_embeddings: bool) -> CommandResult {
    let pairs = match read_pairs(input) {
        Ok(pairs) => pairs,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("load-knowledge", error_class, message, exit_code);
        }
    };
    let config = match load_config("load-knowledge") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match current_thread_runtime("load-knowledge") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let embedder = if skip_embeddings {
            None
        } else {
            Some(
                GeminiClient::new(&config.llm)
                    .map_err(|error| ("llm_client", error.to_string(), 6u8))?,
            )
        };
        let pool = migrated_pool(&config).await?;
        let repository = SqlKnowledgeRepository::new(pool.clone());

        let loaded = load_entries(
            &repository,
            pairs,
            embedder.as_ref().map(|client| client as &dyn Embedder),
        )
        .await;
        pool.close().await;
        loaded
    });

    match result {
        Ok(count) => {
            let mode = if skip_embeddings { "without embeddings" } else { "with embeddings" };
            CommandResult::success(
                "load-knowledge",
                format!("stored {count} Q&A pairs {mode} from `{}`", input.display()),
            )
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("load-knowledge", error_class, message, exit_code)
        }
    }
}

pub fn read_pairs(input: &Path) -> Result<Vec<QaPair>, StepFailure> {
    let raw = fs::read_to_string(input).map_err(|error| {
        ("input_read", format!("could not read `{}`: {error}", input.display()), 8u8)
    })?;
    serde_json::from_str(&raw).map_err(|error| {
        ("input_parse", format!("`{}` is not a Q&A JSON array: {error}", input.display()), 8u8)
    })
}

/// Clears the knowledge base and stores `pairs` in order, embedding each
/// `Question: ..\nAnswer: ..` chunk when an embedder is supplied.
pub async fn load_entries(
    repository: &dyn KnowledgeRepository,
    pairs: Vec<QaPair>,
    embedder: Option<&dyn Embedder>,
) -> Result<usize, StepFailure> {
    let mut entries = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let embedding = match embedder {
            Some(embedder) => Some(
                embedder
                    .embed(&pair.chunk_text())
                    .await
                    .map_err(|error| ("embedding", format!("{}: {error}", pair.question), 7u8))?,
            ),
            None => None,
        };
        entries.push(KnowledgeEntry::from_pair(pair, embedding));
    }

    repository
        .replace_all(&entries)
        .await
        .map_err(|error| ("knowledge_load", error.to_string(), 5u8))
}
