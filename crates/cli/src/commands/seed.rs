use ambel_agent::{Embedder, GeminiClient};
use ambel_db::{ProfessionalRepository, SampleDirectory, SqlProfessionalRepository};

use crate::commands::{
    current_thread_runtime, load_config, migrated_pool, CommandResult, StepFailure,
};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match current_thread_runtime("seed") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let embedder = GeminiClient::new(&config.llm)
            .map_err(|error| ("llm_client", error.to_string(), 6u8))?;
        let pool = migrated_pool(&config).await?;
        let repository = SqlProfessionalRepository::new(pool.clone());

        let seeded = seed_directory(&repository, &embedder).await;
        pool.close().await;
        seeded
    });

    match result {
        Ok(names) => CommandResult::success("seed", render_seed_message(&names)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

/// Embeds every sample record and replaces the directory with them.
/// Returns the seeded names in insertion order.
pub async fn seed_directory(
    repository: &dyn ProfessionalRepository,
    embedder: &dyn Embedder,
) -> Result<Vec<String>, StepFailure> {
    let mut records = SampleDirectory::records();
    for record in &mut records {
        record.embedding = embedder
            .embed(&record.embedding_text())
            .await
            .map_err(|error| ("embedding", format!("{}: {error}", record.name), 7u8))?;
    }

    repository
        .replace_all(&records)
        .await
        .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

    Ok(records.into_iter().map(|record| record.name).collect())
}

fn render_seed_message(names: &[String]) -> String {
    let mut lines = vec![format!("seeded {} professionals:", names.len())];
    lines.extend(names.iter().map(|name| format!("  - {name}")));
    lines.join("\n")
}
