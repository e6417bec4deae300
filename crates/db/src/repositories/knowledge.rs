use ambel_core::{ApplicationError, KnowledgeEntry, KnowledgeLookup, QaPair};
use sqlx::Row;

use super::{KnowledgeRepository, RepositoryError};
use crate::DbPool;

pub struct SqlKnowledgeRepository {
    pool: DbPool,
}

impl SqlKnowledgeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl KnowledgeLookup for SqlKnowledgeRepository {
    async fn find_by_question(&self, question: &str) -> Result<Option<QaPair>, ApplicationError> {
        let row = sqlx::query(
            "SELECT question, answer FROM knowledge_base
             WHERE instr(lower(question), lower(?)) > 0
             ORDER BY id
             LIMIT 1",
        )
        .bind(question)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let question: String =
            row.try_get("question").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let answer: String =
            row.try_get("answer").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        Ok(Some(QaPair::new(question, answer)))
    }
}

#[async_trait::async_trait]
impl KnowledgeRepository for SqlKnowledgeRepository {
    async fn replace_all(&self, entries: &[KnowledgeEntry]) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM knowledge_base").execute(&mut *tx).await?;

        for entry in entries {
            let embedding = entry
                .embedding
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(|e| RepositoryError::Decode(e.to_string()))?;

            sqlx::query(
                "INSERT INTO knowledge_base (question, answer, text, embedding) VALUES (?, ?, ?, ?)",
            )
            .bind(&entry.question)
            .bind(&entry.answer)
            .bind(&entry.text)
            .bind(embedding)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(entries.len())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM knowledge_base")
            .fetch_one(&self.pool)
            .await?;
        usize::try_from(count).map_err(|e| RepositoryError::Decode(e.to_string()))
    }
}
