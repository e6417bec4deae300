use ambel_core::{
    ApplicationError, Availability, ProfessionalDirectory, ProfessionalRecord, VectorSearch,
};
use sqlx::{sqlite::SqliteRow, Row};

use super::{ProfessionalRepository, RepositoryError};
use crate::similarity::rank_candidates;
use crate::DbPool;

pub struct SqlProfessionalRepository {
    pool: DbPool,
}

impl SqlProfessionalRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn candidates(
        &self,
        search: &VectorSearch,
    ) -> Result<Vec<ProfessionalRecord>, RepositoryError> {
        let pool_size = i64::try_from(search.num_candidates).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            "SELECT name, professional_type, specialty, location, description, embedding, availability
             FROM professionals
             WHERE professional_type = ? AND location = ?
             ORDER BY id
             LIMIT ?",
        )
        .bind(&search.filter.professional_type)
        .bind(&search.filter.location)
        .bind(pool_size)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(professional_from_row).collect()
    }
}

#[async_trait::async_trait]
impl ProfessionalDirectory for SqlProfessionalRepository {
    async fn vector_search(
        &self,
        search: &VectorSearch,
    ) -> Result<Vec<ProfessionalRecord>, ApplicationError> {
        let candidates = self.candidates(search).await?;
        Ok(rank_candidates(&search.query_vector, candidates, search.limit))
    }
}

#[async_trait::async_trait]
impl ProfessionalRepository for SqlProfessionalRepository {
    async fn replace_all(&self, records: &[ProfessionalRecord]) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM professionals").execute(&mut *tx).await?;

        for record in records {
            let embedding = encode_json(&record.embedding)?;
            let availability = encode_json(&record.availability)?;
            sqlx::query(
                "INSERT INTO professionals
                    (name, professional_type, specialty, location, description, embedding, availability)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&record.name)
            .bind(&record.professional_type)
            .bind(&record.specialty)
            .bind(&record.location)
            .bind(&record.description)
            .bind(embedding)
            .bind(availability)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(records.len())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM professionals")
            .fetch_one(&self.pool)
            .await?;
        usize::try_from(count).map_err(|error| RepositoryError::Decode(error.to_string()))
    }
}

fn professional_from_row(row: &SqliteRow) -> Result<ProfessionalRecord, RepositoryError> {
    let embedding: String = try_column(row, "embedding")?;
    let availability: String = try_column(row, "availability")?;

    Ok(ProfessionalRecord {
        name: try_column(row, "name")?,
        professional_type: try_column(row, "professional_type")?,
        specialty: try_column(row, "specialty")?,
        location: try_column(row, "location")?,
        description: try_column(row, "description")?,
        embedding: decode_json::<Vec<f32>>(&embedding, "embedding")?,
        availability: decode_json::<Vec<Availability>>(&availability, "availability")?,
    })
}

fn try_column<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(|error| RepositoryError::Decode(error.to_string()))
}

fn decode_json<T: serde::de::DeserializeOwned>(
    raw: &str,
    column: &str,
) -> Result<T, RepositoryError> {
    serde_json::from_str(raw)
        .map_err(|error| RepositoryError::Decode(format!("invalid `{column}` json: {error}")))
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|error| RepositoryError::Decode(error.to_string()))
}
