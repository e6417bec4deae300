use async_trait::async_trait;
use thiserror::Error;

use ambel_core::{
    ApplicationError, KnowledgeEntry, KnowledgeLookup, ProfessionalDirectory, ProfessionalRecord,
};

pub mod knowledge;
pub mod memory;
pub mod professional;

pub use knowledge::SqlKnowledgeRepository;
pub use memory::{InMemoryKnowledgeBase, InMemoryProfessionalDirectory};
pub use professional::SqlProfessionalRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Persistence(value.to_string())
    }
}

/// Write side of the professional directory. Reads go through
/// [`ProfessionalDirectory::vector_search`].
#[async_trait]
pub trait ProfessionalRepository: ProfessionalDirectory {
    /// Clears the collection and inserts `records` in order. Returns the number inserted.
    async fn replace_all(&self, records: &[ProfessionalRecord]) -> Result<usize, RepositoryError>;
    async fn count(&self) -> Result<usize, RepositoryError>;
}

#[async_trait]
pub trait KnowledgeRepository: KnowledgeLookup {
    async fn replace_all(&self, entries: &[KnowledgeEntry]) -> Result<usize, RepositoryError>;
    async fn count(&self) -> Result<usize, RepositoryError>;
}
