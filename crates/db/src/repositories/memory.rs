use tokio::sync::RwLock;

use ambel_core::{
    ApplicationError, KnowledgeEntry, KnowledgeLookup, ProfessionalDirectory, ProfessionalRecord,
    QaPair, VectorSearch,
};

use super::{KnowledgeRepository, ProfessionalRepository, RepositoryError};
use crate::similarity::rank_candidates;

#[derive(Default)]
pub struct InMemoryProfessionalDirectory {
    records: RwLock<Vec<ProfessionalRecord>>,
}

impl InMemoryProfessionalDirectory {
    pub fn with_records(records: Vec<ProfessionalRecord>) -> Self {
        Self { records: RwLock::new(records) }
    }
}

#[async_trait::async_trait]
impl ProfessionalDirectory for InMemoryProfessionalDirectory {
    async fn vector_search(
        &self,
        search: &VectorSearch,
    ) -> Result<Vec<ProfessionalRecord>, ApplicationError> {
        let records = self.records.read().await;
        let candidates = records
            .iter()
            .filter(|record| search.filter.matches(record))
            .take(search.num_candidates)
            .cloned()
            .collect();
        Ok(rank_candidates(&search.query_vector, candidates, search.limit))
    }
}

#[async_trait::async_trait]
impl ProfessionalRepository for InMemoryProfessionalDirectory {
    async fn replace_all(&self, records: &[ProfessionalRecord]) -> Result<usize, RepositoryError> {
        let mut stored = self.records.write().await;
        *stored = records.to_vec();
        Ok(stored.len())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.records.read().await.len())
    }
}

#[derive(Default)]
pub struct InMemoryKnowledgeBase {
    entries: RwLock<Vec<KnowledgeEntry>>,
}

impl InMemoryKnowledgeBase {
    pub fn with_pairs(pairs: Vec<QaPair>) -> Self {
        let entries =
            pairs.into_iter().map(|pair| KnowledgeEntry::from_pair(pair, None)).collect();
        Self { entries: RwLock::new(entries) }
    }
}

#[async_trait::async_trait]
impl KnowledgeLookup for InMemoryKnowledgeBase {
    async fn find_by_question(&self, question: &str) -> Result<Option<QaPair>, ApplicationError> {
        // ASCII folding, the same as SQLite's `lower()`.
        let needle = question.to_ascii_lowercase();
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|entry| entry.question.to_ascii_lowercase().contains(&needle))
            .map(KnowledgeEntry::pair))
    }
}

#[async_trait::async_trait]
impl KnowledgeRepository for InMemoryKnowledgeBase {
    async fn replace_all(&self, entries: &[KnowledgeEntry]) -> Result<usize, RepositoryError> {
        let mut stored = self.entries.write().await;
        *stored = entries.to_vec();
        Ok(stored.len())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.entries.read().await.len())
    }
}
