use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ApplicationError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub day: String,
    pub slots: Vec<String>,
}

/// A bookable professional as stored in the directory. `professional_type`,
/// `specialty` and `location` are stored lowercase so that exact-match
/// filtering works against normalized slot values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub professional_type: String,
    pub specialty: String,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub availability: Vec<Availability>,
}

impl ProfessionalRecord {
    /// Text submitted to the embedding model when the record is indexed.
    pub fn embedding_text(&self) -> String {
        format!(
            "Name: {}, Type: {}, Specialty: {}, Location: {}. Description: {}",
            self.name, self.professional_type, self.specialty, self.location, self.description
        )
        .to_lowercase()
    }

    pub fn summary(&self) -> String {
        format!("{} ({}) in {}", self.name, self.specialty, self.location)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalFilter {
    #[serde(rename = "type")]
    pub professional_type: String,
    pub location: String,
}

impl ProfessionalFilter {
    pub fn matches(&self, record: &ProfessionalRecord) -> bool {
        record.professional_type == self.professional_type && record.location == self.location
    }
}

/// Filtered nearest-neighbour query. `num_candidates` bounds the pool of
/// filtered records that are scored; `limit` bounds the result.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorSearch {
    pub query_vector: Vec<f32>,
    pub filter: ProfessionalFilter,
    pub num_candidates: usize,
    pub limit: usize,
}

#[async_trait]
pub trait ProfessionalDirectory: Send + Sync {
    /// Returns up to `search.limit` records, closest first.
    async fn vector_search(
        &self,
        search: &VectorSearch,
    ) -> Result<Vec<ProfessionalRecord>, ApplicationError>;
}
