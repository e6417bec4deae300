pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;
pub mod similarity;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::SampleDirectory;
pub use repositories::{
    InMemoryKnowledgeBase, InMemoryProfessionalDirectory, KnowledgeRepository,
    ProfessionalRepository, RepositoryError, SqlKnowledgeRepository, SqlProfessionalRepository,
};
