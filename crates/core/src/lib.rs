//! Domain model, configuration and error taxonomy shared by every Ambel crate.

pub mod config;
pub mod domain;
pub mod errors;
pub mod knowledge;

pub use domain::conversation::{Role, Turn};
pub use domain::decision::{DecisionError, RouterAction, RoutingDecision};
pub use domain::knowledge::{KnowledgeEntry, KnowledgeLookup, QaPair};
pub use domain::professional::{
    Availability, ProfessionalDirectory, ProfessionalFilter, ProfessionalRecord, VectorSearch,
};
pub use domain::slots::SlotSet;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use knowledge::{QaSegmenter, SegmentOptions};
