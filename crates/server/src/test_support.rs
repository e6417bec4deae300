use std::sync::Arc;

use ambel_agent::{AgentRuntime, DecisionOracle, Embedder, FaqResponder, LlmError, TextGenerator};
use ambel_core::config::SearchConfig;
use ambel_core::{ProfessionalRecord, QaPair};
use ambel_db::{InMemoryKnowledgeBase, InMemoryProfessionalDirectory, SampleDirectory};
use async_trait::async_trait;

struct StaticOracle(String);

#[async_trait]
impl DecisionOracle for StaticOracle {
    async fn classify(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok(self.0.clone())
    }
}

struct UnitEmbedder;

#[async_trait]
impl Embedder for UnitEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, LlmError> {
        Ok(vec![1.0, 0.0])
    }
}

struct EchoGenerator;

#[async_trait]
impl TextGenerator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        Ok(prompt.to_string())
    }
}

pub fn sample_records() -> Vec<ProfessionalRecord> {
    SampleDirectory::records()
        .into_iter()
        .map(|mut record| {
            record.embedding = vec![1.0, 0.0];
            record
        })
        .collect()
}

pub fn runtime_with(decision: &str, records: Vec<ProfessionalRecord>) -> Arc<AgentRuntime> {
    Arc::new(AgentRuntime::new(
        Arc::new(StaticOracle(decision.to_string())),
        Arc::new(UnitEmbedder),
        Arc::new(EchoGenerator),
        Arc::new(InMemoryProfessionalDirectory::with_records(records)),
        SearchConfig::default(),
    ))
}

pub fn faq_responder() -> Arc<FaqResponder> {
    let knowledge = InMemoryKnowledgeBase::with_pairs(vec![QaPair::new(
        "What is Ambel?",
        "Ambel is a booking platform.",
    )]);
    Arc::new(FaqResponder::new(Arc::new(knowledge), Arc::new(EchoGenerator)))
}
