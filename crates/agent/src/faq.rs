use std::sync::Arc;

use ambel_core::{ApplicationError, DomainError, KnowledgeLookup};
use thiserror::Error;
use tracing::info;

use crate::llm::{LlmError, TextGenerator};

pub const GREETING_REPLY: &str = "Hello! I am the Ambel Bot. How can I help you today?";
pub const NOT_FOUND_REPLY: &str =
    "I'm sorry, I don't have information about that. Please try another question.";

const GREETINGS: &[&str] = &["hi", "hello"];

#[derive(Debug, Error)]
pub enum FaqError {
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error(transparent)]
    Upstream(#[from] LlmError),
    #[error(transparent)]
    Store(#[from] ApplicationError),
}

impl From<FaqError> for ApplicationError {
    fn from(value: FaqError) -> Self {
        match value {
            FaqError::EmptyQuestion => DomainError::EmptyInput { field: "question" }.into(),
            FaqError::Upstream(error) => ApplicationError::Integration(error.to_string()),
            FaqError::Store(error) => error,
        }
    }
}

/// Answers single questions from the knowledge base, phrased by the generator.
pub struct FaqResponder {
    knowledge: Arc<dyn KnowledgeLookup>,
    generator: Arc<dyn TextGenerator>,
}

impl FaqResponder {
    pub fn new(knowledge: Arc<dyn KnowledgeLookup>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { knowledge, generator }
    }

    pub async fn answer(&self, question: &str) -> Result<String, FaqError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(FaqError::EmptyQuestion);
        }

        let lowered = question.to_lowercase();
        if GREETINGS.contains(&lowered.as_str()) {
            return Ok(GREETING_REPLY.to_string());
        }

        let Some(entry) = self.knowledge.find_by_question(question).await? else {
            info!(event_name = "faq.miss", "no knowledge base entry matched");
            return Ok(NOT_FOUND_REPLY.to_string());
        };

        info!(event_name = "faq.hit", "knowledge base entry matched");
        Ok(self.generator.generate(&context_prompt(&entry.answer, question)).await?)
    }
}

fn context_prompt(answer: &str, question: &str) -> String {
    format!(
        "Based on this information: \"{answer}\", please provide a friendly and conversational \
         answer to the user's question: \"{question}\"."
    )
}
