use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ApplicationError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self { question: question.into(), answer: answer.into() }
    }

    pub fn chunk_text(&self) -> String {
        format!("Question: {}\nAnswer: {}", self.question, self.answer)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub question: String,
    pub answer: String,
    pub text: String,
    pub embedding: Option<Vec<f32>>,
}

impl KnowledgeEntry {
    pub fn from_pair(pair: QaPair, embedding: Option<Vec<f32>>) -> Self {
        let text = pair.chunk_text();
        Self { question: pair.question, answer: pair.answer, text, embedding }
    }

    pub fn pair(&self) -> QaPair {
        QaPair::new(self.question.clone(), self.answer.clone())
    }
}

#[async_trait]
pub trait KnowledgeLookup: Send + Sync {
    /// First stored entry whose question contains `question`, ignoring ASCII
    /// case. Non-ASCII letters must match exactly.
    async fn find_by_question(&self, question: &str) -> Result<Option<QaPair>, ApplicationError>;
}
