//! Conversational slot-filling router for the Ambel assistant.
//!
//! Each chat turn is routed in three steps:
//! 1. **Classification** (`conversation`): history and utterance are flattened into a
//!    transcript and the decision oracle returns a `RoutingDecision`.
//! 2. **Dispatch** (`runtime`): an exhaustive match over `RouterAction` picks a
//!    follow-up prompt, a filtered vector search, or a general answer.
//! 3. **Rendering**: search hits are summarized into a single reply string.
//!
//! The router holds no per-conversation state. Callers resend the full history
//! on every turn and slots are re-derived from it.
//!
//! `faq` serves the legacy single-question endpoint backed by the knowledge base.

pub mod conversation;
pub mod faq;
pub mod gemini;
pub mod llm;
pub mod runtime;

pub use faq::{FaqError, FaqResponder};
pub use gemini::GeminiClient;
pub use llm::{DecisionOracle, Embedder, LlmError, TextGenerator};
pub use runtime::{AgentRuntime, RouterError};
