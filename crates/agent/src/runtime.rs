use std::sync::Arc;

use ambel_core::config::SearchConfig;
use ambel_core::{
    ApplicationError, DecisionError, DomainError, ProfessionalDirectory, ProfessionalFilter,
    ProfessionalRecord, RouterAction, SlotSet, Turn, VectorSearch,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::conversation::{classification_prompt, parse_decision};
use crate::llm::{DecisionOracle, Embedder, LlmError, TextGenerator};

pub const ASK_TYPE_REPLY: &str =
    "What type of professional are you looking for? For example, a doctor or a lawyer.";
pub const ASK_LOCATION_REPLY: &str = "Which city or area should I search in?";
pub const NO_RESULTS_REPLY: &str =
    "Sorry, I couldn't find any professionals matching your request.";
const TYPE_FALLBACK: &str = "professional";

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("classification failed: {0}")]
    Classification(#[from] DecisionError),
    #[error("search requires slot `{0}`")]
    MissingSlot(&'static str),
    #[error(transparent)]
    Upstream(#[from] LlmError),
    #[error(transparent)]
    Store(#[from] ApplicationError),
}

impl From<RouterError> for ApplicationError {
    fn from(value: RouterError) -> Self {
        match value {
            RouterError::EmptyMessage => DomainError::EmptyInput { field: "message" }.into(),
            RouterError::Classification(error) => DomainError::MalformedDecision(error).into(),
            RouterError::MissingSlot(slot) => DomainError::MissingSlot { slot }.into(),
            RouterError::Upstream(error) => ApplicationError::Integration(error.to_string()),
            RouterError::Store(error) => error,
        }
    }
}

/// Stateless router: every call re-derives the slots from the supplied history.
pub struct AgentRuntime {
    oracle: Arc<dyn DecisionOracle>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn TextGenerator>,
    directory: Arc<dyn ProfessionalDirectory>,
    search: SearchConfig,
}

impl AgentRuntime {
    pub fn new(
        oracle: Arc<dyn DecisionOracle>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn TextGenerator>,
        directory: Arc<dyn ProfessionalDirectory>,
        search: SearchConfig,
    ) -> Self {
        Self { oracle, embedder, generator, directory, search }
    }

    pub async fn handle_message(
        &self,
        history: &[Turn],
        message: &str,
    ) -> Result<String, RouterError> {
        if message.trim().is_empty() {
            return Err(RouterError::EmptyMessage);
        }

        let raw = self.oracle.classify(&classification_prompt(history, message)).await?;
        let decision = parse_decision(&raw)?;
        info!(
            event_name = "router.decision",
            action = decision.action.as_str(),
            slots_complete = decision.slots.is_complete(),
            history_turns = history.len(),
            "routing decision received"
        );

        match decision.action {
            RouterAction::AskType => Ok(ASK_TYPE_REPLY.to_string()),
            RouterAction::AskSpecialty => Ok(ask_specialty_reply(&decision.slots)),
            RouterAction::AskLocation => Ok(ASK_LOCATION_REPLY.to_string()),
            RouterAction::PerformSearch => self.perform_search(&decision.slots).await,
            RouterAction::AnswerGeneral => Ok(self.generator.generate(message).await?),
        }
    }

    async fn perform_search(&self, slots: &SlotSet) -> Result<String, RouterError> {
        let professional_type = normalize(slots.professional_type(), "type")?;
        let specialty = normalize(slots.specialty(), "specialty")?;
        let location = normalize(slots.location(), "location")?;

        let query_text = format!("A {specialty} {professional_type} in {location}");
        let query_vector = self.embedder.embed(&query_text).await?;

        let search = VectorSearch {
            query_vector,
            filter: ProfessionalFilter { professional_type, location },
            num_candidates: self.search.num_candidates,
            limit: self.search.limit,
        };
        let records = self.directory.vector_search(&search).await?;
        debug!(
            event_name = "router.search",
            professional_type = %search.filter.professional_type,
            location = %search.filter.location,
            hits = records.len(),
            "vector search finished"
        );

        Ok(render_results(&records))
    }
}

fn ask_specialty_reply(slots: &SlotSet) -> String {
    let professional_type = slots.professional_type().unwrap_or(TYPE_FALLBACK);
    format!("What kind of {professional_type} would you like to see?")
}

fn normalize(value: Option<&str>, slot: &'static str) -> Result<String, RouterError> {
    value.map(|value| value.trim().to_lowercase()).ok_or(RouterError::MissingSlot(slot))
}

fn render_results(records: &[ProfessionalRecord]) -> String {
    if records.is_empty() {
        return NO_RESULTS_REPLY.to_string();
    }

    let summaries = records.iter().map(ProfessionalRecord::summary).collect::<Vec<_>>();
    format!(
        "I found the following professionals: {}. Would you like to check their availability?",
        summaries.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use ambel_core::config::SearchConfig;
    use ambel_core::{
        ApplicationError, DecisionError, DomainError, ProfessionalDirectory, ProfessionalFilter,
        ProfessionalRecord, Turn, VectorSearch,
    };
    use async_trait::async_trait;

    use super::{AgentRuntime, RouterError, ASK_LOCATION_REPLY, ASK_TYPE_REPLY, NO_RESULTS_REPLY};
    use crate::llm::{DecisionOracle, Embedder, LlmError, TextGenerator};

    type CallLog = Arc<Mutex<Vec<String>>>;

    struct ScriptedOracle {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        prompts: Mutex<Vec<String>>,
        log: CallLog,
    }

    #[async_trait]
    impl DecisionOracle for ScriptedOracle {
        async fn classify(&self, prompt: &str) -> Result<String, LlmError> {
            self.log.lock().expect("log").push("classify".to_string());
            self.prompts.lock().expect("prompts").push(prompt.to_string());
            self.replies
                .lock()
                .expect("replies")
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::InvalidPayload("no scripted reply".to_string())))
        }
    }

    struct FixedEmbedder {
        inputs: Mutex<Vec<String>>,
        log: CallLog,
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
            self.log.lock().expect("log").push("embed".to_string());
            self.inputs.lock().expect("inputs").push(text.to_string());
            Ok(vec![0.5, 0.5])
        }
    }

    struct EchoGenerator {
        log: CallLog,
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.log.lock().expect("log").push("generate".to_string());
            Ok(format!("generated: {prompt}"))
        }
    }

    struct RecordingDirectory {
        records: Vec<ProfessionalRecord>,
        searches: Mutex<Vec<VectorSearch>>,
        log: CallLog,
    }

    #[async_trait]
    impl ProfessionalDirectory for RecordingDirectory {
        async fn vector_search(
            &self,
            search: &VectorSearch,
        ) -> Result<Vec<ProfessionalRecord>, ApplicationError> {
            self.log.lock().expect("log").push("search".to_string());
            self.searches.lock().expect("searches").push(search.clone());
            Ok(self.records.clone())
        }
    }

    struct Harness {
        runtime: AgentRuntime,
        oracle: Arc<ScriptedOracle>,
        embedder: Arc<FixedEmbedder>,
        directory: Arc<RecordingDirectory>,
        log: CallLog,
    }

    fn harness(decisions: &[&str], records: Vec<ProfessionalRecord>) -> Harness {
        let log: CallLog = Arc::default();
        let oracle = Arc::new(ScriptedOracle {
            replies: Mutex::new(decisions.iter().map(|raw| Ok(raw.to_string())).collect()),
            prompts: Mutex::default(),
            log: log.clone(),
        });
        let embedder = Arc::new(FixedEmbedder { inputs: Mutex::default(), log: log.clone() });
        let generator = Arc::new(EchoGenerator { log: log.clone() });
        let directory =
            Arc::new(RecordingDirectory { records, searches: Mutex::default(), log: log.clone() });

        let runtime = AgentRuntime::new(
            oracle.clone(),
            embedder.clone(),
            generator,
            directory.clone(),
            SearchConfig::default(),
        );
        Harness { runtime, oracle, embedder, directory, log }
    }

    fn record(name: &str, specialty: &str) -> ProfessionalRecord {
        ProfessionalRecord {
            name: name.to_string(),
            professional_type: "doctor".to_string(),
            specialty: specialty.to_string(),
            location: "chattogram".to_string(),
            description: String::new(),
            embedding: Vec::new(),
            availability: Vec::new(),
        }
    }

    #[tokio::test]
    async fn ask_specialty_uses_the_known_type() {
        let harness =
            harness(&[r#"{"action":"ASK_SPECIALTY","slots":{"type":"lawyer"}}"#], Vec::new());

        let reply = harness
            .runtime
            .handle_message(&[Turn::user("hi")], "I need a lawyer")
            .await
            .expect("reply");

        assert_eq!(reply, "What kind of lawyer would you like to see?");
        let prompts = harness.oracle.prompts.lock().expect("prompts").clone();
        assert!(prompts[0].contains("user: hi\nUser: I need a lawyer"));
    }

    #[tokio::test]
    async fn ask_specialty_falls_back_to_professional() {
        let harness = harness(
            &[
                r#"{"action":"ASK_SPECIALTY","slots":{"type":null}}"#,
                r#"{"action":"ASK_SPECIALTY","slots":{"type":"  "}}"#,
            ],
            Vec::new(),
        );

        for _ in 0..2 {
            let reply = harness.runtime.handle_message(&[], "help").await.expect("reply");
            assert_eq!(reply, "What kind of professional would you like to see?");
            assert!(!reply.contains("null") && !reply.contains("undefined"));
        }
    }

    #[tokio::test]
    async fn fixed_prompts_make_no_other_calls() {
        let harness = harness(
            &[
                r#"{"action":"ASK_TYPE","slots":{}}"#,
                r#"{"action":"ASK_LOCATION","slots":{"type":"doctor","specialty":"cardiologist"}}"#,
            ],
            Vec::new(),
        );

        let reply = harness.runtime.handle_message(&[], "hello").await.expect("reply");
        assert_eq!(reply, ASK_TYPE_REPLY);
        assert_eq!(
            harness.runtime.handle_message(&[], "a cardiologist").await.expect("reply"),
            ASK_LOCATION_REPLY
        );
        assert_eq!(*harness.log.lock().expect("log"), vec!["classify", "classify"]);
    }

    #[tokio::test]
    async fn search_lowercases_slots_and_embeds_before_searching() {
        let harness = harness(
            &[r#"{"action":"PERFORM_SEARCH","slots":{"type":"Doctor","specialty":"Cardiologist","location":"Chattogram"}}"#],
            vec![record("Dr. A", "cardiologist")],
        );

        harness.runtime.handle_message(&[], "Chattogram please").await.expect("reply");

        assert_eq!(
            *harness.embedder.inputs.lock().expect("inputs"),
            vec!["A cardiologist doctor in chattogram".to_string()]
        );
        let searches = harness.directory.searches.lock().expect("searches").clone();
        assert_eq!(
            searches,
            vec![VectorSearch {
                query_vector: vec![0.5, 0.5],
                filter: ProfessionalFilter {
                    professional_type: "doctor".to_string(),
                    location: "chattogram".to_string(),
                },
                num_candidates: 100,
                limit: 3,
            }]
        );
        assert_eq!(*harness.log.lock().expect("log"), vec!["classify", "embed", "search"]);
    }

    #[tokio::test]
    async fn search_renders_results_in_order() {
        let harness = harness(
            &[r#"{"action":"PERFORM_SEARCH","slots":{"type":"doctor","specialty":"cardiologist","location":"chattogram"}}"#],
            vec![record("Dr. A", "cardiologist"), record("Dr. B", "cardiologist")],
        );

        let reply = harness.runtime.handle_message(&[], "go").await.expect("reply");

        assert_eq!(
            reply,
            "I found the following professionals: Dr. A (cardiologist) in chattogram, \
             Dr. B (cardiologist) in chattogram. Would you like to check their availability?"
        );
    }

    #[tokio::test]
    async fn empty_search_results_are_not_an_error() {
        let harness = harness(
            &[r#"{"action":"PERFORM_SEARCH","slots":{"type":"doctor","specialty":"cardiologist","location":"sylhet"}}"#],
            Vec::new(),
        );

        assert_eq!(harness.runtime.handle_message(&[], "sylhet").await.expect("reply"), NO_RESULTS_REPLY);
    }

    #[tokio::test]
    async fn search_with_missing_slot_fails_before_embedding() {
        let harness = harness(
            &[r#"{"action":"PERFORM_SEARCH","slots":{"type":"doctor","specialty":"cardiologist","location":null}}"#],
            Vec::new(),
        );

        let error = harness.runtime.handle_message(&[], "go").await.expect_err("missing slot");

        assert!(matches!(error, RouterError::MissingSlot("location")));
        assert_eq!(*harness.log.lock().expect("log"), vec!["classify"]);
        assert_eq!(
            ApplicationError::from(error),
            ApplicationError::Domain(DomainError::MissingSlot { slot: "location" })
        );
    }

    #[tokio::test]
    async fn answer_general_forwards_the_raw_utterance() {
        let harness =
            harness(&[r#"{"action":"ANSWER_GENERAL","slots":{}}"#], Vec::new());

        let reply = harness
            .runtime
            .handle_message(&[Turn::assistant("Hi!")], "What are your opening hours?")
            .await
            .expect("reply");

        assert_eq!(reply, "generated: What are your opening hours?");
        assert_eq!(*harness.log.lock().expect("log"), vec!["classify", "generate"]);
    }

    #[tokio::test]
    async fn empty_message_is_rejected_before_classification() {
        let harness = harness(&[], Vec::new());

        let error = harness.runtime.handle_message(&[], "   ").await.expect_err("empty");

        assert!(matches!(error, RouterError::EmptyMessage));
        assert!(harness.log.lock().expect("log").is_empty());
    }

    #[tokio::test]
    async fn malformed_or_unknown_decisions_fail_the_request() {
        let harness = harness(
            &["I think you want a doctor.", r#"{"action":"BOOK_NOW","slots":{}}"#],
            Vec::new(),
        );

        let malformed = harness.runtime.handle_message(&[], "doctor").await.expect_err("non json");
        assert!(matches!(malformed, RouterError::Classification(DecisionError::Malformed(_))));

        let unknown = harness.runtime.handle_message(&[], "doctor").await.expect_err("unknown");
        assert!(matches!(
            unknown,
            RouterError::Classification(DecisionError::UnknownAction(ref action)) if action == "BOOK_NOW"
        ));
        assert_eq!(*harness.log.lock().expect("log"), vec!["classify", "classify"]);
    }

    #[tokio::test]
    async fn upstream_failures_propagate() {
        let harness = harness(&[], Vec::new());

        let error = harness.runtime.handle_message(&[], "hello").await.expect_err("no reply");

        assert!(matches!(error, RouterError::Upstream(LlmError::InvalidPayload(_))));
        assert!(matches!(ApplicationError::from(error), ApplicationError::Integration(_)));
    }
}
