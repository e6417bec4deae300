//! Classification prompt construction and decision parsing.

use ambel_core::{DecisionError, RoutingDecision, Turn};

const CLASSIFICATION_INSTRUCTIONS: &str = "\
You are the routing assistant for Ambel, a service that helps people book \
appointments with professionals such as doctors and lawyers.

Read the conversation below and decide the single next step. Track three slots:
- \"type\": the kind of professional (for example doctor or lawyer)
- \"specialty\": the professional's specialty (for example cardiologist or corporate law)
- \"location\": the city or area to search in

Choose exactly one action:
- ASK_TYPE: the user wants a professional but the type is unknown
- ASK_SPECIALTY: the type is known but the specialty is unknown
- ASK_LOCATION: type and specialty are known but the location is unknown
- PERFORM_SEARCH: type, specialty and location are all known
- ANSWER_GENERAL: the user is not looking for a professional

Use null for any slot that is still unknown. Respond with only a JSON object of this exact shape:
{\"action\": \"<ACTION>\", \"slots\": {\"type\": <string or null>, \"specialty\": <string or null>, \"location\": <string or null>}}";

/// Flattens prior turns into `role: content` lines and appends the new utterance.
pub fn transcript(history: &[Turn], utterance: &str) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.content))
        .chain(std::iter::once(format!("User: {utterance}")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn classification_prompt(history: &[Turn], utterance: &str) -> String {
    format!(
        "{CLASSIFICATION_INSTRUCTIONS}\n\nConversation:\n{}\n\nJSON response:",
        transcript(history, utterance)
    )
}

pub fn parse_decision(raw: &str) -> Result<RoutingDecision, DecisionError> {
    RoutingDecision::parse(raw)
}

#[cfg(test)]
mod tests {
    use ambel_core::{RouterAction, Turn};

    use super::{classification_prompt, parse_decision, transcript};

    #[test]
    fn transcript_lists_history_then_utterance() {
        let history = vec![
            Turn::user("hi"),
            Turn::assistant("What type of professional are you looking for?"),
        ];

        assert_eq!(
            transcript(&history, "a doctor"),
            "user: hi\nassistant: What type of professional are you looking for?\nUser: a doctor"
        );
        assert_eq!(transcript(&[], "hello"), "User: hello");
    }

    #[test]
    fn prompt_names_every_action_and_slot() {
        let prompt = classification_prompt(&[Turn::user("hi")], "I need a lawyer");

        for action in RouterAction::ALL {
            assert!(prompt.contains(action.as_str()), "prompt should mention {action}");
        }
        for slot in ["\"type\"", "\"specialty\"", "\"location\""] {
            assert!(prompt.contains(slot));
        }
        assert!(prompt.contains("user: hi\nUser: I need a lawyer"));
    }

    #[test]
    fn parse_decision_delegates_to_routing_decision() {
        let decision = parse_decision(r#"{"action":"ASK_SPECIALTY","slots":{"type":"lawyer"}}"#)
            .expect("valid decision");
        assert_eq!(decision.action, RouterAction::AskSpecialty);
        assert!(parse_decision("not json").is_err());
    }
}
