use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::slots::SlotSet;

/// The five next steps the router can take. The set is closed: an action the
/// oracle invents is a classification failure, never a fallthrough.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouterAction {
    AskType,
    AskSpecialty,
    AskLocation,
    PerformSearch,
    AnswerGeneral,
}

impl RouterAction {
    pub const ALL: [Self; 5] = [
        Self::AskType,
        Self::AskSpecialty,
        Self::AskLocation,
        Self::PerformSearch,
        Self::AnswerGeneral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AskType => "ASK_TYPE",
            Self::AskSpecialty => "ASK_SPECIALTY",
            Self::AskLocation => "ASK_LOCATION",
            Self::PerformSearch => "PERFORM_SEARCH",
            Self::AnswerGeneral => "ANSWER_GENERAL",
        }
    }
}

impl fmt::Display for RouterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouterAction {
    type Err = DecisionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| DecisionError::UnknownAction(value.to_string()))
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecisionError {
    #[error("decision output is empty")]
    Empty,
    #[error("decision output is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("unknown router action `{0}`")]
    UnknownAction(String),
    #[error("decision output is malformed: {0}")]
    Malformed(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingDecision {
    pub action: RouterAction,
    pub slots: SlotSet,
}

impl RoutingDecision {
    /// Parses the oracle's raw output. Only a JSON object with exactly `action`
    /// and `slots` is accepted; a Markdown code fence around it is tolerated.
    pub fn parse(raw: &str) -> Result<Self, DecisionError> {
        let body = strip_code_fence(raw.trim());
        if body.is_empty() {
            return Err(DecisionError::Empty);
        }

        let value: Value =
            serde_json::from_str(body).map_err(|error| DecisionError::Malformed(error.to_string()))?;
        let Some(object) = value.as_object() else {
            return Err(DecisionError::Malformed("expected a JSON object".to_string()));
        };

        let action = object.get("action").ok_or(DecisionError::MissingField("action"))?;
        let Some(action) = action.as_str() else {
            return Err(DecisionError::Malformed("`action` must be a string".to_string()));
        };
        action.parse::<RouterAction>()?;

        if !object.contains_key("slots") {
            return Err(DecisionError::MissingField("slots"));
        }

        serde_json::from_value(value).map_err(|error| DecisionError::Malformed(error.to_string()))
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let Some(inner) = raw.strip_prefix("```") else {
        return raw;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    match inner.strip_suffix("```") {
        Some(body) => body.trim(),
        None => raw,
    }
}
