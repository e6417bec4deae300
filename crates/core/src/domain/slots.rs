use serde::{Deserialize, Serialize};

/// What the router has understood so far about the professional being sought.
///
/// Values arrive verbatim from the classification oracle. A slot holding an
/// empty or whitespace-only string is treated the same as a missing one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotSet {
    #[serde(rename = "type", default)]
    pub professional_type: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl SlotSet {
    pub fn professional_type(&self) -> Option<&str> {
        known(self.professional_type.as_deref())
    }

    pub fn specialty(&self) -> Option<&str> {
        known(self.specialty.as_deref())
    }

    pub fn location(&self) -> Option<&str> {
        known(self.location.as_deref())
    }

    pub fn is_complete(&self) -> bool {
        self.professional_type().is_some() && self.specialty().is_some() && self.location().is_some()
    }
}

fn known(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
