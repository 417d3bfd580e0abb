use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Interaction modality a participant completes the trial sequence under.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Voice,
    Touchscreen,
    Controller,
    Baseline,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::Voice,
        Condition::Touchscreen,
        Condition::Controller,
        Condition::Baseline,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Voice => "Voice",
            Self::Touchscreen => "Touchscreen",
            Self::Controller => "Controller",
            Self::Baseline => "Baseline",
        }
    }

    /// Upper-case label used inside log tags.
    pub fn tag_label(&self) -> &'static str {
        match self {
            Self::Voice => "VOICE",
            Self::Touchscreen => "TOUCHSCREEN",
            Self::Controller => "CONTROLLER",
            Self::Baseline => "BASELINE",
        }
    }

    pub fn start_marker(&self) -> String {
        format!("[START {} CONDITION]", self.tag_label())
    }

    pub fn end_marker(&self) -> String {
        format!("[END {} CONDITION]", self.tag_label())
    }

    pub fn selection_tag(&self) -> String {
        format!("[{}]", self.tag_label())
    }

    /// Has on-screen or physical buttons that the lockout gates.
    pub fn has_button_input(&self) -> bool {
        matches!(self, Self::Touchscreen | Self::Controller)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A condition name that does not match any of the four modalities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("condition not found: {name:?}")]
pub struct UnknownCondition {
    pub name: String,
}

impl UnknownCondition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// No condition has been selected yet.
    pub fn none() -> Self {
        Self::new("<none>")
    }
}

impl FromStr for Condition {
    type Err = UnknownCondition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCondition::new(s))
    }
}
