//! Typed instructions produced by a dialogue generator.
//!
//! These are the validated, internal form of a generator response. Raw external
//! shapes are converted into these at the generator boundary and never travel
//! further.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::ActorId;
use crate::value_objects::Language;

/// Whether a line continues the current beat or opens a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BeatDelta {
    #[default]
    Continue,
    Advance,
}

impl BeatDelta {
    pub fn as_increment(&self) -> u32 {
        match self {
            BeatDelta::Continue => 0,
            BeatDelta::Advance => 1,
        }
    }
}

impl TryFrom<i64> for BeatDelta {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BeatDelta::Continue),
            1 => Ok(BeatDelta::Advance),
            other => Err(DomainError::validation(format!(
                "beatDelta must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

/// Scene-level metadata a turn may rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMetadata {
    pub title: String,
    pub genre: String,
    pub setting: String,
    pub logline: String,
}

/// Patch for an existing actor. Fields left `None` are unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorUpdate {
    pub id: ActorId,
    pub language: Option<Language>,
    pub style: Option<String>,
}

/// One line the generator wants spoken, in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDirective {
    pub actor_id: ActorId,
    /// Explicit per-line language; `None` means the actor's resting language.
    pub language: Option<Language>,
    pub text: String,
    pub beat_delta: BeatDelta,
}

impl LineDirective {
    pub fn new(actor_id: ActorId, text: impl Into<String>, beat_delta: BeatDelta) -> Self {
        Self {
            actor_id,
            language: None,
            text: text.into(),
            beat_delta,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beat_delta_accepts_only_zero_and_one() {
        assert_eq!(BeatDelta::try_from(0).unwrap(), BeatDelta::Continue);
        assert_eq!(BeatDelta::try_from(1).unwrap(), BeatDelta::Advance);
        assert!(BeatDelta::try_from(2).is_err());
        assert!(BeatDelta::try_from(-1).is_err());
    }
}
