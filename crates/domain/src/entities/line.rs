//! Line entity - a single utterance in the scene

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ActorId, LineId};

/// A spoken line.
///
/// Everything but the audio reference is fixed at creation. The audio
/// reference starts empty and can be populated once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    id: LineId,
    actor_id: ActorId,
    text: String,
    timestamp: DateTime<Utc>,
    beat_index: u32,
    #[serde(default)]
    audio_url: String,
}

impl Line {
    pub fn new(
        id: LineId,
        actor_id: ActorId,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
        beat_index: u32,
    ) -> Self {
        Self {
            id,
            actor_id,
            text: text.into(),
            timestamp,
            beat_index,
            audio_url: String::new(),
        }
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn actor_id(&self) -> &ActorId {
        &self.actor_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn beat_index(&self) -> u32 {
        self.beat_index
    }

    /// The inlined audio reference, if synthesis succeeded.
    pub fn audio_url(&self) -> Option<&str> {
        if self.audio_url.is_empty() {
            None
        } else {
            Some(&self.audio_url)
        }
    }

    pub fn has_audio(&self) -> bool {
        !self.audio_url.is_empty()
    }

    /// Populate the audio reference.
    ///
    /// Returns `false` (and leaves the line untouched) if audio was already
    /// attached or the reference is empty.
    pub fn attach_audio(&mut self, audio_url: impl Into<String>) -> bool {
        let audio_url = audio_url.into();
        if self.has_audio() || audio_url.is_empty() {
            return false;
        }
        self.audio_url = audio_url;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Line {
        Line::new(LineId::FIRST, ActorId::new("maya"), "Hello.", Utc::now(), 0)
    }

    #[test]
    fn audio_is_attached_at_most_once() {
        let mut line = line();
        assert!(line.audio_url().is_none());

        assert!(line.attach_audio("data:audio/mpeg;base64,AAAA"));
        assert!(!line.attach_audio("data:audio/mpeg;base64,BBBB"));
        assert_eq!(line.audio_url(), Some("data:audio/mpeg;base64,AAAA"));
    }

    #[test]
    fn empty_reference_does_not_count_as_audio() {
        let mut line = line();
        assert!(!line.attach_audio(""));
        assert!(!line.has_audio());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(line()).unwrap();
        assert_eq!(json["actorId"], "maya");
        assert_eq!(json["beatIndex"], 0);
        assert_eq!(json["audioUrl"], "");
    }
}
