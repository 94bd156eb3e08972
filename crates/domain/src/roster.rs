//! The fixed default cast and the empty scene they start in.

use chrono::{DateTime, Utc};

use crate::entities::{Actor, ActorRole, SceneState};
use crate::ids::SceneId;
use crate::value_objects::{Language, SceneMetadata};

pub const DEFAULT_TITLE: &str = "Untitled Scene";
pub const DEFAULT_GENRE: &str = "Drama";
pub const DEFAULT_SETTING: &str = "An empty stage";
pub const DEFAULT_LOGLINE: &str = "Two strangers meet under a single spotlight.";

/// Ids of the default roster, in roster order.
pub const DEFAULT_ACTOR_IDS: [&str; 3] = ["maya", "viktor", "narrator"];

pub fn default_roster() -> Vec<Actor> {
    vec![
        Actor::new("maya", "Maya", ActorRole::Protagonist, "21m00Tcm4TlvDq8ikWAM")
            .with_language(Language::En)
            .with_style("warm, curious"),
        Actor::new("viktor", "Viktor", ActorRole::Antagonist, "VR6AewLTigWG4xSOukaG")
            .with_language(Language::En)
            .with_style("dry, menacing"),
        Actor::new("narrator", "Narrator", ActorRole::Narrator, "pNInz6obpgDQGcFmaJgB")
            .with_language(Language::En)
            .with_style("measured, atmospheric"),
    ]
}

pub fn default_metadata() -> SceneMetadata {
    SceneMetadata {
        title: DEFAULT_TITLE.to_string(),
        genre: DEFAULT_GENRE.to_string(),
        setting: DEFAULT_SETTING.to_string(),
        logline: DEFAULT_LOGLINE.to_string(),
    }
}

/// A fresh scene: default roster, no lines, beat 0.
pub fn default_scene(id: SceneId, now: DateTime<Utc>) -> SceneState {
    SceneState::new(id, default_metadata(), default_roster(), now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene_has_the_fixed_roster() {
        let scene = default_scene(SceneId::new(), Utc::now());
        let ids: Vec<&str> = scene.actors().iter().map(|a| a.id.as_str()).collect();

        assert_eq!(ids, DEFAULT_ACTOR_IDS);
        assert!(scene.lines().is_empty());
        assert_eq!(scene.current_beat(), 0);
        assert!(scene.validate().is_ok());
    }
}
