//! Actor entity - a voiced member of the scene roster

use serde::{Deserialize, Serialize};

use crate::ids::ActorId;
use crate::value_objects::{ActorUpdate, Language};

/// Dramatic function of an actor in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Protagonist,
    Antagonist,
    Supporting,
    Narrator,
    Ensemble,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Protagonist => "protagonist",
            ActorRole::Antagonist => "antagonist",
            ActorRole::Supporting => "supporting",
            ActorRole::Narrator => "narrator",
            ActorRole::Ensemble => "ensemble",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub role: ActorRole,
    /// Resting language, used when a line does not name one.
    pub language: Language,
    /// Opaque voice reference understood by the speech service
    pub voice_id: String,
    pub style: String,
}

impl Actor {
    pub fn new(
        id: impl Into<ActorId>,
        name: impl Into<String>,
        role: ActorRole,
        voice_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            language: Language::default(),
            voice_id: voice_id.into(),
            style: String::new(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Apply a generator patch. The id is not checked here; callers route
    /// patches to the matching actor.
    pub fn apply(&mut self, update: &ActorUpdate) {
        if let Some(language) = update.language {
            self.language = language;
        }
        if let Some(style) = update.style.as_deref().map(str::trim) {
            if !style.is_empty() {
                self.style = style.to_string();
            }
        }
    }
}
