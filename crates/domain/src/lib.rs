//! Improv Studio domain.
//!
//! Pure types and rules shared by the engine and the player:
//! - `entities` - actors, lines and the scene aggregate
//! - `value_objects` - languages and generator directives
//! - `roster` - the fixed default cast
//! - `summary` - the rolling scene summarizer

pub mod entities;
pub mod error;
pub mod ids;
pub mod roster;
pub mod summary;
pub mod value_objects;

pub use entities::{Actor, ActorRole, Line, SceneState};
pub use error::DomainError;
pub use ids::{ActorId, LineId, SceneId};
pub use roster::{default_roster, default_scene, DEFAULT_ACTOR_IDS};
pub use summary::{classify_tone, summarize, Tone, BEGINNING_PHRASE, MAX_SUMMARY_CHARS};
pub use value_objects::{ActorUpdate, BeatDelta, Language, LineDirective, SceneMetadata};
