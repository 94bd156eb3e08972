//! Value objects shared by the scene entities and the turn pipeline.

mod directive;
mod language;

pub use directive::{ActorUpdate, BeatDelta, LineDirective, SceneMetadata};
pub use language::Language;
