//! Domain entities - Core objects with identity

mod actor;
mod line;
mod scene;

pub use actor::{Actor, ActorRole};
pub use line::Line;
pub use scene::SceneState;
