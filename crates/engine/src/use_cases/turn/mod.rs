//! Turn use cases.
//!
//! A turn takes the client-held scene and one stage direction and produces the
//! next scene plus the lines it added:
//! 1. Dialogue generator proposes lines (fallback generator on failure)
//! 2. Beats are assigned and lines appended
//! 3. Every new line is voiced concurrently
//! 4. The summary is recomputed

use std::sync::Arc;

mod dialogue;
mod fallback;
mod process_turn;
mod prompt;
mod speech;
mod start_scene;

pub use dialogue::{
    parse_generated_turn, DialogueGenerator, GeneratedTurn, GeneratorError, MAX_LINES_PER_TURN,
};
pub use fallback::{fallback_turn, FallbackTurn};
pub use process_turn::{LineSource, ProcessTurn, TurnError, TurnOutcome};
pub use start_scene::StartScene;

/// Container for turn use cases.
pub struct TurnUseCases {
    pub process: Arc<ProcessTurn>,
    pub start_scene: Arc<StartScene>,
}

impl TurnUseCases {
    pub fn new(process: Arc<ProcessTurn>, start_scene: Arc<StartScene>) -> Self {
        Self {
            process,
            start_scene,
        }
    }
}
