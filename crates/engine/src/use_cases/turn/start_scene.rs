//! Scene reset: a fresh default scene.

use std::sync::Arc;

use improvstudio_domain::{default_scene, SceneId, SceneState};

use crate::infrastructure::ports::ClockPort;

pub struct StartScene {
    clock: Arc<dyn ClockPort>,
}

impl StartScene {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self { clock }
    }

    pub fn execute(&self) -> SceneState {
        default_scene(SceneId::new(), self.clock.now())
    }
}
