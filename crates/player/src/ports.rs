//! Outbound ports for the player.

use async_trait::async_trait;
use improvstudio_domain::SceneState;
use improvstudio_shared::TurnResponse;

use crate::infrastructure::turn_client::TurnClientError;

/// Turn endpoint boundary.
///
/// NOTE: object-safe so the studio session can hold an `Arc<dyn TurnPort>`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TurnPort: Send + Sync {
    /// Submit one stage direction against the client-held scene.
    async fn submit_turn(
        &self,
        scene_state: Option<SceneState>,
        user_command: String,
    ) -> Result<TurnResponse, TurnClientError>;
}
