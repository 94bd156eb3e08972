//! Request types sent by the Player.

use improvstudio_domain::SceneState;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/turn`.
///
/// `sceneState` is `null` (or absent) for the first turn of a new scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    #[serde(default)]
    pub scene_state: Option<SceneState>,
    pub user_command: String,
}

impl TurnRequest {
    pub fn new(scene_state: Option<SceneState>, user_command: impl Into<String>) -> Self {
        Self {
            scene_state,
            user_command: user_command.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_scene_state_is_accepted() {
        let request: TurnRequest =
            serde_json::from_str(r#"{"sceneState": null, "userCommand": "Make it horror"}"#)
                .unwrap();
        assert!(request.scene_state.is_none());
        assert_eq!(request.user_command, "Make it horror");
    }

    #[test]
    fn non_string_command_is_rejected() {
        let result = serde_json::from_str::<TurnRequest>(r#"{"sceneState": null, "userCommand": 7}"#);
        assert!(result.is_err());

        let missing = serde_json::from_str::<TurnRequest>(r#"{"sceneState": null}"#);
        assert!(missing.is_err());
    }
}
