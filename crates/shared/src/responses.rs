//! Response types returned by the Engine.

use improvstudio_domain::{Line, SceneState};
use serde::{Deserialize, Serialize};

/// Successful turn: the replacement scene plus exactly the lines this turn added.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub scene_state: SceneState,
    pub new_lines: Vec<Line>,
}

/// Error classification code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    TurnFailed,
    /// Unknown code for forward compatibility
    #[serde(other)]
    Unknown,
}

/// Error payload. The message is safe to show to the end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorCode,
}

impl ErrorResponse {
    pub const TRY_AGAIN: &'static str = "Something went wrong with that turn. Please try again.";

    pub fn new(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }

    pub fn turn_failed() -> Self {
        Self::new(ErrorCode::TurnFailed, Self::TRY_AGAIN)
    }
}
