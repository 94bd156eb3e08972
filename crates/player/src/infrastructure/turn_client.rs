//! HTTP client for the engine's turn endpoint.

use std::time::Duration;

use async_trait::async_trait;
use improvstudio_domain::SceneState;
use improvstudio_shared::{ErrorResponse, TurnRequest, TurnResponse, TURN_PATH};
use reqwest::Client;
use url::Url;

use crate::ports::TurnPort;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TurnClientError {
    #[error("Invalid engine URL: {0}")]
    InvalidUrl(String),
    #[error("Request failed: {0}")]
    Request(String),
    /// Message is the server's user-facing error text.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TurnClientError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Server { message, .. } => message,
            _ => ErrorResponse::TRY_AGAIN,
        }
    }
}

/// `POST {engine}/api/turn` over reqwest.
#[derive(Clone)]
pub struct HttpTurnClient {
    client: Client,
    turn_url: Url,
}

impl HttpTurnClient {
    pub fn new(engine_url: &str) -> Result<Self, TurnClientError> {
        let turn_url = turn_url(engine_url)?;

        // Generation plus synthesis of every line can take a while.
        let client = Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self { client, turn_url })
    }

    pub fn turn_url(&self) -> &Url {
        &self.turn_url
    }
}

/// Resolve the turn endpoint under `engine_url`, keeping any path prefix.
fn turn_url(engine_url: &str) -> Result<Url, TurnClientError> {
    let mut base =
        Url::parse(engine_url.trim()).map_err(|e| TurnClientError::InvalidUrl(e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(TurnClientError::InvalidUrl(format!(
            "unsupported scheme: {}",
            base.scheme()
        )));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(TURN_PATH.trim_start_matches('/'))
        .map_err(|e| TurnClientError::InvalidUrl(e.to_string()))
}

#[async_trait]
impl TurnPort for HttpTurnClient {
    async fn submit_turn(
        &self,
        scene_state: Option<SceneState>,
        user_command: String,
    ) -> Result<TurnResponse, TurnClientError> {
        let request = TurnRequest::new(scene_state, user_command);

        let response = self
            .client
            .post(self.turn_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| TurnClientError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => ErrorResponse::TRY_AGAIN.to_string(),
            };
            return Err(TurnClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| TurnClientError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_turn_path_under_base() {
        assert_eq!(
            turn_url("http://localhost:3000").unwrap().as_str(),
            "http://localhost:3000/api/turn"
        );
        assert_eq!(
            turn_url("https://studio.example.com/engine").unwrap().as_str(),
            "https://studio.example.com/engine/api/turn"
        );
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(matches!(
            turn_url("not a url"),
            Err(TurnClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            turn_url("ftp://localhost"),
            Err(TurnClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn user_message_prefers_server_text() {
        let server = TurnClientError::Server {
            status: 400,
            message: "Command must not be empty".into(),
        };
        assert_eq!(server.user_message(), "Command must not be empty");

        let transport = TurnClientError::Request("connection refused".into());
        assert_eq!(transport.user_message(), ErrorResponse::TRY_AGAIN);
    }
}
