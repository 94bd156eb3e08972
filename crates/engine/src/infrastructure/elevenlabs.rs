//! ElevenLabs text-to-speech client
//!
//! Implements the SpeechPort trait against `POST {base}/v1/text-to-speech/{voice_id}`.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::infrastructure::config::TtsConfig;
use crate::infrastructure::ports::{SpeechError, SpeechPort, SpeechRequest, SynthesizedAudio};

/// Returned when the service omits a content type.
pub const DEFAULT_AUDIO_MIME: &str = "audio/mpeg";

/// Client for the ElevenLabs API
#[derive(Clone)]
pub struct ElevenLabsClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl ElevenLabsClient {
    pub fn new(config: &TtsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn body<'a>(&'a self, request: &'a SpeechRequest) -> SynthesisBody<'a> {
        SynthesisBody {
            text: &request.text,
            model_id: &self.model,
            language_code: request.language.code(),
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
            },
        }
    }
}

#[async_trait]
impl SpeechPort for ElevenLabsClient {
    async fn synthesize(&self, request: SpeechRequest) -> Result<SynthesizedAudio, SpeechError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SpeechError::NotConfigured("TTS_API_KEY is not set".to_string()));
        };

        let voice_id = request.voice_id.trim();
        if voice_id.is_empty() || voice_id.contains('/') {
            return Err(SpeechError::SynthesisFailed(format!(
                "Invalid voice id: {:?}",
                request.voice_id
            )));
        }

        let response = self
            .client
            .post(format!("{}/v1/text-to-speech/{}", self.base_url, voice_id))
            .header("xi-api-key", api_key)
            .header(ACCEPT, DEFAULT_AUDIO_MIME)
            .json(&self.body(&request))
            .send()
            .await
            .map_err(|e| SpeechError::SynthesisFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SpeechError::SynthesisFailed(format!(
                "{}: {}",
                status, error_text
            )));
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
            .filter(|value| value.starts_with("audio/"))
            .unwrap_or_else(|| DEFAULT_AUDIO_MIME.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::SynthesisFailed(e.to_string()))?;

        if bytes.is_empty() {
            return Err(SpeechError::SynthesisFailed("Empty audio body".to_string()));
        }

        Ok(SynthesizedAudio {
            bytes: bytes.to_vec(),
            mime_type,
        })
    }
}

// =============================================================================
// ElevenLabs API types
// =============================================================================

#[derive(Debug, Serialize)]
struct SynthesisBody<'a> {
    text: &'a str,
    model_id: &'a str,
    language_code: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}
