//! Error types for port operations.

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// Credentials are missing or still a template placeholder.
    #[error("LLM not configured: {0}")]
    NotConfigured(String),
}

impl LlmError {
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured(_))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SpeechError {
    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(String),
    #[error("Speech synthesis not configured: {0}")]
    NotConfigured(String),
}
