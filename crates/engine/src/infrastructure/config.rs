//! Engine configuration from environment variables.
//!
//! Every variable has a default except the two credentials. A credential that
//! is missing or still holds a template placeholder is treated as absent.

use std::env;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TTS_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_TTS_MODEL: &str = "eleven_multilingual_v2";
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Chat-completion service settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub base_url: String,
    /// `None` when unset or a placeholder
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

/// Text-to-speech service settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtsConfig {
    pub base_url: String,
    /// `None` when unset or a placeholder
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origins: Option<String>,
    pub llm: LlmConfig,
    pub tts: TtsConfig,
}

impl EngineConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let server_port = var("SERVER_PORT")
            .or_else(|| var("PORT"))
            .and_then(|port| port.parse().ok())
            .unwrap_or(DEFAULT_SERVER_PORT);

        Self {
            server_host: var("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.into()),
            server_port,
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS"),
            llm: LlmConfig {
                base_url: var("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.into()),
                api_key: var("LLM_API_KEY").filter(|key| !is_placeholder_credential(key)),
                model: var("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.into()),
                timeout_secs: var("LLM_TIMEOUT_SECS")
                    .and_then(|secs| secs.parse().ok())
                    .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS),
            },
            tts: TtsConfig {
                base_url: var("TTS_BASE_URL").unwrap_or_else(|| DEFAULT_TTS_BASE_URL.into()),
                api_key: var("TTS_API_KEY").filter(|key| !is_placeholder_credential(key)),
                model: var("TTS_MODEL").unwrap_or_else(|| DEFAULT_TTS_MODEL.into()),
            },
        }
    }
}

/// Whether a credential is empty or an obvious template value.
pub fn is_placeholder_credential(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    value.is_empty()
        || value.starts_with("your")
        || value.contains("placeholder")
        || value.contains("changeme")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.llm.base_url, DEFAULT_LLM_BASE_URL);
        assert_eq!(config.llm.model, DEFAULT_LLM_MODEL);
        assert_eq!(config.tts.model, DEFAULT_TTS_MODEL);
        assert!(config.llm.api_key.is_none());
        assert!(config.cors_allowed_origins.is_none());
    }

    #[test]
    fn placeholder_credentials_are_dropped() {
        let config = config(&[
            ("LLM_API_KEY", "your-openai-key-here"),
            ("TTS_API_KEY", "sk_live_123"),
        ]);
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.tts.api_key.as_deref(), Some("sk_live_123"));
    }

    #[test]
    fn placeholder_detection() {
        assert!(is_placeholder_credential(""));
        assert!(is_placeholder_credential("  "));
        assert!(is_placeholder_credential("YOUR_KEY"));
        assert!(is_placeholder_credential("api-PLACEHOLDER"));
        assert!(is_placeholder_credential("changeme"));
        assert!(!is_placeholder_credential("sk-abc123"));
    }

    #[test]
    fn port_falls_back_to_port_var_then_default() {
        assert_eq!(config(&[("PORT", "8080")]).server_port, 8080);
        assert_eq!(config(&[("SERVER_PORT", "not-a-number")]).server_port, 3000);
    }
}
