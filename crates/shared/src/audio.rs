//! Self-contained audio references.
//!
//! Synthesized speech travels inside the scene state as a `data:` URL, so a
//! client can play it without another network round trip.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Decoded inline audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAudio {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioRefError {
    #[error("Not a data URL")]
    NotDataUrl,
    #[error("Data URL is not base64 encoded")]
    NotBase64,
    #[error("Data URL does not carry audio: {0}")]
    NotAudio(String),
    #[error("Invalid base64 payload: {0}")]
    InvalidPayload(String),
}

/// Wrap encoded audio bytes into a `data:<mime>;base64,<payload>` reference.
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Inverse of [`encode_data_url`].
pub fn decode_data_url(url: &str) -> Result<InlineAudio, AudioRefError> {
    let rest = url.strip_prefix("data:").ok_or(AudioRefError::NotDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(AudioRefError::NotDataUrl)?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or(AudioRefError::NotBase64)?;

    if !mime_type.starts_with("audio/") {
        return Err(AudioRefError::NotAudio(mime_type.to_string()));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| AudioRefError::InvalidPayload(e.to_string()))?;

    Ok(InlineAudio {
        mime_type: mime_type.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_what_it_encodes() {
        let url = encode_data_url("audio/mpeg", &[0xff, 0xfb, 0x90, 0x00]);
        assert!(url.starts_with("data:audio/mpeg;base64,"));

        let audio = decode_data_url(&url).unwrap();
        assert_eq!(audio.mime_type, "audio/mpeg");
        assert_eq!(audio.bytes, vec![0xff, 0xfb, 0x90, 0x00]);
    }

    #[test]
    fn rejects_non_audio_and_plain_urls() {
        assert_eq!(
            decode_data_url("https://example.com/a.mp3"),
            Err(AudioRefError::NotDataUrl)
        );
        assert!(matches!(
            decode_data_url("data:image/png;base64,AAAA"),
            Err(AudioRefError::NotAudio(_))
        ));
        assert_eq!(
            decode_data_url("data:audio/wav,raw"),
            Err(AudioRefError::NotBase64)
        );
    }
}
