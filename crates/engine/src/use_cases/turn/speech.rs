//! Concurrent speech synthesis for a turn's new lines.

use futures_util::future::join_all;
use improvstudio_shared::encode_data_url;

use crate::infrastructure::ports::{SpeechError, SpeechPort, SpeechRequest};

/// Synthesize every request concurrently.
///
/// Returns one entry per request, in request order: a `data:` audio reference,
/// or `None` when that line could not be voiced. All requests are attempted.
pub async fn synthesize_all(
    speech: &dyn SpeechPort,
    requests: Vec<SpeechRequest>,
) -> Vec<Option<String>> {
    let attempts = requests.into_iter().enumerate().map(|(index, request)| async move {
        let voice_id = request.voice_id.clone();
        match speech.synthesize(request).await {
            Ok(audio) if !audio.bytes.is_empty() => {
                Some(encode_data_url(&audio.mime_type, &audio.bytes))
            }
            Ok(_) => {
                tracing::warn!(line = index, voice_id = %voice_id, "Speech service returned no audio");
                None
            }
            Err(SpeechError::NotConfigured(reason)) => {
                tracing::debug!(line = index, reason = %reason, "Speech synthesis skipped");
                None
            }
            Err(e) => {
                tracing::warn!(line = index, voice_id = %voice_id, error = %e, "Speech synthesis failed");
                None
            }
        }
    });

    join_all(attempts).await
}
