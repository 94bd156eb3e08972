//! Audio output boundary.

use async_trait::async_trait;
use improvstudio_shared::InlineAudio;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("No audio output available")]
    NoDevice,
    #[error("Could not decode audio: {0}")]
    Decode(String),
    #[error("Playback failed: {0}")]
    Device(String),
}

/// One playback attempt. Dropping the handle without `stop` lets the clip run out.
#[async_trait]
pub trait AudioHandle: Send + Sync {
    /// Resolves when the clip has played to the end.
    async fn finished(&mut self) -> Result<(), PlaybackError>;

    /// Halt output immediately.
    fn stop(&mut self);
}

/// Starts playback of decoded inline audio.
pub trait AudioSink: Send + Sync {
    fn start(&self, audio: InlineAudio) -> Result<Box<dyn AudioHandle>, PlaybackError>;
}

/// No output device. Every line plays in degraded mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn start(&self, _audio: InlineAudio) -> Result<Box<dyn AudioHandle>, PlaybackError> {
        Err(PlaybackError::NoDevice)
    }
}
