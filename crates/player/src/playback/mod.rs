//! Client-side playback of a turn's new lines.

mod sequencer;
mod sink;
#[cfg(feature = "speaker")]
mod speaker;

pub use sequencer::{
    LineResult, LineVisit, PlaybackConfig, PlaybackMode, PlaybackReport, PlaybackSequencer,
    PlaybackState,
};
pub use sink::{AudioHandle, AudioSink, NullAudioSink, PlaybackError};
#[cfg(feature = "speaker")]
pub use speaker::SpeakerSink;
