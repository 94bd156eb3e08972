//! Speaker output via rodio.
//!
//! The output stream is not `Send`, so it lives on a dedicated thread for the
//! sink's lifetime. Each clip gets its own `rodio::Sink`.

use std::io::Cursor;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use async_trait::async_trait;
use improvstudio_shared::InlineAudio;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use super::sink::{AudioHandle, AudioSink, PlaybackError};

pub struct SpeakerSink {
    stream_handle: OutputStreamHandle,
    // Dropping this sender ends the stream thread.
    _shutdown: mpsc::Sender<()>,
}

impl SpeakerSink {
    /// Open the default output device.
    pub fn new() -> Result<Self, PlaybackError> {
        let (handle_tx, handle_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("improvstudio-audio".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = handle_tx.send(Ok(handle));
                    // Park until the sink is dropped.
                    let _ = shutdown_rx.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = handle_tx.send(Err(PlaybackError::Device(e.to_string())));
                }
            })
            .map_err(|e| PlaybackError::Device(e.to_string()))?;

        let stream_handle = handle_rx
            .recv()
            .map_err(|_| PlaybackError::NoDevice)??;

        tracing::info!("Speaker output ready");
        Ok(Self {
            stream_handle,
            _shutdown: shutdown_tx,
        })
    }
}

impl AudioSink for SpeakerSink {
    fn start(&self, audio: InlineAudio) -> Result<Box<dyn AudioHandle>, PlaybackError> {
        let source = Decoder::new(Cursor::new(audio.bytes))
            .map_err(|e| PlaybackError::Decode(e.to_string()))?;
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| PlaybackError::Device(e.to_string()))?;
        sink.append(source.convert_samples::<f32>());

        Ok(Box::new(SpeakerHandle {
            sink: Arc::new(sink),
        }))
    }
}

struct SpeakerHandle {
    sink: Arc<Sink>,
}

#[async_trait]
impl AudioHandle for SpeakerHandle {
    async fn finished(&mut self) -> Result<(), PlaybackError> {
        let sink = self.sink.clone();
        tokio::task::spawn_blocking(move || sink.sleep_until_end())
            .await
            .map_err(|e| PlaybackError::Device(e.to_string()))
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}
