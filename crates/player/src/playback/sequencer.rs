//! Playback sequencer.
//!
//! Plays lines strictly in order, one at a time. A line advances on
//! completion, timeout or failure; only cancellation stops the sequence.

use std::sync::Arc;
use std::time::Duration;

use improvstudio_domain::{Line, LineId};
use improvstudio_shared::decode_data_url;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::sink::{AudioHandle, AudioSink};

/// Fixed timings of the sequencer and the auto-continue loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// How long a line without playable audio stays current
    pub degraded_dwell: Duration,
    /// Upper bound on a single clip
    pub line_timeout: Duration,
    /// Gap between the end of playback and the synthetic "continue"
    pub auto_continue_pause: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            degraded_dwell: Duration::from_millis(2500),
            line_timeout: Duration::from_secs(30),
            auto_continue_pause: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing { line_id: LineId, index: usize },
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    Audio,
    /// Highlighted without sound
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineResult {
    Completed,
    TimedOut,
    Failed(String),
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineVisit {
    pub line_id: LineId,
    pub mode: PlaybackMode,
    pub result: LineResult,
}

/// What happened during one run of the sequencer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackReport {
    pub visits: Vec<LineVisit>,
    pub aborted: bool,
}

impl PlaybackReport {
    /// Every line was visited and nothing cancelled the run.
    pub fn ran_to_end(&self) -> bool {
        !self.aborted
    }
}

pub struct PlaybackSequencer {
    sink: Arc<dyn AudioSink>,
    config: PlaybackConfig,
    state: watch::Sender<PlaybackState>,
    current: Option<Box<dyn AudioHandle>>,
}

impl PlaybackSequencer {
    pub fn new(sink: Arc<dyn AudioSink>, config: PlaybackConfig) -> Self {
        let (state, _) = watch::channel(PlaybackState::Idle);
        Self {
            sink,
            config,
            state,
            current: None,
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.subscribe()
    }

    /// Whether an audio clip is currently held.
    pub fn has_active_audio(&self) -> bool {
        self.current.is_some()
    }

    /// Play `lines` in order until the end or until `token` is cancelled.
    pub async fn play(&mut self, lines: &[Line], token: &CancellationToken) -> PlaybackReport {
        let mut report = PlaybackReport::default();

        for (index, line) in lines.iter().enumerate() {
            if token.is_cancelled() {
                report.aborted = true;
                break;
            }

            self.state.send_replace(PlaybackState::Playing {
                line_id: line.id(),
                index,
            });

            let visit = match self.start_audio(line) {
                Some(handle) => {
                    self.current = Some(handle);
                    let result = self.await_current(token).await;
                    self.current = None;
                    LineVisit {
                        line_id: line.id(),
                        mode: PlaybackMode::Audio,
                        result,
                    }
                }
                None => LineVisit {
                    line_id: line.id(),
                    mode: PlaybackMode::Degraded,
                    result: self.dwell(token).await,
                },
            };

            tracing::debug!(line_id = %line.id(), mode = ?visit.mode, result = ?visit.result, "Line visited");

            let aborted = visit.result == LineResult::Aborted;
            report.visits.push(visit);
            if aborted {
                report.aborted = true;
                break;
            }
        }

        self.state.send_replace(if report.aborted {
            PlaybackState::Aborted
        } else {
            PlaybackState::Idle
        });
        report
    }

    /// Decode and start a line's audio; `None` means play it degraded.
    fn start_audio(&self, line: &Line) -> Option<Box<dyn AudioHandle>> {
        let url = line.audio_url()?;
        let audio = match decode_data_url(url) {
            Ok(audio) => audio,
            Err(e) => {
                tracing::debug!(line_id = %line.id(), error = %e, "Unplayable audio reference");
                return None;
            }
        };
        match self.sink.start(audio) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::debug!(line_id = %line.id(), error = %e, "Audio could not start");
                None
            }
        }
    }

    async fn await_current(&mut self, token: &CancellationToken) -> LineResult {
        let timeout = self.config.line_timeout;
        let Some(handle) = self.current.as_mut() else {
            return LineResult::Completed;
        };

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            outcome = tokio::time::timeout(timeout, handle.finished()) => Some(outcome),
        };

        match outcome {
            None => {
                handle.stop();
                LineResult::Aborted
            }
            Some(Ok(Ok(()))) => LineResult::Completed,
            Some(Ok(Err(e))) => {
                handle.stop();
                LineResult::Failed(e.to_string())
            }
            Some(Err(_)) => {
                handle.stop();
                LineResult::TimedOut
            }
        }
    }

    async fn dwell(&self, token: &CancellationToken) -> LineResult {
        tokio::select! {
            biased;
            _ = token.cancelled() => LineResult::Aborted,
            _ = tokio::time::sleep(self.config.degraded_dwell) => LineResult::Completed,
        }
    }
}
