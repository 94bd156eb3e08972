//! Studio session: the client-side loop tying turns to playback.
//!
//! The session owns the scene, keeps at most one turn in flight and decides
//! what happens after each activity ends. Inputs arrive on an mpsc channel;
//! progress is reported as [`StudioEvent`]s.

use std::sync::Arc;
use std::time::Duration;

use improvstudio_domain::{Line, SceneState};
use improvstudio_shared::CONTINUE_COMMAND;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::playback::{PlaybackReport, PlaybackSequencer};
use crate::ports::TurnPort;

const INPUT_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudioInput {
    /// A stage direction typed by the user
    Command(String),
    Stop,
    SetAutoContinue(bool),
}

#[derive(Debug, Clone)]
pub enum StudioEvent {
    TurnStarted {
        command: String,
    },
    TurnCompleted {
        scene: SceneState,
        new_lines: Vec<Line>,
    },
    /// Message is safe to show the user
    TurnFailed {
        message: String,
    },
    PlaybackFinished {
        report: PlaybackReport,
    },
    AutoContinueScheduled {
        after: Duration,
    },
    AutoContinueCancelled,
    Stopped,
}

#[derive(Debug, thiserror::Error)]
#[error("Studio session has ended")]
pub struct SessionClosed;

/// Sending half of a running session. Dropping every handle ends the session.
#[derive(Clone)]
pub struct StudioHandle {
    inputs: mpsc::Sender<StudioInput>,
}

impl StudioHandle {
    pub async fn send(&self, input: StudioInput) -> Result<(), SessionClosed> {
        self.inputs.send(input).await.map_err(|_| SessionClosed)
    }

    pub async fn command(&self, text: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(StudioInput::Command(text.into())).await
    }

    pub async fn stop(&self) -> Result<(), SessionClosed> {
        self.send(StudioInput::Stop).await
    }

    pub async fn set_auto_continue(&self, on: bool) -> Result<(), SessionClosed> {
        self.send(StudioInput::SetAutoContinue(on)).await
    }
}

enum Phase {
    Idle,
    Turn(String),
    Playback(Vec<Line>),
    /// Waiting out the gap before an automatic "continue"
    Pause,
}

pub struct StudioSession {
    turns: Arc<dyn TurnPort>,
    sequencer: PlaybackSequencer,
    scene: Option<SceneState>,
    auto_continue: bool,
    inputs: mpsc::Receiver<StudioInput>,
    events: mpsc::UnboundedSender<StudioEvent>,
}

impl StudioSession {
    pub fn new(
        turns: Arc<dyn TurnPort>,
        sequencer: PlaybackSequencer,
        auto_continue: bool,
    ) -> (Self, StudioHandle, mpsc::UnboundedReceiver<StudioEvent>) {
        let (input_tx, input_rx) = mpsc::channel(INPUT_BUFFER);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let session = Self {
            turns,
            sequencer,
            scene: None,
            auto_continue,
            inputs: input_rx,
            events: event_tx,
        };
        (session, StudioHandle { inputs: input_tx }, event_rx)
    }

    /// Resume from an existing scene instead of letting the engine start one.
    pub fn with_scene(mut self, scene: SceneState) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Run until the input channel closes. Returns the last scene reached.
    pub async fn run(mut self) -> Option<SceneState> {
        let mut phase = Phase::Idle;
        loop {
            let next = match phase {
                Phase::Idle => self.idle().await,
                Phase::Turn(command) => self.turn(command).await,
                Phase::Playback(lines) => self.playback(lines).await,
                Phase::Pause => self.pause().await,
            };
            match next {
                Some(next) => phase = next,
                None => break,
            }
        }
        tracing::debug!("Studio session closed");
        self.scene
    }

    async fn idle(&mut self) -> Option<Phase> {
        loop {
            match self.inputs.recv().await? {
                StudioInput::Command(text) => {
                    if let Some(command) = normalize_command(&text) {
                        return Some(Phase::Turn(command));
                    }
                }
                StudioInput::Stop => self.emit(StudioEvent::Stopped),
                StudioInput::SetAutoContinue(on) => self.auto_continue = on,
            }
        }
    }

    async fn turn(&mut self, command: String) -> Option<Phase> {
        self.emit(StudioEvent::TurnStarted {
            command: command.clone(),
        });

        let turns = self.turns.clone();
        let request = turns.submit_turn(self.scene.clone(), command);
        tokio::pin!(request);

        let mut held: Option<String> = None;
        let mut stopped = false;
        let mut closed = false;

        let result = loop {
            tokio::select! {
                result = &mut request => break result,
                input = self.inputs.recv(), if !closed => match input {
                    None => closed = true,
                    Some(StudioInput::Command(text)) => {
                        if let Some(command) = normalize_command(&text) {
                            held = Some(command);
                            stopped = false;
                        }
                    }
                    Some(StudioInput::Stop) => {
                        held = None;
                        stopped = true;
                        self.emit(StudioEvent::Stopped);
                    }
                    Some(StudioInput::SetAutoContinue(on)) => self.auto_continue = on,
                },
            }
        };

        let new_lines = match result {
            Ok(response) => {
                tracing::info!(
                    lines = response.new_lines.len(),
                    beat = response.scene_state.current_beat(),
                    "Turn completed"
                );
                self.scene = Some(response.scene_state.clone());
                self.emit(StudioEvent::TurnCompleted {
                    scene: response.scene_state,
                    new_lines: response.new_lines.clone(),
                });
                Some(response.new_lines)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Turn failed");
                self.emit(StudioEvent::TurnFailed {
                    message: e.user_message().to_string(),
                });
                None
            }
        };

        if closed {
            return None;
        }
        if let Some(command) = held {
            return Some(Phase::Turn(command));
        }
        match new_lines {
            Some(lines) if !stopped => Some(Phase::Playback(lines)),
            _ => Some(Phase::Idle),
        }
    }

    async fn playback(&mut self, lines: Vec<Line>) -> Option<Phase> {
        let token = CancellationToken::new();
        let mut next: Option<String> = None;
        let mut stopped = false;
        let mut closed = false;

        // `play` borrows the sequencer, so events are emitted after the loop.
        let report = {
            let play = self.sequencer.play(&lines, &token);
            tokio::pin!(play);

            loop {
                tokio::select! {
                    report = &mut play => break report,
                    input = self.inputs.recv(), if !closed => match input {
                        None => {
                            closed = true;
                            token.cancel();
                        }
                        Some(StudioInput::Command(text)) => {
                            if let Some(command) = normalize_command(&text) {
                                next = Some(command);
                                stopped = false;
                                token.cancel();
                            }
                        }
                        Some(StudioInput::Stop) => {
                            next = None;
                            stopped = true;
                            token.cancel();
                        }
                        Some(StudioInput::SetAutoContinue(on)) => self.auto_continue = on,
                    },
                }
            }
        };

        let aborted = report.aborted;
        if stopped {
            self.emit(StudioEvent::Stopped);
        }
        self.emit(StudioEvent::PlaybackFinished { report });

        if closed {
            return None;
        }
        if let Some(command) = next {
            return Some(Phase::Turn(command));
        }
        if !aborted && self.auto_continue {
            Some(Phase::Pause)
        } else {
            Some(Phase::Idle)
        }
    }

    async fn pause(&mut self) -> Option<Phase> {
        let after = self.sequencer.config().auto_continue_pause;
        self.emit(StudioEvent::AutoContinueScheduled { after });

        let deadline = tokio::time::sleep(after);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => return Some(Phase::Turn(CONTINUE_COMMAND.to_string())),
                input = self.inputs.recv() => match input? {
                    StudioInput::Command(text) => {
                        if let Some(command) = normalize_command(&text) {
                            self.emit(StudioEvent::AutoContinueCancelled);
                            return Some(Phase::Turn(command));
                        }
                    }
                    StudioInput::Stop => {
                        self.emit(StudioEvent::Stopped);
                        self.emit(StudioEvent::AutoContinueCancelled);
                        return Some(Phase::Idle);
                    }
                    StudioInput::SetAutoContinue(on) => {
                        self.auto_continue = on;
                        if !on {
                            self.emit(StudioEvent::AutoContinueCancelled);
                            return Some(Phase::Idle);
                        }
                    }
                },
            }
        }
    }

    fn emit(&self, event: StudioEvent) {
        // A dropped receiver only means nobody is watching.
        let _ = self.events.send(event);
    }
}

fn normalize_command(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use improvstudio_domain::{default_scene, ActorId, LineId, SceneId};
    use improvstudio_shared::TurnResponse;

    use crate::infrastructure::turn_client::TurnClientError;
    use crate::playback::{NullAudioSink, PlaybackConfig};
    use crate::ports::MockTurnPort;

    /// Appends `count` silent lines to the prior scene (or a fresh one).
    fn respond(prior: Option<SceneState>, command: &str, count: u64) -> TurnResponse {
        let mut scene = prior.unwrap_or_else(|| default_scene(SceneId::new(), Utc::now()));
        let first = scene.next_line_id().unwrap().as_u64();
        let beat = scene.current_beat();
        let lines: Vec<Line> = (0..count)
            .map(|i| {
                Line::new(
                    LineId::from_raw(first + i),
                    ActorId::new("maya"),
                    format!("{command} {i}"),
                    Utc::now(),
                    beat,
                )
            })
            .collect();
        scene.append_lines(lines.clone()).unwrap();
        TurnResponse {
            scene_state: scene,
            new_lines: lines,
        }
    }

    /// Turn port that takes `delay` per turn and records every command.
    struct ScriptedTurns {
        delay: Duration,
        lines_per_turn: u64,
        commands: Mutex<Vec<String>>,
    }

    impl ScriptedTurns {
        fn new(delay: Duration, lines_per_turn: u64) -> Arc<Self> {
            Arc::new(Self {
                delay,
                lines_per_turn,
                commands: Mutex::new(Vec::new()),
            })
        }

        fn commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TurnPort for ScriptedTurns {
        async fn submit_turn(
            &self,
            scene_state: Option<SceneState>,
            user_command: String,
        ) -> Result<TurnResponse, TurnClientError> {
            self.commands.lock().unwrap().push(user_command.clone());
            tokio::time::sleep(self.delay).await;
            Ok(respond(scene_state, &user_command, self.lines_per_turn))
        }
    }

    fn session(
        turns: Arc<dyn TurnPort>,
        auto_continue: bool,
    ) -> (StudioSession, StudioHandle, mpsc::UnboundedReceiver<StudioEvent>) {
        let sequencer = PlaybackSequencer::new(Arc::new(NullAudioSink), PlaybackConfig::default());
        StudioSession::new(turns, sequencer, auto_continue)
    }

    /// Skip events until one matches.
    async fn wait_for(
        events: &mut mpsc::UnboundedReceiver<StudioEvent>,
        matches: impl Fn(&StudioEvent) -> bool,
    ) -> StudioEvent {
        loop {
            let event = events.recv().await.expect("session ended early");
            if matches(&event) {
                return event;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn command_runs_turn_then_plays_new_lines() {
        let turns = ScriptedTurns::new(Duration::ZERO, 2);
        let (session, handle, mut events) = session(turns.clone(), false);
        let task = tokio::spawn(session.run());

        handle.command("  open on a lighthouse ").await.unwrap();

        let started = events.recv().await.unwrap();
        assert!(
            matches!(started, StudioEvent::TurnStarted { ref command } if command == "open on a lighthouse")
        );
        let completed = events.recv().await.unwrap();
        assert!(matches!(completed, StudioEvent::TurnCompleted { ref new_lines, .. } if new_lines.len() == 2));
        let StudioEvent::PlaybackFinished { report } = events.recv().await.unwrap() else {
            panic!("expected playback to finish");
        };
        assert_eq!(report.visits.len(), 2);
        assert!(report.ran_to_end());

        drop(handle);
        let scene = task.await.unwrap().unwrap();
        assert_eq!(scene.lines().len(), 2);
        assert_eq!(turns.commands(), vec!["open on a lighthouse"]);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_commands_are_ignored() {
        let turns = ScriptedTurns::new(Duration::ZERO, 1);
        let (session, handle, _events) = session(turns.clone(), false);
        let task = tokio::spawn(session.run());

        handle.command("   ").await.unwrap();
        drop(handle);

        assert!(task.await.unwrap().is_none());
        assert!(turns.commands().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn auto_continue_issues_continue_after_pause() {
        let turns = ScriptedTurns::new(Duration::ZERO, 1);
        let (session, handle, mut events) = session(turns.clone(), true);
        let task = tokio::spawn(session.run());

        handle.command("begin").await.unwrap();

        let scheduled = wait_for(&mut events, |e| {
            matches!(e, StudioEvent::AutoContinueScheduled { .. })
        })
        .await;
        assert!(matches!(
            scheduled,
            StudioEvent::AutoContinueScheduled { after } if after == PlaybackConfig::default().auto_continue_pause
        ));
        let next = events.recv().await.unwrap();
        assert!(matches!(next, StudioEvent::TurnStarted { ref command } if command == CONTINUE_COMMAND));

        // Applied during the continue turn's playback, so no third turn follows.
        handle.set_auto_continue(false).await.unwrap();
        wait_for(&mut events, |e| matches!(e, StudioEvent::PlaybackFinished { .. })).await;

        drop(handle);
        let scene = task.await.unwrap().unwrap();
        assert_eq!(scene.lines().len(), 2);
        assert_eq!(turns.commands(), vec!["begin", CONTINUE_COMMAND]);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_command_aborts_playback_and_runs_next() {
        let turns = ScriptedTurns::new(Duration::ZERO, 3);
        let (session, handle, mut events) = session(turns.clone(), true);
        let task = tokio::spawn(session.run());

        handle.command("first").await.unwrap();
        wait_for(&mut events, |e| matches!(e, StudioEvent::TurnCompleted { .. })).await;

        handle.command("second").await.unwrap();
        let StudioEvent::PlaybackFinished { report } = events.recv().await.unwrap() else {
            panic!("expected aborted playback");
        };
        assert!(report.aborted);
        assert!(report.visits.len() < 3);

        let next = events.recv().await.unwrap();
        assert!(matches!(next, StudioEvent::TurnStarted { ref command } if command == "second"));

        handle.set_auto_continue(false).await.unwrap();
        drop(handle);
        task.await.unwrap();
        assert_eq!(turns.commands(), vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_auto_continue() {
        let turns = ScriptedTurns::new(Duration::ZERO, 1);
        let (session, handle, mut events) = session(turns.clone(), true);
        let task = tokio::spawn(session.run());

        handle.command("begin").await.unwrap();
        wait_for(&mut events, |e| {
            matches!(e, StudioEvent::AutoContinueScheduled { .. })
        })
        .await;

        handle.stop().await.unwrap();
        assert!(matches!(events.recv().await.unwrap(), StudioEvent::Stopped));
        assert!(matches!(
            events.recv().await.unwrap(),
            StudioEvent::AutoContinueCancelled
        ));

        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(handle);
        task.await.unwrap();
        assert_eq!(turns.commands(), vec!["begin"]);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_command_supersedes_pending_auto_continue() {
        let turns = ScriptedTurns::new(Duration::ZERO, 1);
        let (session, handle, mut events) = session(turns.clone(), true);
        let task = tokio::spawn(session.run());

        handle.command("begin").await.unwrap();
        wait_for(&mut events, |e| {
            matches!(e, StudioEvent::AutoContinueScheduled { .. })
        })
        .await;

        handle.command("a door slams").await.unwrap();
        assert!(matches!(
            events.recv().await.unwrap(),
            StudioEvent::AutoContinueCancelled
        ));
        let next = events.recv().await.unwrap();
        assert!(matches!(next, StudioEvent::TurnStarted { ref command } if command == "a door slams"));

        handle.set_auto_continue(false).await.unwrap();
        drop(handle);
        task.await.unwrap();
        assert_eq!(turns.commands(), vec!["begin", "a door slams"]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_playback_reports_stopped_then_aborted_report() {
        let turns = ScriptedTurns::new(Duration::ZERO, 3);
        let (session, handle, mut events) = session(turns.clone(), true);
        let task = tokio::spawn(session.run());

        handle.command("begin").await.unwrap();
        wait_for(&mut events, |e| matches!(e, StudioEvent::TurnCompleted { .. })).await;

        handle.stop().await.unwrap();
        assert!(matches!(events.recv().await.unwrap(), StudioEvent::Stopped));
        let StudioEvent::PlaybackFinished { report } = events.recv().await.unwrap() else {
            panic!("expected aborted playback");
        };
        assert!(report.aborted);

        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(handle);
        task.await.unwrap();
        assert_eq!(turns.commands(), vec!["begin"]);
    }

    #[tokio::test(start_paused = true)]
    async fn commands_during_a_turn_are_held_latest_wins() {
        let turns = ScriptedTurns::new(Duration::from_secs(5), 2);
        let (session, handle, mut events) = session(turns.clone(), false);
        let task = tokio::spawn(session.run());

        handle.command("one").await.unwrap();
        wait_for(&mut events, |e| matches!(e, StudioEvent::TurnStarted { .. })).await;
        handle.command("two").await.unwrap();
        handle.command("three").await.unwrap();

        assert!(matches!(
            events.recv().await.unwrap(),
            StudioEvent::TurnCompleted { .. }
        ));
        // The held command supersedes playback of the first turn.
        let next = events.recv().await.unwrap();
        assert!(matches!(next, StudioEvent::TurnStarted { ref command } if command == "three"));

        wait_for(&mut events, |e| matches!(e, StudioEvent::PlaybackFinished { .. })).await;
        drop(handle);
        let scene = task.await.unwrap().unwrap();
        assert_eq!(scene.lines().len(), 4);
        assert_eq!(turns.commands(), vec!["one", "three"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_turn_keeps_previous_scene() {
        let mut port = MockTurnPort::new();
        port.expect_submit_turn()
            .withf(|_, command| command == "one")
            .returning(|scene, command| Ok(respond(scene, &command, 1)));
        port.expect_submit_turn()
            .withf(|_, command| command == "two")
            .returning(|_, _| {
                Err(TurnClientError::Server {
                    status: 500,
                    message: "The writers room is closed.".to_string(),
                })
            });

        let (session, handle, mut events) = session(Arc::new(port), false);
        let task = tokio::spawn(session.run());

        handle.command("one").await.unwrap();
        wait_for(&mut events, |e| matches!(e, StudioEvent::PlaybackFinished { .. })).await;

        handle.command("two").await.unwrap();
        let failed = wait_for(&mut events, |e| matches!(e, StudioEvent::TurnFailed { .. })).await;
        assert!(
            matches!(failed, StudioEvent::TurnFailed { ref message } if message == "The writers room is closed.")
        );

        drop(handle);
        let scene = task.await.unwrap().unwrap();
        assert_eq!(scene.lines().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn resumes_from_given_scene() {
        let prior = respond(None, "earlier", 2).scene_state;
        let turns = ScriptedTurns::new(Duration::ZERO, 1);
        let (session, handle, mut events) = session(turns.clone(), false);
        let task = tokio::spawn(session.with_scene(prior).run());

        handle.command("later").await.unwrap();
        wait_for(&mut events, |e| matches!(e, StudioEvent::PlaybackFinished { .. })).await;

        drop(handle);
        let scene = task.await.unwrap().unwrap();
        assert_eq!(scene.lines().len(), 3);
        assert_eq!(scene.lines()[2].id(), LineId::from_raw(3));
    }
}
