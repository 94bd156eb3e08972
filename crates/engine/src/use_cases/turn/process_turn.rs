//! Process turn use case.
//!
//! Single writer for a turn: the returned scene either strictly extends the
//! prior one or the turn fails and nothing is returned.

use std::sync::Arc;

use improvstudio_domain::{
    default_scene, summarize, ActorId, DomainError, Line, LineDirective, SceneId, SceneState,
};

use crate::infrastructure::ports::{ClockPort, SpeechPort, SpeechRequest};

use super::dialogue::{DialogueGenerator, GeneratorError};
use super::fallback::fallback_turn;
use super::speech::synthesize_all;

/// Which generator produced a turn's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSource {
    Primary,
    Fallback,
}

impl LineSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineSource::Primary => "primary",
            LineSource::Fallback => "fallback",
        }
    }
}

/// Result of a successful turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub scene_state: SceneState,
    /// Exactly the lines appended by this turn, in creation order
    pub new_lines: Vec<Line>,
    pub source: LineSource,
}

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("Command must not be empty")]
    EmptyCommand,
    #[error("Invalid scene state: {0}")]
    InvalidScene(DomainError),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Generator referenced unknown actor: {0}")]
    InvalidActor(ActorId),
    #[error("Generator produced no lines")]
    NoLines,
    /// The scene cannot take another line.
    #[error("Scene has no {0} left")]
    SceneExhausted(&'static str),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl TurnError {
    /// Errors caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyCommand | Self::InvalidScene(_) | Self::SceneExhausted(_)
        )
    }
}

/// Process turn use case.
///
/// Orchestrates: dialogue generation (with fallback), beat assignment,
/// speech synthesis, summary.
pub struct ProcessTurn {
    generator: Arc<DialogueGenerator>,
    speech: Arc<dyn SpeechPort>,
    clock: Arc<dyn ClockPort>,
}

impl ProcessTurn {
    pub fn new(
        generator: Arc<DialogueGenerator>,
        speech: Arc<dyn SpeechPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            generator,
            speech,
            clock,
        }
    }

    /// Run one turn against `prior` (or a fresh default scene).
    ///
    /// `prior` is never modified; on success the returned state replaces it.
    pub async fn execute(
        &self,
        prior: Option<&SceneState>,
        command: &str,
    ) -> Result<TurnOutcome, TurnError> {
        let command = command.trim();
        if command.is_empty() {
            return Err(TurnError::EmptyCommand);
        }

        let now = self.clock.now();
        let mut scene = match prior {
            Some(prior) => {
                prior.validate().map_err(TurnError::InvalidScene)?;
                prior.clone()
            }
            None => default_scene(SceneId::new(), now),
        };

        let (directives, source) = match self.generator.generate(&scene, command).await {
            Ok(generated) => {
                if generated.lines.is_empty() {
                    return Err(TurnError::NoLines);
                }
                if let Some(unknown) = generated
                    .lines
                    .iter()
                    .find(|line| !scene.has_actor(&line.actor_id))
                {
                    return Err(TurnError::InvalidActor(unknown.actor_id.clone()));
                }

                scene.apply_metadata(&generated.metadata);
                for update in &generated.actor_updates {
                    if !scene.apply_actor_update(update) {
                        tracing::debug!(actor_id = %update.id, "Ignoring update for unknown actor");
                    }
                }
                (generated.lines, LineSource::Primary)
            }
            Err(GeneratorError::NotConfigured(reason)) => {
                return Err(TurnError::Configuration(reason));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dialogue generator failed, using fallback");
                let fallback = fallback_turn(&scene, command);
                if let Some(genre) = fallback.genre {
                    scene.genre = genre.to_string();
                }
                (fallback.lines, LineSource::Fallback)
            }
        };

        let (mut new_lines, requests) = build_lines(&scene, directives, now)?;

        let audio = synthesize_all(self.speech.as_ref(), requests).await;
        let mut voiced = 0;
        for (line, url) in new_lines.iter_mut().zip(audio) {
            if let Some(url) = url {
                if line.attach_audio(url) {
                    voiced += 1;
                }
            }
        }

        scene.append_lines(new_lines.clone())?;
        scene.summary = summarize(&scene.summary, scene.lines(), scene.actors());
        scene.touch(self.clock.now());

        tracing::info!(
            scene_id = %scene.id,
            path = source.as_str(),
            lines = new_lines.len(),
            voiced = voiced,
            beat = scene.current_beat(),
            "Turn processed"
        );

        Ok(TurnOutcome {
            scene_state: scene,
            new_lines,
            source,
        })
    }
}

/// Turn directives into lines with ids and beats, plus one speech request per line.
fn build_lines(
    scene: &SceneState,
    directives: Vec<LineDirective>,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(Vec<Line>, Vec<SpeechRequest>), TurnError> {
    let mut beat = scene.current_beat();
    let mut next_id = scene.next_line_id();
    let mut lines = Vec::with_capacity(directives.len());
    let mut requests = Vec::with_capacity(directives.len());

    for directive in directives {
        let actor = scene
            .actor(&directive.actor_id)
            .ok_or_else(|| TurnError::InvalidActor(directive.actor_id.clone()))?;

        let id = next_id.ok_or(TurnError::SceneExhausted("line ids"))?;
        beat = beat
            .checked_add(directive.beat_delta.as_increment())
            .ok_or(TurnError::SceneExhausted("beats"))?;
        requests.push(SpeechRequest {
            text: directive.text.clone(),
            voice_id: actor.voice_id.clone(),
            language: directive.language.unwrap_or(actor.language),
        });
        lines.push(Line::new(id, directive.actor_id, directive.text, now, beat));
        next_id = id.next();
    }

    Ok((lines, requests))
}
