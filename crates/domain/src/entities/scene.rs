//! Scene state - the aggregate the client holds and sends with every turn
//!
//! Lines are append-only. Two invariants are held across every mutation:
//! - every line's actor is on the roster
//! - beat indices never decrease along the line sequence

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Actor, Line};
use crate::error::DomainError;
use crate::ids::{ActorId, LineId, SceneId};
use crate::value_objects::{ActorUpdate, SceneMetadata};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneState {
    pub id: SceneId,
    pub title: String,
    pub genre: String,
    pub setting: String,
    pub logline: String,
    /// Rolling digest of recent dialogue
    #[serde(default)]
    pub summary: String,
    actors: Vec<Actor>,
    #[serde(default)]
    lines: Vec<Line>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SceneState {
    pub fn new(
        id: SceneId,
        metadata: SceneMetadata,
        actors: Vec<Actor>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: metadata.title,
            genre: metadata.genre,
            setting: metadata.setting,
            logline: metadata.logline,
            summary: String::new(),
            actors,
            lines: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn actor(&self, id: &ActorId) -> Option<&Actor> {
        self.actors.iter().find(|actor| &actor.id == id)
    }

    pub fn has_actor(&self, id: &ActorId) -> bool {
        self.actor(id).is_some()
    }

    pub fn metadata(&self) -> SceneMetadata {
        SceneMetadata {
            title: self.title.clone(),
            genre: self.genre.clone(),
            setting: self.setting.clone(),
            logline: self.logline.clone(),
        }
    }

    /// Highest beat reached so far (0 for an empty scene).
    pub fn current_beat(&self) -> u32 {
        self.lines
            .iter()
            .map(Line::beat_index)
            .max()
            .unwrap_or(0)
    }

    /// Id the next appended line must carry; `None` once ids are exhausted.
    pub fn next_line_id(&self) -> Option<LineId> {
        match self.lines.last() {
            Some(line) => line.id().next(),
            None => Some(LineId::FIRST),
        }
    }

    /// The last `count` lines, oldest first.
    pub fn recent_lines(&self, count: usize) -> &[Line] {
        let start = self.lines.len().saturating_sub(count);
        &self.lines[start..]
    }

    /// Overwrite metadata fields; blank incoming values keep the current value.
    pub fn apply_metadata(&mut self, metadata: &SceneMetadata) {
        fn overwrite(target: &mut String, value: &str) {
            let value = value.trim();
            if !value.is_empty() {
                *target = value.to_string();
            }
        }

        overwrite(&mut self.title, &metadata.title);
        overwrite(&mut self.genre, &metadata.genre);
        overwrite(&mut self.setting, &metadata.setting);
        overwrite(&mut self.logline, &metadata.logline);
    }

    /// Apply an actor patch. Unknown ids are ignored and reported as `false`.
    pub fn apply_actor_update(&mut self, update: &ActorUpdate) -> bool {
        match self.actors.iter_mut().find(|actor| actor.id == update.id) {
            Some(actor) => {
                actor.apply(update);
                true
            }
            None => false,
        }
    }

    /// Append lines, all or nothing.
    ///
    /// The batch must reference roster actors, continue the id sequence and
    /// keep beats non-decreasing; otherwise nothing is appended.
    pub fn append_lines(&mut self, lines: Vec<Line>) -> Result<(), DomainError> {
        let mut previous_id = self.lines.last().map(Line::id);
        let mut previous_beat = self.lines.last().map(Line::beat_index);

        for line in &lines {
            self.check_line(line, previous_id, previous_beat)?;
            previous_id = Some(line.id());
            previous_beat = Some(line.beat_index());
        }

        self.lines.extend(lines);
        Ok(())
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Check all scene invariants. Used on states received from clients.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for actor in &self.actors {
            if !seen.insert(&actor.id) {
                return Err(DomainError::DuplicateActor(actor.id.clone()));
            }
        }

        let mut previous_id = None;
        let mut previous_beat = None;
        for line in &self.lines {
            self.check_line(line, previous_id, previous_beat)?;
            previous_id = Some(line.id());
            previous_beat = Some(line.beat_index());
        }
        Ok(())
    }

    fn check_line(
        &self,
        line: &Line,
        previous_id: Option<LineId>,
        previous_beat: Option<u32>,
    ) -> Result<(), DomainError> {
        if !self.has_actor(line.actor_id()) {
            return Err(DomainError::UnknownActor {
                line_id: line.id(),
                actor_id: line.actor_id().clone(),
            });
        }
        if previous_id.is_some_and(|previous| line.id() <= previous) {
            return Err(DomainError::LineOrder { line_id: line.id() });
        }
        if let Some(previous) = previous_beat {
            if line.beat_index() < previous {
                return Err(DomainError::BeatRegression {
                    line_id: line.id(),
                    beat_index: line.beat_index(),
                    previous,
                });
            }
        }
        Ok(())
    }
}
