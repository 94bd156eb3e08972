//! Prompt construction for the dialogue generator.

use improvstudio_domain::{Language, Line, SceneState};

use super::dialogue::MAX_LINES_PER_TURN;

/// Lines of history shown to the model.
pub const PROMPT_HISTORY_LINES: usize = 10;

/// Build the system prompt describing the response contract.
pub fn build_system_prompt() -> String {
    let languages = Language::ALL
        .iter()
        .map(|lang| format!("{} ({})", lang.code(), lang.display_name()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are the director and cast of a live improv scene.
Follow the user's stage direction and write the next few lines of dialogue.

Respond with a single JSON object and nothing else:
{{
  "sceneMetadata": {{"title": "...", "genre": "...", "setting": "...", "logline": "..."}},
  "updatedActors": [{{"id": "<existing actor id>", "language": "<code>", "style": "..."}}],
  "newLines": [{{"actorId": "<existing actor id>", "language": "<code>", "text": "...", "beatDelta": 0}}]
}}

Rules:
- Write between 1 and {max_lines} newLines, in speaking order.
- actorId and updatedActors[].id must be ids from the cast list. Never invent actors.
- beatDelta is 1 when a line opens a new story beat, otherwise 0.
- language is one of: {languages}. Omit it to use the actor's current language.
- Leave sceneMetadata fields empty to keep their current value.
- updatedActors may be empty."#,
        max_lines = MAX_LINES_PER_TURN,
        languages = languages,
    )
}

/// Build the user prompt from the scene and the stage direction.
pub fn build_user_prompt(scene: &SceneState, command: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("=== SCENE ===\n");
    prompt.push_str(&format!("Title: {}\n", scene.title));
    prompt.push_str(&format!("Genre: {}\n", scene.genre));
    prompt.push_str(&format!("Setting: {}\n", scene.setting));
    prompt.push_str(&format!("Logline: {}\n", scene.logline));
    prompt.push_str(&format!("Current beat: {}\n", scene.current_beat()));
    if !scene.summary.trim().is_empty() {
        prompt.push_str(&format!("Summary so far: {}\n", scene.summary.trim()));
    }

    prompt.push_str("\n=== CAST ===\n");
    for actor in scene.actors() {
        prompt.push_str(&format!(
            "- id: {} | name: {} | role: {} | language: {} | style: {}\n",
            actor.id,
            actor.name,
            actor.role.as_str(),
            actor.language.code(),
            actor.style
        ));
    }

    let recent = scene.recent_lines(PROMPT_HISTORY_LINES);
    if !recent.is_empty() {
        prompt.push_str("\n=== RECENT DIALOGUE ===\n");
        prompt.push_str(&format_history(scene, recent));
    }

    prompt.push_str("\n=== DIRECTION ===\n");
    prompt.push_str(command.trim());
    prompt.push('\n');

    prompt
}

/// Recent lines grouped under a header per beat.
fn format_history(scene: &SceneState, lines: &[Line]) -> String {
    let mut history = String::new();
    let mut current_beat = None;

    for line in lines {
        if current_beat != Some(line.beat_index()) {
            current_beat = Some(line.beat_index());
            history.push_str(&format!("[Beat {}]\n", line.beat_index()));
        }
        let speaker = scene
            .actor(line.actor_id())
            .map(|actor| actor.name.as_str())
            .unwrap_or_else(|| line.actor_id().as_str());
        history.push_str(&format!("{}: {}\n", speaker, line.text()));
    }

    history
}
