//! Dialogue generator boundary.
//!
//! Calls the LLM, extracts the JSON object from its reply and validates it
//! into typed directives. Raw response shapes never leave this module.

use std::sync::Arc;

use improvstudio_domain::{
    ActorId, ActorUpdate, BeatDelta, Language, LineDirective, SceneMetadata, SceneState,
};
use serde::Deserialize;

use crate::infrastructure::ports::{ChatMessage, FinishReason, LlmError, LlmPort, LlmRequest};

use super::prompt::{build_system_prompt, build_user_prompt};

/// Upper bound on lines a single generator reply may carry.
pub const MAX_LINES_PER_TURN: usize = 8;

/// Validated generator output.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedTurn {
    pub metadata: SceneMetadata,
    pub actor_updates: Vec<ActorUpdate>,
    /// In creation order. May be empty; the orchestrator decides what that means.
    pub lines: Vec<LineDirective>,
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Dialogue generator not configured: {0}")]
    NotConfigured(String),
    #[error("Dialogue generator request failed: {0}")]
    Request(LlmError),
    #[error("Malformed generator response: {0}")]
    Malformed(String),
    /// The reply hit the token limit before the JSON was complete.
    #[error("Generator response was cut off: {0}")]
    Truncated(String),
    #[error("Generator response failed validation: {0}")]
    Shape(String),
}

impl From<LlmError> for GeneratorError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::NotConfigured(msg) => GeneratorError::NotConfigured(msg),
            other => GeneratorError::Request(other),
        }
    }
}

/// LLM-backed dialogue generator. One attempt per call, no retries.
pub struct DialogueGenerator {
    llm: Arc<dyn LlmPort>,
}

impl DialogueGenerator {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }

    pub async fn generate(
        &self,
        scene: &SceneState,
        command: &str,
    ) -> Result<GeneratedTurn, GeneratorError> {
        let request = LlmRequest::new(vec![ChatMessage::user(build_user_prompt(scene, command))])
            .with_system_prompt(build_system_prompt())
            .with_temperature(0.9)
            .with_max_tokens(Some(1200))
            .with_json_output();

        let response = self.llm.generate(request).await?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Generator usage"
            );
        }

        match (parse_generated_turn(&response.content), response.finish_reason) {
            (Err(GeneratorError::Malformed(e)), FinishReason::Length) => {
                Err(GeneratorError::Truncated(e))
            }
            (result, FinishReason::Length) => {
                tracing::warn!("Generator reply reached the token limit");
                result
            }
            (result, _) => result,
        }
    }
}

/// Parse and validate a raw generator reply.
pub fn parse_generated_turn(content: &str) -> Result<GeneratedTurn, GeneratorError> {
    let json = extract_json(content);
    let raw: RawTurn =
        serde_json::from_str(json).map_err(|e| GeneratorError::Malformed(e.to_string()))?;

    if raw.new_lines.len() > MAX_LINES_PER_TURN {
        return Err(GeneratorError::Shape(format!(
            "{} lines exceeds the limit of {}",
            raw.new_lines.len(),
            MAX_LINES_PER_TURN
        )));
    }

    let lines = raw
        .new_lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| line.into_directive(index))
        .collect::<Result<Vec<_>, _>>()?;

    let actor_updates = raw
        .updated_actors
        .into_iter()
        .filter_map(RawActorUpdate::into_update)
        .collect();

    let metadata = raw.scene_metadata.unwrap_or_default();

    Ok(GeneratedTurn {
        metadata: SceneMetadata {
            title: metadata.title,
            genre: metadata.genre,
            setting: metadata.setting,
            logline: metadata.logline,
        },
        actor_updates,
        lines,
    })
}

/// Extract a JSON object from a reply that may wrap it in fences or prose.
fn extract_json(response: &str) -> &str {
    // Markdown code block tagged as JSON
    if let Some(start) = response.find("```json") {
        if let Some(end) = response[start + 7..].find("```") {
            return response[start + 7..start + 7 + end].trim();
        }
    }

    // Plain code block, optionally with another language tag
    if let Some(start) = response.find("```") {
        if let Some(end) = response[start + 3..].find("```") {
            let content = response[start + 3..start + 3 + end].trim();
            if let Some(newline_pos) = content.find('\n') {
                if !content[..newline_pos].trim_start().starts_with('{') {
                    return content[newline_pos + 1..].trim();
                }
            }
            return content;
        }
    }

    // Raw object surrounded by prose
    if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
        if start < end {
            return &response[start..=end];
        }
    }

    response.trim()
}

/// Language codes outside the supported set are dropped.
fn parse_language(code: Option<&str>, context: &str) -> Option<Language> {
    let code = code.map(str::trim).filter(|code| !code.is_empty())?;
    match code.parse() {
        Ok(language) => Some(language),
        Err(_) => {
            tracing::warn!(code = %code, context = %context, "Dropping unsupported language code");
            None
        }
    }
}

// =============================================================================
// Raw response shapes
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTurn {
    #[serde(default)]
    scene_metadata: Option<RawMetadata>,
    #[serde(default)]
    updated_actors: Vec<RawActorUpdate>,
    new_lines: Vec<RawLine>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    title: String,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    setting: String,
    #[serde(default)]
    logline: String,
}

#[derive(Debug, Deserialize)]
struct RawActorUpdate {
    id: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    style: Option<String>,
}

impl RawActorUpdate {
    fn into_update(self) -> Option<ActorUpdate> {
        let id = self.id.trim();
        if id.is_empty() {
            return None;
        }
        Some(ActorUpdate {
            language: parse_language(self.language.as_deref(), id),
            id: ActorId::new(id),
            style: self.style,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLine {
    actor_id: String,
    #[serde(default)]
    language: Option<String>,
    text: String,
    beat_delta: i64,
}

impl RawLine {
    fn into_directive(self, index: usize) -> Result<LineDirective, GeneratorError> {
        let actor_id = self.actor_id.trim();
        if actor_id.is_empty() {
            return Err(GeneratorError::Shape(format!("newLines[{}]: empty actorId", index)));
        }

        let text = self.text.trim();
        if text.is_empty() {
            return Err(GeneratorError::Shape(format!("newLines[{}]: empty text", index)));
        }

        let beat_delta = BeatDelta::try_from(self.beat_delta)
            .map_err(|e| GeneratorError::Shape(format!("newLines[{}]: {}", index, e)))?;

        let mut directive = LineDirective::new(ActorId::new(actor_id), text, beat_delta);
        directive.language = parse_language(self.language.as_deref(), actor_id);
        Ok(directive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use improvstudio_domain::{default_scene, SceneId};

    use crate::infrastructure::ports::{LlmResponse, MockLlmPort, TokenUsage};

    const VALID: &str = r#"{
        "sceneMetadata": {"title": "Night Shift", "genre": "Horror", "setting": "", "logline": ""},
        "updatedActors": [{"id": "viktor", "language": "de", "style": "cold"}],
        "newLines": [
            {"actorId": "maya", "text": "Did you hear that?", "beatDelta": 1},
            {"actorId": "viktor", "language": "de", "text": "Nichts.", "beatDelta": 0}
        ]
    }"#;

    #[test]
    fn parses_valid_response_into_directives() {
        let turn = parse_generated_turn(VALID).unwrap();

        assert_eq!(turn.metadata.genre, "Horror");
        assert_eq!(turn.metadata.setting, "");
        assert_eq!(turn.actor_updates.len(), 1);
        assert_eq!(turn.actor_updates[0].language, Some(Language::De));
        assert_eq!(turn.lines.len(), 2);
        assert_eq!(turn.lines[0].beat_delta, BeatDelta::Advance);
        assert_eq!(turn.lines[0].language, None);
        assert_eq!(turn.lines[1].language, Some(Language::De));
    }

    #[test]
    fn extracts_json_from_fences_and_prose() {
        let fenced = format!("Here you go:\n```json\n{}\n```", VALID);
        assert!(parse_generated_turn(&fenced).is_ok());

        let plain = format!("```\n{}\n```", VALID);
        assert!(parse_generated_turn(&plain).is_ok());

        let prose = format!("Sure! {} Hope that helps.", VALID);
        assert!(parse_generated_turn(&prose).is_ok());
    }

    #[test]
    fn rejects_out_of_range_beat_delta() {
        let reply = r#"{"newLines": [{"actorId": "maya", "text": "Hi", "beatDelta": 2}]}"#;
        assert!(matches!(
            parse_generated_turn(reply),
            Err(GeneratorError::Shape(_))
        ));
    }

    #[test]
    fn rejects_missing_fields_and_blank_text() {
        let missing = r#"{"newLines": [{"actorId": "maya", "beatDelta": 0}]}"#;
        assert!(matches!(
            parse_generated_turn(missing),
            Err(GeneratorError::Malformed(_))
        ));

        let blank = r#"{"newLines": [{"actorId": "maya", "text": "  ", "beatDelta": 0}]}"#;
        assert!(matches!(
            parse_generated_turn(blank),
            Err(GeneratorError::Shape(_))
        ));

        assert!(matches!(
            parse_generated_turn("I cannot help with that."),
            Err(GeneratorError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_too_many_lines() {
        let lines = (0..=MAX_LINES_PER_TURN)
            .map(|_| r#"{"actorId": "maya", "text": "Again.", "beatDelta": 0}"#)
            .collect::<Vec<_>>()
            .join(",");
        let reply = format!(r#"{{"newLines": [{}]}}"#, lines);

        assert!(matches!(
            parse_generated_turn(&reply),
            Err(GeneratorError::Shape(_))
        ));
    }

    #[test]
    fn unsupported_language_is_dropped_not_fatal() {
        let reply = r#"{"newLines": [{"actorId": "maya", "language": "tlh", "text": "Qapla'", "beatDelta": 0}]}"#;
        let turn = parse_generated_turn(reply).unwrap();
        assert_eq!(turn.lines[0].language, None);
    }

    #[test]
    fn empty_line_list_is_returned_to_caller() {
        let turn = parse_generated_turn(r#"{"newLines": []}"#).unwrap();
        assert!(turn.lines.is_empty());
    }

    #[tokio::test]
    async fn not_configured_is_distinguished_from_transport_failure() {
        let scene = default_scene(SceneId::new(), Utc::now());

        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| Err(LlmError::NotConfigured("no key".into())));
        let generator = DialogueGenerator::new(Arc::new(llm));
        assert!(matches!(
            generator.generate(&scene, "go").await,
            Err(GeneratorError::NotConfigured(_))
        ));

        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| Err(LlmError::RequestFailed("timeout".into())));
        let generator = DialogueGenerator::new(Arc::new(llm));
        assert!(matches!(
            generator.generate(&scene, "go").await,
            Err(GeneratorError::Request(_))
        ));
    }

    #[tokio::test]
    async fn reply_cut_off_at_token_limit_is_truncated() {
        let scene = default_scene(SceneId::new(), Utc::now());

        let mut llm = MockLlmPort::new();
        llm.expect_generate().returning(|_| {
            Ok(LlmResponse {
                content: r#"{"newLines": [{"actorId": "maya", "text": "Did you"#.into(),
                finish_reason: FinishReason::Length,
                usage: Some(TokenUsage {
                    prompt_tokens: 900,
                    completion_tokens: 1200,
                    total_tokens: 2100,
                }),
            })
        });

        let generator = DialogueGenerator::new(Arc::new(llm));
        assert!(matches!(
            generator.generate(&scene, "go").await,
            Err(GeneratorError::Truncated(_))
        ));
    }

    #[tokio::test]
    async fn request_asks_for_json_with_prompt() {
        let scene = default_scene(SceneId::new(), Utc::now());

        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .withf(|request| {
                request.json_output
                    && request.system_prompt.is_some()
                    && request.messages[0].content.contains("Make it horror")
            })
            .times(1)
            .returning(|_| Ok(LlmResponse::text(VALID)));

        let generator = DialogueGenerator::new(Arc::new(llm));
        let turn = generator.generate(&scene, "Make it horror").await.unwrap();
        assert_eq!(turn.lines.len(), 2);
    }
}
