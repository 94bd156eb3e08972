//! Terminal front end: parses typed lines and renders studio events.

use improvstudio_domain::{Line, SceneState};

use crate::playback::LineResult;
use crate::studio::{StudioEvent, StudioInput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Send(StudioInput),
    Quit,
    /// Unrecognized control, reported back to the user
    Unknown(String),
}

/// Map one typed line to an action. Blank lines map to nothing.
pub fn parse_line(line: &str) -> Option<CliAction> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(control) = line.strip_prefix('/') else {
        return Some(CliAction::Send(StudioInput::Command(line.to_string())));
    };

    let mut words = control.split_whitespace();
    let action = match (words.next(), words.next()) {
        (Some("stop"), None) => CliAction::Send(StudioInput::Stop),
        (Some("quit" | "exit"), None) => CliAction::Quit,
        (Some("auto"), Some("on")) => CliAction::Send(StudioInput::SetAutoContinue(true)),
        (Some("auto"), Some("off")) => CliAction::Send(StudioInput::SetAutoContinue(false)),
        _ => CliAction::Unknown(line.to_string()),
    };
    Some(action)
}

/// `Name: text`, with silent lines marked.
pub fn render_line(scene: &SceneState, line: &Line) -> String {
    let speaker = scene
        .actor(line.actor_id())
        .map(|actor| actor.name.as_str())
        .unwrap_or_else(|| line.actor_id().as_str());
    let marker = if line.has_audio() { "" } else { " [silent]" };
    format!("{speaker}: {}{marker}", line.text())
}

/// Terminal output for an event; `None` for events that print nothing.
pub fn render_event(event: &StudioEvent) -> Option<String> {
    match event {
        StudioEvent::TurnStarted { command } => Some(format!("> {command} ...")),
        StudioEvent::TurnCompleted { scene, new_lines } => {
            let mut out = format!("[{} | {}]", scene.title, scene.genre);
            for line in new_lines {
                out.push('\n');
                out.push_str(&render_line(scene, line));
            }
            if new_lines.is_empty() {
                out.push_str("\n(nobody spoke)");
            }
            Some(out)
        }
        StudioEvent::TurnFailed { message } => Some(format!("! {message}")),
        StudioEvent::PlaybackFinished { report } => {
            let troubled = report
                .visits
                .iter()
                .filter(|visit| matches!(visit.result, LineResult::TimedOut | LineResult::Failed(_)))
                .count();
            if report.aborted {
                Some("(playback stopped)".to_string())
            } else if troubled > 0 {
                Some(format!("({troubled} line(s) could not be played)"))
            } else {
                None
            }
        }
        StudioEvent::AutoContinueScheduled { after } => {
            Some(format!("(continuing in {:.1}s)", after.as_secs_f32()))
        }
        StudioEvent::AutoContinueCancelled => Some("(auto-continue cancelled)".to_string()),
        StudioEvent::Stopped => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use improvstudio_domain::{default_scene, ActorId, LineId, SceneId};

    use crate::playback::{LineVisit, PlaybackMode, PlaybackReport};

    #[test]
    fn plain_text_is_a_command() {
        assert_eq!(
            parse_line("  make it horror "),
            Some(CliAction::Send(StudioInput::Command("make it horror".into())))
        );
        assert_eq!(parse_line("   "), None);
    }

    #[test]
    fn controls() {
        assert_eq!(parse_line("/stop"), Some(CliAction::Send(StudioInput::Stop)));
        assert_eq!(
            parse_line("/auto on"),
            Some(CliAction::Send(StudioInput::SetAutoContinue(true)))
        );
        assert_eq!(
            parse_line("/auto off"),
            Some(CliAction::Send(StudioInput::SetAutoContinue(false)))
        );
        assert_eq!(parse_line("/quit"), Some(CliAction::Quit));
        assert_eq!(
            parse_line("/auto maybe"),
            Some(CliAction::Unknown("/auto maybe".into()))
        );
    }

    #[test]
    fn lines_show_speaker_name_and_silence() {
        let scene = default_scene(SceneId::new(), Utc::now());
        let mut voiced = Line::new(LineId::FIRST, ActorId::new("maya"), "Hello?", Utc::now(), 0);
        voiced.attach_audio("data:audio/mpeg;base64,AAAA");
        let silent = Line::new(
            LineId::from_raw(2),
            ActorId::new("viktor"),
            "Nobody here.",
            Utc::now(),
            0,
        );

        assert_eq!(render_line(&scene, &voiced), "Maya: Hello?");
        assert_eq!(render_line(&scene, &silent), "Viktor: Nobody here. [silent]");
    }

    #[test]
    fn clean_playback_prints_nothing() {
        let report = PlaybackReport {
            visits: vec![LineVisit {
                line_id: LineId::FIRST,
                mode: PlaybackMode::Degraded,
                result: LineResult::Completed,
            }],
            aborted: false,
        };
        assert_eq!(render_event(&StudioEvent::PlaybackFinished { report }), None);

        let aborted = PlaybackReport {
            visits: vec![],
            aborted: true,
        };
        assert_eq!(
            render_event(&StudioEvent::PlaybackFinished { report: aborted }).as_deref(),
            Some("(playback stopped)")
        );
    }
}
