//! Local dialogue used when the generator is unavailable.
//!
//! Deterministic for a given scene and command, and never fails.

use improvstudio_domain::{Actor, BeatDelta, LineDirective, SceneState};

/// Placeholder turn: an optional genre override plus lines to speak.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackTurn {
    pub genre: Option<&'static str>,
    pub lines: Vec<LineDirective>,
}

const GENRE_KEYWORDS: &[(&str, &str)] = &[
    ("horror", "Horror"),
    ("scary", "Horror"),
    ("comedy", "Comedy"),
    ("funny", "Comedy"),
    ("romance", "Romance"),
    ("romantic", "Romance"),
    ("mystery", "Mystery"),
    ("western", "Western"),
    ("sci-fi", "Sci-Fi"),
    ("scifi", "Sci-Fi"),
    ("science fiction", "Sci-Fi"),
    ("noir", "Noir"),
];

const ANGER_KEYWORDS: &[&str] = &["angry", "anger", "furious", "rage", "mad", "yell", "shout"];

const ANGRY_PAIR: [&str; 2] = [
    "How dare you! After everything, this is what you do?",
    "Don't raise your voice at me. You brought this on yourself.",
];

const GENERIC_LINES: [&str; 4] = [
    "Well. I suppose this is where it begins.",
    "Then let's not waste the moment.",
    "Wait. Did you hear something just now?",
    "Whatever comes next, we face it together.",
];

const HORROR_LINES: [&str; 4] = [
    "Did you hear that? Something is moving behind the walls.",
    "Stay close. The lights weren't flickering a minute ago.",
    "The door we came through... it's gone.",
    "Whatever it is, it knows our names.",
];

const COMEDY_LINES: [&str; 4] = [
    "For the record, this was not my idea.",
    "Noted. I'll file it next to the last seventeen.",
    "Is that a duck wearing a tiny hat?",
    "Nobody panic. Especially not the duck.",
];

const ROMANCE_LINES: [&str; 4] = [
    "I kept telling myself I wouldn't come tonight.",
    "And yet here you are.",
    "Here I am. Say something before I lose my nerve.",
    "I've been trying to say it for a year.",
];

const MYSTERY_LINES: [&str; 4] = [
    "The clock stopped at exactly eleven. That's no accident.",
    "Then someone wanted us to notice.",
    "Look at the ashes. Someone burned a letter here.",
    "Which means whoever did this is still in the house.",
];

/// Build a fallback turn for `command` against `scene`.
pub fn fallback_turn(scene: &SceneState, command: &str) -> FallbackTurn {
    let lowered = command.to_lowercase();
    let genre = genre_override(&lowered);

    let actors = scene.actors();
    if actors.is_empty() {
        return FallbackTurn {
            genre,
            lines: Vec::new(),
        };
    }

    let texts: Vec<&'static str> = if mentions_any(&lowered, ANGER_KEYWORDS) {
        ANGRY_PAIR.to_vec()
    } else {
        let templates = templates_for(genre.unwrap_or(scene.genre.as_str()));
        let count = 2 + command.chars().count() % 3;
        templates.iter().copied().take(count).collect()
    };

    let lead = lead_index(scene, actors, &lowered);
    let first_delta = if scene.lines().is_empty() {
        BeatDelta::Continue
    } else {
        BeatDelta::Advance
    };

    let lines = texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let actor = &actors[(lead + i) % actors.len()];
            let delta = if i == 0 { first_delta } else { BeatDelta::Continue };
            LineDirective::new(actor.id.clone(), text, delta)
        })
        .collect();

    FallbackTurn { genre, lines }
}

fn genre_override(lowered: &str) -> Option<&'static str> {
    GENRE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, genre)| *genre)
}

fn mentions_any(lowered: &str, keywords: &[&str]) -> bool {
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| keywords.contains(&word))
}

fn templates_for(genre: &str) -> &'static [&'static str; 4] {
    match genre.to_lowercase().as_str() {
        "horror" => &HORROR_LINES,
        "comedy" => &COMEDY_LINES,
        "romance" => &ROMANCE_LINES,
        "mystery" | "noir" => &MYSTERY_LINES,
        _ => &GENERIC_LINES,
    }
}

/// A named actor leads; otherwise the actor after the last speaker.
fn lead_index(scene: &SceneState, actors: &[Actor], lowered: &str) -> usize {
    let named = actors.iter().position(|actor| {
        let name = actor.name.to_lowercase();
        let id = actor.id.as_str().to_lowercase();
        lowered
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| !word.is_empty() && (word == name || word == id))
    });
    if let Some(index) = named {
        return index;
    }

    scene
        .lines()
        .last()
        .and_then(|line| actors.iter().position(|actor| &actor.id == line.actor_id()))
        .map(|last| (last + 1) % actors.len())
        .unwrap_or(0)
}
