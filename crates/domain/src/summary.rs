//! Rolling scene summarizer.
//!
//! A keyword heuristic that compresses the most recent dialogue into a few
//! sentences. It is lossy on purpose and fully deterministic: the same
//! previous summary, lines and roster always produce the same text.

use crate::entities::{Actor, Line};
use crate::ids::ActorId;

/// Number of trailing lines the summarizer looks at.
pub const SUMMARY_WINDOW: usize = 10;
/// Hard cap on the summary length, in characters.
pub const MAX_SUMMARY_CHARS: usize = 800;
/// Summary of a scene with no dialogue yet.
pub const BEGINNING_PHRASE: &str = "The scene is just beginning.";

const MAX_SPEAKERS: usize = 3;
const MAX_KEY_PHRASES: usize = 2;
const KEY_PHRASE_CHARS: usize = 80;
const KEY_PHRASES_CHARS: usize = 120;
const LONG_LINE_CHARS: usize = 50;
const CONTINUITY_CHARS: usize = 100;
const MAX_SENTENCES: usize = 5;
const PREFIX_THRESHOLD_CHARS: usize = 50;

const ANGER_WORDS: &[&str] = &[
    "angry", "anger", "furious", "rage", "hate", "mad", "betrayed", "betray", "shout", "yell",
];
const JOY_WORDS: &[&str] = &[
    "happy", "joy", "laugh", "love", "delighted", "wonderful", "glad", "celebrate",
];
const SORROW_WORDS: &[&str] = &[
    "sad", "cry", "crying", "tears", "grief", "mourn", "sorrow", "alone", "miss",
];
const QUESTION_WORDS: &[&str] = &["why", "how", "what", "who", "where", "when", "wonder"];
const INTENT_KEYWORDS: &[&str] = &[
    "decide", "decided", "must", "will", "plan", "promise", "choose", "going to", "have to",
];

/// Aggregate emotional colour of the recent dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Tense,
    Positive,
    Somber,
    Inquisitive,
    Neutral,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Tense => "tense",
            Tone::Positive => "positive",
            Tone::Somber => "somber",
            Tone::Inquisitive => "inquisitive",
            Tone::Neutral => "neutral",
        }
    }
}

/// Produce the next rolling summary.
pub fn summarize(previous: &str, lines: &[Line], actors: &[Actor]) -> String {
    let previous = previous.trim();

    if lines.is_empty() {
        return if previous.is_empty() {
            BEGINNING_PHRASE.to_string()
        } else {
            truncate_chars(previous, MAX_SUMMARY_CHARS)
        };
    }

    let start = lines.len().saturating_sub(SUMMARY_WINDOW);
    let recent = &lines[start..];

    let mut sentences = Vec::with_capacity(MAX_SENTENCES);
    sentences.extend(speaker_sentence(recent, actors));

    let tone = classify_tone(recent);
    if tone != Tone::Neutral {
        sentences.push(format!("The mood is {}.", tone.as_str()));
    }

    sentences.extend(key_phrase_sentence(recent));

    let beats = distinct_beats(recent);
    if beats > 1 {
        sentences.push(format!("The scene has moved through {} beats.", beats));
    }

    if !previous.is_empty() {
        let first = truncate_chars(first_sentence(previous), CONTINUITY_CHARS);
        sentences.push(format!("Previously: {}.", first));
    }

    sentences.truncate(MAX_SENTENCES);
    let fresh = sentences.join(" ");

    let combined = if !previous.is_empty() && fresh.chars().count() > PREFIX_THRESHOLD_CHARS {
        format!("{} {}", previous, fresh)
    } else {
        fresh
    };

    truncate_chars(&combined, MAX_SUMMARY_CHARS)
}

/// Tone of a window of lines; the first matching keyword class wins in the
/// order tense, positive, somber, inquisitive.
pub fn classify_tone(lines: &[Line]) -> Tone {
    let words: Vec<String> = lines.iter().flat_map(|line| words(line.text())).collect();
    let has_any = |set: &[&str]| set.iter().any(|kw| words.iter().any(|w| w == kw));

    if has_any(ANGER_WORDS) {
        Tone::Tense
    } else if has_any(JOY_WORDS) {
        Tone::Positive
    } else if has_any(SORROW_WORDS) {
        Tone::Somber
    } else if has_any(QUESTION_WORDS) {
        Tone::Inquisitive
    } else {
        Tone::Neutral
    }
}

fn speaker_sentence(recent: &[Line], actors: &[Actor]) -> Option<String> {
    // (actor, count) in order of first appearance; the stable sort keeps that
    // order for ties.
    let mut counts: Vec<(&ActorId, usize)> = Vec::new();
    for line in recent {
        match counts.iter_mut().find(|(id, _)| *id == line.actor_id()) {
            Some((_, count)) => *count += 1,
            None => counts.push((line.actor_id(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let names: Vec<&str> = counts
        .iter()
        .take(MAX_SPEAKERS)
        .map(|(id, _)| {
            actors
                .iter()
                .find(|actor| &actor.id == *id)
                .map(|actor| actor.name.as_str())
                .unwrap_or_else(|| id.as_str())
        })
        .collect();

    match names.as_slice() {
        [] => None,
        [one] => Some(format!("{} has been speaking.", one)),
        [a, b] => Some(format!("{} and {} have been in dialogue.", a, b)),
        [a, b, c, ..] => Some(format!("{}, {}, and {} have been conversing.", a, b, c)),
    }
}

fn key_phrase_sentence(recent: &[Line]) -> Option<String> {
    let phrases: Vec<String> = recent
        .iter()
        .map(Line::text)
        .filter(|text| is_key_phrase(text))
        .take(MAX_KEY_PHRASES)
        .map(|text| truncate_chars(text.trim(), KEY_PHRASE_CHARS))
        .collect();

    if phrases.is_empty() {
        return None;
    }

    let joined = truncate_chars(&phrases.join(" / "), KEY_PHRASES_CHARS);
    let joined = joined.trim_end();
    if joined.ends_with(['.', '!', '?']) {
        Some(format!("Key moments: {}", joined))
    } else {
        Some(format!("Key moments: {}.", joined))
    }
}

fn is_key_phrase(text: &str) -> bool {
    if text.contains('?') || text.chars().count() > LONG_LINE_CHARS {
        return true;
    }

    let lower = text.to_lowercase();
    let words = words(text);
    INTENT_KEYWORDS.iter().any(|kw| {
        if kw.contains(' ') {
            lower.contains(kw)
        } else {
            words.iter().any(|w| w == kw)
        }
    })
}

fn distinct_beats(recent: &[Line]) -> usize {
    let mut beats: Vec<u32> = recent.iter().map(Line::beat_index).collect();
    beats.sort_unstable();
    beats.dedup();
    beats.len()
}

fn first_sentence(text: &str) -> &str {
    match text.find(['.', '!', '?']) {
        Some(end) => text[..end].trim(),
        None => text.trim(),
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
