//! Story content configuration
//!
//! Every piece of text and every item list the stages gate on lives here.
//! Item counts are always derived from list lengths.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration load/validation failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed story config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{section} needs at least one item")]
    Empty { section: &'static str },
    #[error("{section} has duplicate item id {id}")]
    DuplicateId { section: &'static str, id: u32 },
}

/// Which gated component the MEMORY stage mounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemoryStageKind {
    /// Blurred photo cards revealed one by one
    #[default]
    Gallery,
    /// Sealed envelopes opened one by one
    Notes,
}

impl MemoryStageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryStageKind::Gallery => "gallery",
            MemoryStageKind::Notes => "notes",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gallery" | "memories" => Some(MemoryStageKind::Gallery),
            "notes" | "envelopes" => Some(MemoryStageKind::Notes),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryContent {
    pub heading: String,
    pub subtitle: String,
    pub button_text: String,
}

impl Default for EntryContent {
    fn default() -> Self {
        Self {
            heading: "I made something for you.".into(),
            subtitle: "Something small, but from the heart.".into(),
            button_text: "Open it".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartContent {
    pub instruction: String,
    pub unlock_message: String,
    /// Shown one per tap, in order
    pub affirmations: Vec<String>,
}

impl Default for HeartContent {
    fn default() -> Self {
        Self {
            instruction: "Tap the heart".into(),
            unlock_message: "Something unlocked...".into(),
            affirmations: vec![
                "You are my peace.".into(),
                "You are my favorite place.".into(),
                "You make ordinary days magical.".into(),
                "With you, I feel home.".into(),
                "You are my always.".into(),
            ],
        }
    }
}

/// A sealed envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u32,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesContent {
    pub heading: String,
    pub subtitle: String,
    pub completion_message: String,
    pub notes: Vec<Note>,
}

impl Default for NotesContent {
    fn default() -> Self {
        let messages = [
            "You make my ordinary days feel extraordinary.",
            "My favorite place in the world is next to you.",
            "I fall for you a little more every single day.",
            "You're the reason I believe in forever.",
            "No one else could ever make me feel this way.",
            "You are my today and all of my tomorrows.",
        ];
        Self {
            heading: "Little notes for you".into(),
            subtitle: "Tap each envelope to open".into(),
            completion_message: "Every word, straight from my heart...".into(),
            notes: messages
                .iter()
                .zip(1..)
                .map(|(message, id)| Note {
                    id,
                    message: (*message).into(),
                })
                .collect(),
        }
    }
}

/// A photo card with its caption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: u32,
    pub caption: String,
    /// Image URL; a missing or broken image falls back to a placeholder
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryContent {
    pub heading: String,
    pub subtitle: String,
    pub completion_message: String,
    pub memories: Vec<Memory>,
}

impl Default for GalleryContent {
    fn default() -> Self {
        let captions = [
            "The day everything changed.",
            "Your laugh, my favorite sound.",
            "Lost together, happily.",
            "Still my favorite view.",
        ];
        Self {
            heading: "Our moments".into(),
            subtitle: "Tap to bring each memory into focus".into(),
            completion_message: "Every picture, a piece of us...".into(),
            memories: captions
                .iter()
                .zip(1..)
                .map(|(caption, id)| Memory {
                    id,
                    caption: (*caption).into(),
                    image: format!("/memories/{id}.jpg"),
                })
                .collect(),
        }
    }
}

/// One chapter of the relationship timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: u32,
    pub title: String,
    pub text: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineContent {
    pub heading: String,
    pub subtitle: String,
    pub swipe_hint: String,
    pub completion_message: String,
    pub events: Vec<TimelineEvent>,
}

impl Default for TimelineContent {
    fn default() -> Self {
        let events = [
            ("The Beginning", "When our story started to unfold...", "Day One"),
            ("First Butterflies", "That moment I knew you were special.", "Soon After"),
            ("Growing Closer", "Every conversation made me fall harder.", "With Time"),
            ("The Realization", "I couldn't imagine life without you.", "One Day"),
            ("Now", "And here we are, still choosing each other.", "Today"),
        ];
        Self {
            heading: "Our story".into(),
            subtitle: "Swipe through our journey".into(),
            swipe_hint: "Swipe or tap".into(),
            completion_message: "And the best chapters are yet to come...".into(),
            events: events
                .iter()
                .zip(1..)
                .map(|((title, text, date), id)| TimelineEvent {
                    id,
                    title: (*title).into(),
                    text: (*text).into(),
                    date: (*date).into(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealContent {
    /// Shown one at a time before the question
    pub reveal_lines: Vec<String>,
    pub question: String,
    pub yes_message: String,
    /// Shown briefly whenever "No" slips away
    pub no_hover_message: String,
    pub yes_button_text: String,
    pub no_button_text: String,
}

impl Default for RevealContent {
    fn default() -> Self {
        Self {
            reveal_lines: vec![
                "I don't just love you.".into(),
                "I choose you.".into(),
                "Every day.".into(),
                "Again.".into(),
            ],
            question: "Will you be my Valentine?".into(),
            yes_message: "You are my favorite chapter.".into(),
            no_hover_message: "Try again...".into(),
            yes_button_text: "Yes".into(),
            no_button_text: "No".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CelebrationContent {
    pub thank_you_message: String,
    pub description: String,
    pub closing: String,
}

impl Default for CelebrationContent {
    fn default() -> Self {
        Self {
            thank_you_message: "Thank you for being mine.".into(),
            description: "Here's to us, to every moment past and every moment yet to come."
                .into(),
            closing: "Forever yours".into(),
        }
    }
}

/// Complete story content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    /// RNG seed; the host picks one when absent
    pub seed: Option<u64>,
    pub memory_stage: MemoryStageKind,
    pub entry: EntryContent,
    pub heart_affirmation: HeartContent,
    pub love_notes: NotesContent,
    pub memory_gallery: GalleryContent,
    pub love_timeline: TimelineContent,
    pub final_reveal: RevealContent,
    pub celebration: CelebrationContent,
}

impl StoryConfig {
    /// DOM element holding an inline JSON config
    pub const ELEMENT_ID: &'static str = "story-config";

    /// Parse and validate a JSON document; absent sections keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every gated list the story will mount
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heart_affirmation.affirmations.is_empty() {
            return Err(ConfigError::Empty {
                section: "heart_affirmation",
            });
        }
        match self.memory_stage {
            MemoryStageKind::Gallery => check_ids(
                "memory_gallery",
                self.memory_gallery.memories.iter().map(|m| m.id),
            )?,
            MemoryStageKind::Notes => {
                check_ids("love_notes", self.love_notes.notes.iter().map(|n| n.id))?
            }
        }
        check_ids(
            "love_timeline",
            self.love_timeline.events.iter().map(|e| e.id),
        )
    }

    /// Load the inline page config, falling back to the stock story
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::ELEMENT_ID))
            .and_then(|el| el.text_content());

        match text {
            Some(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded story config from page");
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring story config: {e}");
                    Self::default()
                }
            },
            None => {
                log::info!("Using default story config");
                Self::default()
            }
        }
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

fn check_ids(section: &'static str, ids: impl Iterator<Item = u32>) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ConfigError::DuplicateId { section, id });
        }
    }
    if seen.is_empty() {
        return Err(ConfigError::Empty { section });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_counts() {
        let config = StoryConfig::default();
        assert_eq!(config.heart_affirmation.affirmations.len(), 5);
        assert_eq!(config.love_notes.notes.len(), 6);
        assert_eq!(config.memory_gallery.memories.len(), 4);
        assert_eq!(config.love_timeline.events.len(), 5);
        assert_eq!(config.final_reveal.reveal_lines.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "heart_affirmation": { "affirmations": ["one", "two"] } }"#;
        let config = StoryConfig::from_json(json).unwrap();
        assert_eq!(config.heart_affirmation.affirmations, vec!["one", "two"]);
        assert_eq!(config.heart_affirmation.instruction, "Tap the heart");
        assert_eq!(config.love_timeline.events.len(), 5);
    }

    #[test]
    fn test_empty_affirmations_rejected() {
        let json = r#"{ "heart_affirmation": { "affirmations": [] } }"#;
        assert!(matches!(
            StoryConfig::from_json(json),
            Err(ConfigError::Empty {
                section: "heart_affirmation"
            })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{
            "memory_stage": "notes",
            "love_notes": { "notes": [
                { "id": 4, "message": "a" },
                { "id": 4, "message": "b" }
            ] }
        }"#;
        assert!(matches!(
            StoryConfig::from_json(json),
            Err(ConfigError::DuplicateId {
                section: "love_notes",
                id: 4
            })
        ));
    }

    #[test]
    fn test_unselected_memory_list_may_be_empty() {
        let json = r#"{ "memory_stage": "notes", "memory_gallery": { "memories": [] } }"#;
        assert!(StoryConfig::from_json(json).is_ok());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            StoryConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_memory_stage_from_str() {
        assert_eq!(MemoryStageKind::from_str("Notes"), Some(MemoryStageKind::Notes));
        assert_eq!(MemoryStageKind::from_str("gallery"), Some(MemoryStageKind::Gallery));
        assert_eq!(MemoryStageKind::from_str("video"), None);
        assert_eq!(MemoryStageKind::Notes.as_str(), "notes");
    }
}
