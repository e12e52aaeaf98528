//! Story definition model.
//!
//! Two shapes live here. The `Raw*` types are what a content-authoring
//! routine produces: every structural field is optional so that a validator
//! can report all defects in one pass. The validated types (`StoryDefinition`
//! and friends) are what the rest of the engine reads; they are built once,
//! after validation, and never mutated.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{CharacterId, GameId, LessonId, StoryId};

/// A narrative scene. Opaque to the engine; only counted.
pub type Scene = serde_json::Value;

/// Declared difficulty of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// First contact with the language.
    Beginner,
    /// Comfortable with basic vocabulary.
    Intermediate,
    /// Conversational learners.
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Beginner => f.write_str("beginner"),
            Self::Intermediate => f.write_str("intermediate"),
            Self::Advanced => f.write_str("advanced"),
        }
    }
}

/// One vocabulary term taught by a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// The term in the target language.
    pub term: String,
    /// Its translation in the learner's language.
    pub translation: String,
    /// Grouping such as "food" or "greetings".
    #[serde(default)]
    pub category: Option<String>,
}

/// Reference from a lesson to a mini-game it embeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRef {
    /// The referenced game.
    pub id: GameId,
    /// Game type, when the lesson declares it.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Configuration of a mini-game offered by a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Game identifier.
    pub id: GameId,
    /// Game type, e.g. "matching" or "listening".
    #[serde(rename = "type")]
    pub kind: String,
    /// Display title.
    #[serde(default)]
    pub title: Option<String>,
    /// Game-specific settings, passed through untouched.
    #[serde(default)]
    pub config: serde_json::Value,
}

/// A character appearing in a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    /// Display name.
    pub name: String,
    /// Narrative role, e.g. "shopkeeper".
    #[serde(default)]
    pub role: Option<String>,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
    /// Audio key of the character's voice sample.
    #[serde(default)]
    pub voice: Option<String>,
}

/// Prerequisites gating a story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockRequirements {
    /// Stories that must be progressed before this one unlocks.
    #[serde(default)]
    pub prerequisite_story_ids: BTreeSet<StoryId>,
    /// Minimum completion percentage per prerequisite. Missing entries mean 0.
    #[serde(default)]
    pub minimum_progress: BTreeMap<StoryId, u32>,
}

impl UnlockRequirements {
    /// Returns the threshold for `prerequisite`, defaulting to 0.
    #[must_use]
    pub fn threshold_for(&self, prerequisite: &StoryId) -> u32 {
        self.minimum_progress.get(prerequisite).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Raw (unvalidated) shapes
// ---------------------------------------------------------------------------

/// Story definition as produced by content authoring, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStoryDefinition {
    /// Story id. Falls back to `metadata.id` when absent.
    pub id: Option<StoryId>,
    /// Descriptive metadata.
    pub metadata: Option<RawStoryMetadata>,
    /// Ordered lessons.
    pub lessons: Option<Vec<RawLesson>>,
    /// Character profiles keyed by character id.
    pub characters: Option<BTreeMap<CharacterId, CharacterProfile>>,
    /// Mini-games offered by the story.
    #[serde(default)]
    pub games: Vec<GameConfig>,
    /// Audio namespace.
    pub audio_config: Option<RawAudioConfig>,
    /// Prerequisite rules.
    pub unlock_requirements: Option<UnlockRequirements>,
    /// SHA-256 of the source document, stamped by ingestion.
    #[serde(skip)]
    pub version_hash: Option<String>,
}

/// Unvalidated story metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStoryMetadata {
    /// Story id.
    pub id: Option<StoryId>,
    /// Display name.
    pub name: Option<String>,
    /// Short description.
    pub description: Option<String>,
    /// Declared difficulty.
    pub difficulty: Option<Difficulty>,
    /// Position in the curriculum.
    pub order: Option<u32>,
    /// Estimated duration in minutes.
    pub estimated_duration: Option<u32>,
    /// Declared lesson total, used when this story is a prerequisite.
    pub total_lessons: Option<u32>,
}

/// Unvalidated lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLesson {
    /// Lesson id, unique within the story.
    pub id: Option<LessonId>,
    /// Display title.
    pub title: Option<String>,
    /// Vocabulary taught by the lesson.
    pub vocabulary: Option<RawVocabulary>,
    /// Embedded mini-games.
    #[serde(default)]
    pub games: Vec<GameRef>,
    /// Narrative scenes.
    pub story: Option<Vec<Scene>>,
    /// Estimated duration in minutes.
    pub estimated_duration: Option<u32>,
}

/// Vocabulary as found in a document: a proper list, a list with entries
/// that are not vocabulary entries, or anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawVocabulary {
    /// A list of vocabulary entries.
    List(Vec<VocabularyEntry>),
    /// A list where at least one entry is malformed; always rejected by
    /// validation, which reports each bad entry.
    Entries(Vec<serde_json::Value>),
    /// Any other value; always rejected by validation.
    Malformed(serde_json::Value),
}

/// Unvalidated audio configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAudioConfig {
    /// Root of the story's audio namespace.
    pub base_path: Option<String>,
    /// Audio key to file name.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Validated shapes
// ---------------------------------------------------------------------------

/// A validated, immutable story definition.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryDefinition {
    /// Story id.
    pub id: StoryId,
    /// Descriptive metadata.
    pub metadata: StoryMetadata,
    /// Ordered, non-empty lessons.
    pub lessons: Vec<Lesson>,
    /// Non-empty character profiles.
    pub characters: BTreeMap<CharacterId, CharacterProfile>,
    /// Mini-games offered by the story.
    pub games: Vec<GameConfig>,
    /// Audio namespace.
    pub audio_config: AudioConfig,
    /// Prerequisite rules, if any.
    pub unlock_requirements: Option<UnlockRequirements>,
    /// SHA-256 of the source document, when ingested from one.
    pub version_hash: Option<String>,
}

impl StoryDefinition {
    /// Returns the lesson total used when this story gates another one:
    /// the declared `total_lessons`, else the number of lessons.
    #[must_use]
    pub fn declared_lesson_total(&self) -> u32 {
        self.metadata
            .total_lessons
            .unwrap_or_else(|| u32::try_from(self.lessons.len()).unwrap_or(u32::MAX))
    }
}

/// Validated story metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryMetadata {
    /// Story id.
    pub id: StoryId,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Declared difficulty.
    pub difficulty: Option<Difficulty>,
    /// Position in the curriculum; 0 when undeclared.
    pub order: u32,
    /// Estimated duration in minutes.
    pub estimated_duration: Option<u32>,
    /// Declared lesson total.
    pub total_lessons: Option<u32>,
}

/// A validated lesson.
#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
    /// Lesson id.
    pub id: LessonId,
    /// Display title.
    pub title: String,
    /// Non-empty vocabulary.
    pub vocabulary: Vec<VocabularyEntry>,
    /// Embedded mini-games.
    pub games: Vec<GameRef>,
    /// Narrative scenes.
    pub story: Vec<Scene>,
    /// Estimated duration in minutes.
    pub estimated_duration: Option<u32>,
}

/// A validated audio configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioConfig {
    /// Root of the story's audio namespace.
    pub base_path: String,
    /// Audio key to file name.
    pub files: BTreeMap<String, String>,
}
