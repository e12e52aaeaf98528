//! Derived story statistics.

use fabula_core::definition::{Difficulty, StoryDefinition};
use serde::Serialize;

/// Read-only counts derived from a story definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryStatistics {
    /// Number of lessons.
    pub total_lessons: usize,
    /// Vocabulary terms across all lessons.
    pub total_vocabulary: usize,
    /// Narrative scenes across all lessons.
    pub total_scenes: usize,
    /// Games embedded across all lessons.
    pub total_games: usize,
    /// Character profiles.
    pub total_characters: usize,
    /// Estimated minutes: the sum of lesson estimates (saturating), or the
    /// story's own estimate when no lesson declares one.
    pub estimated_duration: u32,
    /// Declared difficulty.
    pub difficulty: Option<Difficulty>,
}

/// Computes statistics by traversing `definition`.
#[must_use]
pub fn compute_statistics(definition: &StoryDefinition) -> StoryStatistics {
    let lessons = &definition.lessons;
    let lesson_durations: Vec<u32> = lessons.iter().filter_map(|l| l.estimated_duration).collect();
    let estimated_duration = if lesson_durations.is_empty() {
        definition.metadata.estimated_duration.unwrap_or(0)
    } else {
        lesson_durations
            .iter()
            .fold(0_u32, |total, minutes| total.saturating_add(*minutes))
    };

    StoryStatistics {
        total_lessons: lessons.len(),
        total_vocabulary: lessons.iter().map(|l| l.vocabulary.len()).sum(),
        total_scenes: lessons.iter().map(|l| l.story.len()).sum(),
        total_games: lessons.iter().map(|l| l.games.len()).sum(),
        total_characters: definition.characters.len(),
        estimated_duration,
        difficulty: definition.metadata.difficulty,
    }
}
