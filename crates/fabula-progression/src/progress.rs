//! Progress calculator.
//!
//! Derives a 0–100 completion score for a story from a progress record.
//! Lessons carry 60% of the score and games 40%. A story that declares no
//! games never earns the game share, so it tops out at 60.

use fabula_core::definition::StoryDefinition;
use fabula_core::progress::{StoryProgressEntry, UserProgressRecord};
use serde::Serialize;

/// Weight of lesson completion in the total score.
pub const LESSON_WEIGHT: f64 = 60.0;

/// Weight of game completion in the total score.
pub const GAME_WEIGHT: f64 = 40.0;

/// A learner's completion of one story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    /// Weighted score, 0–100.
    pub total_progress: u8,
    /// Lessons of this story marked completed.
    pub lessons_completed: usize,
    /// Lessons in the story.
    pub total_lessons: usize,
    /// Games marked completed in the learner's entry.
    pub games_completed: usize,
    /// Sum of per-lesson game counts.
    pub total_games: usize,
    /// Lesson completion, 0–100.
    pub lesson_progress: u8,
    /// Game completion, 0–100.
    pub game_progress: u8,
}

impl ProgressReport {
    /// Returns whether every lesson and every game is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.lessons_completed >= self.total_lessons && self.games_completed >= self.total_games
    }
}

/// Computes `definition`'s progress from `record`.
#[must_use]
pub fn calculate_progress(
    definition: &StoryDefinition,
    record: &UserProgressRecord,
) -> ProgressReport {
    let total_lessons = definition.lessons.len();
    let total_games: usize = definition.lessons.iter().map(|l| l.games.len()).sum();

    let entry = record.story(&definition.id);
    let lessons_completed = entry.map_or(0, |entry| {
        definition
            .lessons
            .iter()
            .filter(|lesson| entry.lesson_completed(lesson.id))
            .count()
    });
    let games_completed = entry.map_or(0, StoryProgressEntry::completed_game_count);

    let lesson_ratio = ratio(lessons_completed, total_lessons);
    let game_ratio = ratio(games_completed, total_games);

    let game_share = if total_games > 0 {
        game_ratio * GAME_WEIGHT
    } else {
        0.0
    };

    ProgressReport {
        total_progress: to_percent(lesson_ratio * LESSON_WEIGHT + game_share),
        lessons_completed,
        total_lessons,
        games_completed,
        total_games,
        lesson_progress: to_percent(lesson_ratio * 100.0),
        game_progress: to_percent(game_ratio * 100.0),
    }
}

/// Completed over total, capped at 1. Zero when there is nothing to complete.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn ratio(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (completed as f64 / total as f64).min(1.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
