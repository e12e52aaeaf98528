//! The externally owned user progress record.
//!
//! The engine only ever reads this record. It is owned and persisted by a
//! progress-tracking collaborator; the builder-style methods below exist so
//! that collaborator (and tests) can assemble one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::{GameId, LessonId, StoryId};

/// Completion flag for a lesson or a game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Whether the learner finished it.
    #[serde(default)]
    pub completed: bool,
}

/// A learner's progress within one story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryProgressEntry {
    /// Lesson completion keyed by lesson id.
    #[serde(default)]
    pub lessons: HashMap<LessonId, Completion>,
    /// Game completion keyed by game id.
    #[serde(default)]
    pub games: HashMap<GameId, Completion>,
}

impl StoryProgressEntry {
    /// Returns whether `lesson` is marked completed.
    #[must_use]
    pub fn lesson_completed(&self, lesson: LessonId) -> bool {
        self.lessons.get(&lesson).is_some_and(|c| c.completed)
    }

    /// Number of lesson entries marked completed.
    #[must_use]
    pub fn completed_lesson_count(&self) -> usize {
        self.lessons.values().filter(|c| c.completed).count()
    }

    /// Number of game entries marked completed.
    #[must_use]
    pub fn completed_game_count(&self) -> usize {
        self.games.values().filter(|c| c.completed).count()
    }
}

/// Progress across all stories, keyed by story id. A missing story is zero
/// progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProgressRecord {
    stories: HashMap<StoryId, StoryProgressEntry>,
}

impl UserProgressRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `story`, if the learner has any.
    #[must_use]
    pub fn story(&self, story: &StoryId) -> Option<&StoryProgressEntry> {
        self.stories.get(story)
    }

    /// Returns whether the record has an entry for `story`.
    #[must_use]
    pub fn contains(&self, story: &StoryId) -> bool {
        self.stories.contains_key(story)
    }

    /// Sets a lesson's completion flag.
    #[must_use]
    pub fn with_lesson(mut self, story: &StoryId, lesson: LessonId, completed: bool) -> Self {
        self.stories
            .entry(story.clone())
            .or_default()
            .lessons
            .insert(lesson, Completion { completed });
        self
    }

    /// Sets a game's completion flag.
    #[must_use]
    pub fn with_game(mut self, story: &StoryId, game: GameId, completed: bool) -> Self {
        self.stories
            .entry(story.clone())
            .or_default()
            .games
            .insert(game, Completion { completed });
        self
    }

    /// Adds an empty entry for `story` (started but nothing completed).
    #[must_use]
    pub fn with_story(mut self, story: &StoryId) -> Self {
        self.stories.entry(story.clone()).or_default();
        self
    }
}

impl FromIterator<(StoryId, StoryProgressEntry)> for UserProgressRecord {
    fn from_iter<T: IntoIterator<Item = (StoryId, StoryProgressEntry)>>(iter: T) -> Self {
        Self {
            stories: iter.into_iter().collect(),
        }
    }
}
