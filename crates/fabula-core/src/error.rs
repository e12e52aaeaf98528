//! Domain error types.

use std::fmt;

use thiserror::Error;

use crate::id::StoryId;

/// The kind of entity a story query failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A lesson, looked up by lesson id.
    Lesson,
    /// A character profile, looked up by character id.
    Character,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lesson => f.write_str("lesson"),
            Self::Character => f.write_str("character"),
        }
    }
}

/// Top-level domain error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    /// A story definition failed structural validation. Carries every
    /// defect found, in the order the validator reported them.
    #[error("story {story_id} failed validation: {}", errors.join("; "))]
    Validation {
        /// The story whose definition was rejected.
        story_id: StoryId,
        /// All structural defects.
        errors: Vec<String>,
    },

    /// A story accessor was called before `initialize()` completed.
    #[error("story {0} accessed before initialization")]
    NotInitialized(StoryId),

    /// A lesson or character id is not part of the story.
    #[error("{kind} {requested} not found in story {story_id}")]
    NotFound {
        /// What was being looked up.
        kind: EntityKind,
        /// The id the caller asked for.
        requested: String,
        /// The story that was queried.
        story_id: StoryId,
    },

    /// The catalog has no story with this id.
    #[error("story not found in catalog: {0}")]
    UnknownStory(StoryId),

    /// Two sources declared the same story id.
    #[error("duplicate story id in catalog: {0}")]
    DuplicateStory(StoryId),

    /// The prerequisite graph contains a cycle through these stories.
    #[error("prerequisite cycle detected among stories: {}", join_ids(.0))]
    PrerequisiteCycle(Vec<StoryId>),

    /// The definition-producing routine failed.
    #[error("definition source for story {story_id} failed: {message}")]
    Source {
        /// The story whose definition could not be produced.
        story_id: StoryId,
        /// What went wrong.
        message: String,
    },
}

fn join_ids(ids: &[StoryId]) -> String {
    ids.iter()
        .map(StoryId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
