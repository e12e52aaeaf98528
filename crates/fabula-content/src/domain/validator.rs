//! Structural validation of raw story definitions.
//!
//! Validation never stops at the first defect: every violation is collected
//! so content authors see the complete list in one pass.

use std::collections::HashSet;
use std::fmt;

use fabula_core::definition::{
    AudioConfig, Lesson, RawLesson, RawStoryDefinition, RawVocabulary, StoryDefinition,
    StoryMetadata, VocabularyEntry,
};

/// Outcome of validating a raw definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Every defect found, in check order.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns whether no defects were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// How a lesson is named in error messages: its id, or its 1-based position
/// when the id is missing.
enum LessonLabel {
    Id(u32),
    Position(usize),
}

impl fmt::Display for LessonLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "lesson {id}"),
            Self::Position(position) => write!(f, "lesson #{position}"),
        }
    }
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Checks `raw` for structural completeness.
#[must_use]
pub fn validate(raw: &RawStoryDefinition) -> ValidationReport {
    let mut errors = Vec::new();

    let metadata = raw.metadata.as_ref();
    if !metadata.is_some_and(|m| m.id.as_ref().is_some_and(|id| present(Some(id.as_str())))) {
        errors.push("missing metadata.id".to_owned());
    }
    if !present(metadata.and_then(|m| m.name.as_deref())) {
        errors.push("missing metadata.name".to_owned());
    }
    if !present(metadata.and_then(|m| m.description.as_deref())) {
        errors.push("missing metadata.description".to_owned());
    }
    if let (Some(id), Some(metadata_id)) = (&raw.id, metadata.and_then(|m| m.id.as_ref())) {
        if id != metadata_id {
            errors.push(format!(
                "story id `{id}` does not match metadata.id `{metadata_id}`"
            ));
        }
    }

    match raw.lessons.as_deref() {
        None | Some([]) => errors.push("story must have at least one lesson".to_owned()),
        Some(lessons) => validate_lessons(lessons, &mut errors),
    }

    if raw.characters.as_ref().is_none_or(|c| c.is_empty()) {
        errors.push("story must have at least one character".to_owned());
    }

    match &raw.audio_config {
        None => errors.push("missing audioConfig".to_owned()),
        Some(audio) if !present(audio.base_path.as_deref()) => {
            errors.push("missing audioConfig.basePath".to_owned());
        }
        Some(_) => {}
    }

    ValidationReport { errors }
}

fn validate_lessons(lessons: &[RawLesson], errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for (index, lesson) in lessons.iter().enumerate() {
        let label = lesson
            .id
            .map_or(LessonLabel::Position(index + 1), |id| LessonLabel::Id(id.0));

        match lesson.id {
            None => errors.push(format!("{label}: missing id")),
            Some(id) if !seen.insert(id) => errors.push(format!("duplicate lesson id {id}")),
            Some(_) => {}
        }
        if !present(lesson.title.as_deref()) {
            errors.push(format!("{label}: missing title"));
        }
        if lesson.story.is_none() {
            errors.push(format!("{label}: missing story"));
        }
        match &lesson.vocabulary {
            None => errors.push(format!("{label}: missing vocabulary")),
            Some(RawVocabulary::Malformed(_)) => {
                errors.push(format!("{label}: vocabulary must be a list"));
            }
            Some(RawVocabulary::Entries(entries)) => {
                for (position, entry) in entries.iter().enumerate() {
                    if let Err(err) = serde_json::from_value::<VocabularyEntry>(entry.clone()) {
                        errors.push(format!(
                            "{label}: vocabulary entry #{} is malformed: {err}",
                            position + 1
                        ));
                    }
                }
            }
            Some(RawVocabulary::List(entries)) if entries.is_empty() => {
                errors.push(format!("{label}: vocabulary must not be empty"));
            }
            Some(RawVocabulary::List(_)) => {}
        }
    }
}

/// Validates `raw` and, if it passes, builds the immutable definition.
///
/// # Errors
///
/// Returns every structural defect when validation fails.
pub fn build_definition(raw: RawStoryDefinition) -> Result<StoryDefinition, Vec<String>> {
    let report = validate(&raw);
    if !report.is_valid() {
        return Err(report.errors);
    }

    let RawStoryDefinition {
        metadata: Some(metadata),
        lessons: Some(lessons),
        characters: Some(characters),
        games,
        audio_config: Some(audio_config),
        unlock_requirements,
        version_hash,
        ..
    } = raw
    else {
        return Err(vec!["definition is incomplete".to_owned()]);
    };
    let (Some(id), Some(name), Some(description), Some(base_path)) = (
        metadata.id,
        metadata.name,
        metadata.description,
        audio_config.base_path,
    ) else {
        return Err(vec!["definition is incomplete".to_owned()]);
    };
    let Some(lessons) = lessons.into_iter().map(build_lesson).collect::<Option<Vec<_>>>() else {
        return Err(vec!["lesson is incomplete".to_owned()]);
    };

    Ok(StoryDefinition {
        id: id.clone(),
        metadata: StoryMetadata {
            id,
            name,
            description,
            difficulty: metadata.difficulty,
            order: metadata.order.unwrap_or(0),
            estimated_duration: metadata.estimated_duration,
            total_lessons: metadata.total_lessons,
        },
        lessons,
        characters,
        games,
        audio_config: AudioConfig {
            base_path,
            files: audio_config.files,
        },
        unlock_requirements,
        version_hash,
    })
}

fn build_lesson(lesson: RawLesson) -> Option<Lesson> {
    let Some(RawVocabulary::List(vocabulary)) = lesson.vocabulary else {
        return None;
    };
    Some(Lesson {
        id: lesson.id?,
        title: lesson.title?,
        vocabulary,
        games: lesson.games,
        story: lesson.story?,
        estimated_duration: lesson.estimated_duration,
    })
}
