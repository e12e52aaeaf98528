//! Story fixtures — valid raw and validated definitions for tests.

use std::collections::{BTreeMap, BTreeSet};

use fabula_core::definition::{
    AudioConfig, CharacterProfile, Difficulty, GameRef, Lesson, RawAudioConfig, RawLesson,
    RawStoryDefinition, RawStoryMetadata, RawVocabulary, StoryDefinition, StoryMetadata,
    UnlockRequirements, VocabularyEntry,
};
use fabula_core::id::{CharacterId, GameId, LessonId, StoryId};

/// A vocabulary entry with no category.
#[must_use]
pub fn vocabulary(term: &str, translation: &str) -> VocabularyEntry {
    VocabularyEntry {
        term: term.to_owned(),
        translation: translation.to_owned(),
        category: None,
    }
}

fn scene(line: &str) -> serde_json::Value {
    serde_json::json!({ "speaker": "ana", "line": line })
}

fn ana() -> BTreeMap<CharacterId, CharacterProfile> {
    BTreeMap::from([(
        CharacterId::from("ana"),
        CharacterProfile {
            name: "Ana".to_owned(),
            role: Some("guide".to_owned()),
            description: None,
            voice: Some("ana_voice".to_owned()),
        },
    )])
}

/// A valid raw lesson with one vocabulary entry and one scene.
#[must_use]
pub fn raw_lesson(id: u32) -> RawLesson {
    RawLesson {
        id: Some(LessonId(id)),
        title: Some(format!("Lesson {id}")),
        vocabulary: Some(RawVocabulary::List(vec![vocabulary("hola", "hello")])),
        games: Vec::new(),
        story: Some(vec![scene("Hola")]),
        estimated_duration: None,
    }
}

/// A valid raw story with two lessons, one character and a `greeting`
/// audio file under `audio/<id>`.
#[must_use]
pub fn raw_story(id: &str) -> RawStoryDefinition {
    RawStoryDefinition {
        id: Some(StoryId::new(id)),
        metadata: Some(RawStoryMetadata {
            id: Some(StoryId::new(id)),
            name: Some(format!("Story {id}")),
            description: Some("A short story".to_owned()),
            difficulty: Some(Difficulty::Beginner),
            order: Some(1),
            estimated_duration: Some(20),
            total_lessons: None,
        }),
        lessons: Some(vec![raw_lesson(1), raw_lesson(2)]),
        characters: Some(ana()),
        games: Vec::new(),
        audio_config: Some(RawAudioConfig {
            base_path: Some(format!("audio/{id}")),
            files: BTreeMap::from([("greeting".to_owned(), "greeting.mp3".to_owned())]),
        }),
        unlock_requirements: None,
        version_hash: None,
    }
}

/// A validated story with `lesson_count` lessons (ids `1..=n`) and no games.
#[must_use]
pub fn story(id: &str, lesson_count: u32) -> StoryDefinition {
    let games = vec![0; lesson_count as usize];
    story_with_games(id, &games)
}

/// A validated story with one lesson per element of `games_per_lesson`, each
/// embedding that many games (ids `<story>-l<lesson>-g<n>`).
#[must_use]
pub fn story_with_games(id: &str, games_per_lesson: &[usize]) -> StoryDefinition {
    let lessons = (1_u32..)
        .zip(games_per_lesson)
        .map(|(lesson_id, &game_count)| Lesson {
            id: LessonId(lesson_id),
            title: format!("Lesson {lesson_id}"),
            vocabulary: vec![vocabulary("hola", "hello")],
            games: (1..=game_count)
                .map(|n| GameRef {
                    id: GameId(format!("{id}-l{lesson_id}-g{n}")),
                    kind: None,
                })
                .collect(),
            story: vec![scene("Hola")],
            estimated_duration: None,
        })
        .collect();

    StoryDefinition {
        id: StoryId::new(id),
        metadata: StoryMetadata {
            id: StoryId::new(id),
            name: format!("Story {id}"),
            description: "A short story".to_owned(),
            difficulty: Some(Difficulty::Beginner),
            order: 1,
            estimated_duration: Some(20),
            total_lessons: None,
        },
        lessons,
        characters: ana(),
        games: Vec::new(),
        audio_config: AudioConfig {
            base_path: format!("audio/{id}"),
            files: BTreeMap::new(),
        },
        unlock_requirements: None,
        version_hash: None,
    }
}

/// Replaces `definition`'s unlock requirements with `(prerequisite,
/// threshold)` pairs. An empty slice yields an empty requirement set.
#[must_use]
pub fn with_prerequisites(
    mut definition: StoryDefinition,
    prerequisites: &[(&str, u32)],
) -> StoryDefinition {
    let prerequisite_story_ids: BTreeSet<StoryId> = prerequisites
        .iter()
        .map(|(id, _)| StoryId::new(*id))
        .collect();
    let minimum_progress = prerequisites
        .iter()
        .map(|(id, threshold)| (StoryId::new(*id), *threshold))
        .collect();
    definition.unlock_requirements = Some(UnlockRequirements {
        prerequisite_story_ids,
        minimum_progress,
    });
    definition
}
