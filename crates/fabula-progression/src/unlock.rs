//! Unlock resolver.
//!
//! A story is unlocked when every prerequisite story has reached its
//! minimum completion percentage. Root stories (no prerequisites) are always
//! unlocked. A prerequisite the learner has never touched fails closed.

use fabula_core::definition::StoryDefinition;
use fabula_core::id::StoryId;
use fabula_core::progress::UserProgressRecord;
use serde::Serialize;
use tracing::debug;

use crate::progress::ratio;

/// Lookup of the lesson total a prerequisite story declares.
pub trait PrerequisiteTotals: Send + Sync {
    /// Declared lesson total of `story`, or `None` if the story is unknown.
    fn lesson_total(&self, story: &StoryId) -> Option<u32>;
}

/// A lookup that knows no stories. Prerequisite percentages then fall back to
/// the number of lesson entries in the learner's record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrerequisiteTotals;

impl PrerequisiteTotals for NoPrerequisiteTotals {
    fn lesson_total(&self, _story: &StoryId) -> Option<u32> {
        None
    }
}

/// How one prerequisite stands against its threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteStatus {
    /// The prerequisite story.
    pub story_id: StoryId,
    /// Minimum completion percentage required.
    pub required: u32,
    /// Completion reached, rounded, or `None` if the learner has no entry
    /// for it.
    pub achieved: Option<u32>,
    /// Whether the threshold is met.
    pub satisfied: bool,
}

/// Per-prerequisite detail of an unlock decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockStatus {
    /// One entry per prerequisite, in id order.
    pub prerequisites: Vec<PrerequisiteStatus>,
}

impl UnlockStatus {
    /// Returns whether every prerequisite is satisfied.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.prerequisites.iter().all(|p| p.satisfied)
    }
}

/// Returns whether `definition` is unlocked for the learner.
#[must_use]
pub fn is_unlocked(
    definition: &StoryDefinition,
    record: &UserProgressRecord,
    totals: &dyn PrerequisiteTotals,
) -> bool {
    let Some(requirements) = &definition.unlock_requirements else {
        return true;
    };

    let unlocked = requirements
        .prerequisite_story_ids
        .iter()
        .all(|prerequisite| {
            completion(prerequisite, record, totals)
                .is_some_and(|c| c.meets(requirements.threshold_for(prerequisite)))
        });

    debug!(story_id = %definition.id, unlocked, "resolved unlock state");
    unlocked
}

/// Evaluates every prerequisite of `definition`, without short-circuiting.
#[must_use]
pub fn unlock_status(
    definition: &StoryDefinition,
    record: &UserProgressRecord,
    totals: &dyn PrerequisiteTotals,
) -> UnlockStatus {
    let Some(requirements) = &definition.unlock_requirements else {
        return UnlockStatus::default();
    };

    let prerequisites = requirements
        .prerequisite_story_ids
        .iter()
        .map(|prerequisite| {
            let required = requirements.threshold_for(prerequisite);
            let progress = completion(prerequisite, record, totals);
            PrerequisiteStatus {
                story_id: prerequisite.clone(),
                required,
                achieved: progress.map(Completion::percent),
                satisfied: progress.is_some_and(|c| c.meets(required)),
            }
        })
        .collect();

    UnlockStatus { prerequisites }
}

/// Completed lessons of a prerequisite against its lesson total.
#[derive(Debug, Clone, Copy)]
struct Completion {
    completed: usize,
    total: usize,
}

impl Completion {
    /// Exact comparison: `completed / total >= threshold / 100`. A story with
    /// no lessons only meets a zero threshold.
    fn meets(self, threshold: u32) -> bool {
        if self.total == 0 {
            return threshold == 0;
        }
        let completed = self.completed.min(self.total) as u128;
        completed * 100 >= u128::from(threshold) * self.total as u128
    }

    /// Rounded percentage, for display only.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn percent(self) -> u32 {
        (ratio(self.completed, self.total) * 100.0).round() as u32
    }
}

/// Completion of `prerequisite`, or `None` if the learner has no entry for it.
fn completion(
    prerequisite: &StoryId,
    record: &UserProgressRecord,
    totals: &dyn PrerequisiteTotals,
) -> Option<Completion> {
    let entry = record.story(prerequisite)?;
    let total = totals
        .lesson_total(prerequisite)
        .map_or(entry.lessons.len(), |t| t as usize);
    Some(Completion {
        completed: entry.completed_lesson_count(),
        total,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use fabula_core::id::LessonId;
    use fabula_test_support::{story, with_prerequisites};

    use super::*;

    struct Totals(HashMap<StoryId, u32>);

    impl PrerequisiteTotals for Totals {
        fn lesson_total(&self, story: &StoryId) -> Option<u32> {
            self.0.get(story).copied()
        }
    }

    fn totals(entries: &[(&str, u32)]) -> Totals {
        Totals(
            entries
                .iter()
                .map(|(id, total)| (StoryId::new(*id), *total))
                .collect(),
        )
    }

    fn completed(story: &str, count: u32) -> UserProgressRecord {
        let id = StoryId::new(story);
        (1..=count).fold(UserProgressRecord::new().with_story(&id), |record, n| {
            record.with_lesson(&id, LessonId(n), true)
        })
    }

    #[test]
    fn test_story_without_requirements_is_unlocked() {
        let definition = story("greetings", 2);

        assert!(is_unlocked(
            &definition,
            &UserProgressRecord::new(),
            &NoPrerequisiteTotals
        ));
    }

    #[test]
    fn test_empty_prerequisite_set_is_unlocked() {
        let definition = with_prerequisites(story("market", 2), &[]);

        assert!(is_unlocked(
            &definition,
            &UserProgressRecord::new(),
            &NoPrerequisiteTotals
        ));
    }

    #[test]
    fn test_threshold_met_exactly_unlocks() {
        let definition = with_prerequisites(story("market", 2), &[("a", 80)]);

        let unlocked = is_unlocked(&definition, &completed("a", 80), &totals(&[("a", 100)]));

        assert!(unlocked);
    }

    #[test]
    fn test_threshold_missed_by_one_stays_locked() {
        let definition = with_prerequisites(story("market", 2), &[("a", 80)]);

        let unlocked = is_unlocked(&definition, &completed("a", 79), &totals(&[("a", 100)]));

        assert!(!unlocked);
    }

    #[test]
    fn test_percentage_that_rounds_up_to_threshold_stays_locked() {
        let definition = with_prerequisites(story("market", 2), &[("a", 80)]);
        let record = completed("a", 159);
        let lookup = totals(&[("a", 200)]);

        let unlocked = is_unlocked(&definition, &record, &lookup);
        let status = unlock_status(&definition, &record, &lookup);

        assert!(!unlocked);
        assert_eq!(status.prerequisites[0].achieved, Some(80));
        assert!(!status.prerequisites[0].satisfied);
    }

    #[test]
    fn test_prerequisite_without_lessons_meets_only_zero_threshold() {
        let record = UserProgressRecord::new().with_story(&StoryId::new("a"));
        let lookup = totals(&[("a", 0)]);

        let zero = with_prerequisites(story("market", 2), &[("a", 0)]);
        let ten = with_prerequisites(story("market", 2), &[("a", 10)]);

        assert!(is_unlocked(&zero, &record, &lookup));
        assert!(!is_unlocked(&ten, &record, &lookup));
    }

    #[test]
    fn test_missing_prerequisite_entry_fails_closed() {
        let definition = with_prerequisites(story("market", 2), &[("a", 0)]);

        let unlocked = is_unlocked(
            &definition,
            &UserProgressRecord::new(),
            &totals(&[("a", 5)]),
        );

        assert!(!unlocked);
    }

    #[test]
    fn test_unspecified_threshold_defaults_to_zero() {
        let mut definition = with_prerequisites(story("market", 2), &[]);
        if let Some(requirements) = definition.unlock_requirements.as_mut() {
            requirements.prerequisite_story_ids.insert(StoryId::new("a"));
        }
        let record = UserProgressRecord::new().with_story(&StoryId::new("a"));

        assert!(is_unlocked(&definition, &record, &totals(&[("a", 4)])));
    }

    #[test]
    fn test_every_prerequisite_must_clear_its_threshold() {
        let definition = with_prerequisites(story("market", 2), &[("a", 50), ("b", 50)]);
        let record = UserProgressRecord::new()
            .with_lesson(&StoryId::new("a"), LessonId(1), true)
            .with_lesson(&StoryId::new("a"), LessonId(2), true)
            .with_lesson(&StoryId::new("b"), LessonId(1), true);
        let lookup = totals(&[("a", 2), ("b", 4)]);

        assert!(!is_unlocked(&definition, &record, &lookup));

        let status = unlock_status(&definition, &record, &lookup);
        assert_eq!(status.prerequisites.len(), 2);
        assert!(status.prerequisites[0].satisfied);
        assert_eq!(status.prerequisites[1].achieved, Some(25));
        assert!(!status.prerequisites[1].satisfied);
        assert!(!status.is_unlocked());
    }

    #[test]
    fn test_unknown_prerequisite_falls_back_to_recorded_lessons() {
        let definition = with_prerequisites(story("market", 2), &[("a", 50)]);
        let a = StoryId::new("a");
        let record = UserProgressRecord::new()
            .with_lesson(&a, LessonId(1), true)
            .with_lesson(&a, LessonId(2), false);

        assert!(is_unlocked(&definition, &record, &NoPrerequisiteTotals));
    }

    #[test]
    fn test_status_reports_missing_entry_as_none() {
        let definition = with_prerequisites(story("market", 2), &[("a", 10)]);

        let status = unlock_status(&definition, &UserProgressRecord::new(), &NoPrerequisiteTotals);

        assert_eq!(
            status.prerequisites,
            vec![PrerequisiteStatus {
                story_id: StoryId::new("a"),
                required: 10,
                achieved: None,
                satisfied: false,
            }]
        );
    }
}
