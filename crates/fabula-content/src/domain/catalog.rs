//! The story catalog.
//!
//! Holds every successfully initialized story, keyed by id. The catalog is
//! also the node set of the prerequisite graph: it checks that graph for
//! cycles once, at assembly, and hands each story the lesson totals it needs
//! to resolve its own prerequisites.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use fabula_core::error::StoryError;
use fabula_core::id::StoryId;
use fabula_progression::unlock::PrerequisiteTotals;
use tracing::warn;

use super::graph::topological_order;
use super::story::{ContentStory, Story};
use crate::config::CatalogConfig;

/// Declared lesson totals of every story in a catalog.
#[derive(Debug, Clone, Default)]
pub struct LessonTotals(HashMap<StoryId, u32>);

impl PrerequisiteTotals for LessonTotals {
    fn lesson_total(&self, story: &StoryId) -> Option<u32> {
        self.0.get(story).copied()
    }
}

/// All loaded stories, addressable by id.
#[derive(Debug)]
pub struct Catalog {
    stories: HashMap<StoryId, Arc<ContentStory>>,
    order: Vec<StoryId>,
    totals: Arc<LessonTotals>,
}

impl Catalog {
    /// Assembles a catalog from initialized stories.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` if a story has not been
    /// initialized, `StoryError::DuplicateStory` if two stories share an id,
    /// or `StoryError::PrerequisiteCycle` if cycle enforcement is on and the
    /// prerequisite graph has a cycle.
    pub fn assemble(
        stories: Vec<Arc<ContentStory>>,
        config: &CatalogConfig,
    ) -> Result<Self, StoryError> {
        let mut by_id = HashMap::with_capacity(stories.len());
        let mut graph = BTreeMap::new();
        let mut totals = HashMap::with_capacity(stories.len());
        let mut order = Vec::with_capacity(stories.len());

        for story in stories {
            let definition = story.definition()?;
            let id = definition.id.clone();
            let prerequisites = definition
                .unlock_requirements
                .as_ref()
                .map(|r| r.prerequisite_story_ids.clone())
                .unwrap_or_default();
            order.push((definition.metadata.order, id.clone()));
            totals.insert(id.clone(), definition.declared_lesson_total());
            graph.insert(id.clone(), prerequisites);
            if by_id.insert(id.clone(), story).is_some() {
                return Err(StoryError::DuplicateStory(id));
            }
        }

        for (story_id, prerequisites) in &graph {
            for prerequisite in prerequisites.iter().filter(|p| !graph.contains_key(*p)) {
                warn!(%story_id, %prerequisite, "prerequisite is not in the catalog");
            }
        }

        if config.enforce_acyclic {
            topological_order(&graph).map_err(StoryError::PrerequisiteCycle)?;
        }

        order.sort();
        let totals = Arc::new(LessonTotals(totals));
        for story in by_id.values() {
            if !story.attach_totals(totals.clone()) {
                warn!(story_id = %story.id(), "story already belongs to another catalog");
            }
        }

        Ok(Self {
            stories: by_id,
            order: order.into_iter().map(|(_, id)| id).collect(),
            totals,
        })
    }

    /// Looks up a story.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::UnknownStory` if the catalog has no such story.
    pub fn get(&self, id: &StoryId) -> Result<&Arc<ContentStory>, StoryError> {
        self.stories
            .get(id)
            .ok_or_else(|| StoryError::UnknownStory(id.clone()))
    }

    /// Returns whether the catalog holds `id`.
    #[must_use]
    pub fn contains(&self, id: &StoryId) -> bool {
        self.stories.contains_key(id)
    }

    /// Number of stories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stories.len()
    }

    /// Returns whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Story ids in curriculum order (`metadata.order`, then id).
    #[must_use]
    pub fn ids(&self) -> &[StoryId] {
        &self.order
    }

    /// Stories in curriculum order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ContentStory>> + '_ {
        self.order.iter().filter_map(|id| self.stories.get(id))
    }

    /// Lesson totals shared with every story in the catalog.
    #[must_use]
    pub fn totals(&self) -> &LessonTotals {
        &self.totals
    }
}

impl PrerequisiteTotals for Catalog {
    fn lesson_total(&self, story: &StoryId) -> Option<u32> {
        self.totals.lesson_total(story)
    }
}

#[cfg(test)]
mod tests {
    use fabula_core::definition::{RawStoryDefinition, UnlockRequirements};
    use fabula_core::id::LessonId;
    use fabula_core::progress::UserProgressRecord;
    use fabula_test_support::{StaticSource, raw_story};

    use super::*;

    fn gated(id: &str, order: u32, prerequisites: &[(&str, u32)]) -> RawStoryDefinition {
        let mut raw = raw_story(id);
        if let Some(metadata) = raw.metadata.as_mut() {
            metadata.order = Some(order);
        }
        if !prerequisites.is_empty() {
            raw.unlock_requirements = Some(UnlockRequirements {
                prerequisite_story_ids: prerequisites.iter().map(|(p, _)| StoryId::new(*p)).collect(),
                minimum_progress: prerequisites
                    .iter()
                    .map(|(p, t)| (StoryId::new(*p), *t))
                    .collect(),
            });
        }
        raw
    }

    async fn loaded(id: &str, raw: RawStoryDefinition) -> Arc<ContentStory> {
        let story = Arc::new(ContentStory::new(Arc::new(StaticSource::new(id, raw))));
        story.initialize().await.unwrap();
        story
    }

    #[tokio::test]
    async fn test_assemble_orders_by_curriculum_position() {
        let stories = vec![
            loaded("travel", gated("travel", 3, &[("market", 50)])).await,
            loaded("greetings", gated("greetings", 1, &[])).await,
            loaded("market", gated("market", 2, &[("greetings", 100)])).await,
        ];

        let catalog = Catalog::assemble(stories, &CatalogConfig::default()).unwrap();

        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());
        assert_eq!(
            catalog.ids(),
            &[
                StoryId::new("greetings"),
                StoryId::new("market"),
                StoryId::new("travel")
            ]
        );
        let names: Vec<String> = catalog
            .iter()
            .map(|s| s.metadata().unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["Story greetings", "Story market", "Story travel"]);
    }

    #[tokio::test]
    async fn test_get_unknown_story_fails() {
        let catalog = Catalog::assemble(
            vec![loaded("greetings", raw_story("greetings")).await],
            &CatalogConfig::default(),
        )
        .unwrap();

        assert!(catalog.contains(&StoryId::new("greetings")));
        assert_eq!(
            catalog.get(&StoryId::new("nope")).unwrap_err(),
            StoryError::UnknownStory(StoryId::new("nope"))
        );
    }

    #[tokio::test]
    async fn test_cycle_is_rejected() {
        let stories = vec![
            loaded("a", gated("a", 1, &[("b", 10)])).await,
            loaded("b", gated("b", 2, &[("a", 10)])).await,
            loaded("root", gated("root", 0, &[])).await,
        ];

        let result = Catalog::assemble(stories, &CatalogConfig::default());

        assert_eq!(
            result.unwrap_err(),
            StoryError::PrerequisiteCycle(vec![StoryId::new("a"), StoryId::new("b")])
        );
    }

    #[tokio::test]
    async fn test_cycle_allowed_when_enforcement_is_off() {
        let stories = vec![
            loaded("a", gated("a", 1, &[("b", 10)])).await,
            loaded("b", gated("b", 2, &[("a", 10)])).await,
        ];
        let config = CatalogConfig {
            enforce_acyclic: false,
            ..CatalogConfig::default()
        };

        let catalog = Catalog::assemble(stories, &config).unwrap();

        assert_eq!(catalog.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_story_is_rejected() {
        let stories = vec![
            loaded("greetings", raw_story("greetings")).await,
            loaded("greetings", raw_story("greetings")).await,
        ];

        let result = Catalog::assemble(stories, &CatalogConfig::default());

        assert_eq!(
            result.unwrap_err(),
            StoryError::DuplicateStory(StoryId::new("greetings"))
        );
    }

    #[tokio::test]
    async fn test_uninitialized_story_is_rejected() {
        let story = Arc::new(ContentStory::new(Arc::new(StaticSource::new(
            "greetings",
            raw_story("greetings"),
        ))));

        let result = Catalog::assemble(vec![story], &CatalogConfig::default());

        assert!(matches!(result, Err(StoryError::NotInitialized(_))));
    }

    #[tokio::test]
    async fn test_stories_resolve_prerequisites_through_catalog_totals() {
        let mut greetings = gated("greetings", 1, &[]);
        if let Some(metadata) = greetings.metadata.as_mut() {
            metadata.total_lessons = Some(5);
        }
        let stories = vec![
            loaded("greetings", greetings).await,
            loaded("market", gated("market", 2, &[("greetings", 80)])).await,
        ];
        let catalog = Catalog::assemble(stories, &CatalogConfig::default()).unwrap();
        let market = catalog.get(&StoryId::new("market")).unwrap();
        let greetings_id = StoryId::new("greetings");
        let four_of_five = (1..=4).fold(UserProgressRecord::new(), |record, n| {
            record.with_lesson(&greetings_id, LessonId(n), true)
        });
        let three_of_five = (1..=3).fold(UserProgressRecord::new(), |record, n| {
            record.with_lesson(&greetings_id, LessonId(n), true)
        });

        assert_eq!(catalog.lesson_total(&greetings_id), Some(5));
        assert!(market.is_unlocked(&four_of_five).unwrap());
        assert!(!market.is_unlocked(&three_of_five).unwrap());
        assert!(!market.is_unlocked(&UserProgressRecord::new()).unwrap());
    }

    #[tokio::test]
    async fn test_dangling_prerequisite_is_kept_and_fails_closed() {
        fabula_test_support::init_test_tracing();
        let stories = vec![loaded("market", gated("market", 1, &[("retired", 0)])).await];

        let catalog = Catalog::assemble(stories, &CatalogConfig::default()).unwrap();

        let market = catalog.get(&StoryId::new("market")).unwrap();
        assert!(!market.is_unlocked(&UserProgressRecord::new()).unwrap());
    }
}
