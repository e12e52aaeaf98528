//! Catalog loading.
//!
//! Instantiates one story per definition source, initializes each, and
//! assembles the survivors into a catalog. A story that fails to initialize
//! does not stop the others unless the configuration is strict.

use std::sync::Arc;

use fabula_core::error::StoryError;
use fabula_core::source::DefinitionSource;
use tracing::{info, instrument, warn};

use crate::config::CatalogConfig;
use crate::domain::catalog::Catalog;
use crate::domain::story::{ContentStory, Story};

/// Result of a catalog load.
#[derive(Debug)]
pub struct CatalogLoad {
    /// The assembled catalog.
    pub catalog: Catalog,
    /// Stories left out because they failed to initialize.
    pub failures: Vec<StoryError>,
}

/// Loads a catalog from `sources`.
///
/// # Errors
///
/// In strict mode, returns the first story's initialization error. In every
/// mode, returns the catalog assembly error (duplicate id or prerequisite
/// cycle).
#[instrument(skip_all, fields(sources = sources.len()))]
pub async fn load_catalog(
    sources: Vec<Arc<dyn DefinitionSource>>,
    config: &CatalogConfig,
) -> Result<CatalogLoad, StoryError> {
    let mut loaded = Vec::with_capacity(sources.len());
    let mut failures = Vec::new();

    for source in sources {
        let story = Arc::new(ContentStory::new(source));
        match story.initialize().await {
            Ok(()) => loaded.push(story),
            Err(err) if config.strict => return Err(err),
            Err(err) => {
                warn!(story_id = %story.id(), %err, "leaving story out of the catalog");
                failures.push(err);
            }
        }
    }

    let catalog = Catalog::assemble(loaded, config)?;
    info!(
        loaded = catalog.len(),
        failed = failures.len(),
        "story catalog loaded"
    );

    Ok(CatalogLoad { catalog, failures })
}

#[cfg(test)]
mod tests {
    use fabula_core::definition::UnlockRequirements;
    use fabula_core::id::StoryId;
    use fabula_test_support::{FailingSource, StaticSource, init_test_tracing, raw_story};

    use super::*;

    fn source(id: &str) -> Arc<dyn DefinitionSource> {
        Arc::new(StaticSource::new(id, raw_story(id)))
    }

    fn invalid(id: &str) -> Arc<dyn DefinitionSource> {
        let mut raw = raw_story(id);
        raw.characters = None;
        Arc::new(StaticSource::new(id, raw))
    }

    #[tokio::test]
    async fn test_load_catalog_initializes_every_story() {
        // Arrange
        init_test_tracing();
        let sources = vec![source("greetings"), source("market")];

        // Act
        let load = load_catalog(sources, &CatalogConfig::default())
            .await
            .unwrap();

        // Assert
        assert_eq!(load.catalog.len(), 2);
        assert!(load.failures.is_empty());
        assert!(
            load.catalog
                .iter()
                .all(|story| story.is_initialized())
        );
    }

    #[tokio::test]
    async fn test_invalid_story_is_left_out_in_lenient_mode() {
        // Arrange
        let sources = vec![source("greetings"), invalid("market"), source("travel")];

        // Act
        let load = load_catalog(sources, &CatalogConfig::default())
            .await
            .unwrap();

        // Assert
        assert_eq!(load.catalog.len(), 2);
        assert!(!load.catalog.contains(&StoryId::new("market")));
        assert_eq!(load.failures.len(), 1);
        match &load.failures[0] {
            StoryError::Validation { story_id, errors } => {
                assert_eq!(story_id, &StoryId::new("market"));
                assert_eq!(errors, &vec!["story must have at least one character".to_owned()]);
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_source_failure_is_collected_in_lenient_mode() {
        // Arrange
        let sources: Vec<Arc<dyn DefinitionSource>> =
            vec![source("greetings"), Arc::new(FailingSource::new("market"))];

        // Act
        let load = load_catalog(sources, &CatalogConfig::default())
            .await
            .unwrap();

        // Assert
        assert_eq!(load.catalog.len(), 1);
        assert!(matches!(load.failures[0], StoryError::Source { .. }));
    }

    #[tokio::test]
    async fn test_strict_mode_fails_on_first_invalid_story() {
        // Arrange
        let sources = vec![source("greetings"), invalid("market")];
        let config = CatalogConfig {
            strict: true,
            ..CatalogConfig::default()
        };

        // Act
        let result = load_catalog(sources, &config).await;

        // Assert
        assert!(matches!(
            result,
            Err(StoryError::Validation { ref story_id, .. }) if story_id == &StoryId::new("market")
        ));
    }

    #[tokio::test]
    async fn test_cycle_rejects_the_load() {
        // Arrange
        let mut a = raw_story("a");
        a.unlock_requirements = Some(UnlockRequirements {
            prerequisite_story_ids: [StoryId::new("b")].into(),
            ..UnlockRequirements::default()
        });
        let mut b = raw_story("b");
        b.unlock_requirements = Some(UnlockRequirements {
            prerequisite_story_ids: [StoryId::new("a")].into(),
            ..UnlockRequirements::default()
        });
        let sources: Vec<Arc<dyn DefinitionSource>> = vec![
            Arc::new(StaticSource::new("a", a)),
            Arc::new(StaticSource::new("b", b)),
        ];

        // Act
        let result = load_catalog(sources, &CatalogConfig::default()).await;

        // Assert
        match result.unwrap_err() {
            StoryError::PrerequisiteCycle(ids) => {
                assert_eq!(ids, vec![StoryId::new("a"), StoryId::new("b")]);
            }
            other => panic!("expected PrerequisiteCycle, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_source_list_yields_empty_catalog() {
        let load = load_catalog(Vec::new(), &CatalogConfig::default())
            .await
            .unwrap();

        assert!(load.catalog.is_empty());
        assert!(load.failures.is_empty());
    }
}
