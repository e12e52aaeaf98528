//! Test sources — mock `DefinitionSource` implementations for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fabula_core::definition::RawStoryDefinition;
use fabula_core::error::StoryError;
use fabula_core::id::StoryId;
use fabula_core::source::DefinitionSource;

/// A source that returns a clone of a fixed raw definition on every call.
#[derive(Debug)]
pub struct StaticSource {
    story_id: StoryId,
    definition: RawStoryDefinition,
}

impl StaticSource {
    /// Create a source registered under `story_id`.
    #[must_use]
    pub fn new(story_id: &str, definition: RawStoryDefinition) -> Self {
        Self {
            story_id: StoryId::new(story_id),
            definition,
        }
    }
}

#[async_trait]
impl DefinitionSource for StaticSource {
    fn story_id(&self) -> StoryId {
        self.story_id.clone()
    }

    async fn produce(&self) -> Result<RawStoryDefinition, StoryError> {
        Ok(self.definition.clone())
    }
}

/// A source that records how many times `produce` was called. Yields to the
/// runtime before answering, so concurrent callers interleave, and can be
/// slowed down with [`CountingSource::with_delay`].
#[derive(Debug)]
pub struct CountingSource {
    inner: StaticSource,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingSource {
    /// Create a counting source registered under `story_id`.
    #[must_use]
    pub fn new(story_id: &str, definition: RawStoryDefinition) -> Self {
        Self {
            inner: StaticSource::new(story_id, definition),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Sleep for `delay` before answering each call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `produce` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DefinitionSource for CountingSource {
    fn story_id(&self) -> StoryId {
        self.inner.story_id()
    }

    async fn produce(&self) -> Result<RawStoryDefinition, StoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        self.inner.produce().await
    }
}

/// A source that always fails. Useful for testing error-handling paths.
#[derive(Debug)]
pub struct FailingSource {
    story_id: StoryId,
}

impl FailingSource {
    /// Create a failing source registered under `story_id`.
    #[must_use]
    pub fn new(story_id: &str) -> Self {
        Self {
            story_id: StoryId::new(story_id),
        }
    }
}

#[async_trait]
impl DefinitionSource for FailingSource {
    fn story_id(&self) -> StoryId {
        self.story_id.clone()
    }

    async fn produce(&self) -> Result<RawStoryDefinition, StoryError> {
        Err(StoryError::Source {
            story_id: self.story_id.clone(),
            message: "content generator unavailable".into(),
        })
    }
}
