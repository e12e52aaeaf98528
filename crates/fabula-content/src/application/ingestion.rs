//! Definition sources for authored content.
//!
//! `DocumentSource` parses a YAML or JSON document into a raw definition and
//! stamps it with the document's SHA-256 version hash. `FnSource` wraps a
//! plain factory function, for stories assembled in code.

use std::fmt;

use async_trait::async_trait;
use fabula_core::definition::RawStoryDefinition;
use fabula_core::error::StoryError;
use fabula_core::id::StoryId;
use fabula_core::source::DefinitionSource;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::story::ContentStory;

/// Serialization format of a story document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// YAML.
    Yaml,
    /// JSON.
    Json,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => f.write_str("yaml"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Hex-encoded SHA-256 of `document`.
#[must_use]
pub fn version_hash(document: &str) -> String {
    format!("{:x}", Sha256::digest(document.as_bytes()))
}

/// A story authored as a YAML or JSON document.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    story_id: StoryId,
    format: DocumentFormat,
    document: String,
}

impl DocumentSource {
    /// A source reading `document` as YAML.
    #[must_use]
    pub fn yaml(story_id: impl Into<StoryId>, document: impl Into<String>) -> Self {
        Self {
            story_id: story_id.into(),
            format: DocumentFormat::Yaml,
            document: document.into(),
        }
    }

    /// A source reading `document` as JSON.
    #[must_use]
    pub fn json(story_id: impl Into<StoryId>, document: impl Into<String>) -> Self {
        Self {
            story_id: story_id.into(),
            format: DocumentFormat::Json,
            document: document.into(),
        }
    }

    /// The document's format.
    #[must_use]
    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    fn parse(&self) -> Result<RawStoryDefinition, String> {
        match self.format {
            DocumentFormat::Yaml => {
                serde_yaml::from_str(&self.document).map_err(|e| e.to_string())
            }
            DocumentFormat::Json => {
                serde_json::from_str(&self.document).map_err(|e| e.to_string())
            }
        }
    }
}

#[async_trait]
impl DefinitionSource for DocumentSource {
    fn story_id(&self) -> StoryId {
        self.story_id.clone()
    }

    async fn produce(&self) -> Result<RawStoryDefinition, StoryError> {
        let mut raw = self.parse().map_err(|message| StoryError::Source {
            story_id: self.story_id.clone(),
            message: format!("{} document is malformed: {message}", self.format),
        })?;
        let hash = version_hash(&self.document);
        debug!(story_id = %self.story_id, version_hash = %hash, "parsed story document");
        raw.version_hash = Some(hash);
        Ok(raw)
    }
}

/// A story assembled by a factory function.
pub struct FnSource<F> {
    story_id: StoryId,
    factory: F,
}

impl<F> FnSource<F>
where
    F: Fn() -> RawStoryDefinition + Send + Sync,
{
    /// A source calling `factory` to produce the definition.
    #[must_use]
    pub fn new(story_id: impl Into<StoryId>, factory: F) -> Self {
        Self {
            story_id: story_id.into(),
            factory,
        }
    }
}

impl<F> fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSource")
            .field("story_id", &self.story_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> DefinitionSource for FnSource<F>
where
    F: Fn() -> RawStoryDefinition + Send + Sync,
{
    fn story_id(&self) -> StoryId {
        self.story_id.clone()
    }

    async fn produce(&self) -> Result<RawStoryDefinition, StoryError> {
        Ok((self.factory)())
    }
}

/// Builds an uninitialized story from a factory function.
#[must_use]
pub fn story_from_fn<F>(story_id: impl Into<StoryId>, factory: F) -> ContentStory
where
    F: Fn() -> RawStoryDefinition + Send + Sync + 'static,
{
    ContentStory::new(std::sync::Arc::new(FnSource::new(story_id, factory)))
}
