//! Definition source abstraction.

use async_trait::async_trait;

use crate::definition::RawStoryDefinition;
use crate::error::StoryError;
use crate::id::StoryId;

/// A content-authoring routine that produces one story's raw definition.
///
/// The catalog invokes `produce` once per story, during initialization.
/// Implementations may assemble the definition from sub-generators or parse
/// it from a document.
#[async_trait]
pub trait DefinitionSource: Send + Sync {
    /// The id the catalog registers this story under.
    fn story_id(&self) -> StoryId;

    /// Assemble the raw definition.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Source` if the definition cannot be produced.
    async fn produce(&self) -> Result<RawStoryDefinition, StoryError>;
}
