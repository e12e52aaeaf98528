//! Query handlers for the Story Content context.
//!
//! Read-only view DTOs combining a story's metadata with the learner's
//! progress and unlock state, for the presentation layer.

use fabula_core::definition::Difficulty;
use fabula_core::error::StoryError;
use fabula_core::id::StoryId;
use fabula_core::progress::UserProgressRecord;
use fabula_progression::progress::ProgressReport;
use fabula_progression::unlock::UnlockStatus;
use serde::Serialize;

use crate::domain::catalog::Catalog;
use crate::domain::statistics::StoryStatistics;
use crate::domain::story::Story;

/// Read-only view of a story for one learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryView {
    /// The story identifier.
    pub story_id: StoryId,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Declared difficulty.
    pub difficulty: Option<Difficulty>,
    /// Position in the curriculum.
    pub order: u32,
    /// Whether the learner may open the story.
    pub unlocked: bool,
    /// The learner's completion.
    pub progress: ProgressReport,
    /// Content version hash, when ingested from a document.
    pub version_hash: Option<String>,
}

fn view_of(story: &dyn Story, record: &UserProgressRecord) -> Result<StoryView, StoryError> {
    let metadata = story.metadata()?;
    Ok(StoryView {
        story_id: story.id().clone(),
        name: metadata.name.clone(),
        description: metadata.description.clone(),
        difficulty: metadata.difficulty,
        order: metadata.order,
        unlocked: story.is_unlocked(record)?,
        progress: story.progress(record)?,
        version_hash: story.version_hash()?.map(str::to_owned),
    })
}

/// Retrieves one story's view.
///
/// # Errors
///
/// Returns `StoryError::UnknownStory` if the catalog has no such story.
pub fn get_story_view(
    catalog: &Catalog,
    story_id: &StoryId,
    record: &UserProgressRecord,
) -> Result<StoryView, StoryError> {
    view_of(catalog.get(story_id)?.as_ref(), record)
}

/// Retrieves every story's view, in curriculum order.
///
/// # Errors
///
/// Returns `StoryError::NotInitialized` if a catalog story is not queryable,
/// which assembly rules out.
pub fn list_story_views(
    catalog: &Catalog,
    record: &UserProgressRecord,
) -> Result<Vec<StoryView>, StoryError> {
    catalog
        .iter()
        .map(|story| view_of(story.as_ref(), record))
        .collect()
}

/// Retrieves a story's statistics.
///
/// # Errors
///
/// Returns `StoryError::UnknownStory` if the catalog has no such story.
pub fn get_story_statistics(
    catalog: &Catalog,
    story_id: &StoryId,
) -> Result<StoryStatistics, StoryError> {
    catalog.get(story_id)?.statistics()
}

/// Retrieves the per-prerequisite detail of a story's unlock state.
///
/// # Errors
///
/// Returns `StoryError::UnknownStory` if the catalog has no such story.
pub fn get_unlock_status(
    catalog: &Catalog,
    story_id: &StoryId,
    record: &UserProgressRecord,
) -> Result<UnlockStatus, StoryError> {
    catalog.get(story_id)?.unlock_status(record)
}
