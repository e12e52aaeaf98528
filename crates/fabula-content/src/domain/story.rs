//! The story entity.
//!
//! Every story exposes the same capability set, described by the [`Story`]
//! trait. All query methods are provided once, as default methods built on
//! [`Story::definition`]; [`ContentStory`] is the one concrete type, and
//! individual stories are values built from a [`DefinitionSource`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use fabula_core::definition::{
    AudioConfig, CharacterProfile, GameConfig, Lesson, StoryDefinition, StoryMetadata,
    VocabularyEntry,
};
use fabula_core::error::{EntityKind, StoryError};
use fabula_core::id::{CharacterId, LessonId, StoryId};
use fabula_core::progress::UserProgressRecord;
use fabula_core::source::DefinitionSource;
use fabula_progression::progress::{ProgressReport, calculate_progress};
use fabula_progression::unlock::{self, NoPrerequisiteTotals, PrerequisiteTotals, UnlockStatus};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use super::audio::resolve_audio_path;
use super::statistics::{StoryStatistics, compute_statistics};
use super::validator::build_definition;

/// Capability set shared by every story.
///
/// Every accessor except [`Story::id`] fails with
/// `StoryError::NotInitialized` until [`Story::initialize`] has completed
/// successfully.
#[async_trait]
pub trait Story: Send + Sync {
    /// The story's id. Known before initialization.
    fn id(&self) -> &StoryId;

    /// Assembles and validates the definition. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Validation` with every defect if the definition
    /// is structurally invalid, or `StoryError::Source` if it could not be
    /// produced.
    async fn initialize(&self) -> Result<(), StoryError>;

    /// The validated definition.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes.
    fn definition(&self) -> Result<&StoryDefinition, StoryError>;

    /// Lesson totals of other stories, used to resolve prerequisites.
    fn prerequisite_totals(&self) -> &dyn PrerequisiteTotals;

    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes.
    fn metadata(&self) -> Result<&StoryMetadata, StoryError> {
        Ok(&self.definition()?.metadata)
    }

    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes.
    fn lessons(&self) -> Result<&[Lesson], StoryError> {
        Ok(&self.definition()?.lessons)
    }

    /// Looks up a lesson by id.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes,
    /// or `StoryError::NotFound` if the story has no such lesson.
    fn lesson(&self, id: LessonId) -> Result<&Lesson, StoryError> {
        self.lessons()?
            .iter()
            .find(|lesson| lesson.id == id)
            .ok_or_else(|| StoryError::NotFound {
                kind: EntityKind::Lesson,
                requested: id.to_string(),
                story_id: self.id().clone(),
            })
    }

    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes.
    fn characters(&self) -> Result<&BTreeMap<CharacterId, CharacterProfile>, StoryError> {
        Ok(&self.definition()?.characters)
    }

    /// Looks up a character by id.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes,
    /// or `StoryError::NotFound` if the story has no such character.
    fn character(&self, id: &CharacterId) -> Result<&CharacterProfile, StoryError> {
        self.characters()?
            .get(id)
            .ok_or_else(|| StoryError::NotFound {
                kind: EntityKind::Character,
                requested: id.to_string(),
                story_id: self.id().clone(),
            })
    }

    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes.
    fn games(&self) -> Result<&[GameConfig], StoryError> {
        Ok(&self.definition()?.games)
    }

    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes.
    fn audio_config(&self) -> Result<&AudioConfig, StoryError> {
        Ok(&self.definition()?.audio_config)
    }

    /// Resolves an audio key. `Ok(None)` means no audio for this key.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes.
    fn audio_path(&self, key: &str) -> Result<Option<String>, StoryError> {
        let definition = self.definition()?;
        Ok(resolve_audio_path(
            &definition.audio_config,
            &definition.id,
            key,
        ))
    }

    /// Every lesson's vocabulary, in lesson order.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes.
    fn vocabulary(&self) -> Result<Vec<&VocabularyEntry>, StoryError> {
        Ok(self
            .lessons()?
            .iter()
            .flat_map(|lesson| lesson.vocabulary.iter())
            .collect())
    }

    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes.
    fn progress(&self, record: &UserProgressRecord) -> Result<ProgressReport, StoryError> {
        Ok(calculate_progress(self.definition()?, record))
    }

    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes.
    fn is_unlocked(&self, record: &UserProgressRecord) -> Result<bool, StoryError> {
        Ok(unlock::is_unlocked(
            self.definition()?,
            record,
            self.prerequisite_totals(),
        ))
    }

    /// Per-prerequisite detail behind [`Story::is_unlocked`].
    ///
    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes.
    fn unlock_status(&self, record: &UserProgressRecord) -> Result<UnlockStatus, StoryError> {
        Ok(unlock::unlock_status(
            self.definition()?,
            record,
            self.prerequisite_totals(),
        ))
    }

    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes.
    fn statistics(&self) -> Result<StoryStatistics, StoryError> {
        Ok(compute_statistics(self.definition()?))
    }

    /// SHA-256 of the source document, if the story was ingested from one.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::NotInitialized` before initialization completes.
    fn version_hash(&self) -> Result<Option<&str>, StoryError> {
        Ok(self.definition()?.version_hash.as_deref())
    }
}

/// A story whose definition comes from a [`DefinitionSource`].
pub struct ContentStory {
    id: StoryId,
    source: Arc<dyn DefinitionSource>,
    outcome: OnceCell<Result<StoryDefinition, StoryError>>,
    totals: OnceLock<Arc<dyn PrerequisiteTotals>>,
}

impl ContentStory {
    /// Creates an uninitialized story registered under the source's id.
    #[must_use]
    pub fn new(source: Arc<dyn DefinitionSource>) -> Self {
        Self {
            id: source.story_id(),
            source,
            outcome: OnceCell::new(),
            totals: OnceLock::new(),
        }
    }

    /// Attaches the lesson totals used to resolve prerequisites. Only the
    /// first attachment takes effect; returns whether this one did.
    pub fn attach_totals(&self, totals: Arc<dyn PrerequisiteTotals>) -> bool {
        self.totals.set(totals).is_ok()
    }

    /// Returns whether initialization completed successfully.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        matches!(self.outcome.get(), Some(Ok(_)))
    }

    async fn assemble(&self) -> Result<StoryDefinition, StoryError> {
        let outcome = self.assemble_definition().await;
        match &outcome {
            Ok(definition) => info!(lessons = definition.lessons.len(), "story initialized"),
            Err(err) => warn!(%err, "story failed to initialize"),
        }
        outcome
    }

    async fn assemble_definition(&self) -> Result<StoryDefinition, StoryError> {
        let raw = self.source.produce().await?;
        let definition = build_definition(raw).map_err(|errors| StoryError::Validation {
            story_id: self.id.clone(),
            errors,
        })?;
        if definition.id != self.id {
            return Err(StoryError::Validation {
                story_id: self.id.clone(),
                errors: vec![format!(
                    "metadata.id `{}` does not match registered story id `{}`",
                    definition.id, self.id
                )],
            });
        }
        Ok(definition)
    }
}

impl fmt::Debug for ContentStory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentStory")
            .field("id", &self.id)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Story for ContentStory {
    fn id(&self) -> &StoryId {
        &self.id
    }

    #[instrument(skip(self), fields(story_id = %self.id))]
    async fn initialize(&self) -> Result<(), StoryError> {
        if self.outcome.initialized() {
            debug!("initialize called again, replaying outcome");
        }
        // Concurrent callers wait on the attempt in flight. If that attempt
        // is dropped before finishing, the next waiter runs its own.
        match self.outcome.get_or_init(|| self.assemble()).await {
            Ok(_) => Ok(()),
            Err(err) => Err(err.clone()),
        }
    }

    fn definition(&self) -> Result<&StoryDefinition, StoryError> {
        match self.outcome.get() {
            Some(Ok(definition)) => Ok(definition),
            _ => Err(StoryError::NotInitialized(self.id.clone())),
        }
    }

    fn prerequisite_totals(&self) -> &dyn PrerequisiteTotals {
        match self.totals.get() {
            Some(totals) => totals.as_ref(),
            None => &NoPrerequisiteTotals,
        }
    }
}
