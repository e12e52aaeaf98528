//! Audio reference resolution.

use fabula_core::definition::AudioConfig;
use fabula_core::id::StoryId;
use tracing::warn;

/// Resolves `key` to a path inside the story's audio namespace.
///
/// A missing key is not an error: audio never blocks lesson progression, so
/// the miss is logged and `None` returned.
#[must_use]
pub fn resolve_audio_path(audio: &AudioConfig, story_id: &StoryId, key: &str) -> Option<String> {
    match audio.files.get(key) {
        Some(filename) => Some(format!("{}/{filename}", audio.base_path)),
        None => {
            warn!(%story_id, key, "no audio file mapped for key");
            None
        }
    }
}
