//! Fabula — Progress & Unlock resolution bounded context.
//!
//! Pure functions over an immutable story definition and a caller-supplied
//! progress record: completion scoring and prerequisite gating.

pub mod progress;
pub mod unlock;
