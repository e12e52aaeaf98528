//! Fabula — Story Content bounded context.
//!
//! Responsible for story validation, the story entity and its catalog,
//! document ingestion with version hashing, and the read-only views handed
//! to the presentation layer.

pub mod application;
pub mod config;
pub mod domain;
