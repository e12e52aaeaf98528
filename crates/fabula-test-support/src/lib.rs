//! Shared test mocks and fixtures for the Fabula story progression engine.

mod fixtures;
mod logging;
mod source;

pub use fixtures::{
    raw_lesson, raw_story, story, story_with_games, vocabulary, with_prerequisites,
};
pub use logging::init_test_tracing;
pub use source::{CountingSource, FailingSource, StaticSource};
