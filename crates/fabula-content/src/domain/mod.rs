//! Domain layer for the Story Content context.

pub mod audio;
pub mod catalog;
pub mod graph;
pub mod statistics;
pub mod story;
pub mod validator;
