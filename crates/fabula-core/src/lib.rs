//! Fabula Core — shared domain abstractions.
//!
//! This crate defines the identifiers, the story definition model, the
//! externally owned progress record and the error taxonomy that every other
//! Fabula crate depends on. It contains no behaviour beyond construction
//! and lookup.

pub mod definition;
pub mod error;
pub mod id;
pub mod progress;
pub mod source;
