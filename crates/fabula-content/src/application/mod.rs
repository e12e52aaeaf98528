//! Application layer for the Story Content context.

pub mod catalog_loader;
pub mod ingestion;
pub mod query_handlers;
