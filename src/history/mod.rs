//! Per-user, per-document history of tool results.

mod store;

pub use store::{sanitize_document_name, unsanitize_document_name, HistoryError, HistoryStore, StoreFailure};
