//! Editor features for Lua documents.
//!
//! [`DocumentStore`] keeps the latest parse of every open document. Queries run on a
//! [`Snapshot`] and speak editor coordinates: 0-based lines and UTF-16 columns.

mod config;
mod documents;
mod error;
mod queries;

pub use config::{DEFAULT_COMPLETION_LIMIT, DEFAULT_MAX_DIAGNOSTICS, IdeConfig};
pub use documents::{DocumentStore, Position, Range, Snapshot};
pub use error::IdeError;
pub use queries::{
    CompletionItem, DiagnosticItem, Hover, complete_locals, definition, diagnostics,
    highlights, hover,
};

#[cfg(test)]
mod tests;
