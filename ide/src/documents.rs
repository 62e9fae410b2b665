//! Open documents and their current parse.
//!
//! Each document holds its latest [`Snapshot`] behind an `Arc`. Readers clone the `Arc` and
//! query it without holding any lock; a new parse replaces the `Arc` and never mutates a
//! snapshot in place.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use lua_analyzer::{ParseOutput, Span, Utf16LineCol, parse};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::IdeError;

/// Editor position: 0-based line and UTF-16 column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl From<Utf16LineCol> for Position {
    fn from(at: Utf16LineCol) -> Self {
        Self::new(at.line, at.character)
    }
}

impl From<Position> for Utf16LineCol {
    fn from(at: Position) -> Self {
        Utf16LineCol {
            line: at.line,
            character: at.character,
        }
    }
}

/// Half-open editor range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// One parsed version of a document.
#[derive(Debug)]
pub struct Snapshot {
    pub version: i32,
    pub text: String,
    pub parse: ParseOutput,
}

impl Snapshot {
    pub fn new(version: i32, text: String) -> Self {
        let parse = parse(&text);
        Self {
            version,
            text,
            parse,
        }
    }

    /// Byte offset of an editor position. Columns past the end of a line clamp to its end.
    pub fn offset(&self, at: Position) -> Result<u32, IdeError> {
        self.parse
            .line_index
            .to_position(&self.text, at.into())
            .ok_or(IdeError::PositionOutOfRange {
                line: at.line,
                character: at.character,
            })
    }

    pub fn position(&self, offset: u32) -> Option<Position> {
        self.parse
            .line_index
            .from_position(&self.text, offset)
            .map(Position::from)
    }

    /// Editor range of a byte span of this snapshot's text.
    pub fn range(&self, span: Span) -> Option<Range> {
        Some(Range {
            start: self.position(span.start)?,
            end: self.position(span.end)?,
        })
    }
}

/// Per-document state.
struct Document {
    /// Serializes parses of this document.
    parsing: Mutex<()>,
    current: RwLock<Arc<Snapshot>>,
}

impl Document {
    fn new(snapshot: Arc<Snapshot>) -> Self {
        Self {
            parsing: Mutex::new(()),
            current: RwLock::new(snapshot),
        }
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    /// Parses `text` and makes it current unless a newer version is already installed.
    fn update(&self, uri: &str, version: i32, text: String) -> Arc<Snapshot> {
        let _parsing = self.parsing.lock();
        if let Some(current) = self.newer_than(uri, version) {
            return current;
        }
        self.swap(uri, Arc::new(Snapshot::new(version, text)))
    }

    /// Installs an already parsed snapshot, with the same version check as [`Document::update`].
    fn install(&self, uri: &str, snapshot: Arc<Snapshot>) -> Arc<Snapshot> {
        let _parsing = self.parsing.lock();
        if let Some(current) = self.newer_than(uri, snapshot.version) {
            return current;
        }
        self.swap(uri, snapshot)
    }

    fn newer_than(&self, uri: &str, version: i32) -> Option<Arc<Snapshot>> {
        let current = self.current.read();
        if version >= current.version {
            return None;
        }
        tracing::warn!(
            uri,
            version,
            current = current.version,
            "dropping stale document version"
        );
        Some(Arc::clone(&current))
    }

    fn swap(&self, uri: &str, snapshot: Arc<Snapshot>) -> Arc<Snapshot> {
        *self.current.write() = Arc::clone(&snapshot);
        tracing::debug!(
            uri,
            version = snapshot.version,
            diagnostics = snapshot.parse.diagnostics.len(),
            "swapped document snapshot"
        );
        snapshot
    }
}

/// Open documents keyed by URI.
///
/// Documents are independent: different documents can be parsed on different threads at
/// the same time, while parses of one document run one after another.
#[derive(Default)]
pub struct DocumentStore {
    docs: RwLock<HashMap<String, Arc<Document>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn document(&self, uri: &str) -> Option<Arc<Document>> {
        self.docs.read().get(uri).cloned()
    }

    /// Opens a document, or updates it if it is already open.
    pub fn open(&self, uri: &str, version: i32, text: impl Into<String>) -> Arc<Snapshot> {
        if let Some(doc) = self.document(uri) {
            return doc.update(uri, version, text.into());
        }

        // Parse before taking the map lock so other documents are not blocked.
        let snapshot = Arc::new(Snapshot::new(version, text.into()));
        let doc = match self.docs.write().entry(uri.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Document::new(Arc::clone(&snapshot))));
                tracing::debug!(uri, version, "opened document");
                return snapshot;
            }
            Entry::Occupied(entry) => Arc::clone(entry.get()),
        };
        doc.install(uri, snapshot)
    }

    /// Replaces the text of an open document.
    ///
    /// A `version` older than the current one is ignored and the current snapshot is
    /// returned.
    pub fn update(
        &self,
        uri: &str,
        version: i32,
        text: impl Into<String>,
    ) -> Result<Arc<Snapshot>, IdeError> {
        let doc = self.document(uri).ok_or_else(|| unknown(uri))?;
        Ok(doc.update(uri, version, text.into()))
    }

    /// Returns `true` if the document was open.
    pub fn close(&self, uri: &str) -> bool {
        let closed = self.docs.write().remove(uri).is_some();
        if closed {
            tracing::debug!(uri, "closed document");
        }
        closed
    }

    pub fn snapshot(&self, uri: &str) -> Result<Arc<Snapshot>, IdeError> {
        self.document(uri)
            .map(|doc| doc.snapshot())
            .ok_or_else(|| unknown(uri))
    }

    /// URIs of all open documents, sorted.
    pub fn uris(&self) -> Vec<String> {
        let mut uris: Vec<_> = self.docs.read().keys().cloned().collect();
        uris.sort();
        uris
    }
}

fn unknown(uri: &str) -> IdeError {
    IdeError::UnknownDocument {
        uri: uri.to_string(),
    }
}
