use lua_analyzer::{Lookup, locals_at};
use serde::Serialize;

use crate::{IdeConfig, IdeError, Position, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    pub label: String,
    /// Binding kind, e.g. `parameter`.
    pub detail: &'static str,
}

/// Local names visible at the cursor that extend the name being typed.
///
/// Names are listed latest declared first; at most [`IdeConfig::completion_limit`]
/// items are returned.
pub fn complete_locals(
    snapshot: &Snapshot,
    at: Position,
    config: &IdeConfig,
) -> Result<Vec<CompletionItem>, IdeError> {
    let pos = snapshot.offset(at)?;
    let prefix = typed_prefix(&snapshot.text, pos);

    let locals = locals_at(&snapshot.parse.block, pos, Lookup::All);
    Ok(locals
        .values()
        .rev()
        .filter(|b| b.name().starts_with(prefix))
        .take(config.completion_limit)
        .map(|b| CompletionItem {
            label: b.name().to_string(),
            detail: b.kind.as_str(),
        })
        .collect())
}

/// Identifier characters directly before `pos`.
fn typed_prefix(text: &str, pos: u32) -> &str {
    let before = text.get(..pos as usize).unwrap_or_default();
    let start = before
        .char_indices()
        .rev()
        .find(|(_, c)| !(*c == '_' || c.is_ascii_alphanumeric()))
        .map_or(0, |(i, c)| i + c.len_utf8());
    &before[start..]
}
