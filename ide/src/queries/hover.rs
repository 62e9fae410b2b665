use lua_analyzer::{BindingKind, doc_comment, resolve};
use serde::Serialize;

use super::name_at;
use crate::{IdeConfig, IdeError, Position, Range, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hover {
    /// The hovered name.
    pub range: Range,
    pub name: String,
    /// `local`, `local function`, `parameter`, `loop variable` or `global`.
    pub kind: &'static str,
    /// `---` comment above the declaring statement.
    pub doc: Option<String>,
}

impl Hover {
    /// Markdown for the editor popup.
    pub fn markdown(&self) -> String {
        let mut out = format!("```lua\n({}) {}\n```", self.kind, self.name);
        if let Some(doc) = &self.doc {
            out.push_str("\n\n---\n\n");
            out.push_str(doc);
        }
        out
    }
}

pub fn hover(
    snapshot: &Snapshot,
    at: Position,
    config: &IdeConfig,
) -> Result<Option<Hover>, IdeError> {
    let Some(ident) = name_at(snapshot, at)? else {
        return Ok(None);
    };
    let Some(range) = snapshot.range(ident.token.span) else {
        return Ok(None);
    };

    let binding = resolve(&snapshot.parse.block, ident);
    let doc = binding
        .filter(|b| {
            config.hover_doc_comments
                && matches!(b.kind, BindingKind::Local | BindingKind::LocalFunction)
        })
        .and_then(|b| doc_comment(&b.decl.leading_trivia));

    Ok(Some(Hover {
        range,
        name: ident.name().to_string(),
        kind: binding.map_or("global", |b| b.kind.as_str()),
        doc,
    }))
}
