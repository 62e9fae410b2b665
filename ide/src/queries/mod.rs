//! Read-only feature queries over a [`Snapshot`].
//!
//! Queries take editor positions and return editor ranges. Only names that refer to
//! variables take part: field names (`a.b`), method names, table keys and `goto` labels
//! are skipped.

use std::collections::HashSet;

use lua_analyzer::ast::{Expr, Identifier, Stat, TableField};
use lua_analyzer::{Node, locate, walk};
use serde::Serialize;

use crate::{IdeConfig, IdeError, Position, Range, Snapshot};

mod completion;
mod hover;
mod navigation;

pub use completion::{CompletionItem, complete_locals};
pub use hover::{Hover, hover};
pub use navigation::{definition, highlights};

/// A diagnostic in editor coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticItem {
    pub range: Range,
    pub severity: &'static str,
    pub message: String,
}

/// Diagnostics to publish for a snapshot, in source order, capped by
/// [`IdeConfig::max_diagnostics`].
pub fn diagnostics(snapshot: &Snapshot, config: &IdeConfig) -> Vec<DiagnosticItem> {
    snapshot
        .parse
        .diagnostics
        .iter()
        .filter_map(|d| {
            Some(DiagnosticItem {
                range: snapshot.range(d.span)?,
                severity: d.severity.as_str(),
                message: d.message.clone(),
            })
        })
        .take(config.max_diagnostics)
        .collect()
}

/// Every identifier that names a variable, in source order.
pub(crate) fn variable_occurrences<'a>(snapshot: &'a Snapshot) -> Vec<&'a Identifier> {
    let mut names = HashSet::new();
    let mut out = Vec::new();
    walk(&snapshot.parse.block, &mut |node: Node<'a>| {
        match node {
            Node::Identifier(id) => {
                if !names.contains(&(id as *const Identifier)) && !id.name().is_empty() {
                    out.push(id);
                }
            }
            Node::Expr(Expr::Field(f)) => {
                names.insert(&f.name as *const Identifier);
            }
            Node::Expr(Expr::MethodCall(m)) => {
                names.insert(&m.name as *const Identifier);
            }
            Node::TableField(TableField::Named(f)) => {
                names.insert(&f.name as *const Identifier);
            }
            Node::Stat(Stat::Goto(s)) => {
                names.insert(&s.label as *const Identifier);
            }
            Node::Stat(Stat::Label(s)) => {
                names.insert(&s.name as *const Identifier);
            }
            Node::Stat(Stat::Function(s)) => {
                if let Some(method) = &s.method {
                    names.insert(&method.name as *const Identifier);
                }
            }
            _ => {}
        }
        true
    });
    out
}

/// The variable name under the cursor.
///
/// A cursor just past the end of a name (`foo|`) also selects it.
pub(crate) fn name_at(snapshot: &Snapshot, at: Position) -> Result<Option<&Identifier>, IdeError> {
    let pos = snapshot.offset(at)?;
    let block = &snapshot.parse.block;

    let under = |pos: u32| locate(block, pos).and_then(|path| path.node.as_identifier());
    let Some(ident) = under(pos).or_else(|| pos.checked_sub(1).and_then(under)) else {
        return Ok(None);
    };

    let is_variable = variable_occurrences(snapshot)
        .into_iter()
        .any(|occurrence| std::ptr::eq(occurrence, ident));
    Ok(is_variable.then_some(ident))
}
