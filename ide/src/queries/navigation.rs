use lua_analyzer::resolve;

use super::{name_at, variable_occurrences};
use crate::{IdeError, Position, Range, Snapshot};

/// Where the name under the cursor is declared.
///
/// `None` when the cursor is not on a variable name or the name is global.
pub fn definition(snapshot: &Snapshot, at: Position) -> Result<Option<Range>, IdeError> {
    let Some(ident) = name_at(snapshot, at)? else {
        return Ok(None);
    };
    Ok(resolve(&snapshot.parse.block, ident).and_then(|b| snapshot.range(b.ident.token.span)))
}

/// Every occurrence of the variable under the cursor, declaration included, in source order.
///
/// Globals have no declaration; all global uses of the same name are highlighted together.
pub fn highlights(snapshot: &Snapshot, at: Position) -> Result<Vec<Range>, IdeError> {
    let Some(ident) = name_at(snapshot, at)? else {
        return Ok(Vec::new());
    };
    let block = &snapshot.parse.block;
    let target = resolve(block, ident).map(|b| b.ident);

    Ok(variable_occurrences(snapshot)
        .into_iter()
        .filter(|other| other.name() == ident.name())
        .filter(|other| {
            match (resolve(block, other).map(|b| b.ident), target) {
                (Some(decl), Some(target)) => std::ptr::eq(decl, target),
                (None, None) => true,
                _ => false,
            }
        })
        .filter_map(|other| snapshot.range(other.token.span))
        .collect())
}
