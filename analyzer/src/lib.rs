//! Lua syntax core.
//!
//! Pipeline: lex → parse → traverse/resolve.
//! All spans are UTF-8 byte offsets into the original source, using `[start, end)`.
//! UTF-16 conversion for editors goes through [`LineIndex`].

pub mod ast;
mod diagnostics;
pub mod lexer;
mod line_index;
pub mod parser;
pub mod scope;
mod span;
mod tests;
pub mod traverse;

pub use ast::{AstNode, Block, Node, NodeKind};
pub use diagnostics::{Diagnostic, Diagnostics, Label, Severity, format_diagnostics};
pub use lexer::{LexOutput, Token, TokenKind, Trivia, doc_comment, lex};
pub use line_index::{LineCol, LineIndex, Utf16LineCol};
pub use parser::{MAX_DEPTH, ParseOutput, parse};
pub use scope::{Binding, BindingKind, Bindings, Lookup, locals_at, resolve};
pub use span::{INVALID_POSITION, Position, Span};
pub use traverse::{NodePath, locate, walk};
