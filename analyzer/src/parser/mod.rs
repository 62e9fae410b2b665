//! Recursive-descent parser for Lua chunks.
//!
//! Inputs: a [`TokenCursor`] over lexer tokens that carry their leading trivia and end with an
//! explicit EOF token. Spans are UTF-8 byte offsets into the original source, with half-open
//! semantics `[start, end)`.
//!
//! The parser never fails: every syntax error becomes a diagnostic plus a zero-width missing
//! token or an `Invalid` node, and parsing continues. Each statement-level iteration consumes
//! at least one token, so parsing terminates on any input.

use crate::ast::Block;
use crate::diagnostics::{Diagnostic, Diagnostics, Label};
use crate::lexer::{Token, TokenKind, lex};
use crate::line_index::LineIndex;
use crate::span::{Position, Span};

mod expr;
mod stat;
mod tokenstream;
pub use tokenstream::TokenCursor;

/// Nesting limit for blocks and expressions. Each operator or suffix in a chain such as
/// `a + b + c` or `a.b.c` also counts as one level, so the tree is never deeper than this.
pub const MAX_DEPTH: usize = 200;

/// Remaining stack below which a nesting level continues on a fresh heap segment.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

#[derive(Debug)]
pub struct ParseOutput {
    pub block: Block,
    /// The full token stream, ending with EOF. Concatenating every token's trivia and text
    /// reproduces the source.
    pub tokens: Vec<Token>,
    pub line_index: LineIndex,
    /// Lexer and parser diagnostics, ordered by position.
    pub diagnostics: Vec<Diagnostic>,
}

/// Lexes and parses a whole chunk.
pub fn parse(source: &str) -> ParseOutput {
    let _span = tracing::debug_span!("parse", len = source.len()).entered();

    let lexed = lex(source);
    let mut parser = Parser::new(TokenCursor::new(lexed.tokens));
    let block = parser.parse_chunk();
    let (tokens, parse_diags) = parser.finish();

    let mut diagnostics = lexed.diagnostics;
    diagnostics.extend(parse_diags);
    diagnostics.sort_by_key(|d| (d.span.start, d.span.end));

    tracing::debug!(
        tokens = tokens.len(),
        stats = block.stats.len(),
        diagnostics = diagnostics.len(),
        "parsed chunk"
    );

    ParseOutput {
        block,
        tokens,
        line_index: lexed.line_index,
        diagnostics,
    }
}

/// Position to rewind to when a speculative parse turns out wrong.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    pos: usize,
    diagnostics: usize,
}

pub struct Parser {
    token_cursor: TokenCursor,
    diagnostics: Diagnostics,
    depth: usize,
    /// Set once the nesting limit is hit; the rest of the input is swallowed and later
    /// diagnostics are suppressed.
    too_deep: bool,
}

impl Parser {
    pub fn new(token_cursor: TokenCursor) -> Self {
        Parser {
            token_cursor,
            diagnostics: Diagnostics::default(),
            depth: 0,
            too_deep: false,
        }
    }

    pub fn finish(self) -> (Vec<Token>, Vec<Diagnostic>) {
        (self.token_cursor.into_tokens(), self.diagnostics.diags)
    }

    fn cur(&self) -> &Token {
        self.token_cursor.cur()
    }

    fn peek(&self) -> &Token {
        self.token_cursor.peek()
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.cur().kind == kind
    }

    fn bump(&mut self) -> Token {
        self.token_cursor.bump()
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        self.at(kind).then(|| self.bump())
    }

    /// End of the last consumed token. Missing tokens and empty lists are anchored here.
    fn last_end(&self) -> Position {
        self.token_cursor.last_end()
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.token_cursor.pos(),
            diagnostics: self.diagnostics.len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        tracing::trace!(
            from = self.token_cursor.pos(),
            to = checkpoint.pos,
            "rewinding parser"
        );
        self.token_cursor.reset(checkpoint.pos);
        self.diagnostics.truncate(checkpoint.diagnostics);
    }

    /// Consumes a token of `kind`, or reports it and returns a zero-width missing token.
    fn expect(&mut self, kind: TokenKind) -> Token {
        if let Some(tok) = self.eat(kind) {
            return tok;
        }
        self.emit_unexpected(&kind.describe());
        Token::missing(kind, self.last_end())
    }

    /// Like [`Parser::expect`], for a token that closes `opener`; the diagnostic points back at
    /// the opener.
    fn expect_closing(&mut self, kind: TokenKind, opener: &Token) -> Token {
        if let Some(tok) = self.eat(kind) {
            return tok;
        }
        let found = self.cur().clone();
        let mut labels = Vec::new();
        if !opener.is_missing() {
            labels.push(Label {
                span: opener.span,
                message: Some(format!("this '{}' is not closed", opener.text)),
            });
        }
        self.error_with_labels(
            found.span,
            format!(
                "expected {}, found {}",
                kind.describe(),
                found.kind.describe()
            ),
            labels,
        );
        Token::missing(kind, self.last_end())
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.error_with_labels(span, message, vec![]);
    }

    /// Reports an error unless one was already reported at the same position, which keeps a
    /// single mistake from cascading into a pile of diagnostics.
    fn error_with_labels(&mut self, span: Span, message: impl Into<String>, labels: Vec<Label>) {
        if self.too_deep {
            return;
        }
        if self
            .diagnostics
            .diags
            .last()
            .is_some_and(|d| d.span.start == span.start)
        {
            tracing::trace!(at = span.start, "suppressing cascading diagnostic");
            return;
        }
        self.diagnostics
            .emit_error_with_labels(span, message, labels);
    }

    fn emit_unexpected(&mut self, expected: &str) {
        let found = self.cur().clone();
        self.error(
            found.span,
            format!("expected {expected}, found {}", found.kind.describe()),
        );
    }

    /// Enters one nesting level. Returns `false` once the limit is exceeded, after consuming
    /// the rest of the input into `swallowed`.
    fn enter(&mut self, swallowed: &mut Vec<Token>) -> bool {
        if self.too_deep {
            return false;
        }
        if self.depth >= MAX_DEPTH {
            let at = self.cur().span;
            self.error(at, "chunk has too many syntax levels");
            self.too_deep = true;
            tracing::trace!(depth = self.depth, "nesting limit reached");
            while !self.at(TokenKind::Eof) {
                swallowed.push(self.bump());
            }
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.leave_levels(1);
    }

    fn leave_levels(&mut self, levels: usize) {
        self.depth -= levels;
    }
}
