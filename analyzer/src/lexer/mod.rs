use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::line_index::LineIndex;
use crate::span::{Position, Span};

mod token;

pub use token::{
    CommentKind, Token, TokenKind, Trivia, TriviaKind, doc_comment, keyword, match_symbol,
    reconstruct,
};

pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub line_index: LineIndex,
    pub diagnostics: Vec<Diagnostic>,
}

/// Lex the input into tokens.
///
/// - Whitespace and comments become [`Trivia`] on the following token; the final
///   [`TokenKind::Eof`] token carries any trailing trivia.
/// - Malformed literals and unknown characters become [`TokenKind::Invalid`] tokens plus a
///   diagnostic. Every call to `next_token` consumes at least one character, so lexing always
///   terminates.
/// - Every `\n` consumed, inside trivia or literals alike, is recorded in the [`LineIndex`].
pub fn lex(input: &str) -> LexOutput {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if eof {
            break;
        }
    }

    LexOutput {
        tokens,
        line_index: LineIndex::new(lexer.line_breaks, input.len() as Position),
        diagnostics: lexer.diagnostics.diags,
    }
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line_breaks: Vec<Position>,
    diagnostics: Diagnostics,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src,
            pos: 0,
            line_breaks: Vec::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        if c == '\n' {
            self.line_breaks.push(self.pos as Position);
        }
        self.pos += c.len_utf8();
        Some(c)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let mut n = 0;
        while self.peek().is_some_and(&pred) {
            self.bump();
            n += 1;
        }
        n
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start as Position, self.pos as Position)
    }

    fn next_token(&mut self) -> Token {
        let leading_trivia = self.lex_trivia();
        let start = self.pos;

        let Some(ch) = self.peek() else {
            return Token {
                kind: TokenKind::Eof,
                text: String::new(),
                span: Span::empty(start as Position),
                leading_trivia,
            };
        };

        let kind = match ch {
            '"' | '\'' => self.lex_short_string(ch),
            '[' if matches!(self.peek_nth(1), Some('[' | '=')) => self.lex_long_string(),
            c if c.is_ascii_digit() => self.lex_number(),
            '.' if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => self.lex_number(),
            c if is_ident_start(c) => {
                self.bump_while(is_ident_continue);
                keyword(&self.src[start..self.pos]).unwrap_or(TokenKind::Ident)
            }
            _ => match match_symbol(self.rest()) {
                Some((kind, len)) => {
                    // Symbols never contain a newline.
                    self.pos += len;
                    kind
                }
                None => {
                    self.bump();
                    self.diagnostics.emit_error(
                        self.span_from(start),
                        format!("unexpected character '{}'", ch.escape_debug()),
                    );
                    TokenKind::Invalid
                }
            },
        };

        Token {
            kind,
            text: self.src[start..self.pos].to_string(),
            span: self.span_from(start),
            leading_trivia,
        }
    }

    fn lex_trivia(&mut self) -> Vec<Trivia> {
        let mut trivia = Vec::new();
        loop {
            let start = self.pos;
            let kind = match self.peek() {
                Some(c) if is_whitespace(c) => {
                    self.bump_while(is_whitespace);
                    TriviaKind::Whitespace
                }
                Some('-') if self.peek_nth(1) == Some('-') => {
                    self.pos += 2;
                    TriviaKind::Comment(self.lex_comment_body(start))
                }
                _ => break,
            };
            trivia.push(Trivia {
                kind,
                text: self.src[start..self.pos].to_string(),
                span: self.span_from(start),
            });
        }
        trivia
    }

    /// Lexes the part of a comment after `--`.
    fn lex_comment_body(&mut self, start: usize) -> CommentKind {
        if let Some(level) = self.long_bracket_level() {
            self.consume_long_open(level);
            if !self.consume_long_body(level) {
                self.diagnostics
                    .emit_error(self.span_from(start), "unfinished long comment");
            }
            return CommentKind::Block;
        }

        self.bump_while(|c| c != '\n');
        CommentKind::Line
    }

    /// If a long bracket `[=*[` opens at the cursor, returns its level (the `=` count).
    fn long_bracket_level(&self) -> Option<usize> {
        let rest = self.rest().as_bytes();
        if rest.first() != Some(&b'[') {
            return None;
        }
        let level = rest[1..].iter().take_while(|b| **b == b'=').count();
        (rest.get(1 + level) == Some(&b'[')).then_some(level)
    }

    fn consume_long_open(&mut self, level: usize) {
        // `[`, `=` * level, `[`; ASCII only.
        self.pos += level + 2;
    }

    /// Scans to the matching `]=*]` of the same level. Returns `false` at end of input.
    ///
    /// A `]` followed by a different number of `=` does not close the bracket; scanning
    /// resumes right after that `=` run, so its trailing `]` can still start a real close.
    fn consume_long_body(&mut self, level: usize) -> bool {
        while let Some(c) = self.bump() {
            if c != ']' {
                continue;
            }
            let n = self.bump_while(|c| c == '=');
            if n == level && self.peek() == Some(']') {
                self.bump();
                return true;
            }
        }
        false
    }

    fn lex_long_string(&mut self) -> TokenKind {
        let start = self.pos;
        let Some(level) = self.long_bracket_level() else {
            self.bump(); // '['
            self.bump_while(|c| c == '=');
            self.diagnostics
                .emit_error(self.span_from(start), "invalid long string delimiter");
            return TokenKind::Invalid;
        };

        self.consume_long_open(level);
        if self.consume_long_body(level) {
            TokenKind::String
        } else {
            self.diagnostics
                .emit_error(self.span_from(start), "unfinished long string");
            TokenKind::Invalid
        }
    }

    fn lex_short_string(&mut self, quote: char) -> TokenKind {
        let start = self.pos;
        self.bump(); // quote

        loop {
            match self.peek() {
                None | Some('\n' | '\r') => {
                    self.diagnostics
                        .emit_error(self.span_from(start), "unfinished string");
                    return TokenKind::Invalid;
                }
                Some(c) if c == quote => {
                    self.bump();
                    return TokenKind::String;
                }
                Some('\\') => {
                    let esc_start = self.pos;
                    self.bump();
                    self.lex_escape(esc_start);
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Consumes one escape sequence after the backslash.
    ///
    /// Bad escapes are kept in the token text and reported as warnings; only the closing
    /// quote and line ends decide where the string stops.
    fn lex_escape(&mut self, esc_start: usize) {
        match self.peek() {
            None => {}
            Some('n' | 't' | 'a' | 'b' | 'f' | 'r' | 'v' | '\\' | '"' | '\'') => {
                self.bump();
            }
            Some('\n') => {
                self.bump();
                if self.peek() == Some('\r') {
                    self.bump();
                }
            }
            Some('\r') => {
                self.bump();
                if self.peek() == Some('\n') {
                    self.bump();
                }
            }
            Some('z') => {
                self.bump();
                self.bump_while(is_whitespace);
            }
            Some('x') => {
                self.bump();
                let mut digits = 0;
                while digits < 2 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                    self.bump();
                    digits += 1;
                }
                if digits < 2 {
                    self.diagnostics
                        .emit_warning(self.span_from(esc_start), "hexadecimal digit expected");
                }
            }
            Some('u') => {
                self.bump();
                let ok = self.peek() == Some('{') && {
                    self.bump();
                    let digits = self.bump_while(|c| c.is_ascii_hexdigit());
                    digits > 0 && self.peek() == Some('}')
                };
                if ok {
                    self.bump();
                } else {
                    self.diagnostics
                        .emit_warning(self.span_from(esc_start), "malformed unicode escape");
                }
            }
            Some(c) if c.is_ascii_digit() => {
                let digits_start = self.pos;
                let mut digits = 0;
                while digits < 3 && self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                    digits += 1;
                }
                let value: u32 = self.src[digits_start..self.pos].parse().unwrap_or(0);
                if value > 255 {
                    self.diagnostics
                        .emit_warning(self.span_from(esc_start), "decimal escape too large");
                }
            }
            Some(c) => {
                self.bump();
                self.diagnostics.emit_warning(
                    self.span_from(esc_start),
                    format!("invalid escape sequence '\\{}'", c.escape_debug()),
                );
            }
        }
    }

    /// Single forward scan: digits for the base, optional fraction, optional exponent.
    fn lex_number(&mut self) -> TokenKind {
        let start = self.pos;
        let hex = self.rest().starts_with("0x") || self.rest().starts_with("0X");
        let is_digit = |c: char| {
            if hex {
                c.is_ascii_hexdigit()
            } else {
                c.is_ascii_digit()
            }
        };

        let mut malformed = false;
        let mut digits = 0;
        if hex {
            self.pos += 2;
        }
        digits += self.bump_while(is_digit);
        if self.peek() == Some('.') {
            self.bump();
            digits += self.bump_while(is_digit);
        }
        if digits == 0 {
            malformed = true;
        }

        let exponent = if hex { ['p', 'P'] } else { ['e', 'E'] };
        if self.peek().is_some_and(|c| exponent.contains(&c)) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if self.bump_while(|c| c.is_ascii_digit()) == 0 {
                malformed = true;
            }
        }

        // A numeral runs on through letters and dots, so `3..2` is one malformed token.
        if self.bump_while(|c| c == '.' || is_ident_continue(c)) > 0 {
            malformed = true;
        }

        if malformed {
            self.diagnostics
                .emit_error(self.span_from(start), "malformed number");
            TokenKind::Invalid
        } else {
            TokenKind::Number
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0B' | '\x0C')
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}
