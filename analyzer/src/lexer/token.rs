//! Lexer tokens, trivia, and the keyword/symbol tables.
//!
//! [`Span`] uses UTF-8 byte offsets into the original source and is half-open `[start, end)`.
//! The lexer also emits a [`TokenKind::Eof`] token with an empty span at end of input; its
//! leading trivia holds whatever whitespace and comments trail the last real token.

use crate::span::{Position, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /* Keywords */
    And,
    Break,
    Do,
    Else,
    ElseIf,
    End,
    False,
    For,
    Function,
    Goto,
    If,
    In,
    Local,
    Nil,
    Not,
    Or,
    Repeat,
    Return,
    Then,
    True,
    Until,
    While,

    /* Expression-operator symbols. */
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `//`
    SlashSlash,
    /// `%`
    Percent,
    /// `^`
    Caret,
    /// `#`
    Pound,
    /// `&`
    Amp,
    /// `~`
    Tilde,
    /// `|`
    Pipe,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `==`
    EqEq,
    /// `~=`
    Ne,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `..`
    DotDot,

    /* Structural symbols */
    /// `=`
    Eq,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `::`
    ColonColon,
    /// `;`
    Semi,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `...`
    DotDotDot,

    /* Literals */
    /// Numeric literal, decimal or hex.
    Number,
    /// Short (`'..'`, `".."`) or long (`[[..]]`) string literal.
    String,
    /// Identifier token.
    Ident,

    /// Malformed input; always paired with a lexer diagnostic.
    Invalid,
    /// End Of File
    Eof,
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("and", TokenKind::And),
    ("break", TokenKind::Break),
    ("do", TokenKind::Do),
    ("else", TokenKind::Else),
    ("elseif", TokenKind::ElseIf),
    ("end", TokenKind::End),
    ("false", TokenKind::False),
    ("for", TokenKind::For),
    ("function", TokenKind::Function),
    ("goto", TokenKind::Goto),
    ("if", TokenKind::If),
    ("in", TokenKind::In),
    ("local", TokenKind::Local),
    ("nil", TokenKind::Nil),
    ("not", TokenKind::Not),
    ("or", TokenKind::Or),
    ("repeat", TokenKind::Repeat),
    ("return", TokenKind::Return),
    ("then", TokenKind::Then),
    ("true", TokenKind::True),
    ("until", TokenKind::Until),
    ("while", TokenKind::While),
];

const SYMBOLS: &[(&str, TokenKind)] = &[
    ("...", TokenKind::DotDotDot),
    ("..", TokenKind::DotDot),
    ("==", TokenKind::EqEq),
    ("~=", TokenKind::Ne),
    ("<=", TokenKind::Le),
    (">=", TokenKind::Ge),
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Shr),
    ("//", TokenKind::SlashSlash),
    ("::", TokenKind::ColonColon),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("^", TokenKind::Caret),
    ("#", TokenKind::Pound),
    ("&", TokenKind::Amp),
    ("~", TokenKind::Tilde),
    ("|", TokenKind::Pipe),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("=", TokenKind::Eq),
    ("(", TokenKind::OpenParen),
    (")", TokenKind::CloseParen),
    ("{", TokenKind::OpenBrace),
    ("}", TokenKind::CloseBrace),
    ("[", TokenKind::OpenBracket),
    ("]", TokenKind::CloseBracket),
    (";", TokenKind::Semi),
    (":", TokenKind::Colon),
    (",", TokenKind::Comma),
    (".", TokenKind::Dot),
];

/// Looks up the exact identifier text in the keyword table.
pub fn keyword(text: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(kw, _)| *kw == text)
        .map(|(_, kind)| *kind)
}

/// Longest-match lookup of an operator/punctuation symbol at the start of `rest`.
///
/// Returns the kind and its byte length. The table is ordered longest-first.
pub fn match_symbol(rest: &str) -> Option<(TokenKind, usize)> {
    SYMBOLS
        .iter()
        .find(|(sym, _)| rest.starts_with(sym))
        .map(|(sym, kind)| (*kind, sym.len()))
}

impl TokenKind {
    /// Fixed source spelling for keywords and symbols.
    pub fn as_str(&self) -> Option<&'static str> {
        KEYWORDS
            .iter()
            .chain(SYMBOLS.iter())
            .find(|(_, kind)| kind == self)
            .map(|(text, _)| *text)
    }

    pub fn is_keyword(&self) -> bool {
        KEYWORDS.iter().any(|(_, kind)| kind == self)
    }

    /// Tokens that close a block without being consumed by it.
    pub fn is_block_end(&self) -> bool {
        matches!(
            self,
            TokenKind::Eof
                | TokenKind::End
                | TokenKind::Else
                | TokenKind::ElseIf
                | TokenKind::Until
        )
    }

    /// Human-readable description used in diagnostics.
    pub fn describe(&self) -> String {
        if let Some(spelling) = self.as_str() {
            return format!("'{spelling}'");
        }
        match self {
            TokenKind::Number => "number".into(),
            TokenKind::String => "string literal".into(),
            TokenKind::Ident => "identifier".into(),
            TokenKind::Invalid => "invalid token".into(),
            TokenKind::Eof => "end of input".into(),
            other => format!("{other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `-- ...` up to the end of the line.
    Line,
    /// `--[==[ ... ]==]`.
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaKind {
    Whitespace,
    Comment(CommentKind),
}

/// Whitespace or a comment, kept verbatim in front of the token it precedes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
    pub span: Span,
}

impl Trivia {
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TriviaKind::Comment(_))
    }

    /// `---` line comments, read by hover as documentation.
    pub fn is_doc_comment(&self) -> bool {
        self.kind == TriviaKind::Comment(CommentKind::Line) && self.text.starts_with("---")
    }
}

/// Joins the run of `---` comments that directly precedes a token.
///
/// Only comments on consecutive lines immediately above the token count: a blank line or any
/// other comment ends the run. The `---` marker and one following space are stripped.
///
/// ```text
/// --- Adds two numbers.
/// --- Returns their sum.
/// local function add(a, b)   -- doc: "Adds two numbers.\nReturns their sum."
/// ```
pub fn doc_comment(trivia: &[Trivia]) -> Option<String> {
    let mut lines = Vec::new();
    for t in trivia.iter().rev() {
        match t.kind {
            TriviaKind::Whitespace if t.text.matches('\n').count() <= 1 => {}
            _ if t.is_doc_comment() => {
                let line = t.text.trim_start_matches('-');
                let line = line.strip_prefix(' ').unwrap_or(line);
                lines.push(line.trim_end().to_string());
            }
            _ => break,
        }
    }
    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    Some(lines.join("\n"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A token with its source span and the trivia that precedes it.
///
/// `span` is a byte offset range into the original source (`[start, end)`) and covers
/// `text` only, never the trivia.
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    pub leading_trivia: Vec<Trivia>,
}

impl Token {
    /// A zero-width stand-in for a token the parser expected but did not find.
    pub fn missing(kind: TokenKind, at: Position) -> Self {
        Token {
            kind,
            text: String::new(),
            span: Span::empty(at),
            leading_trivia: Vec::new(),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.text.is_empty() && self.kind != TokenKind::Eof
    }

    pub fn can_begin_expr(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Ident
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::Nil
                | TokenKind::True
                | TokenKind::False
                | TokenKind::DotDotDot
                | TokenKind::Function
                | TokenKind::OpenBrace
                | TokenKind::OpenParen
                | TokenKind::Not
                | TokenKind::Minus
                | TokenKind::Pound
                | TokenKind::Tilde
        )
    }

    /// Writes the trivia and the token text back out in source order.
    pub fn write_source(&self, out: &mut String) {
        for trivia in &self.leading_trivia {
            out.push_str(&trivia.text);
        }
        out.push_str(&self.text);
    }
}

/// Rebuilds the source text from a token stream.
pub fn reconstruct(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        token.write_source(&mut out);
    }
    out
}
