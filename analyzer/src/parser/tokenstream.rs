use crate::lexer::{Token, TokenKind};
use crate::span::{Position, Span};

/// Forward cursor over lexer tokens.
///
/// The token vector always ends with exactly one [`TokenKind::Eof`]; the cursor never moves
/// past it, so `cur()` and `peek()` are always valid.
pub struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenCursor {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                span: Span::empty(end),
                leading_trivia: Vec::new(),
            });
        }
        TokenCursor { tokens, pos: 0 }
    }

    pub fn cur(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// The token after `cur()`, or EOF.
    pub fn peek(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)]
    }

    pub fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    /// End of the last consumed token, or the start of input.
    pub fn last_end(&self) -> Position {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or(0)
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len() - 1);
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}
