//! Expression parsing (precedence climbing).
//!
//! Spans are UTF-8 byte offsets with half-open semantics `[start, end)`.

use super::{Parser, STACK_RED_ZONE, STACK_SEGMENT};
use crate::ast::*;
use crate::lexer::{Token, TokenKind};

impl Parser {
    /// Parses an expression.
    ///
    /// ```text
    /// `1 + 2 * 3`   parses as `1 + (2 * 3)`
    /// `a .. b .. c` parses as `a .. (b .. c)`   // right-associative
    /// `not a == b`  parses as `(not a) == b`
    /// `-x ^ 2`      parses as `-(x ^ 2)`
    /// ```
    pub fn parse_expr(&mut self) -> Expr {
        self.parse_expr_assoc_with(0)
    }

    /// Parses an expression whose binary operators all have a left priority above `limit`.
    fn parse_expr_assoc_with(&mut self, limit: u8) -> Expr {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            self.parse_expr_assoc_inner(limit)
        })
    }

    fn parse_expr_assoc_inner(&mut self, limit: u8) -> Expr {
        let mut swallowed = Vec::new();
        if !self.enter(&mut swallowed) {
            return Expr::Invalid(InvalidExpr {
                expr: None,
                tokens: swallowed,
                anchor: self.last_end(),
            });
        }

        let mut lhs = self.parse_expr_prefix();
        let mut links = 0;
        while let Some(kind) = binop_kind(self.cur().kind) {
            let (left, right) = kind.binding_power();
            if left <= limit {
                break;
            }
            if !self.enter(&mut swallowed) {
                lhs = self.cut_off(lhs, swallowed);
                break;
            }
            links += 1;
            let token = self.bump();
            let rhs = self.parse_expr_assoc_with(right);
            lhs = Expr::Binary(BinaryExpr {
                lhs: Box::new(lhs),
                op: BinOp { kind, token },
                rhs: Box::new(rhs),
            });
        }

        self.leave_levels(links + 1);
        lhs
    }

    /// Keeps the part of a chain parsed before the nesting limit tripped, followed by the
    /// tokens swallowed after it.
    fn cut_off(&self, expr: Expr, swallowed: Vec<Token>) -> Expr {
        Expr::Invalid(InvalidExpr {
            expr: Some(Box::new(expr)),
            tokens: swallowed,
            anchor: self.last_end(),
        })
    }

    /// Parses a prefix-unary-operator expr or a simple expression.
    fn parse_expr_prefix(&mut self) -> Expr {
        let Some(kind) = unop_kind(self.cur().kind) else {
            return self.parse_simple_expr();
        };
        let token = self.bump();
        let operand = self.parse_expr_assoc_with(kind.binding_power());
        Expr::Unary(UnaryExpr {
            op: UnOp { kind, token },
            operand: Box::new(operand),
        })
    }

    fn parse_simple_expr(&mut self) -> Expr {
        let lit = |kind: LitKind, token: Token| Expr::Lit(Literal { kind, token });
        match self.cur().kind {
            TokenKind::Nil => lit(LitKind::Nil, self.bump()),
            TokenKind::True => lit(LitKind::True, self.bump()),
            TokenKind::False => lit(LitKind::False, self.bump()),
            TokenKind::Number => lit(LitKind::Number, self.bump()),
            TokenKind::String => lit(LitKind::String, self.bump()),
            TokenKind::DotDotDot => Expr::Vararg(VarargExpr { token: self.bump() }),
            TokenKind::OpenBrace => Expr::Table(self.parse_table()),
            TokenKind::Function => {
                let function = self.bump();
                let body = self.parse_func_body(&function);
                Expr::Function(FunctionExpr { function, body })
            }
            _ => self.parse_suffixed_expr(true),
        }
    }

    /// Parses a name or parenthesized expression followed by any number of `.name`, `[expr]`,
    /// `:name args` and call suffixes.
    ///
    /// With `allow_call` unset only `.name` and `[expr]` suffixes are taken, which is how a
    /// `function a.b.c:m()` name is read.
    pub(super) fn parse_suffixed_expr(&mut self, allow_call: bool) -> Expr {
        let mut expr = self.parse_primary_expr();
        let mut links = 0;
        loop {
            let is_suffix = match self.cur().kind {
                TokenKind::Dot | TokenKind::OpenBracket => true,
                TokenKind::Colon
                | TokenKind::OpenParen
                | TokenKind::String
                | TokenKind::OpenBrace => allow_call,
                _ => false,
            };
            if !is_suffix {
                break;
            }
            let mut swallowed = Vec::new();
            if !self.enter(&mut swallowed) {
                expr = self.cut_off(expr, swallowed);
                break;
            }
            links += 1;
            expr = self.parse_suffix(expr);
        }
        self.leave_levels(links);
        expr
    }

    /// Applies the suffix at the current token to `base`.
    fn parse_suffix(&mut self, base: Expr) -> Expr {
        let base = Box::new(base);
        match self.cur().kind {
            TokenKind::Dot => {
                let dot = self.bump();
                let name = self.expect_ident();
                Expr::Field(FieldExpr { base, dot, name })
            }
            TokenKind::OpenBracket => {
                let open = self.bump();
                let index = self.parse_expr();
                let close = self.expect_closing(TokenKind::CloseBracket, &open);
                Expr::Index(IndexExpr {
                    base,
                    open,
                    index: Box::new(index),
                    close,
                })
            }
            TokenKind::Colon => {
                let colon = self.bump();
                let name = self.expect_ident();
                let args = self.parse_call_args();
                Expr::MethodCall(MethodCallExpr {
                    receiver: base,
                    colon,
                    name,
                    args,
                })
            }
            _ => {
                let args = self.parse_call_args();
                Expr::Call(CallExpr { callee: base, args })
            }
        }
    }

    fn parse_primary_expr(&mut self) -> Expr {
        match self.cur().kind {
            TokenKind::Ident => Expr::Name(Identifier { token: self.bump() }),
            TokenKind::OpenParen => {
                let open = self.bump();
                let inner = self.parse_expr();
                let close = self.expect_closing(TokenKind::CloseParen, &open);
                Expr::Paren(ParenExpr {
                    open,
                    inner: Box::new(inner),
                    close,
                })
            }
            // Already reported by the lexer.
            TokenKind::Invalid => {
                let tok = self.bump();
                Expr::Invalid(InvalidExpr {
                    expr: None,
                    anchor: tok.span.start,
                    tokens: vec![tok],
                })
            }
            _ => self.error_expr(),
        }
    }

    /// Reports a missing expression.
    ///
    /// Keywords and tokens a caller may be waiting for (closers, separators) are left in
    /// place; anything else is consumed into the [`InvalidExpr`].
    fn error_expr(&mut self) -> Expr {
        self.emit_unexpected("expression");
        let anchor = self.last_end();
        let tokens = if is_sync_token(self.cur().kind) {
            Vec::new()
        } else {
            vec![self.bump()]
        };
        Expr::Invalid(InvalidExpr {
            expr: None,
            tokens,
            anchor,
        })
    }

    fn parse_call_args(&mut self) -> CallArgs {
        match self.cur().kind {
            TokenKind::String => CallArgs::String(Literal {
                kind: LitKind::String,
                token: self.bump(),
            }),
            TokenKind::OpenBrace => CallArgs::Table(self.parse_table()),
            TokenKind::OpenParen => {
                let open = self.bump();
                let args = if self.at(TokenKind::CloseParen) {
                    Punctuated::new(self.last_end())
                } else {
                    self.parse_expr_list()
                };
                let close = self.expect_closing(TokenKind::CloseParen, &open);
                CallArgs::Paren { open, args, close }
            }
            _ => {
                self.emit_unexpected("function arguments");
                let at = self.last_end();
                CallArgs::Paren {
                    open: Token::missing(TokenKind::OpenParen, at),
                    args: Punctuated::new(at),
                    close: Token::missing(TokenKind::CloseParen, at),
                }
            }
        }
    }

    /// `{ field {sep field} [sep] }` where `sep` is `,` or `;`.
    fn parse_table(&mut self) -> TableExpr {
        let open = self.bump();
        let mut fields = Punctuated::new(open.span.end);
        while self.cur().can_begin_expr() || self.at(TokenKind::OpenBracket) {
            fields.push(self.parse_table_field());
            match self.cur().kind {
                TokenKind::Comma | TokenKind::Semi => {
                    let sep = self.bump();
                    fields.push_delimiter(sep);
                }
                _ => break,
            }
        }
        let close = self.expect_closing(TokenKind::CloseBrace, &open);
        TableExpr {
            open,
            fields,
            close,
        }
    }

    fn parse_table_field(&mut self) -> TableField {
        match self.cur().kind {
            TokenKind::OpenBracket => {
                let open = self.bump();
                let key = self.parse_expr();
                let close = self.expect_closing(TokenKind::CloseBracket, &open);
                let eq = self.expect(TokenKind::Eq);
                let value = self.parse_expr();
                TableField::Keyed(KeyedField {
                    open,
                    key,
                    close,
                    eq,
                    value,
                })
            }
            TokenKind::Ident if self.peek().kind == TokenKind::Eq => {
                let name = Identifier { token: self.bump() };
                let eq = self.bump();
                let value = self.parse_expr();
                TableField::Named(NamedField { name, eq, value })
            }
            _ => TableField::Positional(self.parse_expr()),
        }
    }

    /// `( [params] ) block end`; `opener` is the `function` keyword the body belongs to.
    pub(super) fn parse_func_body(&mut self, opener: &Token) -> FuncBody {
        let open = self.expect(TokenKind::OpenParen);
        let mut params = Punctuated::new(self.last_end());
        if !self.at(TokenKind::CloseParen) {
            loop {
                match self.cur().kind {
                    TokenKind::Ident => {
                        params.push(Param::Name(Identifier { token: self.bump() }));
                    }
                    TokenKind::DotDotDot => {
                        params.push(Param::Vararg(VarargExpr { token: self.bump() }));
                        break;
                    }
                    _ => {
                        self.emit_unexpected("parameter name");
                        break;
                    }
                }
                match self.eat(TokenKind::Comma) {
                    Some(comma) => {
                        params.push_delimiter(comma);
                    }
                    None => break,
                }
            }
        }
        let close = self.expect(TokenKind::CloseParen);
        let block = self.parse_block();
        let end = self.expect_closing(TokenKind::End, opener);
        FuncBody {
            open,
            params,
            close,
            block,
            end,
        }
    }

    /// `expr {, expr}`
    pub(super) fn parse_expr_list(&mut self) -> Punctuated<Expr> {
        let mut list = Punctuated::new(self.last_end());
        list.push(self.parse_expr());
        while let Some(comma) = self.eat(TokenKind::Comma) {
            list.push_delimiter(comma);
            list.push(self.parse_expr());
        }
        list
    }

    /// Consumes an identifier, or reports it and returns a missing (empty) one.
    pub(super) fn expect_ident(&mut self) -> Identifier {
        Identifier {
            token: self.expect(TokenKind::Ident),
        }
    }
}

fn unop_kind(kind: TokenKind) -> Option<UnOpKind> {
    Some(match kind {
        TokenKind::Not => UnOpKind::Not,
        TokenKind::Minus => UnOpKind::Neg,
        TokenKind::Pound => UnOpKind::Len,
        TokenKind::Tilde => UnOpKind::BNot,
        _ => return None,
    })
}

fn binop_kind(kind: TokenKind) -> Option<BinOpKind> {
    use BinOpKind::*;
    Some(match kind {
        TokenKind::Or => Or,
        TokenKind::And => And,
        TokenKind::Lt => Lt,
        TokenKind::Gt => Gt,
        TokenKind::Le => Le,
        TokenKind::Ge => Ge,
        TokenKind::Ne => Ne,
        TokenKind::EqEq => Eq,
        TokenKind::Pipe => BOr,
        TokenKind::Tilde => BXor,
        TokenKind::Amp => BAnd,
        TokenKind::Shl => Shl,
        TokenKind::Shr => Shr,
        TokenKind::DotDot => Concat,
        TokenKind::Plus => Add,
        TokenKind::Minus => Sub,
        TokenKind::Star => Mul,
        TokenKind::Slash => Div,
        TokenKind::SlashSlash => IDiv,
        TokenKind::Percent => Mod,
        TokenKind::Caret => Pow,
        _ => return None,
    })
}

/// Tokens an enclosing construct or the next statement may still consume.
fn is_sync_token(kind: TokenKind) -> bool {
    kind.is_keyword()
        || kind == TokenKind::Eof
        || matches!(
            kind,
            TokenKind::CloseParen
                | TokenKind::CloseBracket
                | TokenKind::CloseBrace
                | TokenKind::Comma
                | TokenKind::Semi
                | TokenKind::Eq
                | TokenKind::Colon
                | TokenKind::ColonColon
        )
}
