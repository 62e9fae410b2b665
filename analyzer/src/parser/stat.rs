//! Statement and block parsing.

use super::{Parser, STACK_RED_ZONE, STACK_SEGMENT};
use crate::ast::*;
use crate::lexer::{Token, TokenKind};
use crate::span::{Position, Span};

impl Parser {
    /// Parses the whole input as the root block.
    ///
    /// Stray block terminators (`end`, `else`, `elseif`, `until`) at the top level are reported,
    /// wrapped in an [`InvalidStat`], and parsing resumes after them.
    pub fn parse_chunk(&mut self) -> Block {
        let anchor = self.cur().span.start;
        let mut block = self.parse_block_at(anchor);
        while !self.at(TokenKind::Eof) {
            let stray = self.bump();
            self.error(stray.span, format!("unexpected {}", stray.kind.describe()));
            block.stats.push(Stat::Invalid(InvalidStat {
                expr: None,
                anchor: stray.span.start,
                tokens: vec![stray],
            }));
            let rest = self.parse_block_at(self.last_end());
            block.stats.extend(rest.stats);
        }
        block
    }

    /// Parses statements up to (not including) the next block terminator.
    pub(super) fn parse_block(&mut self) -> Block {
        self.parse_block_at(self.last_end())
    }

    fn parse_block_at(&mut self, anchor: Position) -> Block {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            self.parse_block_inner(anchor)
        })
    }

    fn parse_block_inner(&mut self, anchor: Position) -> Block {
        let mut stats = Vec::new();
        let mut swallowed = Vec::new();
        if !self.enter(&mut swallowed) {
            if !swallowed.is_empty() {
                stats.push(Stat::Invalid(InvalidStat {
                    expr: None,
                    tokens: swallowed,
                    anchor,
                }));
            }
            return Block { stats, anchor };
        }

        let mut after_return = false;
        while !self.cur().kind.is_block_end() {
            let stat = self.parse_stat();
            if after_return {
                self.error(stat.span(), "'return' must be the last statement in a block");
                after_return = false;
            }
            if matches!(stat, Stat::Return(_)) {
                after_return = true;
            }
            stats.push(stat);
        }

        self.leave();
        Block { stats, anchor }
    }

    fn parse_stat(&mut self) -> Stat {
        match self.cur().kind {
            TokenKind::Semi => Stat::Empty(EmptyStat { semi: self.bump() }),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do(),
            TokenKind::For => self.parse_for(),
            TokenKind::Repeat => self.parse_repeat(),
            TokenKind::Function => self.parse_function_stat(),
            TokenKind::Local if self.peek().kind == TokenKind::Function => {
                self.parse_local_function()
            }
            TokenKind::Local => self.parse_local(),
            TokenKind::ColonColon => self.parse_label(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => Stat::Break(BreakStat { token: self.bump() }),
            TokenKind::Goto => Stat::Goto(GotoStat {
                goto: self.bump(),
                label: self.expect_ident(),
            }),
            TokenKind::Ident | TokenKind::OpenParen => self.parse_expr_stat(),
            // Already reported by the lexer.
            TokenKind::Invalid => {
                let tok = self.bump();
                Stat::Invalid(InvalidStat {
                    expr: None,
                    anchor: tok.span.start,
                    tokens: vec![tok],
                })
            }
            _ if self.cur().can_begin_expr() => {
                let expr = self.parse_expr();
                self.not_a_statement(expr)
            }
            _ => {
                self.emit_unexpected("statement");
                let tok = self.bump();
                Stat::Invalid(InvalidStat {
                    expr: None,
                    anchor: tok.span.start,
                    tokens: vec![tok],
                })
            }
        }
    }

    /// `if cond then block {elseif cond then block} [else block] end`
    fn parse_if(&mut self) -> Stat {
        let if_token = self.bump();
        let cond = self.parse_expr();
        let then = self.expect(TokenKind::Then);
        let block = self.parse_block();

        let mut else_ifs = Vec::new();
        while self.at(TokenKind::ElseIf) {
            let else_if = self.bump();
            let cond = self.parse_expr();
            let then = self.expect(TokenKind::Then);
            let block = self.parse_block();
            else_ifs.push(ElseIfClause {
                else_if,
                cond,
                then,
                block,
            });
        }

        let else_clause = self.eat(TokenKind::Else).map(|else_token| ElseClause {
            else_token,
            block: self.parse_block(),
        });
        let end = self.expect_closing(TokenKind::End, &if_token);

        Stat::If(IfStat {
            if_token,
            cond,
            then,
            block,
            else_ifs,
            else_clause,
            end,
        })
    }

    fn parse_while(&mut self) -> Stat {
        let while_token = self.bump();
        let cond = self.parse_expr();
        let do_token = self.expect(TokenKind::Do);
        let block = self.parse_block();
        let end = self.expect_closing(TokenKind::End, &while_token);
        Stat::While(WhileStat {
            while_token,
            cond,
            do_token,
            block,
            end,
        })
    }

    fn parse_do(&mut self) -> Stat {
        let do_token = self.bump();
        let block = self.parse_block();
        let end = self.expect_closing(TokenKind::End, &do_token);
        Stat::Do(DoStat {
            do_token,
            block,
            end,
        })
    }

    fn parse_repeat(&mut self) -> Stat {
        let repeat = self.bump();
        let block = self.parse_block();
        let until = self.expect_closing(TokenKind::Until, &repeat);
        let cond = self.parse_expr();
        Stat::Repeat(RepeatStat {
            repeat,
            block,
            until,
            cond,
        })
    }

    /// `for name = start, limit [, step] do block end` when the name is followed by `=`,
    /// otherwise `for names in exprs do block end`.
    fn parse_for(&mut self) -> Stat {
        let for_token = self.bump();

        if self.at(TokenKind::Ident) && self.peek().kind == TokenKind::Eq {
            let var = self.expect_ident();
            let eq = self.bump();
            let start = self.parse_expr();
            let comma = self.expect(TokenKind::Comma);
            let limit = self.parse_expr();
            let step = self
                .eat(TokenKind::Comma)
                .map(|comma| (comma, self.parse_expr()));
            let do_token = self.expect(TokenKind::Do);
            let block = self.parse_block();
            let end = self.expect_closing(TokenKind::End, &for_token);
            return Stat::NumericFor(NumericForStat {
                for_token,
                var,
                eq,
                start,
                comma,
                limit,
                step,
                do_token,
                block,
                end,
            });
        }

        let names = self.parse_name_list();
        let in_token = self.expect(TokenKind::In);
        let exprs = self.parse_expr_list();
        let do_token = self.expect(TokenKind::Do);
        let block = self.parse_block();
        let end = self.expect_closing(TokenKind::End, &for_token);
        Stat::GenericFor(GenericForStat {
            for_token,
            names,
            in_token,
            exprs,
            do_token,
            block,
            end,
        })
    }

    /// `function a.b.c:m(params) block end`
    fn parse_function_stat(&mut self) -> Stat {
        let function = self.bump();

        let name = if self.at(TokenKind::Ident) {
            self.parse_suffixed_expr(false)
        } else {
            Expr::Name(self.expect_ident())
        };
        if let Some(bad) = first_non_name_path(&name) {
            self.error(bad, "function name must be a dotted name");
        }

        let method = self.eat(TokenKind::Colon).map(|colon| MethodName {
            colon,
            name: self.expect_ident(),
        });
        let body = self.parse_func_body(&function);

        Stat::Function(FunctionStat {
            function,
            name,
            method,
            body,
        })
    }

    fn parse_local_function(&mut self) -> Stat {
        let local = self.bump();
        let function = self.bump();
        let name = self.expect_ident();
        let body = self.parse_func_body(&function);
        Stat::LocalFunction(LocalFunctionStat {
            local,
            function,
            name,
            body,
        })
    }

    /// `local names [= exprs]`
    fn parse_local(&mut self) -> Stat {
        let local = self.bump();
        let names = self.parse_name_list();
        let eq = self.eat(TokenKind::Eq);
        let values = match &eq {
            Some(eq) => self.parse_assigned_values(eq),
            None => Punctuated::new(self.last_end()),
        };
        Stat::Local(LocalStat {
            local,
            names,
            eq,
            values,
        })
    }

    /// `return [exprs] [;]`
    fn parse_return(&mut self) -> Stat {
        let return_token = self.bump();
        let values = if self.cur().kind.is_block_end() || self.at(TokenKind::Semi) {
            Punctuated::new(self.last_end())
        } else {
            self.parse_expr_list()
        };
        let semi = self.eat(TokenKind::Semi);
        Stat::Return(ReturnStat {
            return_token,
            values,
            semi,
        })
    }

    fn parse_label(&mut self) -> Stat {
        let open = self.bump();
        let name = self.expect_ident();
        let close = self.expect(TokenKind::ColonColon);
        Stat::Label(LabelStat { open, name, close })
    }

    /// A statement that starts with an expression: an assignment or a call.
    fn parse_expr_stat(&mut self) -> Stat {
        let expr = self.parse_suffixed_expr(true);

        if self.at(TokenKind::Eq) || self.at(TokenKind::Comma) {
            return self.parse_assignment(expr);
        }
        if expr.is_call() {
            return Stat::Call(CallStat { call: expr });
        }
        self.not_a_statement(expr)
    }

    fn not_a_statement(&mut self, expr: Expr) -> Stat {
        self.error(expr.span(), "syntax error: expected '=' or a function call");
        Stat::Invalid(InvalidStat {
            anchor: expr.span().start,
            expr: Some(Box::new(expr)),
            tokens: Vec::new(),
        })
    }

    fn parse_assignment(&mut self, first: Expr) -> Stat {
        let mut targets = Punctuated::new(first.span().start);
        targets.push(first);
        while let Some(comma) = self.eat(TokenKind::Comma) {
            targets.push_delimiter(comma);
            targets.push(self.parse_suffixed_expr(true));
        }

        let bad: Vec<Span> = targets
            .iter()
            .filter(|t| !t.is_assignable() && !matches!(t, Expr::Invalid(_)))
            .map(|t| t.span())
            .collect();
        for span in bad {
            self.error(span, "cannot assign to this expression");
        }

        let eq = self.expect(TokenKind::Eq);
        let values = self.parse_assigned_values(&eq);
        Stat::Assign(AssignStat {
            targets,
            eq,
            values,
        })
    }

    /// Parses the values after `=`.
    ///
    /// When the value list is followed by another `=`, as in
    ///
    /// ```text
    /// foo =
    /// bar = 1
    /// ```
    ///
    /// the values actually start the next statement. The parser rewinds, reports the missing
    /// expression once, and leaves `bar = 1` to be parsed on its own.
    fn parse_assigned_values(&mut self, eq: &Token) -> Punctuated<Expr> {
        let checkpoint = self.checkpoint();
        let values = self.parse_expr_list();
        if !self.at(TokenKind::Eq) || eq.is_missing() {
            return values;
        }

        self.restore(checkpoint);
        let anchor = eq.span.end;
        self.error(Span::empty(anchor), "expected expression after '='");
        let mut values = Punctuated::new(anchor);
        values.push(Expr::Invalid(InvalidExpr {
            expr: None,
            tokens: Vec::new(),
            anchor,
        }));
        values
    }

    /// `name {, name}`
    pub(super) fn parse_name_list(&mut self) -> Punctuated<Identifier> {
        let mut names = Punctuated::new(self.last_end());
        names.push(self.expect_ident());
        while let Some(comma) = self.eat(TokenKind::Comma) {
            names.push_delimiter(comma);
            names.push(self.expect_ident());
        }
        names
    }
}

/// The span of the first part of a function name that is not `name` or `.name`.
fn first_non_name_path(name: &Expr) -> Option<Span> {
    match name {
        Expr::Name(_) => None,
        Expr::Field(f) => first_non_name_path(&f.base),
        other => Some(other.span()),
    }
}
