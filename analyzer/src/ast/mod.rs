//! Lossless Lua syntax tree.
//!
//! Every node owns its children and keeps the keyword and punctuation [`Token`]s it was built
//! from, so spans are derived from tokens instead of being stored separately. Only an empty
//! [`Block`] or [`Punctuated`] list needs a stored anchor position.
//!
//! Tokens the parser expected but did not find are zero-width "missing" tokens
//! (see [`Token::missing`]), anchored at the end of the last consumed token.

use crate::lexer::{Token, Trivia};
use crate::span::{Position, Span};

mod node;
mod pretty;
mod punctuated;

pub use node::{Node, NodeKind};
pub use punctuated::{Pair, Punctuated};

/// Shared accessors for syntax nodes.
pub trait AstNode {
    fn span(&self) -> Span;

    /// The leftmost token of the node, which owns the node's leading trivia.
    fn first_token(&self) -> Option<&Token>;

    fn leading_trivia(&self) -> &[Trivia] {
        self.first_token()
            .map(|t| t.leading_trivia.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub stats: Vec<Stat>,
    /// Where the block starts; the only position an empty block has.
    pub anchor: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub token: Token,
}

impl Identifier {
    pub fn name(&self) -> &str {
        &self.token.text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Nil,
    True,
    False,
    Number,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LitKind,
    pub token: Token,
}

impl Literal {
    /// Decoded contents of a string literal, or `None` for other literals.
    ///
    /// Escapes that the lexer reported as malformed are kept verbatim.
    pub fn string_value(&self) -> Option<String> {
        (self.kind == LitKind::String).then(|| decode_string(&self.token.text))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarargExpr {
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stat {
    /// `;`
    Empty(EmptyStat),
    /// `a, b.c = 1, 2`
    Assign(AssignStat),
    /// `f(x)` or `obj:m(x)`
    Call(CallStat),
    /// `do ... end`
    Do(DoStat),
    /// `while cond do ... end`
    While(WhileStat),
    /// `repeat ... until cond`
    Repeat(RepeatStat),
    /// `if c then ... elseif c then ... else ... end`
    If(IfStat),
    /// `for i = a, b, c do ... end`
    NumericFor(NumericForStat),
    /// `for k, v in exprs do ... end`
    GenericFor(GenericForStat),
    /// `function a.b:c() ... end`
    Function(FunctionStat),
    /// `local function f() ... end`
    LocalFunction(LocalFunctionStat),
    /// `local a, b = 1, 2`
    Local(LocalStat),
    /// `return a, b`
    Return(ReturnStat),
    /// `break`
    Break(BreakStat),
    /// `goto name`
    Goto(GotoStat),
    /// `::name::`
    Label(LabelStat),
    Invalid(InvalidStat),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyStat {
    pub semi: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignStat {
    pub targets: Punctuated<Expr>,
    pub eq: Token,
    pub values: Punctuated<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStat {
    /// Always an [`Expr::Call`] or [`Expr::MethodCall`].
    pub call: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoStat {
    pub do_token: Token,
    pub block: Block,
    pub end: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStat {
    pub while_token: Token,
    pub cond: Expr,
    pub do_token: Token,
    pub block: Block,
    pub end: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatStat {
    pub repeat: Token,
    pub block: Block,
    pub until: Token,
    pub cond: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStat {
    pub if_token: Token,
    pub cond: Expr,
    pub then: Token,
    pub block: Block,
    pub else_ifs: Vec<ElseIfClause>,
    pub else_clause: Option<ElseClause>,
    pub end: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElseIfClause {
    pub else_if: Token,
    pub cond: Expr,
    pub then: Token,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElseClause {
    pub else_token: Token,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericForStat {
    pub for_token: Token,
    pub var: Identifier,
    pub eq: Token,
    pub start: Expr,
    pub comma: Token,
    pub limit: Expr,
    pub step: Option<(Token, Expr)>,
    pub do_token: Token,
    pub block: Block,
    pub end: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericForStat {
    pub for_token: Token,
    pub names: Punctuated<Identifier>,
    pub in_token: Token,
    pub exprs: Punctuated<Expr>,
    pub do_token: Token,
    pub block: Block,
    pub end: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodName {
    pub colon: Token,
    pub name: Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionStat {
    pub function: Token,
    /// A name path: [`Expr::Name`] or nested [`Expr::Field`].
    pub name: Expr,
    pub method: Option<MethodName>,
    pub body: FuncBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFunctionStat {
    pub local: Token,
    pub function: Token,
    pub name: Identifier,
    pub body: FuncBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStat {
    pub local: Token,
    pub names: Punctuated<Identifier>,
    pub eq: Option<Token>,
    pub values: Punctuated<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStat {
    pub return_token: Token,
    pub values: Punctuated<Expr>,
    pub semi: Option<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakStat {
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoStat {
    pub goto: Token,
    pub label: Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelStat {
    pub open: Token,
    pub name: Identifier,
    pub close: Token,
}

/// A statement the parser could not make sense of.
///
/// Holds the expression it managed to parse (if any) and the tokens it skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStat {
    pub expr: Option<Box<Expr>>,
    pub tokens: Vec<Token>,
    pub anchor: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncBody {
    pub open: Token,
    pub params: Punctuated<Param>,
    pub close: Token,
    pub block: Block,
    pub end: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Name(Identifier),
    Vararg(VarargExpr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `nil`, `true`, `false`, numbers and strings.
    Lit(Literal),
    /// `...`
    Vararg(VarargExpr),
    Name(Identifier),
    /// `function(...) ... end`
    Function(FunctionExpr),
    /// `{ ... }`
    Table(TableExpr),
    /// `(expr)`
    Paren(ParenExpr),
    /// `base.name`
    Field(FieldExpr),
    /// `base[index]`
    Index(IndexExpr),
    /// `callee(args)`, `callee "str"`, `callee {..}`
    Call(CallExpr),
    /// `receiver:name(args)`
    MethodCall(MethodCallExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Invalid(InvalidExpr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionExpr {
    pub function: Token,
    pub body: FuncBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableExpr {
    pub open: Token,
    pub fields: Punctuated<TableField>,
    pub close: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableField {
    /// `expr`
    Positional(Expr),
    /// `name = expr`
    Named(NamedField),
    /// `[key] = expr`
    Keyed(KeyedField),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedField {
    pub name: Identifier,
    pub eq: Token,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedField {
    pub open: Token,
    pub key: Expr,
    pub close: Token,
    pub eq: Token,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenExpr {
    pub open: Token,
    pub inner: Box<Expr>,
    pub close: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldExpr {
    pub base: Box<Expr>,
    pub dot: Token,
    pub name: Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexExpr {
    pub base: Box<Expr>,
    pub open: Token,
    pub index: Box<Expr>,
    pub close: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArgs {
    /// `(a, b)`
    Paren {
        open: Token,
        args: Punctuated<Expr>,
        close: Token,
    },
    /// `f { ... }`
    Table(TableExpr),
    /// `f "str"`
    String(Literal),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: CallArgs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCallExpr {
    pub receiver: Box<Expr>,
    pub colon: Token,
    pub name: Identifier,
    pub args: CallArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOpKind {
    /// `not`
    Not,
    /// `-`
    Neg,
    /// `#`
    Len,
    /// `~`
    BNot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnOp {
    pub kind: UnOpKind,
    pub token: Token,
}

impl UnOpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnOpKind::Not => "not",
            UnOpKind::Neg => "-",
            UnOpKind::Len => "#",
            UnOpKind::BNot => "~",
        }
    }

    /// Priority at which every prefix operator parses its operand.
    pub fn binding_power(&self) -> u8 {
        12
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub operand: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    /// `or`
    Or,
    /// `and`
    And,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `~=`
    Ne,
    /// `==`
    Eq,
    /// `|`
    BOr,
    /// `~`
    BXor,
    /// `&`
    BAnd,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `..`
    Concat,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `//`
    IDiv,
    /// `%`
    Mod,
    /// `^`
    Pow,
}

impl BinOpKind {
    pub fn as_str(&self) -> &'static str {
        use BinOpKind::*;
        match self {
            Or => "or",
            And => "and",
            Lt => "<",
            Gt => ">",
            Le => "<=",
            Ge => ">=",
            Ne => "~=",
            Eq => "==",
            BOr => "|",
            BXor => "~",
            BAnd => "&",
            Shl => "<<",
            Shr => ">>",
            Concat => "..",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            IDiv => "//",
            Mod => "%",
            Pow => "^",
        }
    }

    /// Returns `(left, right)` priorities for precedence climbing.
    ///
    /// The parser keeps consuming an operator while its left priority is greater than the
    /// current limit and parses the right operand with the right priority as the new limit.
    /// Equal priorities make an operator left-associative; a right priority one below the
    /// left makes it right-associative (`..` and `^`).
    ///
    /// ```text
    /// `1 + 2 - 3`  parses as `(1 + 2) - 3`
    /// `2 ^ 2 ^ 2`  parses as `2 ^ (2 ^ 2)`
    /// `-x ^ 2`     parses as `-(x ^ 2)`       // unary operands parse at 12 < 14
    /// ```
    pub fn binding_power(&self) -> (u8, u8) {
        use BinOpKind::*;
        match self {
            Or => (1, 1),
            And => (2, 2),
            Lt | Gt | Le | Ge | Ne | Eq => (3, 3),
            BOr => (4, 4),
            BXor => (5, 5),
            BAnd => (6, 6),
            Shl | Shr => (7, 7),
            Concat => (9, 8),
            Add | Sub => (10, 10),
            Mul | Div | IDiv | Mod => (11, 11),
            Pow => (14, 13),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinOp {
    pub kind: BinOpKind,
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub lhs: Box<Expr>,
    pub op: BinOp,
    pub rhs: Box<Expr>,
}

/// A placeholder for an expression that could not be parsed.
///
/// `tokens` are the tokens consumed while recovering; it is empty for a missing expression,
/// whose span is the zero-width `anchor`. `expr` holds the part of an operator or suffix
/// chain that was parsed before the nesting limit cut it off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidExpr {
    pub expr: Option<Box<Expr>>,
    pub tokens: Vec<Token>,
    pub anchor: Position,
}

impl Expr {
    /// Whether the expression may appear on the left of `=`.
    pub fn is_assignable(&self) -> bool {
        matches!(self, Expr::Name(_) | Expr::Field(_) | Expr::Index(_))
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Expr::Call(_) | Expr::MethodCall(_))
    }
}

/* Span and first-token derivation. */

fn join(first: Span, last: Span) -> Span {
    Span::new(first.start, last.end.max(first.start))
}

impl AstNode for Token {
    fn span(&self) -> Span {
        self.span
    }

    fn first_token(&self) -> Option<&Token> {
        Some(self)
    }
}

impl AstNode for Identifier {
    fn span(&self) -> Span {
        self.token.span
    }

    fn first_token(&self) -> Option<&Token> {
        Some(&self.token)
    }
}

impl AstNode for Literal {
    fn span(&self) -> Span {
        self.token.span
    }

    fn first_token(&self) -> Option<&Token> {
        Some(&self.token)
    }
}

impl AstNode for VarargExpr {
    fn span(&self) -> Span {
        self.token.span
    }

    fn first_token(&self) -> Option<&Token> {
        Some(&self.token)
    }
}

impl AstNode for Block {
    fn span(&self) -> Span {
        match (self.stats.first(), self.stats.last()) {
            (Some(first), Some(last)) => join(first.span(), last.span()),
            _ => Span::empty(self.anchor),
        }
    }

    fn first_token(&self) -> Option<&Token> {
        self.stats.first().and_then(|s| s.first_token())
    }
}

impl AstNode for Stat {
    fn span(&self) -> Span {
        match self {
            Stat::Empty(s) => s.semi.span,
            Stat::Assign(s) => {
                let last = if s.values.is_empty() {
                    s.eq.span
                } else {
                    s.values.span()
                };
                join(s.targets.span(), last)
            }
            Stat::Call(s) => s.call.span(),
            Stat::Do(s) => join(s.do_token.span, s.end.span),
            Stat::While(s) => join(s.while_token.span, s.end.span),
            Stat::Repeat(s) => join(s.repeat.span, s.cond.span()),
            Stat::If(s) => join(s.if_token.span, s.end.span),
            Stat::NumericFor(s) => join(s.for_token.span, s.end.span),
            Stat::GenericFor(s) => join(s.for_token.span, s.end.span),
            Stat::Function(s) => join(s.function.span, s.body.span()),
            Stat::LocalFunction(s) => join(s.local.span, s.body.span()),
            Stat::Local(s) => {
                let last = if !s.values.is_empty() {
                    s.values.span()
                } else if let Some(eq) = &s.eq {
                    eq.span
                } else if !s.names.is_empty() {
                    s.names.span()
                } else {
                    s.local.span
                };
                join(s.local.span, last)
            }
            Stat::Return(s) => {
                let last = match &s.semi {
                    Some(semi) => semi.span,
                    None if !s.values.is_empty() => s.values.span(),
                    None => s.return_token.span,
                };
                join(s.return_token.span, last)
            }
            Stat::Break(s) => s.token.span,
            Stat::Goto(s) => join(s.goto.span, s.label.span()),
            Stat::Label(s) => join(s.open.span, s.close.span),
            Stat::Invalid(s) => s.span(),
        }
    }

    fn first_token(&self) -> Option<&Token> {
        match self {
            Stat::Empty(s) => Some(&s.semi),
            Stat::Assign(s) => s.targets.first_token(),
            Stat::Call(s) => s.call.first_token(),
            Stat::Do(s) => Some(&s.do_token),
            Stat::While(s) => Some(&s.while_token),
            Stat::Repeat(s) => Some(&s.repeat),
            Stat::If(s) => Some(&s.if_token),
            Stat::NumericFor(s) => Some(&s.for_token),
            Stat::GenericFor(s) => Some(&s.for_token),
            Stat::Function(s) => Some(&s.function),
            Stat::LocalFunction(s) => Some(&s.local),
            Stat::Local(s) => Some(&s.local),
            Stat::Return(s) => Some(&s.return_token),
            Stat::Break(s) => Some(&s.token),
            Stat::Goto(s) => Some(&s.goto),
            Stat::Label(s) => Some(&s.open),
            Stat::Invalid(s) => s.first_token(),
        }
    }
}

impl AstNode for InvalidStat {
    fn span(&self) -> Span {
        let start = self
            .expr
            .as_ref()
            .map(|e| e.span().start)
            .or_else(|| self.tokens.first().map(|t| t.span.start))
            .unwrap_or(self.anchor);
        let end = self
            .tokens
            .last()
            .map(|t| t.span.end)
            .or_else(|| self.expr.as_ref().map(|e| e.span().end))
            .unwrap_or(self.anchor);
        Span::new(start, end.max(start))
    }

    fn first_token(&self) -> Option<&Token> {
        self.expr
            .as_ref()
            .and_then(|e| e.first_token())
            .or(self.tokens.first())
    }
}

impl AstNode for ElseIfClause {
    fn span(&self) -> Span {
        let last = if self.block.stats.is_empty() {
            self.then.span
        } else {
            self.block.span()
        };
        join(self.else_if.span, last)
    }

    fn first_token(&self) -> Option<&Token> {
        Some(&self.else_if)
    }
}

impl AstNode for ElseClause {
    fn span(&self) -> Span {
        join(self.else_token.span, self.block.span())
    }

    fn first_token(&self) -> Option<&Token> {
        Some(&self.else_token)
    }
}

impl AstNode for FuncBody {
    fn span(&self) -> Span {
        join(self.open.span, self.end.span)
    }

    fn first_token(&self) -> Option<&Token> {
        Some(&self.open)
    }
}

impl AstNode for Param {
    fn span(&self) -> Span {
        match self {
            Param::Name(id) => id.span(),
            Param::Vararg(v) => v.span(),
        }
    }

    fn first_token(&self) -> Option<&Token> {
        match self {
            Param::Name(id) => id.first_token(),
            Param::Vararg(v) => v.first_token(),
        }
    }
}

impl AstNode for TableExpr {
    fn span(&self) -> Span {
        join(self.open.span, self.close.span)
    }

    fn first_token(&self) -> Option<&Token> {
        Some(&self.open)
    }
}

impl AstNode for TableField {
    fn span(&self) -> Span {
        match self {
            TableField::Positional(value) => value.span(),
            TableField::Named(f) => join(f.name.span(), f.value.span()),
            TableField::Keyed(f) => join(f.open.span, f.value.span()),
        }
    }

    fn first_token(&self) -> Option<&Token> {
        match self {
            TableField::Positional(value) => value.first_token(),
            TableField::Named(f) => Some(&f.name.token),
            TableField::Keyed(f) => Some(&f.open),
        }
    }
}

impl AstNode for CallArgs {
    fn span(&self) -> Span {
        match self {
            CallArgs::Paren { open, close, .. } => join(open.span, close.span),
            CallArgs::Table(t) => t.span(),
            CallArgs::String(s) => s.span(),
        }
    }

    fn first_token(&self) -> Option<&Token> {
        match self {
            CallArgs::Paren { open, .. } => Some(open),
            CallArgs::Table(t) => t.first_token(),
            CallArgs::String(s) => s.first_token(),
        }
    }
}

impl AstNode for InvalidExpr {
    fn span(&self) -> Span {
        let start = self
            .expr
            .as_ref()
            .map(|e| e.span().start)
            .or_else(|| self.tokens.first().map(|t| t.span.start))
            .unwrap_or(self.anchor);
        let end = self
            .tokens
            .last()
            .map(|t| t.span.end)
            .or_else(|| self.expr.as_ref().map(|e| e.span().end))
            .unwrap_or(self.anchor);
        Span::new(start, end.max(start))
    }

    fn first_token(&self) -> Option<&Token> {
        self.expr
            .as_ref()
            .and_then(|e| e.first_token())
            .or(self.tokens.first())
    }
}

impl AstNode for Expr {
    fn span(&self) -> Span {
        match self {
            Expr::Lit(lit) => lit.span(),
            Expr::Vararg(v) => v.span(),
            Expr::Name(id) => id.span(),
            Expr::Function(f) => join(f.function.span, f.body.span()),
            Expr::Table(t) => t.span(),
            Expr::Paren(p) => join(p.open.span, p.close.span),
            Expr::Field(f) => join(f.base.span(), f.name.span()),
            Expr::Index(i) => join(i.base.span(), i.close.span),
            Expr::Call(c) => join(c.callee.span(), c.args.span()),
            Expr::MethodCall(m) => join(m.receiver.span(), m.args.span()),
            Expr::Unary(u) => join(u.op.token.span, u.operand.span()),
            Expr::Binary(b) => join(b.lhs.span(), b.rhs.span()),
            Expr::Invalid(i) => i.span(),
        }
    }

    fn first_token(&self) -> Option<&Token> {
        match self {
            Expr::Lit(lit) => Some(&lit.token),
            Expr::Vararg(v) => Some(&v.token),
            Expr::Name(id) => Some(&id.token),
            Expr::Function(f) => Some(&f.function),
            Expr::Table(t) => Some(&t.open),
            Expr::Paren(p) => Some(&p.open),
            Expr::Field(f) => f.base.first_token(),
            Expr::Index(i) => i.base.first_token(),
            Expr::Call(c) => c.callee.first_token(),
            Expr::MethodCall(m) => m.receiver.first_token(),
            Expr::Unary(u) => Some(&u.op.token),
            Expr::Binary(b) => b.lhs.first_token(),
            Expr::Invalid(i) => i.first_token(),
        }
    }
}

/// Decodes the text of a string token (quotes or long brackets included).
fn decode_string(text: &str) -> String {
    if text.starts_with('[') {
        return decode_long_string(text);
    }

    let inner = match text.len() {
        0 | 1 => "",
        n => &text[1..n - 1],
    };
    let mut out: Vec<u8> = Vec::with_capacity(inner.len());
    let mut chars = inner.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let Some((at, esc)) = chars.next() else {
            out.push(b'\\');
            break;
        };
        match esc {
            'n' => out.push(b'\n'),
            't' => out.push(b'\t'),
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0C),
            'r' => out.push(b'\r'),
            'v' => out.push(0x0B),
            '\\' | '"' | '\'' => out.push(esc as u8),
            '\n' | '\r' => {
                out.push(b'\n');
                let pair = if esc == '\n' { '\r' } else { '\n' };
                if chars.peek().is_some_and(|(_, c)| *c == pair) {
                    chars.next();
                }
            }
            'z' => {
                while chars
                    .peek()
                    .is_some_and(|(_, c)| matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0B' | '\x0C'))
                {
                    chars.next();
                }
            }
            'x' => {
                let hex: String = inner[at + 1..].chars().take(2).collect();
                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) if hex.len() == 2 => {
                        out.push(byte);
                        chars.next();
                        chars.next();
                    }
                    _ => out.extend_from_slice(b"\\x"),
                }
            }
            'u' => {
                let rest = &inner[at + 1..];
                let decoded = rest
                    .strip_prefix('{')
                    .and_then(|r| r.split_once('}'))
                    .and_then(|(digits, _)| {
                        let ch = u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)?;
                        Some((ch, digits.len() + 2))
                    });
                match decoded {
                    Some((ch, consumed)) => {
                        let mut buf = [0u8; 4];
                        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                        for _ in 0..consumed {
                            chars.next();
                        }
                    }
                    None => out.extend_from_slice(b"\\u"),
                }
            }
            d if d.is_ascii_digit() => {
                let digits: String = inner[at..]
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .take(3)
                    .collect();
                for _ in 1..digits.len() {
                    chars.next();
                }
                match digits.parse::<u16>() {
                    Ok(value) if value <= 255 => out.push(value as u8),
                    _ => {
                        out.push(b'\\');
                        out.extend_from_slice(digits.as_bytes());
                    }
                }
            }
            other => {
                out.push(b'\\');
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn decode_long_string(text: &str) -> String {
    let level = text[1..].bytes().take_while(|b| *b == b'=').count();
    let open = level + 2;
    let close = level + 2;
    if text.len() < open + close {
        return String::new();
    }
    let body = &text[open..text.len() - close];
    // A newline right after the opening bracket is not part of the string.
    let body = ["\r\n", "\n\r", "\n", "\r"]
        .iter()
        .find_map(|nl| body.strip_prefix(nl))
        .unwrap_or(body);
    body.to_string()
}
