//! A borrowed, uniform view over every node type.
//!
//! [`Node`] is what traversal and position lookup hand out. Expressions that are leaves
//! (names, literals, `...`) and tables (which also appear as call arguments) get their own
//! variants, so `Expr::Name(id)` surfaces as `Node::Identifier(id)`.

use super::*;

#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Block(&'a Block),
    Stat(&'a Stat),
    ElseIf(&'a ElseIfClause),
    Else(&'a ElseClause),
    FuncBody(&'a FuncBody),
    TableField(&'a TableField),
    Table(&'a TableExpr),
    Expr(&'a Expr),
    Identifier(&'a Identifier),
    Literal(&'a Literal),
    Vararg(&'a VarargExpr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Block,
    EmptyStat,
    AssignStat,
    CallStat,
    DoStat,
    WhileStat,
    RepeatStat,
    IfStat,
    ElseIfClause,
    ElseClause,
    NumericForStat,
    GenericForStat,
    FunctionStat,
    LocalFunctionStat,
    LocalStat,
    ReturnStat,
    BreakStat,
    GotoStat,
    LabelStat,
    InvalidStat,
    FuncBody,
    TableField,
    TableExpr,
    FunctionExpr,
    ParenExpr,
    FieldExpr,
    IndexExpr,
    CallExpr,
    MethodCallExpr,
    UnaryExpr,
    BinaryExpr,
    InvalidExpr,
    Identifier,
    Literal,
    VarargExpr,
}

impl<'a> From<&'a Block> for Node<'a> {
    fn from(block: &'a Block) -> Self {
        Node::Block(block)
    }
}

impl<'a> From<&'a Stat> for Node<'a> {
    fn from(stat: &'a Stat) -> Self {
        Node::Stat(stat)
    }
}

impl<'a> From<&'a Expr> for Node<'a> {
    fn from(expr: &'a Expr) -> Self {
        match expr {
            Expr::Name(id) => Node::Identifier(id),
            Expr::Lit(lit) => Node::Literal(lit),
            Expr::Vararg(v) => Node::Vararg(v),
            Expr::Table(t) => Node::Table(t),
            _ => Node::Expr(expr),
        }
    }
}

impl<'a> From<&'a Identifier> for Node<'a> {
    fn from(id: &'a Identifier) -> Self {
        Node::Identifier(id)
    }
}

impl<'a> From<&'a Param> for Node<'a> {
    fn from(param: &'a Param) -> Self {
        match param {
            Param::Name(id) => Node::Identifier(id),
            Param::Vararg(v) => Node::Vararg(v),
        }
    }
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Block(_) => NodeKind::Block,
            Node::Stat(stat) => match stat {
                Stat::Empty(_) => NodeKind::EmptyStat,
                Stat::Assign(_) => NodeKind::AssignStat,
                Stat::Call(_) => NodeKind::CallStat,
                Stat::Do(_) => NodeKind::DoStat,
                Stat::While(_) => NodeKind::WhileStat,
                Stat::Repeat(_) => NodeKind::RepeatStat,
                Stat::If(_) => NodeKind::IfStat,
                Stat::NumericFor(_) => NodeKind::NumericForStat,
                Stat::GenericFor(_) => NodeKind::GenericForStat,
                Stat::Function(_) => NodeKind::FunctionStat,
                Stat::LocalFunction(_) => NodeKind::LocalFunctionStat,
                Stat::Local(_) => NodeKind::LocalStat,
                Stat::Return(_) => NodeKind::ReturnStat,
                Stat::Break(_) => NodeKind::BreakStat,
                Stat::Goto(_) => NodeKind::GotoStat,
                Stat::Label(_) => NodeKind::LabelStat,
                Stat::Invalid(_) => NodeKind::InvalidStat,
            },
            Node::ElseIf(_) => NodeKind::ElseIfClause,
            Node::Else(_) => NodeKind::ElseClause,
            Node::FuncBody(_) => NodeKind::FuncBody,
            Node::TableField(_) => NodeKind::TableField,
            Node::Table(_) => NodeKind::TableExpr,
            Node::Expr(expr) => match expr {
                Expr::Function(_) => NodeKind::FunctionExpr,
                Expr::Paren(_) => NodeKind::ParenExpr,
                Expr::Field(_) => NodeKind::FieldExpr,
                Expr::Index(_) => NodeKind::IndexExpr,
                Expr::Call(_) => NodeKind::CallExpr,
                Expr::MethodCall(_) => NodeKind::MethodCallExpr,
                Expr::Unary(_) => NodeKind::UnaryExpr,
                Expr::Binary(_) => NodeKind::BinaryExpr,
                Expr::Invalid(_) => NodeKind::InvalidExpr,
                Expr::Name(_) => NodeKind::Identifier,
                Expr::Lit(_) => NodeKind::Literal,
                Expr::Vararg(_) => NodeKind::VarargExpr,
                Expr::Table(_) => NodeKind::TableExpr,
            },
            Node::Identifier(_) => NodeKind::Identifier,
            Node::Literal(_) => NodeKind::Literal,
            Node::Vararg(_) => NodeKind::VarargExpr,
        }
    }

    fn as_ast(&self) -> &'a dyn AstNode {
        match *self {
            Node::Block(n) => n,
            Node::Stat(n) => n,
            Node::ElseIf(n) => n,
            Node::Else(n) => n,
            Node::FuncBody(n) => n,
            Node::TableField(n) => n,
            Node::Table(n) => n,
            Node::Expr(n) => n,
            Node::Identifier(n) => n,
            Node::Literal(n) => n,
            Node::Vararg(n) => n,
        }
    }

    pub fn span(&self) -> Span {
        self.as_ast().span()
    }

    pub fn leading_trivia(&self) -> &'a [Trivia] {
        self.as_ast().leading_trivia()
    }

    /// Leaves are the hover/highlight targets; composite nodes only contribute through them.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Node::Identifier(_) | Node::Literal(_) | Node::Vararg(_)
        )
    }

    pub fn as_identifier(&self) -> Option<&'a Identifier> {
        match *self {
            Node::Identifier(id) => Some(id),
            _ => None,
        }
    }

    /// Identity comparison: both views point at the same node in the same tree.
    pub fn ptr_eq(&self, other: &Node<'_>) -> bool {
        std::ptr::addr_eq(
            self.as_ast() as *const dyn AstNode,
            other.as_ast() as *const dyn AstNode,
        ) && self.kind() == other.kind()
    }

    /// Child nodes in source order, without pure punctuation.
    pub fn semantic_children(&self) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        match *self {
            Node::Block(block) => out.extend(block.stats.iter().map(Node::Stat)),
            Node::Stat(stat) => stat_children(stat, &mut out),
            Node::ElseIf(clause) => {
                out.push(Node::from(&clause.cond));
                out.push(Node::Block(&clause.block));
            }
            Node::Else(clause) => out.push(Node::Block(&clause.block)),
            Node::FuncBody(body) => {
                out.extend(body.params.iter().map(Node::from));
                out.push(Node::Block(&body.block));
            }
            Node::TableField(field) => match field {
                TableField::Positional(value) => out.push(Node::from(value)),
                TableField::Named(f) => {
                    out.push(Node::Identifier(&f.name));
                    out.push(Node::from(&f.value));
                }
                TableField::Keyed(f) => {
                    out.push(Node::from(&f.key));
                    out.push(Node::from(&f.value));
                }
            },
            Node::Table(table) => out.extend(table.fields.iter().map(Node::TableField)),
            Node::Expr(expr) => expr_children(expr, &mut out),
            Node::Identifier(_) | Node::Literal(_) | Node::Vararg(_) => {}
        }
        out
    }
}

fn stat_children<'a>(stat: &'a Stat, out: &mut Vec<Node<'a>>) {
    match stat {
        Stat::Empty(_) | Stat::Break(_) => {}
        Stat::Assign(s) => {
            out.extend(s.targets.iter().map(Node::from));
            out.extend(s.values.iter().map(Node::from));
        }
        Stat::Call(s) => out.push(Node::from(&s.call)),
        Stat::Do(s) => out.push(Node::Block(&s.block)),
        Stat::While(s) => {
            out.push(Node::from(&s.cond));
            out.push(Node::Block(&s.block));
        }
        Stat::Repeat(s) => {
            out.push(Node::Block(&s.block));
            out.push(Node::from(&s.cond));
        }
        Stat::If(s) => {
            out.push(Node::from(&s.cond));
            out.push(Node::Block(&s.block));
            out.extend(s.else_ifs.iter().map(Node::ElseIf));
            out.extend(s.else_clause.iter().map(Node::Else));
        }
        Stat::NumericFor(s) => {
            out.push(Node::Identifier(&s.var));
            out.push(Node::from(&s.start));
            out.push(Node::from(&s.limit));
            if let Some((_, step)) = &s.step {
                out.push(Node::from(step));
            }
            out.push(Node::Block(&s.block));
        }
        Stat::GenericFor(s) => {
            out.extend(s.names.iter().map(Node::Identifier));
            out.extend(s.exprs.iter().map(Node::from));
            out.push(Node::Block(&s.block));
        }
        Stat::Function(s) => {
            out.push(Node::from(&s.name));
            if let Some(method) = &s.method {
                out.push(Node::Identifier(&method.name));
            }
            out.push(Node::FuncBody(&s.body));
        }
        Stat::LocalFunction(s) => {
            out.push(Node::Identifier(&s.name));
            out.push(Node::FuncBody(&s.body));
        }
        Stat::Local(s) => {
            out.extend(s.names.iter().map(Node::Identifier));
            out.extend(s.values.iter().map(Node::from));
        }
        Stat::Return(s) => out.extend(s.values.iter().map(Node::from)),
        Stat::Goto(s) => out.push(Node::Identifier(&s.label)),
        Stat::Label(s) => out.push(Node::Identifier(&s.name)),
        Stat::Invalid(s) => out.extend(s.expr.as_deref().map(Node::from)),
    }
}

fn expr_children<'a>(expr: &'a Expr, out: &mut Vec<Node<'a>>) {
    match expr {
        Expr::Lit(_) | Expr::Vararg(_) | Expr::Name(_) => {}
        Expr::Invalid(i) => out.extend(i.expr.as_deref().map(Node::from)),
        Expr::Table(t) => out.extend(t.fields.iter().map(Node::TableField)),
        Expr::Function(f) => out.push(Node::FuncBody(&f.body)),
        Expr::Paren(p) => out.push(Node::from(p.inner.as_ref())),
        Expr::Field(f) => {
            out.push(Node::from(f.base.as_ref()));
            out.push(Node::Identifier(&f.name));
        }
        Expr::Index(i) => {
            out.push(Node::from(i.base.as_ref()));
            out.push(Node::from(i.index.as_ref()));
        }
        Expr::Call(c) => {
            out.push(Node::from(c.callee.as_ref()));
            args_children(&c.args, out);
        }
        Expr::MethodCall(m) => {
            out.push(Node::from(m.receiver.as_ref()));
            out.push(Node::Identifier(&m.name));
            args_children(&m.args, out);
        }
        Expr::Unary(u) => out.push(Node::from(u.operand.as_ref())),
        Expr::Binary(b) => {
            out.push(Node::from(b.lhs.as_ref()));
            out.push(Node::from(b.rhs.as_ref()));
        }
    }
}

fn args_children<'a>(args: &'a CallArgs, out: &mut Vec<Node<'a>>) {
    match args {
        CallArgs::Paren { args, .. } => out.extend(args.iter().map(Node::from)),
        CallArgs::Table(t) => out.push(Node::Table(t)),
        CallArgs::String(s) => out.push(Node::Literal(s)),
    }
}
