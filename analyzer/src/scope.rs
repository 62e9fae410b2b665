//! Lexical scope resolution for local names.
//!
//! There is no persistent symbol table: every query re-derives the scopes that enclose a
//! position by descending from the root block. Each enclosing block, function body and loop
//! contributes one frame of bindings; later frames are more deeply nested.

use indexmap::IndexMap;

use crate::ast::*;
use crate::lexer::Token;
use crate::span::{INVALID_POSITION, Position};
use crate::traverse::walk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Local,
    LocalFunction,
    Parameter,
    LoopVariable,
}

impl BindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingKind::Local => "local",
            BindingKind::LocalFunction => "local function",
            BindingKind::Parameter => "parameter",
            BindingKind::LoopVariable => "loop variable",
        }
    }
}

/// A name declaration visible at some position.
#[derive(Debug, Clone, Copy)]
pub struct Binding<'a> {
    name: &'a str,
    /// The declaring identifier. For the implicit `self` of `function a:b()` this is the
    /// method name `b`.
    pub ident: &'a Identifier,
    pub kind: BindingKind,
    /// First token of the declaring construct (`local`, `for`, `function` for an implicit
    /// `self`, or the parameter itself).
    /// Doc comments live in its leading trivia.
    pub decl: &'a Token,
}

impl<'a> Binding<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }
}

/// Visible names in declaration order.
pub type Bindings<'a> = IndexMap<String, Binding<'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'n> {
    /// Everything visible; an inner or later declaration replaces an outer or earlier one.
    All,
    /// Only the declaration that `name` refers to, if any.
    Name(&'n str),
}

type Frame<'a> = Vec<Binding<'a>>;

/// Collects the locals visible at `pos` in the chunk `root`.
///
/// ```text
/// local x = 1
/// do
///   local x = 2
///   print(x)    -- `x` resolves to the inner declaration
/// end
/// ```
pub fn locals_at<'a>(root: &'a Block, pos: Position, lookup: Lookup<'_>) -> Bindings<'a> {
    let mut frames = Vec::new();
    collect_block(root, pos, &mut frames);

    let mut bindings = Bindings::new();
    match lookup {
        Lookup::All => {
            for binding in frames.into_iter().flatten() {
                bindings.insert(binding.name().to_string(), binding);
            }
        }
        Lookup::Name(name) => {
            let found = frames
                .iter()
                .rev()
                .find_map(|frame| frame.iter().rev().find(|b| b.name() == name));
            if let Some(binding) = found {
                bindings.insert(name.to_string(), *binding);
            }
        }
    }
    bindings
}

/// Resolves a name occurrence to its declaration.
///
/// A declaring identifier resolves to itself; any other occurrence is looked up at its own
/// position. `None` means the name is global.
pub fn resolve<'a>(root: &'a Block, ident: &'a Identifier) -> Option<Binding<'a>> {
    if let Some(binding) = declaration_of(root, ident) {
        return Some(binding);
    }
    locals_at(root, ident.token.span.start, Lookup::Name(ident.name()))
        .swap_remove(ident.name())
}

/// The binding `ident` introduces, if it is a declaring occurrence.
fn declaration_of<'a>(root: &'a Block, ident: &'a Identifier) -> Option<Binding<'a>> {
    let span = ident.token.span;
    let mut found = None;
    walk(root, &mut |node: Node<'a>| {
        if found.is_some() || !node.span().contains_span(span) {
            return false;
        }
        let declared = match node {
            Node::Stat(stat) => declared_by(stat),
            Node::FuncBody(body) => params(body),
            _ => Vec::new(),
        };
        found = declared
            .into_iter()
            .find(|b| std::ptr::eq(b.ident, ident));
        found.is_none()
    });
    found
}

fn binding<'a>(ident: &'a Identifier, kind: BindingKind, decl: &'a Token) -> Binding<'a> {
    Binding {
        name: ident.name(),
        ident,
        kind,
        decl,
    }
}

/// `self` in a method body declared with `:`.
fn implicit_self(s: &FunctionStat) -> Frame<'_> {
    s.method
        .iter()
        .map(|method| Binding {
            name: "self",
            ident: &method.name,
            kind: BindingKind::Parameter,
            decl: &s.function,
        })
        .collect()
}

/// Every name a statement declares, wherever it becomes visible.
fn declared_by(stat: &Stat) -> Frame<'_> {
    match stat {
        Stat::Local(s) => s
            .names
            .iter()
            .map(|id| binding(id, BindingKind::Local, &s.local))
            .collect(),
        Stat::LocalFunction(s) => vec![binding(&s.name, BindingKind::LocalFunction, &s.local)],
        Stat::NumericFor(s) => vec![binding(&s.var, BindingKind::LoopVariable, &s.for_token)],
        Stat::GenericFor(s) => s
            .names
            .iter()
            .map(|id| binding(id, BindingKind::LoopVariable, &s.for_token))
            .collect(),
        _ => Vec::new(),
    }
}

fn params(body: &FuncBody) -> Frame<'_> {
    body.params
        .iter()
        .filter_map(|param| match param {
            Param::Name(id) => Some(binding(id, BindingKind::Parameter, &id.token)),
            Param::Vararg(_) => None,
        })
        .collect()
}

fn push_frame<'a>(frames: &mut Vec<Frame<'a>>, frame: Frame<'a>) {
    // Missing identifiers from error recovery have no name and bind nothing.
    frames.push(frame.into_iter().filter(|b| !b.name().is_empty()).collect());
}

/// Whether `pos` lies between the end of `open` and the start of `close`, i.e. in the block
/// those tokens delimit, including its surrounding whitespace.
fn inside(pos: Position, open: &Token, close: &Token) -> bool {
    open.span.end <= pos && (close.is_missing() || pos <= close.span.start)
}

fn collect_block<'a>(block: &'a Block, pos: Position, frames: &mut Vec<Frame<'a>>) {
    let mut frame = Frame::new();
    let mut stats = block.stats.iter().peekable();
    while let Some(stat) = stats.next() {
        let open_until = stats.peek().map_or(INVALID_POSITION, |next| next.span().start);
        if covers(Node::Stat(stat), pos, open_until) {
            push_frame(frames, frame);
            descend_stat(stat, pos, frames);
            return;
        }
        if stat.span().end > pos {
            break;
        }
        // Loop variables are scoped to the loop body, not the enclosing block.
        if matches!(stat, Stat::Local(_) | Stat::LocalFunction(_)) {
            frame.extend(declared_by(stat));
        }
    }
    push_frame(frames, frame);
}

/// Whether `node` covers `pos`. A construct whose closing token is missing extends up to
/// `open_until`, so the body of an unfinished function still sees its parameters.
fn covers(node: Node<'_>, pos: Position, open_until: Position) -> bool {
    let span = node.span();
    span.contains(pos) || (span.start <= pos && pos <= open_until && is_unclosed(node))
}

/// Whether `node` ends in a block that is missing its closing token.
fn is_unclosed(node: Node<'_>) -> bool {
    let close = match node {
        Node::Stat(Stat::Do(s)) => &s.end,
        Node::Stat(Stat::While(s)) => &s.end,
        Node::Stat(Stat::If(s)) => &s.end,
        Node::Stat(Stat::NumericFor(s)) => &s.end,
        Node::Stat(Stat::GenericFor(s)) => &s.end,
        Node::Stat(Stat::Repeat(s)) => &s.until,
        Node::FuncBody(body) => &body.end,
        _ => {
            let end = node.span().end;
            return node
                .semantic_children()
                .last()
                .is_some_and(|last| last.span().end == end && is_unclosed(*last));
        }
    };
    close.is_missing()
}

fn descend_stat<'a>(stat: &'a Stat, pos: Position, frames: &mut Vec<Frame<'a>>) {
    match stat {
        Stat::Do(s) if inside(pos, &s.do_token, &s.end) => collect_block(&s.block, pos, frames),
        Stat::While(s) if inside(pos, &s.do_token, &s.end) => {
            collect_block(&s.block, pos, frames)
        }
        Stat::Repeat(s) if pos >= s.repeat.span.end => {
            // The body's locals stay visible in the `until` condition.
            collect_block(&s.block, pos, frames);
            if s.cond.span().contains(pos) {
                descend_node(Node::from(&s.cond), pos, frames);
            }
        }
        Stat::If(s) => descend_if(s, pos, frames),
        Stat::NumericFor(s) if inside(pos, &s.do_token, &s.end) => {
            push_frame(frames, declared_by(stat));
            collect_block(&s.block, pos, frames);
        }
        Stat::GenericFor(s) if inside(pos, &s.do_token, &s.end) => {
            push_frame(frames, declared_by(stat));
            collect_block(&s.block, pos, frames);
        }
        Stat::Function(s) => {
            if inside(pos, &s.body.close, &s.body.end) {
                push_frame(frames, implicit_self(s));
            }
            descend_func_body(&s.body, pos, frames);
        }
        Stat::LocalFunction(s) => {
            // Visible in its own body.
            push_frame(frames, declared_by(stat));
            descend_func_body(&s.body, pos, frames);
        }
        _ => descend_node(Node::Stat(stat), pos, frames),
    }
}

fn descend_if<'a>(s: &'a IfStat, pos: Position, frames: &mut Vec<Frame<'a>>) {
    let mut conds = std::iter::once(&s.cond).chain(s.else_ifs.iter().map(|c| &c.cond));
    if let Some(cond) = conds.find(|c| c.span().contains(pos)) {
        descend_node(Node::from(cond), pos, frames);
        return;
    }

    let mut clauses: Vec<(&Token, &Block)> = vec![(&s.then, &s.block)];
    clauses.extend(s.else_ifs.iter().map(|c| (&c.then, &c.block)));
    clauses.extend(s.else_clause.iter().map(|c| (&c.else_token, &c.block)));
    let open_clause = clauses
        .into_iter()
        .rev()
        .find(|(open, _)| inside(pos, open, &s.end));
    if let Some((_, block)) = open_clause {
        collect_block(block, pos, frames);
    }
}

fn descend_func_body<'a>(body: &'a FuncBody, pos: Position, frames: &mut Vec<Frame<'a>>) {
    if inside(pos, &body.close, &body.end) {
        push_frame(frames, params(body));
        collect_block(&body.block, pos, frames);
    }
}

/// Looks for a function body under an expression-bearing node.
fn descend_node<'a>(node: Node<'a>, pos: Position, frames: &mut Vec<Frame<'a>>) {
    let children = node.semantic_children();
    let child = children.iter().enumerate().find_map(|(i, &child)| {
        let open_until = children
            .get(i + 1)
            .map_or(INVALID_POSITION, |next| next.span().start);
        covers(child, pos, open_until).then_some(child)
    });
    let Some(child) = child else {
        return;
    };
    match child {
        Node::FuncBody(body) => descend_func_body(body, pos, frames),
        Node::Block(block) => collect_block(block, pos, frames),
        Node::Stat(stat) => descend_stat(stat, pos, frames),
        _ => descend_node(child, pos, frames),
    }
}
