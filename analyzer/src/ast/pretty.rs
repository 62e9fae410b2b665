//! Normalized, fully parenthesized rendering of a tree.
//!
//! Every binary and unary expression is wrapped in parentheses, call sugar is expanded to
//! `f(...)`, and nested blocks are indented by two spaces. Used by tests to check parse
//! shapes; it is not a formatter.

use super::*;

const INDENT: &str = "  ";

impl Block {
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        write_block(&mut out, self, 0);
        out
    }
}

impl Expr {
    pub fn pretty(&self) -> String {
        expr(self, 0)
    }
}

fn write_block(out: &mut String, block: &Block, indent: usize) {
    for (i, s) in block.stats.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&INDENT.repeat(indent));
        out.push_str(&stat(s, indent));
    }
}

/// Renders a nested block on its own lines followed by the closing keyword line.
fn body(block: &Block, indent: usize, close: &str) -> String {
    let mut out = String::new();
    if !block.stats.is_empty() {
        out.push('\n');
        write_block(&mut out, block, indent + 1);
    }
    out.push('\n');
    out.push_str(&INDENT.repeat(indent));
    out.push_str(close);
    out
}

fn list<T>(items: &Punctuated<T>, render: impl Fn(&T) -> String) -> String {
    items.iter().map(render).collect::<Vec<_>>().join(", ")
}

fn exprs(items: &Punctuated<Expr>, indent: usize) -> String {
    list(items, |e| expr(e, indent))
}

fn stat(s: &Stat, indent: usize) -> String {
    match s {
        Stat::Empty(_) => ";".into(),
        Stat::Assign(a) => format!(
            "{} = {}",
            exprs(&a.targets, indent),
            exprs(&a.values, indent)
        ),
        Stat::Call(c) => expr(&c.call, indent),
        Stat::Do(d) => format!("do{}", body(&d.block, indent, "end")),
        Stat::While(w) => format!(
            "while {} do{}",
            expr(&w.cond, indent),
            body(&w.block, indent, "end")
        ),
        Stat::Repeat(r) => format!(
            "repeat{}",
            body(
                &r.block,
                indent,
                &format!("until {}", expr(&r.cond, indent))
            )
        ),
        Stat::If(i) => {
            let mut out = format!("if {} then", expr(&i.cond, indent));
            let mut pending = &i.block;
            for clause in &i.else_ifs {
                out.push_str(&body(
                    pending,
                    indent,
                    &format!("elseif {} then", expr(&clause.cond, indent)),
                ));
                pending = &clause.block;
            }
            if let Some(else_clause) = &i.else_clause {
                out.push_str(&body(pending, indent, "else"));
                pending = &else_clause.block;
            }
            out.push_str(&body(pending, indent, "end"));
            out
        }
        Stat::NumericFor(f) => {
            let mut head = format!(
                "for {} = {}, {}",
                f.var.name(),
                expr(&f.start, indent),
                expr(&f.limit, indent)
            );
            if let Some((_, step)) = &f.step {
                head.push_str(&format!(", {}", expr(step, indent)));
            }
            format!("{head} do{}", body(&f.block, indent, "end"))
        }
        Stat::GenericFor(f) => format!(
            "for {} in {} do{}",
            list(&f.names, |n| n.name().to_string()),
            exprs(&f.exprs, indent),
            body(&f.block, indent, "end")
        ),
        Stat::Function(f) => {
            let mut name = expr(&f.name, indent);
            if let Some(method) = &f.method {
                name.push(':');
                name.push_str(method.name.name());
            }
            format!("function {name}{}", func_body(&f.body, indent))
        }
        Stat::LocalFunction(f) => format!(
            "local function {}{}",
            f.name.name(),
            func_body(&f.body, indent)
        ),
        Stat::Local(l) => {
            let mut out = format!("local {}", list(&l.names, |n| n.name().to_string()));
            if !l.values.is_empty() {
                out.push_str(" = ");
                out.push_str(&exprs(&l.values, indent));
            }
            out
        }
        Stat::Return(r) if r.values.is_empty() => "return".into(),
        Stat::Return(r) => format!("return {}", exprs(&r.values, indent)),
        Stat::Break(_) => "break".into(),
        Stat::Goto(g) => format!("goto {}", g.label.name()),
        Stat::Label(l) => format!("::{}::", l.name.name()),
        Stat::Invalid(_) => "<error>".into(),
    }
}

fn func_body(f: &FuncBody, indent: usize) -> String {
    let params = list(&f.params, |p| match p {
        Param::Name(id) => id.name().to_string(),
        Param::Vararg(_) => "...".to_string(),
    });
    format!("({params}){}", body(&f.block, indent, "end"))
}

fn args(a: &CallArgs, indent: usize) -> String {
    match a {
        CallArgs::Paren { args, .. } => format!("({})", exprs(args, indent)),
        CallArgs::Table(t) => format!("({})", table(t, indent)),
        CallArgs::String(s) => format!("({})", s.token.text),
    }
}

fn table(t: &TableExpr, indent: usize) -> String {
    let fields = list(&t.fields, |f| match f {
        TableField::Positional(value) => expr(value, indent),
        TableField::Named(n) => format!("{} = {}", n.name.name(), expr(&n.value, indent)),
        TableField::Keyed(k) => format!("[{}] = {}", expr(&k.key, indent), expr(&k.value, indent)),
    });
    format!("{{{fields}}}")
}

fn expr(e: &Expr, indent: usize) -> String {
    match e {
        Expr::Lit(lit) => lit.token.text.clone(),
        Expr::Vararg(_) => "...".into(),
        Expr::Name(id) => id.name().to_string(),
        Expr::Function(f) => format!("function{}", func_body(&f.body, indent)),
        Expr::Table(t) => table(t, indent),
        Expr::Paren(p) => format!("({})", expr(&p.inner, indent)),
        Expr::Field(f) => format!("{}.{}", expr(&f.base, indent), f.name.name()),
        Expr::Index(i) => format!("{}[{}]", expr(&i.base, indent), expr(&i.index, indent)),
        Expr::Call(c) => format!("{}{}", expr(&c.callee, indent), args(&c.args, indent)),
        Expr::MethodCall(m) => format!(
            "{}:{}{}",
            expr(&m.receiver, indent),
            m.name.name(),
            args(&m.args, indent)
        ),
        Expr::Unary(u) => match u.op.kind {
            UnOpKind::Not => format!("(not {})", expr(&u.operand, indent)),
            kind => format!("({}{})", kind.as_str(), expr(&u.operand, indent)),
        },
        Expr::Binary(b) => format!(
            "({} {} {})",
            expr(&b.lhs, indent),
            b.op.kind.as_str(),
            expr(&b.rhs, indent)
        ),
        Expr::Invalid(_) => "<error>".into(),
    }
}
