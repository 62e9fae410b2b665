use insta::assert_snapshot;

use crate::ast::{AstNode, Expr, Stat};
use crate::diagnostics::{Severity, format_diagnostics};
use crate::parser::MAX_DEPTH;
use crate::tests::common::init_tracing;
use crate::{ParseOutput, parse};

fn messages(out: &ParseOutput) -> Vec<&str> {
    out.diagnostics.iter().map(|d| d.message.as_str()).collect()
}

/// Runs `f` on a thread with a 2 MiB stack, the default for spawned threads.
fn on_small_stack(f: impl FnOnce() + Send + 'static) {
    std::thread::Builder::new()
        .stack_size(2 << 20)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_cut_off_assignment_recovers() {
    let out = parse("foo = \nbar = 1");
    assert_eq!(messages(&out), vec!["expected expression after '='"]);
    assert_eq!(out.block.stats.len(), 2);

    let first = assert_stat!(&out.block.stats[0], Assign);
    assert_name!(first.targets.first().unwrap(), "foo");
    assert!(matches!(first.values.first(), Some(Expr::Invalid(i)) if i.tokens.is_empty()));

    let second = assert_stat!(&out.block.stats[1], Assign);
    assert_name!(second.targets.first().unwrap(), "bar");
    assert_lit_num!(second.values.first().unwrap(), 1);
    assert!(!second.eq.is_missing());

    assert_snapshot!(format_diagnostics("foo = \nbar = 1", out.diagnostics), @r"
    error: expected expression after '='
      --> <input>:1:6 [5..5]
    ");
}

#[test]
fn test_cut_off_local_recovers() {
    let out = parse("local x =\ny = 2");
    assert_eq!(messages(&out), vec!["expected expression after '='"]);
    assert_stat!(&out.block.stats[0], Local);
    assert_stat!(&out.block.stats[1], Assign);
}

#[test]
fn test_missing_end_points_at_opener() {
    let out = parse("if x then y()");
    assert_eq!(out.diagnostics.len(), 1);
    let diag = &out.diagnostics[0];
    assert_eq!(diag.message, "expected 'end', found end of input");
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.labels.len(), 1);
    assert_eq!(diag.labels[0].message.as_deref(), Some("this 'if' is not closed"));
    assert_eq!((diag.labels[0].span.start, diag.labels[0].span.end), (0, 2));

    let stat = assert_stat!(&out.block.stats[0], If);
    assert!(stat.end.is_missing());
    assert_eq!((stat.end.span.start, stat.end.span.end), (13, 13));
    assert_eq!(stat.block.stats.len(), 1);
}

#[test]
fn test_unclosed_table() {
    let source = "local t = {1, 2\nprint(t)";
    let out = parse(source);
    assert_eq!(out.block.stats.len(), 2);
    assert_stat!(&out.block.stats[1], Call);
    assert_snapshot!(format_diagnostics(source, out.diagnostics), @r"
    error: expected '}', found identifier
      --> <input>:2:1 [16..21]
      = label: 1:11 [10..11] this '{' is not closed
    ");
}

#[test]
fn test_missing_then_and_do() {
    let out = parse("if x y() end");
    assert_eq!(messages(&out), vec!["expected 'then', found identifier"]);
    let stat = assert_stat!(&out.block.stats[0], If);
    assert!(stat.then.is_missing());
    assert!(!stat.end.is_missing());

    let out = parse("while x y() end");
    assert_eq!(messages(&out), vec!["expected 'do', found identifier"]);
}

#[test]
fn test_unclosed_call() {
    let out = parse("f(1, 2");
    assert_eq!(messages(&out), vec!["expected ')', found end of input"]);
    assert_eq!(
        out.diagnostics[0].labels[0].message.as_deref(),
        Some("this '(' is not closed")
    );
}

#[test]
fn test_missing_operand() {
    let out = parse("x = 1 +");
    assert_eq!(messages(&out), vec!["expected expression, found end of input"]);
    let assign = assert_stat!(&out.block.stats[0], Assign);
    let (left, right) = assert_bin!(assign.values.first().unwrap(), crate::ast::BinOpKind::Add);
    assert_lit_num!(left, 1);
    assert!(matches!(right, Expr::Invalid(_)));
}

#[test]
fn test_stray_block_end() {
    let out = parse("x = 1 end y = 2");
    assert_eq!(messages(&out), vec!["unexpected 'end'"]);
    assert_eq!(out.block.stats.len(), 3);
    assert_stat!(&out.block.stats[0], Assign);
    let invalid = assert_stat!(&out.block.stats[1], Invalid);
    assert_eq!(invalid.tokens[0].text, "end");
    assert_stat!(&out.block.stats[2], Assign);
}

#[test]
fn test_statement_after_return() {
    let out = parse("return 1 x = 2");
    assert_eq!(
        messages(&out),
        vec!["'return' must be the last statement in a block"]
    );
    assert_eq!(out.block.stats.len(), 2);
}

#[test]
fn test_invalid_assignment_target() {
    let out = parse("f() = 1");
    assert_eq!(messages(&out), vec!["cannot assign to this expression"]);
    assert_stat!(&out.block.stats[0], Assign);

    let out = parse("a.b, (c) = 1, 2");
    assert_eq!(messages(&out), vec!["cannot assign to this expression"]);
    assert_eq!(out.diagnostics[0].span.start, 5);
}

#[test]
fn test_expression_is_not_a_statement() {
    let out = parse("x\na.b");
    assert_eq!(out.diagnostics.len(), 2);
    assert!(
        out.diagnostics
            .iter()
            .all(|d| d.message == "syntax error: expected '=' or a function call")
    );
    let invalid = assert_stat!(&out.block.stats[1], Invalid);
    assert!(matches!(invalid.expr.as_deref(), Some(Expr::Field(_))));

    let out = parse("1 + 2");
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.block.stats.len(), 1);
}

#[test]
fn test_bad_function_name() {
    let out = parse("function a[1]() end");
    assert_eq!(messages(&out), vec!["function name must be a dotted name"]);
    assert_stat!(&out.block.stats[0], Function);
}

#[test]
fn test_lexer_errors_are_not_repeated() {
    let out = parse("x = @\n@\ny = \"open");
    assert_eq!(
        messages(&out),
        vec![
            "unexpected character '@'",
            "unexpected character '@'",
            "unfinished string"
        ]
    );
    assert_eq!(out.block.stats.len(), 3);
    assert!(matches!(out.block.stats[1], Stat::Invalid(_)));
}

#[test]
fn test_number_run_into_concat() {
    let out = parse("x = 3..2");
    assert_eq!(messages(&out), vec!["malformed number"]);
    let assign = assert_stat!(&out.block.stats[0], Assign);
    assert!(matches!(assign.values.first(), Some(Expr::Invalid(_))));
}

#[test]
fn test_missing_name() {
    let out = parse("local = 1");
    assert_eq!(messages(&out), vec!["expected identifier, found '='"]);
    let local = assert_stat!(&out.block.stats[0], Local);
    assert_eq!(local.names.first().unwrap().name(), "");
    assert_eq!(local.values.len(), 1);
}

#[test]
fn test_every_input_terminates() {
    for source in [
        "",
        "end",
        ")",
        "(((",
        "]]",
        "local function",
        "function",
        "for",
        "for i",
        "for i =",
        "for a, b in",
        "if",
        "repeat until",
        "return return",
        "goto",
        "::",
        "t = {[",
        "t = {x =",
        "f(,)",
        "a:b",
        "a.",
        "x = function(a, 1) end",
        "else elseif until end",
        "local a <const> = 1",
    ] {
        let out = parse(source);
        assert!(!out.diagnostics.is_empty() || source.is_empty(), "{source:?}");
        assert!(out.block.span().end <= source.len() as u32);
    }
}

#[test]
fn test_nesting_limit_expressions() {
    init_tracing();
    on_small_stack(|| {
        let depth = MAX_DEPTH + 50;
        let source = format!("x = {}1{}", "(".repeat(depth), ")".repeat(depth));
        let out = parse(&source);
        assert_eq!(messages(&out), vec!["chunk has too many syntax levels"]);
        assert_eq!(crate::lexer::reconstruct(&out.tokens), source);

        let depth = MAX_DEPTH - 10;
        let source = format!("x = {}1{}", "(".repeat(depth), ")".repeat(depth));
        let out = parse(&source);
        assert!(out.diagnostics.is_empty());
        assert_eq!(out.block.span().end as usize, source.len());
    });
}

#[test]
fn test_nesting_limit_blocks() {
    on_small_stack(|| {
        let depth = MAX_DEPTH + 50;
        let source = format!("{}{}", "do ".repeat(depth), "end ".repeat(depth));
        let out = parse(&source);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].message, "chunk has too many syntax levels");

        let shallow = format!("{}{}", "do ".repeat(50), "end ".repeat(50));
        assert!(parse(&shallow).diagnostics.is_empty());
    });
}

#[test]
fn test_long_chains_are_cut_off() {
    on_small_stack(|| {
        for source in [
            format!("x = {}1", "1 + ".repeat(100_000)),
            format!("x = a{}", ".b".repeat(100_000)),
            format!("f{}", "()".repeat(100_000)),
        ] {
            let out = parse(&source);
            assert_eq!(messages(&out), vec!["chunk has too many syntax levels"]);
            assert_eq!(out.block.span(), crate::Span::new(0, source.len() as u32));
            assert_eq!(crate::lexer::reconstruct(&out.tokens), source);

            // The tree stays shallow enough to query and drop.
            let path = crate::locate(&out.block, source.len() as u32 - 1).unwrap();
            assert!(path.parents.len() <= MAX_DEPTH + 2);
            let mut nodes = 0;
            crate::walk(&out.block, &mut |_| {
                nodes += 1;
                true
            });
            assert!(nodes > MAX_DEPTH);
        }
    });
}
