use crate::{ParseOutput, parse};

/// Parses `source` and fails the test on any diagnostic.
pub fn parse_ok(source: &str) -> ParseOutput {
    let out = parse(source);
    assert!(
        out.diagnostics.is_empty(),
        "unexpected diagnostics for {source:?}: {:?}",
        out.diagnostics
    );
    out
}

/// Routes `tracing` output to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Byte offset of the `nth` (0-based) occurrence of `needle` in `source`.
pub fn offset_of(source: &str, needle: &str, nth: usize) -> u32 {
    source
        .match_indices(needle)
        .nth(nth)
        .map(|(i, _)| i as u32)
        .unwrap_or_else(|| panic!("{needle:?} occurs fewer than {} times", nth + 1))
}

macro_rules! assert_stat {
    ($stat:expr, $variant:ident) => {{
        match $stat {
            crate::ast::Stat::$variant(s) => s,
            other => panic!("expected Stat::{}, got {:?}", stringify!($variant), other),
        }
    }};
}

macro_rules! assert_expr {
    ($expr:expr, $variant:ident) => {{
        match $expr {
            crate::ast::Expr::$variant(e) => e,
            other => panic!("expected Expr::{}, got {:?}", stringify!($variant), other),
        }
    }};
}

macro_rules! assert_name {
    ($expr:expr, $name:expr) => {{
        match $expr {
            crate::ast::Expr::Name(id) => assert_eq!(id.name(), $name),
            other => panic!("expected Name({}), got {:?}", $name, other),
        }
    }};
}

macro_rules! assert_bin {
    ($expr:expr, $op:pat) => {{
        match $expr {
            crate::ast::Expr::Binary(b) if matches!(b.op.kind, $op) => {
                (b.lhs.as_ref(), b.rhs.as_ref())
            }
            other => panic!("expected Binary({}), got {:?}", stringify!($op), other),
        }
    }};
}

macro_rules! assert_lit_num {
    ($expr:expr, $value:expr) => {{
        match $expr {
            crate::ast::Expr::Lit(lit) if lit.kind == crate::ast::LitKind::Number => {
                assert_eq!(lit.token.text, $value.to_string());
            }
            other => panic!("expected Number literal, got {:?}", other),
        }
    }};
}
