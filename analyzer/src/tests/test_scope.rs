use indoc::indoc;

use crate::ParseOutput;
use crate::ast::Identifier;
use crate::parse;
use crate::scope::{Binding, BindingKind, Lookup, locals_at, resolve};
use crate::tests::common::{offset_of, parse_ok};
use crate::traverse::locate;

fn ident_at(out: &ParseOutput, pos: u32) -> &Identifier {
    locate(&out.block, pos)
        .and_then(|path| path.node.as_identifier())
        .unwrap_or_else(|| panic!("no identifier at {pos}"))
}

/// Byte offset of the `nth` occurrence of `name` as a whole word.
fn word(source: &str, name: &str, nth: usize) -> u32 {
    let is_ident = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    source
        .match_indices(name)
        .filter(|(i, _)| {
            !is_ident(source[..*i].chars().next_back())
                && !is_ident(source[i + name.len()..].chars().next())
        })
        .nth(nth)
        .map(|(i, _)| i as u32)
        .unwrap_or_else(|| panic!("word {name:?} occurs fewer than {} times", nth + 1))
}

/// Resolves the `nth` occurrence of `name` and returns where its declaration starts.
fn resolve_nth(source: &str, name: &str, nth: usize) -> Option<(BindingKind, u32)> {
    let out = parse(source);
    let ident = ident_at(&out, word(source, name, nth));
    resolve(&out.block, ident).map(|b| (b.kind, b.ident.token.span.start))
}

fn visible(source: &str, pos: u32) -> Vec<String> {
    let out = parse(source);
    locals_at(&out.block, pos, Lookup::All).into_keys().collect()
}

#[test]
fn test_shadowing() {
    let source = indoc! {"
        local x = 1
        do
          local x = 2
          print(x)
        end
        print(x)"};
    let inner = word(source, "x", 1);
    let outer = word(source, "x", 0);
    assert_eq!(resolve_nth(source, "x", 2), Some((BindingKind::Local, inner)));
    assert_eq!(resolve_nth(source, "x", 3), Some((BindingKind::Local, outer)));
}

#[test]
fn test_redeclaration_in_same_block() {
    let source = "local x = 1 local x = x + 1 print(x)";
    // The initializer still sees the first declaration.
    assert_eq!(
        resolve_nth(source, "x", 2),
        Some((BindingKind::Local, word(source, "x", 0)))
    );
    assert_eq!(
        resolve_nth(source, "x", 3),
        Some((BindingKind::Local, word(source, "x", 1)))
    );
}

#[test]
fn test_local_not_visible_in_own_initializer() {
    assert_eq!(resolve_nth("local x = x", "x", 1), None);
    assert_eq!(resolve_nth("local f = function() return f() end", "f", 1), None);
}

#[test]
fn test_local_function_is_recursive() {
    let source = "local function f(n) return f(n - 1) end";
    assert_eq!(
        resolve_nth(source, "f", 1),
        Some((BindingKind::LocalFunction, word(source, "f", 0)))
    );
}

#[test]
fn test_parameters() {
    let source = "function g(a, b) return a + b end return a";
    assert_eq!(
        resolve_nth(source, "a", 1),
        Some((BindingKind::Parameter, word(source, "a", 0)))
    );
    assert_eq!(
        resolve_nth(source, "b", 1),
        Some((BindingKind::Parameter, word(source, "b", 0)))
    );
    assert_eq!(resolve_nth(source, "a", 2), None);
}

#[test]
fn test_method_binds_implicit_self() {
    let source = "function obj.m:run(n) return self, n end return self";
    let out = parse_ok(source);
    let ident = ident_at(&out, word(source, "self", 0));
    let binding = resolve(&out.block, ident).unwrap();
    assert_eq!(binding.name(), "self");
    assert_eq!(binding.kind, BindingKind::Parameter);
    assert_eq!(binding.ident.name(), "run");
    assert_eq!(binding.decl.text, "function");
    // Outside the body `self` is global again.
    assert_eq!(resolve_nth(source, "self", 1), None);

    let body = word(source, "return", 0);
    assert_eq!(visible(source, body), vec!["self", "n"]);
}

#[test]
fn test_self_only_in_methods() {
    assert_eq!(resolve_nth("function obj.run() return self end", "self", 0), None);
    // An explicit `self` parameter resolves like any other.
    let source = "function obj.run(self) return self end";
    assert_eq!(
        resolve_nth(source, "self", 1),
        Some((BindingKind::Parameter, word(source, "self", 0)))
    );
    // A nested function inside a method still sees the method's `self`.
    let source = "function a:b() return function() return self end end";
    assert_eq!(
        resolve_nth(source, "self", 0),
        Some((BindingKind::Parameter, word(source, "b", 0)))
    );
}

#[test]
fn test_loop_variables_are_scoped_to_body() {
    let source = "for i = i, 3 do print(i) end print(i)";
    assert_eq!(resolve_nth(source, "i", 1), None);
    assert_eq!(
        resolve_nth(source, "i", 2),
        Some((BindingKind::LoopVariable, word(source, "i", 0)))
    );
    assert_eq!(resolve_nth(source, "i", 3), None);

    let source = "for k, v in pairs(t) do use(k, v) end";
    assert_eq!(
        resolve_nth(source, "v", 1),
        Some((BindingKind::LoopVariable, word(source, "v", 0)))
    );
}

#[test]
fn test_repeat_locals_visible_in_condition() {
    let source = "repeat local done = step() until done";
    assert_eq!(
        resolve_nth(source, "done", 1),
        Some((BindingKind::Local, word(source, "done", 0)))
    );
}

#[test]
fn test_if_branches_do_not_leak() {
    let source = "if c then local a = 1 elseif d then print(a) else local a = 2 print(a) end print(a)";
    assert_eq!(resolve_nth(source, "a", 1), None);
    assert_eq!(
        resolve_nth(source, "a", 3),
        Some((BindingKind::Local, word(source, "a", 2)))
    );
    assert_eq!(resolve_nth(source, "a", 4), None);
}

#[test]
fn test_declaration_resolves_to_itself() {
    let source = "local x, y = 1, 2";
    let out = parse_ok(source);
    let ident = ident_at(&out, word(source, "y", 0));
    let binding = resolve(&out.block, ident).unwrap();
    assert!(std::ptr::eq(binding.ident, ident));
    assert_eq!(binding.kind.as_str(), "local");
    assert_eq!(binding.decl.text, "local");

    let source = "for i = 1, 2 do end";
    assert_eq!(
        resolve_nth(source, "i", 0),
        Some((BindingKind::LoopVariable, 4))
    );
}

#[test]
fn test_all_visible_in_declaration_order() {
    let source = "local a, b = 1, 2\nlocal function f(c)\n  local a = 3\n  -- here\nend\nlocal z";
    let out = parse_ok(source);
    let pos = offset_of(source, "-- here", 0);
    let bindings = locals_at(&out.block, pos, Lookup::All);

    let names: Vec<_> = bindings.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["a", "b", "f", "c"]);
    let kinds: Vec<_> = bindings.values().map(|b: &Binding<'_>| b.kind).collect();
    assert_eq!(
        kinds,
        vec![
            BindingKind::Local,
            BindingKind::Local,
            BindingKind::LocalFunction,
            BindingKind::Parameter
        ]
    );
    // The inner `a` wins.
    assert_eq!(bindings["a"].ident.token.span.start, word(source, "a", 1));
}

#[test]
fn test_lookup_by_name() {
    let source = "local x = 1 local x = 2 -- here";
    let out = parse_ok(source);
    let pos = offset_of(source, "-- here", 0);

    let found = locals_at(&out.block, pos, Lookup::Name("x"));
    assert_eq!(found.len(), 1);
    assert_eq!(found["x"].ident.token.span.start, word(source, "x", 1));
    assert!(locals_at(&out.block, pos, Lookup::Name("y")).is_empty());
}

#[test]
fn test_visibility_follows_position() {
    let source = "local a = 1\n-- here\nlocal b = 2\ndo\n  \nend";
    assert_eq!(visible(source, offset_of(source, "-- here", 0)), vec!["a"]);
    assert_eq!(visible(source, source.len() as u32), vec!["a", "b"]);
    assert_eq!(visible(source, offset_of(source, "  \n", 0) + 1), vec!["a", "b"]);
    assert!(visible(source, 0).is_empty());
}

#[test]
fn test_unclosed_function_body() {
    let source = "local function f(x)\n  local y = x\n  ";
    assert_eq!(visible(source, source.len() as u32), vec!["f", "x", "y"]);

    let source = "call(function(p)\n  p.";
    assert_eq!(visible(source, source.len() as u32), vec!["p"]);

    let source = "for i = 1, 10 do\n  ";
    assert_eq!(visible(source, source.len() as u32), vec!["i"]);
}

#[test]
fn test_missing_names_bind_nothing() {
    let source = "local = 1\nlocal function (a) end\n";
    assert!(visible(source, source.len() as u32).is_empty());
}
