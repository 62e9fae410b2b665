use lua_analyzer::ast::Node;
use lua_analyzer::lexer::reconstruct;
use lua_analyzer::{Lookup, LineIndex, locals_at, locate, parse, walk};
use proptest::prelude::*;

/// Lua-ish fragments; joined together they hit most parser paths, including broken ones.
fn fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "local", "function", "end", "if", "then", "elseif", "else", "for", "in", "do", "while",
        "repeat", "until", "return", "break", "goto", "not", "and", "or", "nil", "x", "y", "f",
        "=", "==", "~=", "+", "-", "..", "...", "#", "(", ")", "{", "}", "[", "]", ",", ";", ".",
        ":", "::", "1", "0x1F", "2.5e3", "'s'", "\"q\\n\"", "[[long]]", "--c\n", "--[[b]]", "\n",
        "@", "\"open", "é",
    ])
}

fn lua_like() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..48).prop_map(|parts| parts.join(" "))
}

fn any_source() -> impl Strategy<Value = String> {
    prop_oneof![lua_like(), ".{0,80}"]
}

proptest! {
    #[test]
    fn tokens_reproduce_source(source in any_source()) {
        let out = parse(&source);
        prop_assert_eq!(reconstruct(&out.tokens), source);
    }

    #[test]
    fn spans_nest_and_stay_in_bounds(source in any_source()) {
        let out = parse(&source);
        let mut ok = true;
        walk(&out.block, &mut |node: Node<'_>| {
            let span = node.span();
            ok &= span.end as usize <= source.len();
            ok &= node
                .semantic_children()
                .iter()
                .all(|child| span.contains_span(child.span()));
            true
        });
        prop_assert!(ok);

        for diag in &out.diagnostics {
            prop_assert!(source.is_char_boundary(diag.span.start as usize));
            prop_assert!(source.is_char_boundary(diag.span.end as usize));
        }
    }

    #[test]
    fn positional_queries_never_panic(source in lua_like()) {
        let out = parse(&source);
        let index = LineIndex::from_source(&source);
        for (pos, _) in source.char_indices().chain([(source.len(), ' ')]) {
            let pos = pos as u32;
            if let Some(path) = locate(&out.block, pos) {
                prop_assert!(path.node.span().contains(pos));
                prop_assert!(path.parents.iter().all(|p| p.span().contains(pos)));
            }
            let locals = locals_at(&out.block, pos, Lookup::All);
            prop_assert!(locals.keys().all(|name| !name.is_empty()));

            let at = index.from_position(&source, pos);
            prop_assert_eq!(at.and_then(|at| index.to_position(&source, at)), Some(pos));
        }
    }
}
