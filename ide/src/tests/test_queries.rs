use indoc::indoc;

use super::query_dsl::t;
use crate::{
    CompletionItem, DiagnosticItem, IdeConfig, IdeError, Position, Range, Snapshot,
    complete_locals, definition, diagnostics, highlights,
};

// ----------------------------
// Definition
// ----------------------------

#[test]
fn definition_of_local() {
    assert_eq!(t("local count = 1\nprint(cou$0nt)").definition(), Some((0, 6)));
    // Cursor right after the name.
    assert_eq!(t("local count = 1\nprint(count$0)").definition(), Some((0, 6)));
    // On the declaration itself.
    assert_eq!(t("local co$0unt = 1").definition(), Some((0, 6)));
}

#[test]
fn definition_follows_shadowing() {
    let fixture = indoc! {"
        local v = 1
        do
          local v = 2
          print(v$0)
        end
    "};
    assert_eq!(t(fixture).definition(), Some((2, 8)));
}

#[test]
fn definition_of_parameter() {
    assert_eq!(
        t("function f(self, n) return n$0 * 2 end").definition(),
        Some((0, 17))
    );
}

#[test]
fn method_self_points_at_method_name() {
    let fixture = indoc! {"
        function Account:deposit(v)
          self.balance = se$0lf.balance + v
        end"};
    assert_eq!(t(fixture).definition(), Some((0, 17)));
    assert_eq!(t(fixture).highlights(), vec![(1, 2), (1, 17)]);
    let hover = t(fixture).hover().unwrap();
    assert_eq!(hover.name, "self");
    assert_eq!(hover.kind, "parameter");
    assert_eq!(
        t("function Account:deposit(v)\n  s$0\nend").completions(),
        vec!["self"]
    );
}

#[test]
fn no_definition_for_globals_and_fields() {
    assert_eq!(t("print(x$0)").definition(), None);
    assert_eq!(t("pri$0nt(x)").definition(), None);
    assert_eq!(t("local t = {}\nt.na$0me = 1").definition(), None);
    assert_eq!(t("local t = {}\nt:na$0me()").definition(), None);
    assert_eq!(t("local t = { na$0me = 1 }").definition(), None);
    assert_eq!(t("x = 1 $0 ").definition(), None);
}

#[test]
fn positions_outside_the_document_are_errors() {
    let snapshot = Snapshot::new(1, "x = 1".to_string());
    assert_eq!(
        definition(&snapshot, Position::new(3, 0)),
        Err(IdeError::PositionOutOfRange {
            line: 3,
            character: 0
        })
    );
    assert!(highlights(&snapshot, Position::new(1, 0)).is_err());
}

// ----------------------------
// Highlights
// ----------------------------

#[test]
fn highlights_of_local() {
    let fixture = indoc! {"
        local n = 0
        for i = 1, 3 do
          n = n + i
        end
        return n$0"};
    assert_eq!(
        t(fixture).highlights(),
        vec![(0, 6), (2, 2), (2, 6), (4, 7)]
    );
}

#[test]
fn highlights_keep_shadowed_names_apart() {
    let fixture = indoc! {"
        local v = 1
        do
          local v = 2
          print(v$0)
        end
        print(v)
    "};
    assert_eq!(t(fixture).highlights(), vec![(2, 8), (3, 8)]);
}

#[test]
fn highlights_of_global_cover_every_global_use() {
    let fixture = "x = 1\nprint(x$0)\nlocal x = 2\nprint(x)";
    assert_eq!(t(fixture).highlights(), vec![(0, 0), (1, 6)]);
}

#[test]
fn no_highlights_off_names() {
    assert!(t("local t = {}\nt.na$0me = 1").highlights().is_empty());
    assert!(t("$0 ").highlights().is_empty());
}

// ----------------------------
// Hover
// ----------------------------

#[test]
fn hover_shows_doc_comment() {
    let fixture = indoc! {"
        --- Number of retries.
        --- Zero disables them.
        local retries = 3
        print(retries$0)"};
    let hover = t(fixture).hover().unwrap();
    assert_eq!(hover.name, "retries");
    assert_eq!(hover.kind, "local");
    assert_eq!(
        hover.doc.as_deref(),
        Some("Number of retries.\nZero disables them.")
    );
    assert_eq!(
        hover.range,
        Range {
            start: Position::new(3, 6),
            end: Position::new(3, 13)
        }
    );
    assert_eq!(
        hover.markdown(),
        "```lua\n(local) retries\n```\n\n---\n\nNumber of retries.\nZero disables them."
    );
}

#[test]
fn hover_doc_comments_can_be_disabled() {
    let config = IdeConfig {
        hover_doc_comments: false,
        ..IdeConfig::default()
    };
    let hover = t("--- Doc.\nlocal function f() end\nf$0()")
        .config(config)
        .hover()
        .unwrap();
    assert_eq!(hover.kind, "local function");
    assert_eq!(hover.doc, None);
    assert_eq!(hover.markdown(), "```lua\n(local function) f\n```");
}

#[test]
fn hover_kinds() {
    assert_eq!(t("print$0('x')").hover().unwrap().kind, "global");
    assert_eq!(
        t("local function f(a) return a$0 end").hover().unwrap().kind,
        "parameter"
    );
    assert_eq!(
        t("for k$0, v in pairs(t) do end").hover().unwrap().kind,
        "loop variable"
    );
    // A blank line separates the comment from the declaration.
    assert_eq!(t("--- Doc.\n\nlocal x$0 = 1").hover().unwrap().doc, None);
    assert!(t("x = 1$0").hover().is_none());
}

// ----------------------------
// Completion
// ----------------------------

#[test]
fn completion_filters_by_typed_prefix() {
    let fixture = indoc! {"
        local alpha, beta = 1, 2
        local function apply(f) end
        do
          local alps = 3
          print(al$0)
        end
    "};
    assert_eq!(t(fixture).completions(), vec!["alps", "alpha"]);
}

#[test]
fn completion_lists_latest_first() {
    let snapshot = Snapshot::new(1, "local a = 1\nlocal function b() end\nprint()".to_string());
    let items = complete_locals(&snapshot, Position::new(2, 6), &IdeConfig::default()).unwrap();
    assert_eq!(
        items,
        vec![
            CompletionItem {
                label: "b".into(),
                detail: "local function"
            },
            CompletionItem {
                label: "a".into(),
                detail: "local"
            },
        ]
    );
}

#[test]
fn completion_respects_limit() {
    let config = IdeConfig {
        completion_limit: 1,
        ..IdeConfig::default()
    };
    assert_eq!(
        t("local a, b, c = 1, 2, 3\nprint($0)").config(config).completions(),
        vec!["c"]
    );
}

#[test]
fn completion_only_sees_declared_names() {
    assert!(t("print($0)\nlocal later = 1").completions().is_empty());
    assert_eq!(
        t("local function f(x)\n  local y = x\n  $0").completions(),
        vec!["y", "x", "f"]
    );
}

// ----------------------------
// Diagnostics
// ----------------------------

#[test]
fn diagnostics_use_editor_ranges() {
    let snapshot = Snapshot::new(1, "a = '😀' @".to_string());
    let items = diagnostics(&snapshot, &IdeConfig::default());
    assert_eq!(
        items.first(),
        Some(&DiagnosticItem {
            range: Range {
                start: Position::new(0, 9),
                end: Position::new(0, 10)
            },
            severity: "error",
            message: "unexpected character '@'".into(),
        })
    );
}

#[test]
fn diagnostics_are_capped() {
    let snapshot = Snapshot::new(1, "@ @ @ @".to_string());
    let config = IdeConfig {
        max_diagnostics: 2,
        ..IdeConfig::default()
    };
    assert_eq!(diagnostics(&snapshot, &config).len(), 2);
    assert!(diagnostics(&snapshot, &IdeConfig::default()).len() >= 4);
}
