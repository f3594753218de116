//! End-to-end navigation over the fixture language.

#![allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]

mod common;

use std::time::Duration;

use common::{analysis, analysis_with, at, describe, project, site, EXTRA, MAIN, SHAPES};
use lsp_types::{Position, Url};
use nav_ide::{IdeConfig, IdeError, ReferenceRole};
use nav_project::ModuleId;
use nav_syntax::LineCol;
use nav_testing::WorkspaceBuilder;
use pretty_assertions::assert_eq;

#[test]
fn test_find_references_across_modules() {
    let ws = project();
    let analysis = analysis(&ws);
    let uri = ws.uri("app", "main.nav");
    let pos = ws.position("app", "main.nav", "make");

    let all = analysis.find_all_references(&uri, pos, true).unwrap();
    assert_eq!(
        describe(&ws, &all),
        vec![
            site("app/main.nav", 2, "make"),
            site("lib/shapes.nav", 1, "make"),
            site("lib/shapes.nav", 6, "make"),
        ]
    );

    let usages = analysis.find_all_references(&uri, pos, false).unwrap();
    assert_eq!(
        describe(&ws, &usages),
        vec![site("app/main.nav", 2, "make"), site("lib/shapes.nav", 6, "make")]
    );
}

#[test]
fn test_declaration_cursor_excluded_without_include_declaration() {
    let ws = project();
    let analysis = analysis(&ws);
    let uri = ws.uri("lib", "shapes.nav");
    let pos = at(&ws, "lib", "shapes.nav", "make", 1);

    let usages = analysis.find_all_references(&uri, pos, false).unwrap();
    assert_eq!(
        describe(&ws, &usages),
        vec![site("app/main.nav", 2, "make"), site("lib/shapes.nav", 6, "make")]
    );
}

#[test]
fn test_results_are_symmetric() {
    let ws = project();
    let analysis = analysis(&ws);
    let start = analysis
        .find_all_references(&ws.uri("app", "main.nav"), at(&ws, "app", "main.nav", "p.x", 2), true)
        .unwrap();
    assert_eq!(start.len(), 5);

    for location in &start {
        let again = analysis
            .find_all_references(&location.uri, location.range.start, true)
            .unwrap();
        assert_eq!(describe(&ws, &again), describe(&ws, &start), "from {location:?}");
    }
}

#[test]
fn test_field_references_follow_declared_and_inferred_types() {
    let ws = project();
    let analysis = analysis(&ws);
    let refs = analysis
        .find_all_references(&ws.uri("app", "main.nav"), at(&ws, "app", "main.nav", "p.x", 2), true)
        .unwrap();
    assert_eq!(
        describe(&ws, &refs),
        vec![
            site("app/main.nav", 3, "x"),
            site("lib/extra.nav", 1, "x"),
            site("lib/extra.nav", 1, "x"),
            site("lib/shapes.nav", 0, "x"),
            site("lib/shapes.nav", 3, "x"),
        ]
    );
}

#[test]
fn test_local_references_stay_in_their_unit() {
    let ws = project();
    let analysis = analysis(&ws);
    let refs = analysis
        .find_all_references(&ws.uri("app", "main.nav"), ws.position("app", "main.nav", "p.x"), false)
        .unwrap();
    assert_eq!(
        describe(&ws, &refs),
        vec![site("app/main.nav", 3, "p"), site("app/main.nav", 4, "p")]
    );
}

#[test]
fn test_only_owner_and_direct_importers_are_walked() {
    let ws = project();
    let analysis = analysis(&ws);
    ws.compiler.clear_log();

    analysis
        .find_all_references(&ws.uri("app", "main.nav"), ws.position("app", "main.nav", "make"), true)
        .unwrap();

    let compiled: Vec<(String, String)> = ws
        .compiler
        .compiled()
        .into_iter()
        .map(|(module, unit)| (module.to_string(), unit))
        .collect();
    assert_eq!(
        compiled,
        vec![
            ("app".to_owned(), "main.nav".to_owned()),
            ("lib".to_owned(), "shapes.nav".to_owned()),
            ("lib".to_owned(), "extra.nav".to_owned()),
        ]
    );
}

#[test]
fn test_scope_boundary_excludes_unrelated_modules() {
    let ws = WorkspaceBuilder::new()
        .file("a", "lib.nav", "fn foo() { }\n")
        .file("b", "main.nav", "import a;\nfn run() {\n    a:foo();\n}\n")
        .file("c", "other.nav", "fn foo() { }\nfn call() {\n    foo();\n}\n")
        .build();
    let analysis = analysis(&ws);
    ws.compiler.clear_log();

    let from_a = analysis
        .find_all_references(&ws.uri("a", "lib.nav"), ws.position("a", "lib.nav", "foo"), true)
        .unwrap();
    assert_eq!(
        describe(&ws, &from_a),
        vec![site("a/lib.nav", 0, "foo"), site("b/main.nav", 2, "foo")]
    );
    assert!(ws
        .compiler
        .compiled()
        .iter()
        .all(|(module, _)| module.as_str() != "c"));

    let from_c = analysis
        .find_all_references(&ws.uri("c", "other.nav"), ws.position("c", "other.nav", "foo"), true)
        .unwrap();
    assert_eq!(
        describe(&ws, &from_c),
        vec![site("c/other.nav", 0, "foo"), site("c/other.nav", 2, "foo")]
    );
}

#[test]
fn test_named_records_with_identical_fields_do_not_merge() {
    let source = "type Vec2 = record { x: int; y: int; };\n\
                  type Pair = record { x: int; y: int; };\n\
                  fn f(v: Vec2, p: Pair) { }\n";
    let ws = WorkspaceBuilder::new().file("geo", "a.nav", source).build();
    let analysis = analysis(&ws);
    let uri = ws.uri("geo", "a.nav");
    let pos = ws.position("geo", "a.nav", "Vec2");

    let refs = analysis.find_all_references(&uri, pos, true).unwrap();
    assert_eq!(
        describe(&ws, &refs),
        vec![site("geo/a.nav", 0, "Vec2"), site("geo/a.nav", 2, "Vec2")]
    );

    let edit = analysis.compute_rename_edit(&uri, pos, "Foo").unwrap();
    ws.documents.apply_workspace_edit(&edit, Duration::from_secs(1)).unwrap();
    assert_eq!(
        &*ws.text("geo", "a.nav"),
        "type Foo = record { x: int; y: int; };\n\
         type Pair = record { x: int; y: int; };\n\
         fn f(v: Foo, p: Pair) { }\n"
    );
}

#[test]
fn test_anonymous_records_with_identical_fields_merge() {
    let ws = WorkspaceBuilder::new()
        .file(
            "geo",
            "a.nav",
            "fn f(a: record { x: int; }) { }\n\
             fn g(b: record { x: int; }, c: record { y: int; }) { }\n",
        )
        .file("geo", "b.nav", "fn h(d: record { x: int; }) -> int {\n    return d.x;\n}\n")
        .build();
    let analysis = analysis(&ws);
    let a = ws.uri("geo", "a.nav");
    let pos = ws.position("geo", "a.nav", "record");

    let refs = analysis.find_all_references(&a, pos, true).unwrap();
    let expected = vec![
        site("geo/a.nav", 0, "record"),
        site("geo/a.nav", 1, "record"),
        site("geo/b.nav", 0, "record"),
    ];
    assert_eq!(describe(&ws, &refs), expected);

    let from_b = analysis
        .find_all_references(&ws.uri("geo", "b.nav"), ws.position("geo", "b.nav", "record"), false)
        .unwrap();
    assert_eq!(describe(&ws, &from_b), expected);

    assert_eq!(
        analysis.hover_text(&a, pos).unwrap(),
        "```\nrecord { x: int; }\n```"
    );
    assert!(analysis.goto_definition(&a, pos).unwrap().is_empty());
    assert!(matches!(
        analysis.compute_rename_edit(&a, pos, "Named"),
        Err(IdeError::InvalidRenameTarget { .. })
    ));
}

#[test]
fn test_rename_then_requery() {
    let ws = project();
    let analysis = analysis(&ws);
    let uri = ws.uri("app", "main.nav");

    let edit = analysis
        .compute_rename_edit(&uri, ws.position("app", "main.nav", "make"), "build")
        .unwrap();
    let changes = edit.changes.as_ref().unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes.values().map(Vec::len).sum::<usize>(), 3);

    assert_eq!(ws.documents.apply_workspace_edit(&edit, Duration::from_secs(1)).unwrap(), 2);
    assert!(ws.text("app", "main.nav").contains("lib:build(1, 2)"));
    assert!(ws.text("lib", "shapes.nav").contains("fn build(x: int"));
    assert!(ws.text("lib", "shapes.nav").contains("= build(0, 0);"));

    let pos = ws.position("app", "main.nav", "build");
    let refs = analysis.find_all_references(&uri, pos, true).unwrap();
    assert_eq!(
        describe(&ws, &refs),
        vec![
            site("app/main.nav", 2, "build"),
            site("lib/shapes.nav", 1, "build"),
            site("lib/shapes.nav", 6, "build"),
        ]
    );

    // Renaming to the current name changes nothing.
    let before = (ws.text("app", "main.nav"), ws.text("lib", "shapes.nav"));
    let same = analysis.compute_rename_edit(&uri, pos, "build").unwrap();
    ws.documents.apply_workspace_edit(&same, Duration::from_secs(1)).unwrap();
    assert_eq!((ws.text("app", "main.nav"), ws.text("lib", "shapes.nav")), before);
}

#[test]
fn test_rename_and_back_restores_the_source() {
    let ws = project();
    let analysis = analysis(&ws);
    let texts = |ws: &nav_testing::Workspace| {
        [
            ws.text("lib", "shapes.nav"),
            ws.text("lib", "extra.nav"),
            ws.text("app", "main.nav"),
        ]
        .map(|text| text.to_string())
    };
    let original = texts(&ws);
    assert_eq!(original, [SHAPES, EXTRA, MAIN].map(str::to_owned));

    let rename = |uri: Url, pos: Position, name: &str| {
        let edit = analysis.compute_rename_edit(&uri, pos, name).unwrap();
        ws.documents.apply_workspace_edit(&edit, Duration::from_secs(1)).unwrap();
    };

    rename(ws.uri("app", "main.nav"), ws.position("app", "main.nav", "make"), "build");
    assert_ne!(texts(&ws), original);
    rename(ws.uri("app", "main.nav"), ws.position("app", "main.nav", "build"), "make");
    assert_eq!(texts(&ws), original);

    let field = at(&ws, "lib", "shapes.nav", "x: int; y", 0);
    rename(ws.uri("lib", "shapes.nav"), field, "horizontal");
    assert!(ws.text("lib", "extra.nav").contains("p.horizontal * p.horizontal"));
    rename(ws.uri("lib", "shapes.nav"), field, "x");
    assert_eq!(texts(&ws), original);
}

#[test]
fn test_rename_edits_cover_every_occurrence_once() {
    let ws = project();
    let analysis = analysis(&ws);
    let edit = analysis
        .compute_rename_edit(
            &ws.uri("lib", "shapes.nav"),
            at(&ws, "lib", "shapes.nav", "x: int; y", 0),
            "horizontal",
        )
        .unwrap();
    let changes = edit.changes.unwrap();
    let shapes = &changes[&ws.uri("lib", "shapes.nav")];
    let extra = &changes[&ws.uri("lib", "extra.nav")];
    let main = &changes[&ws.uri("app", "main.nav")];
    assert_eq!((shapes.len(), extra.len(), main.len()), (2, 2, 1));
    assert!(shapes.windows(2).all(|w| {
        (w[0].range.start.line, w[0].range.start.character)
            < (w[1].range.start.line, w[1].range.start.character)
    }));
    assert!(changes.values().flatten().all(|e| e.new_text == "horizontal"));
}

#[test]
fn test_rename_rejects_invalid_targets() {
    let ws = project();
    let analysis = analysis(&ws);
    let main = ws.uri("app", "main.nav");

    ws.compiler.clear_log();
    let bad_name = analysis.compute_rename_edit(&main, ws.position("app", "main.nav", "make"), "1st");
    assert!(matches!(bad_name, Err(IdeError::InvalidRenameTarget { .. })));
    assert!(ws.compiler.compiled().is_empty(), "name validated before compiling");

    let builtin = analysis.compute_rename_edit(&main, ws.position("app", "main.nav", "print"), "show");
    assert!(matches!(builtin, Err(IdeError::InvalidRenameTarget { .. })));
    assert_eq!(ws.compiler.compiled().len(), 1, "target validated before other units");

    let keyword = analysis.compute_rename_edit(
        &ws.uri("lib", "shapes.nav"),
        ws.position("lib", "shapes.nav", "fn"),
        "other",
    );
    assert!(matches!(keyword, Err(IdeError::InvalidRenameTarget { .. })));
}

#[test]
fn test_compilation_failure_aborts_request() {
    let ws = WorkspaceBuilder::new()
        .file("lib", "ok.nav", "fn good() { }\n")
        .file("lib", "broken.nav", "fn bad() { @ }\n")
        .build();
    let analysis = analysis(&ws);
    let err = analysis
        .find_all_references(&ws.uri("lib", "ok.nav"), ws.position("lib", "ok.nav", "good"), true)
        .unwrap_err();
    assert_eq!(
        err,
        IdeError::CompilationFailed {
            module: ModuleId::new("lib"),
            unit: "broken.nav".to_owned(),
            message: "unexpected character `@`".to_owned(),
        }
    );
    assert_eq!(ws.documents.locks().held(), 0);
}

#[test]
fn test_hover() {
    let ws = project();
    let analysis = analysis(&ws);
    let main = ws.uri("app", "main.nav");

    assert_eq!(
        analysis.hover_text(&main, ws.position("app", "main.nav", "make")).unwrap(),
        "```\nfn make(x: int, y: int) -> Point\n```\nDeclared in module `lib`"
    );
    assert_eq!(
        analysis.hover_text(&main, at(&ws, "app", "main.nav", "p.x", 2)).unwrap(),
        "```\nx: int\n```\nDeclared in module `lib`"
    );
    assert_eq!(
        analysis.hover_text(&main, ws.position("app", "main.nav", "print")).unwrap(),
        "```\nfn print(value: string)\n```"
    );
}

#[test]
fn test_quiet_hover_never_fails_on_the_cursor() {
    let ws = WorkspaceBuilder::new()
        .file(".", "stray.nav", ") fn f() { }\n\n")
        .build();
    let config = IdeConfig::new(ws.layout.clone()).with_hover_default_text("nothing here");
    let analysis = analysis_with(&ws, config);
    let uri = ws.uri(".", "stray.nav");

    // No annotated ancestor.
    assert_eq!(analysis.hover_text(&uri, Position::new(0, 0)).unwrap(), "nothing here");
    // Line past the end of the document.
    assert_eq!(analysis.hover_text(&uri, Position::new(9, 0)).unwrap(), "nothing here");
    // Trailing whitespace falls back to the preceding token.
    assert_eq!(
        analysis.hover_text(&uri, Position::new(2, 0)).unwrap(),
        "```\nfn f()\n```\nDeclared in module `.`"
    );
}

#[test]
fn test_strict_requests_report_cursor_failures() {
    let ws = WorkspaceBuilder::new()
        .file(".", "stray.nav", ") fn f() { }\n\n")
        .build();
    let analysis = analysis(&ws);
    let uri = ws.uri(".", "stray.nav");

    assert_eq!(
        analysis.find_all_references(&uri, Position::new(0, 0), true),
        Err(IdeError::UnresolvedSymbolAtCursor { token: ")".to_owned() })
    );
    assert_eq!(
        analysis.compute_rename_edit(&uri, Position::new(0, 0), "g"),
        Err(IdeError::InvalidRenameTarget {
            reason: "`)` does not name a symbol".to_owned()
        })
    );
    assert_eq!(
        analysis.find_all_references(&uri, Position::new(2, 0), true),
        Err(IdeError::PositionNotFound { line: 2, character: 0 })
    );
    assert_eq!(
        analysis.goto_definition(&uri, Position::new(9, 0)),
        Err(IdeError::PositionNotFound { line: 9, character: 0 })
    );
    assert!(matches!(
        analysis.find_all_references(&ws.uri(".", "missing.nav"), Position::new(0, 0), true),
        Err(IdeError::DocumentNotFound { .. })
    ));
    assert_eq!(ws.documents.locks().held(), 0);
}

#[test]
fn test_goto_definition() {
    let ws = project();
    let analysis = analysis(&ws);
    let main = ws.uri("app", "main.nav");

    let make = analysis.goto_definition(&main, ws.position("app", "main.nav", "make")).unwrap();
    assert_eq!(describe(&ws, &make), vec![site("lib/shapes.nav", 1, "make")]);

    let local = analysis.goto_definition(&main, ws.position("app", "main.nav", "p.x")).unwrap();
    assert_eq!(describe(&ws, &local), vec![site("app/main.nav", 2, "p")]);

    let builtin = analysis.goto_definition(&main, ws.position("app", "main.nav", "print")).unwrap();
    assert!(builtin.is_empty());
}

#[test]
fn test_resolve_reference_at_cursor() {
    let ws = project();
    let analysis = analysis(&ws);
    let cursor = analysis
        .resolve_reference_at_cursor(&ws.uri("app", "main.nav"), at(&ws, "app", "main.nav", "make", 2))
        .unwrap();
    assert_eq!(cursor.role, ReferenceRole::Cursor);
    assert_eq!(cursor.symbol.name, "make");
    assert_eq!(cursor.symbol.owner, ModuleId::new("lib"));
    assert_eq!((cursor.module.as_str(), cursor.unit.as_str()), ("app", "main.nav"));
    assert_eq!((cursor.start, cursor.end), (LineCol::new(2, 16), LineCol::new(2, 20)));
}

#[test]
fn test_new_graph_snapshot_changes_the_search_scope() {
    let ws = project();
    let uri = ws.uri("lib", "shapes.nav");
    let pos = at(&ws, "lib", "shapes.nav", "make", 1);

    // `app` now lives in a graph where it no longer imports `lib`.
    let detached = nav_project::ModuleGraph::builder()
        .module(
            nav_project::Module::new("lib")
                .with_unit("shapes.nav")
                .with_unit("extra.nav"),
        )
        .module(nav_project::Module::new("app").with_unit("main.nav"))
        .build();
    let analysis = analysis(&ws).with_module_graph(std::sync::Arc::new(detached));
    assert_eq!(analysis.module_graph().len(), 2);

    let refs = analysis.find_all_references(&uri, pos, true).unwrap();
    assert_eq!(
        describe(&ws, &refs),
        vec![site("lib/shapes.nav", 1, "make"), site("lib/shapes.nav", 6, "make")]
    );
}
