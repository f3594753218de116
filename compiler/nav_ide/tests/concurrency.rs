//! Document locks under concurrent requests.

#![allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]

mod common;

use std::thread;
use std::time::Duration;

use common::{analysis, analysis_with, at, describe, project, site};
use lsp_types::Position;
use nav_ide::{IdeConfig, IdeError};
use nav_testing::{Workspace, WorkspaceBuilder};

#[test]
fn test_no_lock_outlives_a_request() {
    let ws = project();
    let analysis = analysis(&ws);
    let main = ws.uri("app", "main.nav");

    analysis
        .find_all_references(&main, ws.position("app", "main.nav", "make"), true)
        .unwrap();
    assert_eq!(ws.documents.locks().held(), 0);

    analysis
        .compute_rename_edit(&main, ws.position("app", "main.nav", "print"), "show")
        .unwrap_err();
    assert_eq!(ws.documents.locks().held(), 0);

    analysis.hover_text(&main, ws.position("app", "main.nav", "run")).unwrap();
    analysis.goto_definition(&main, ws.position("app", "main.nav", "norm")).unwrap();
    assert_eq!(ws.documents.locks().held(), 0);
}

#[test]
fn test_held_lock_times_out_request() {
    let ws = project();
    let timeout = Duration::from_millis(50);
    let analysis = analysis_with(&ws, IdeConfig::new(ws.layout.clone()).with_lock_timeout(timeout));
    let extra = ws.path("lib", "extra.nav");
    let main = ws.uri("app", "main.nav");
    let pos = ws.position("app", "main.nav", "make");

    let guard = ws.documents.locks().acquire(&extra, Duration::from_secs(1)).unwrap();
    let err = analysis.find_all_references(&main, pos, true).unwrap_err();
    assert_eq!(
        err,
        IdeError::LockUnavailable {
            path: extra.clone(),
            timeout
        }
    );
    assert!(err.is_transient());
    // Only the test's own guard remains.
    assert_eq!(ws.documents.locks().held(), 1);

    drop(guard);
    assert_eq!(analysis.find_all_references(&main, pos, true).unwrap().len(), 3);
}

#[test]
fn test_request_waits_for_lock_release() {
    let ws = project();
    let analysis = analysis(&ws);
    let shapes = ws.path("lib", "shapes.nav");
    let main = ws.uri("app", "main.nav");
    let pos = ws.position("app", "main.nav", "make");

    let guard = ws.documents.locks().acquire(&shapes, Duration::from_secs(1)).unwrap();
    thread::scope(|s| {
        let request = s.spawn(|| analysis.find_all_references(&main, pos, true));
        thread::sleep(Duration::from_millis(100));
        drop(guard);
        assert_eq!(request.join().unwrap().unwrap().len(), 3);
    });
}

#[test]
fn test_concurrent_requests_agree_with_sequential_results() {
    let ws = project();
    let analysis = analysis(&ws);
    let main = ws.uri("app", "main.nav");
    let cursors = [
        ws.position("app", "main.nav", "make"),
        at(&ws, "app", "main.nav", "p.x", 2),
        ws.position("app", "main.nav", "norm"),
        ws.position("app", "main.nav", "p.x"),
    ];
    let expected: Vec<_> = cursors
        .iter()
        .map(|pos| describe(&ws, &analysis.find_all_references(&main, *pos, true).unwrap()))
        .collect();

    thread::scope(|s| {
        for worker in 0..8 {
            let (analysis, ws, main, cursors, expected) = (&analysis, &ws, &main, &cursors, &expected);
            s.spawn(move || {
                for round in 0..10 {
                    let i = (worker + round) % cursors.len();
                    let found = analysis.find_all_references(main, cursors[i], true).unwrap();
                    assert_eq!(describe(ws, &found), expected[i]);
                    analysis.hover_text(main, cursors[i]).unwrap();
                }
            });
        }
    });
    assert_eq!(ws.documents.locks().held(), 0);
}

/// Two modules that share no file.
fn independent() -> Workspace {
    WorkspaceBuilder::new()
        .file("one", "a.nav", "fn alpha(n: int) -> int {\n    return n;\n}\n")
        .file("two", "b.nav", "fn beta(n: int) -> int {\n    return n;\n}\n")
        .build()
}

#[test]
fn test_renames_on_distinct_files_do_not_block_each_other() {
    let ws = independent();
    let timeout = Duration::from_millis(50);
    let analysis = analysis_with(&ws, IdeConfig::new(ws.layout.clone()).with_lock_timeout(timeout));
    let (a, b) = (ws.uri("one", "a.nav"), ws.uri("two", "b.nav"));

    // A lock held on one file does not delay a rename in the other.
    let guard = ws.documents.locks().acquire(&ws.path("one", "a.nav"), Duration::from_secs(1)).unwrap();
    let edit = analysis
        .compute_rename_edit(&b, ws.position("two", "b.nav", "n:"), "count")
        .unwrap();
    assert_eq!(edit.changes.as_ref().unwrap().keys().collect::<Vec<_>>(), vec![&b]);
    drop(guard);

    thread::scope(|s| {
        let renames = [
            (&a, ws.position("one", "a.nav", "alpha"), "first"),
            (&b, ws.position("two", "b.nav", "beta"), "second"),
        ];
        let workers: Vec<_> = renames
            .into_iter()
            .map(|(uri, pos, name)| {
                let (analysis, ws) = (&analysis, &ws);
                s.spawn(move || {
                    let edit = analysis.compute_rename_edit(uri, pos, name)?;
                    ws.documents
                        .apply_workspace_edit(&edit, Duration::from_secs(1))
                        .map_err(IdeError::from)
                })
            })
            .collect();
        for worker in workers {
            assert_eq!(worker.join().unwrap(), Ok(1));
        }
    });

    assert!(ws.text("one", "a.nav").starts_with("fn first(n: int)"));
    assert!(ws.text("two", "b.nav").starts_with("fn second(n: int)"));
    assert_eq!(ws.documents.locks().held(), 0);
}

#[test]
fn test_second_request_on_a_file_sees_the_first_requests_edits() {
    let ws = independent();
    let analysis = analysis(&ws);
    let a = ws.uri("one", "a.nav");
    let path = ws.path("one", "a.nav");

    let guard = ws.documents.locks().acquire(&path, Duration::from_secs(1)).unwrap();
    thread::scope(|s| {
        let request = s.spawn(|| analysis.find_all_references(&a, Position::new(1, 11), true));
        thread::sleep(Duration::from_millis(100));
        assert!(!request.is_finished(), "request must wait for the lock");

        // The lock holder finishes writing its rename before releasing.
        ws.documents
            .open(path.clone(), "fn alpha(total: int) -> int {\n    return total;\n}\n");
        drop(guard);

        let found = request.join().unwrap().unwrap();
        assert_eq!(
            describe(&ws, &found),
            vec![site("one/a.nav", 0, "total"), site("one/a.nav", 1, "total")]
        );
    });
    assert_eq!(ws.documents.locks().held(), 0);
}
