//! Shared fixtures for the end-to-end tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::time::Duration;

use lsp_types::{Location, Position};
use nav_ide::{Analysis, IdeConfig};
use nav_testing::{Workspace, WorkspaceBuilder};

pub const SHAPES: &str = "\
type Point = record { x: int; y: int; };
fn make(x: int, y: int) -> Point {
    let p: Point = origin;
    p.x = x;
    return p;
}
let origin: Point = make(0, 0);
";

pub const EXTRA: &str = "\
fn norm(p: Point) -> int {
    return p.x * p.x + p.y * p.y;
}
";

pub const MAIN: &str = "\
import lib;
fn run() -> int {
    let p = lib:make(1, 2);
    print(p.x);
    return lib:norm(p);
}
";

pub const CLI: &str = "\
import app;
fn main() {
    app:run();
}
";

/// `lib` (two units), `app` importing `lib`, `tool` importing only `app`.
pub fn project() -> Workspace {
    WorkspaceBuilder::new()
        .file("lib", "shapes.nav", SHAPES)
        .file("lib", "extra.nav", EXTRA)
        .file("app", "main.nav", MAIN)
        .file("tool", "cli.nav", CLI)
        .build()
}

pub fn analysis(ws: &Workspace) -> Analysis {
    analysis_with(
        ws,
        IdeConfig::new(ws.layout.clone()).with_lock_timeout(Duration::from_secs(2)),
    )
}

pub fn analysis_with(ws: &Workspace, config: IdeConfig) -> Analysis {
    nav_ide::init_tracing();
    Analysis::new(
        config,
        ws.graph.clone(),
        ws.compiler.clone(),
        ws.documents.clone(),
    )
}

/// Position `offset` characters into the first occurrence of `needle`.
pub fn at(ws: &Workspace, module: &str, unit: &str, needle: &str, offset: u32) -> Position {
    let pos = ws.position(module, unit, needle);
    Position::new(pos.line, pos.character + offset)
}

/// `(module/unit, line, covered text)` for each location, in order.
pub fn describe(ws: &Workspace, locations: &[Location]) -> Vec<(String, u32, String)> {
    locations
        .iter()
        .map(|loc| {
            let segments: Vec<&str> = loc.uri.path_segments().unwrap().collect();
            let file = segments[segments.len() - 2..].join("/");
            (file, loc.range.start.line, ws.location_text(loc))
        })
        .collect()
}

pub fn site(file: &str, line: u32, text: &str) -> (String, u32, String) {
    (file.to_owned(), line, text.to_owned())
}
