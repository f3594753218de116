//! Location Projector: references → editor locations.

use lsp_types::{Location, Position, Range, Url};
use nav_project::{ModuleId, ProjectLayout};
use nav_syntax::LineCol;

use crate::error::{IdeError, IdeResult};
use crate::references::Reference;

#[inline]
pub(crate) fn to_position(pos: LineCol) -> Position {
    Position::new(pos.line, pos.character)
}

#[inline]
pub(crate) fn to_range(start: LineCol, end: LineCol) -> Range {
    Range::new(to_position(start), to_position(end))
}

/// URI of `unit` in `module` under `layout`.
pub(crate) fn unit_uri(layout: &ProjectLayout, module: &ModuleId, unit: &str) -> IdeResult<Url> {
    layout
        .uri_for(module, unit)
        .ok_or_else(|| IdeError::DocumentNotFound {
            target: layout.path_for(module, unit).display().to_string(),
        })
}

pub(crate) fn project(layout: &ProjectLayout, reference: &Reference) -> IdeResult<Location> {
    Ok(Location::new(
        unit_uri(layout, &reference.module, &reference.unit)?,
        to_range(reference.start, reference.end),
    ))
}

/// Project every reference, sorted by URI then position.
pub(crate) fn project_all<'r>(
    layout: &ProjectLayout,
    references: impl IntoIterator<Item = &'r Reference>,
) -> IdeResult<Vec<Location>> {
    let mut locations = references
        .into_iter()
        .map(|r| project(layout, r))
        .collect::<IdeResult<Vec<_>>>()?;
    sort_locations(&mut locations);
    Ok(locations)
}

pub(crate) fn sort_locations(locations: &mut [Location]) {
    locations.sort_by(|a, b| {
        a.uri
            .as_str()
            .cmp(b.uri.as_str())
            .then(position_key(a.range.start).cmp(&position_key(b.range.start)))
            .then(position_key(a.range.end).cmp(&position_key(b.range.end)))
    });
}

#[inline]
fn position_key(pos: Position) -> (u32, u32) {
    (pos.line, pos.character)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]
mod tests {
    use super::*;
    use crate::references::ReferenceRole;
    use nav_project::{Symbol, SymbolId, SymbolKind};
    use nav_syntax::Span;
    use pretty_assertions::assert_eq;

    fn reference(module: &str, unit: &str, line: u32) -> Reference {
        let symbol = Symbol::new(
            SymbolId::from_path("m::f"),
            "f",
            SymbolKind::Function,
            ModuleId::new("m"),
        );
        Reference {
            symbol,
            module: ModuleId::new(module),
            unit: unit.to_string(),
            span: Span::new(0, 1),
            start: LineCol::new(line, 4),
            end: LineCol::new(line, 5),
            role: ReferenceRole::Usage,
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_projection_follows_layout() {
        let layout = ProjectLayout::new("/ws");
        let root = project(&layout, &reference(".", "main.nav", 2)).unwrap();
        assert_eq!(root.uri.as_str(), "file:///ws/main.nav");
        assert_eq!(root.range, Range::new(Position::new(2, 4), Position::new(2, 5)));

        let named = project(&layout, &reference("lib", "lib.nav", 0)).unwrap();
        assert_eq!(named.uri.as_str(), "file:///ws/src/lib/lib.nav");
    }

    #[cfg(unix)]
    #[test]
    fn test_locations_are_sorted() {
        let layout = ProjectLayout::new("/ws");
        let refs = [
            reference("lib", "b.nav", 1),
            reference("lib", "a.nav", 7),
            reference("lib", "a.nav", 3),
        ];
        let locations = project_all(&layout, &refs).unwrap();
        let keys: Vec<(String, u32)> = locations
            .iter()
            .map(|l| (l.uri.path().to_string(), l.range.start.line))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("/ws/src/lib/a.nav".to_string(), 3),
                ("/ws/src/lib/a.nav".to_string(), 7),
                ("/ws/src/lib/b.nav".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_relative_root_cannot_be_projected() {
        let layout = ProjectLayout::new("relative");
        assert!(matches!(
            project(&layout, &reference(".", "a.nav", 0)),
            Err(IdeError::DocumentNotFound { .. })
        ));
    }
}
