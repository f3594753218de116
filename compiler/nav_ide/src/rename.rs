//! Workspace Edit Builder.
//!
//! Turns the rename targets of a [`ReferenceModel`] into one list of text
//! edits per file. Lists are accumulated per URI, de-duplicated, sorted by
//! position and checked for overlap before anything is returned. Each site
//! keeps the range it was resolved with, so a conflict reports the ranges
//! the editor would have been sent.

use std::collections::{BTreeMap, HashMap};

use lsp_types::{Range, TextEdit, Url, WorkspaceEdit};
use nav_project::ProjectLayout;
use nav_syntax::Span;

use crate::error::{IdeError, IdeResult};
use crate::locations::{to_range, unit_uri};
use crate::references::{Reference, ReferenceModel};
use crate::resolve::CursorResolution;

/// `true` for `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn validate_new_name(new_name: &str) -> IdeResult<()> {
    if is_identifier(new_name) {
        Ok(())
    } else {
        Err(IdeError::InvalidRenameTarget {
            reason: format!("`{new_name}` is not a valid identifier"),
        })
    }
}

/// The cursor must sit on an identifier naming a symbol declared in source.
pub(crate) fn validate_target(resolution: &CursorResolution) -> IdeResult<()> {
    if !resolution.token_kind.is_identifier() {
        return Err(IdeError::InvalidRenameTarget {
            reason: format!("`{}` is not an identifier", resolution.token_text),
        });
    }
    let symbol = resolution.symbol();
    if symbol.declaration.is_none() {
        return Err(IdeError::InvalidRenameTarget {
            reason: format!("`{}` is a {} without a source declaration", symbol.name, symbol.kind),
        });
    }
    Ok(())
}

/// Build the rename edit for every target in `model`.
pub(crate) fn build_workspace_edit(
    layout: &ProjectLayout,
    model: &ReferenceModel,
    new_name: &str,
) -> IdeResult<WorkspaceEdit> {
    let mut per_file: BTreeMap<(String, String), Vec<&Reference>> = BTreeMap::new();
    for target in model.rename_targets() {
        per_file
            .entry((target.module.to_string(), target.unit.clone()))
            .or_default()
            .push(target);
    }

    let mut changes: HashMap<Url, Vec<TextEdit>> = HashMap::with_capacity(per_file.len());
    for targets in per_file.values() {
        let Some(first) = targets.first() else {
            continue;
        };
        let uri = unit_uri(layout, &first.module, &first.unit)?;
        let edits = file_edits(&uri, targets, new_name)?;
        changes.entry(uri).or_default().extend(edits);
    }

    let edit_count: usize = changes.values().map(Vec::len).sum();
    tracing::debug!(files = changes.len(), edits = edit_count, "rename edit built");
    Ok(WorkspaceEdit {
        changes: Some(changes),
        ..WorkspaceEdit::default()
    })
}

fn file_edits(uri: &Url, targets: &[&Reference], new_name: &str) -> IdeResult<Vec<TextEdit>> {
    let mut sites: Vec<(Span, Range)> = targets
        .iter()
        .map(|r| (r.span, to_range(r.start, r.end)))
        .collect();
    sites.sort_by_key(|(span, _)| (span.start, span.end));
    sites.dedup_by_key(|(span, _)| *span);

    if let Some(pair) = sites.windows(2).find(|pair| pair[0].0.overlaps(pair[1].0)) {
        return Err(IdeError::EditConflict {
            uri: uri.clone(),
            first: pair[0].1,
            second: pair[1].1,
        });
    }

    Ok(sites
        .into_iter()
        .map(|(_, range)| TextEdit {
            range,
            new_text: new_name.to_owned(),
        })
        .collect())
}
