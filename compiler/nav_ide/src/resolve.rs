//! Symbol Resolution Engine
//!
//! Resolution runs in two phases:
//!
//! 1. [`resolve_cursor`] compiles the cursor unit, maps the position to a
//!    token, climbs to the nearest annotated ancestor and walks that unit
//!    once, which also records the cursor occurrence.
//! 2. [`collect_references`] walks every other unit of the owning module
//!    and of each module importing it directly, then prunes the model.
//!
//! Hover, go-to-definition and resolve-at-cursor stop after phase 1. Rename
//! validates its target between the phases so an invalid request never
//! compiles the rest of the project.

use lsp_types::{Position, Url};
use nav_project::Symbol;
use nav_syntax::{locate_token, locate_token_or_preceding, LineCol, TokenKind};

use crate::context::{RequestContext, UnitSite};
use crate::error::{IdeError, IdeResult};
use crate::references::{Reference, ReferenceCollector, ReferenceModel};

/// How resolution failures at the cursor are reported.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Mode {
    /// Position and symbol failures are errors.
    Strict,
    /// Fall back to the preceding token; an unresolvable cursor yields
    /// `None` instead of an error.
    Quiet,
}

impl Mode {
    fn fail<T>(self, err: IdeError) -> IdeResult<Option<T>> {
        match self {
            Mode::Strict => Err(err),
            Mode::Quiet => Ok(None),
        }
    }
}

/// Result of phase 1.
#[derive(Debug)]
pub(crate) struct CursorResolution {
    pub(crate) site: UnitSite,
    /// Kind and text of the token under the cursor (not necessarily the
    /// name token of the resolved symbol).
    pub(crate) token_kind: TokenKind,
    pub(crate) token_text: String,
    pub(crate) cursor: Reference,
    pub(crate) model: ReferenceModel,
}

impl CursorResolution {
    #[inline]
    pub(crate) fn symbol(&self) -> &Symbol {
        &self.cursor.symbol
    }
}

/// Phase 1: resolve the symbol under the cursor.
///
/// Returns `None` only in [`Mode::Quiet`].
#[tracing::instrument(level = "debug", skip_all, fields(
    uri = %uri,
    line = position.line,
    character = position.character,
))]
pub(crate) fn resolve_cursor(
    ctx: &RequestContext<'_>,
    uri: &Url,
    position: Position,
    mode: Mode,
) -> IdeResult<Option<CursorResolution>> {
    let (path, site) = ctx.site_for_uri(uri)?;
    let not_found = || IdeError::PositionNotFound {
        line: position.line,
        character: position.character,
    };

    ctx.with_unit(&path, &site, |unit| {
        let tree = unit.tree();
        let Some(offset) = tree
            .line_index()
            .offset(LineCol::new(position.line, position.character))
        else {
            return mode.fail(not_found());
        };

        let located = match mode {
            Mode::Strict => locate_token(tree, offset),
            Mode::Quiet => locate_token_or_preceding(tree, offset),
        };
        let Ok(token_path) = located else {
            return mode.fail(not_found());
        };
        let token = token_path.resolve(tree).ok_or_else(not_found)?;

        let annotated = token_path
            .innermost_first()
            .find_map(|id| unit.annotation(id).map(|a| (id, a)));
        let Some((node, annotation)) = annotated else {
            tracing::debug!(token = token.text(), "no annotated ancestor");
            return mode.fail(IdeError::UnresolvedSymbolAtCursor {
                token: token.text().to_string(),
            });
        };

        let target = annotation.symbol.clone();
        let mut model = ReferenceModel::new();
        let found = ReferenceCollector::new(unit, &target, &mut model)
            .with_cursor(node)
            .collect();
        tracing::debug!(symbol = %target.name, kind = %target.kind, found, "cursor unit walked");

        let Some(cursor) = model.cursor().cloned() else {
            return mode.fail(IdeError::UnresolvedSymbolAtCursor {
                token: token.text().to_string(),
            });
        };
        Ok(Some(CursorResolution {
            site: site.clone(),
            token_kind: token.kind(),
            token_text: token.text().to_string(),
            cursor,
            model,
        }))
    })
}

/// Phase 2: walk the remaining units of every candidate module.
///
/// Any compilation failure aborts the request.
#[tracing::instrument(level = "debug", skip_all, fields(symbol = %resolution.cursor.symbol.name))]
pub(crate) fn collect_references(
    ctx: &RequestContext<'_>,
    resolution: &mut CursorResolution,
) -> IdeResult<()> {
    let target = resolution.symbol().clone();
    let candidates = ctx.graph.candidate_modules(&target.owner);
    tracing::debug!(owner = %target.owner, candidates = candidates.len(), "candidate modules");

    let mut walked = 1usize;
    for module_id in &candidates {
        let Some(module) = ctx.graph.get(module_id) else {
            continue;
        };
        for unit_name in module.units() {
            let site = UnitSite::new(module_id.clone(), unit_name.as_str());
            if site == resolution.site {
                continue;
            }
            let path = ctx.path_for(&site);
            let model = &mut resolution.model;
            ctx.with_unit(&path, &site, |unit| {
                ReferenceCollector::new(unit, &target, model).collect();
                Ok(())
            })?;
            walked += 1;
        }
    }

    let model = &mut resolution.model;
    model.prune();
    if model.definition_count() > 1 {
        let sites: Vec<String> = model
            .definitions()
            .map(|d| format!("{}/{}@{}", d.module, d.unit, d.span))
            .collect();
        tracing::warn!(symbol = %target.name, ?sites, "symbol has more than one definition");
    }
    tracing::debug!(
        walked,
        definitions = model.definition_count(),
        usages = model.usage_count(),
        "references collected"
    );
    Ok(())
}
