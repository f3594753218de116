//! Request API.

use std::sync::Arc;

use lsp_types::{Location, Position, Url, WorkspaceEdit};
use nav_project::{Compiler, DocumentManager, ModuleGraph};
use nav_syntax::LineIndex;

use crate::config::IdeConfig;
use crate::context::{RequestContext, UnitSite};
use crate::error::{IdeError, IdeResult};
use crate::hover::hover_markdown;
use crate::locations::{project_all, to_range, unit_uri};
use crate::references::Reference;
use crate::rename::{build_workspace_edit, validate_new_name, validate_target};
use crate::resolve::{collect_references, resolve_cursor, CursorResolution, Mode};

/// Serves navigation requests against one project state.
///
/// `Analysis` is `Send + Sync`; concurrent requests share it by reference.
/// Requests touching the same file are serialized by that file's document
/// lock; otherwise they run independently.
///
/// # Usage
/// ```ignore
/// let analysis = Analysis::new(config, graph, compiler, documents);
/// let locations = analysis.find_all_references(&uri, position, true)?;
/// let edit = analysis.compute_rename_edit(&uri, position, "total")?;
/// ```
#[derive(Clone)]
pub struct Analysis {
    config: IdeConfig,
    graph: Arc<ModuleGraph>,
    compiler: Arc<dyn Compiler>,
    documents: Arc<dyn DocumentManager>,
}

impl Analysis {
    pub fn new(
        config: IdeConfig,
        graph: Arc<ModuleGraph>,
        compiler: Arc<dyn Compiler>,
        documents: Arc<dyn DocumentManager>,
    ) -> Self {
        Analysis {
            config,
            graph,
            compiler,
            documents,
        }
    }

    /// Serve later requests against a new module graph snapshot.
    #[must_use]
    pub fn with_module_graph(mut self, graph: Arc<ModuleGraph>) -> Self {
        self.graph = graph;
        self
    }

    #[inline]
    pub fn config(&self) -> &IdeConfig {
        &self.config
    }

    #[inline]
    pub fn module_graph(&self) -> &ModuleGraph {
        &self.graph
    }

    fn context(&self) -> RequestContext<'_> {
        RequestContext::new(
            &self.config,
            &self.graph,
            self.compiler.as_ref(),
            self.documents.as_ref(),
        )
    }

    fn resolve_strict(
        &self,
        ctx: &RequestContext<'_>,
        uri: &Url,
        position: Position,
    ) -> IdeResult<CursorResolution> {
        match resolve_cursor(ctx, uri, position, Mode::Strict)? {
            Some(resolution) => Ok(resolution),
            // Strict mode reports every failure as an error.
            None => Err(IdeError::PositionNotFound {
                line: position.line,
                character: position.character,
            }),
        }
    }

    /// The occurrence under the cursor and the symbol it resolves to.
    pub fn resolve_reference_at_cursor(
        &self,
        uri: &Url,
        position: Position,
    ) -> IdeResult<Reference> {
        let ctx = self.context();
        Ok(self.resolve_strict(&ctx, uri, position)?.cursor)
    }

    /// Every occurrence of the symbol under the cursor in its owning module
    /// and the modules importing it directly.
    ///
    /// The declaration is reported only with `include_declaration`; the
    /// cursor occurrence is always reported unless it is the declaration.
    #[tracing::instrument(level = "debug", skip_all, fields(uri = %uri, include_declaration = include_declaration))]
    pub fn find_all_references(
        &self,
        uri: &Url,
        position: Position,
        include_declaration: bool,
    ) -> IdeResult<Vec<Location>> {
        let ctx = self.context();
        let mut resolution = self.resolve_strict(&ctx, uri, position)?;
        collect_references(&ctx, &mut resolution)?;
        project_all(
            &self.config.layout,
            resolution.model.find_results(include_declaration),
        )
    }

    /// Rename the symbol under the cursor everywhere it is referenced.
    ///
    /// A cursor on a keyword, punctuation, literal or anything else that
    /// names no symbol is an invalid rename target.
    #[tracing::instrument(level = "debug", skip_all, fields(uri = %uri, new_name = new_name))]
    pub fn compute_rename_edit(
        &self,
        uri: &Url,
        position: Position,
        new_name: &str,
    ) -> IdeResult<WorkspaceEdit> {
        validate_new_name(new_name)?;
        let ctx = self.context();
        let mut resolution = match self.resolve_strict(&ctx, uri, position) {
            Ok(resolution) => resolution,
            Err(IdeError::UnresolvedSymbolAtCursor { token }) => {
                return Err(IdeError::InvalidRenameTarget {
                    reason: format!("`{token}` does not name a symbol"),
                });
            }
            Err(err) => return Err(err),
        };
        validate_target(&resolution)?;
        collect_references(&ctx, &mut resolution)?;
        build_workspace_edit(&self.config.layout, &resolution.model, new_name)
    }

    /// Markdown describing the symbol under the cursor.
    ///
    /// Never fails on the cursor itself: past the last token the preceding
    /// token is used, and an unresolvable cursor yields the configured
    /// default text.
    pub fn hover_text(&self, uri: &Url, position: Position) -> IdeResult<String> {
        let ctx = self.context();
        Ok(match resolve_cursor(&ctx, uri, position, Mode::Quiet)? {
            Some(resolution) => hover_markdown(resolution.symbol()),
            None => self.config.hover_default_text.clone(),
        })
    }

    /// The declaration site of the symbol under the cursor. Empty for
    /// symbols without a source declaration.
    pub fn goto_definition(&self, uri: &Url, position: Position) -> IdeResult<Vec<Location>> {
        let ctx = self.context();
        let resolution = self.resolve_strict(&ctx, uri, position)?;

        let symbol = resolution.symbol();
        let Some(declaration) = &symbol.declaration else {
            return Ok(Vec::new());
        };
        let site = UnitSite::new(symbol.owner.clone(), declaration.unit.as_str());
        let uri = unit_uri(&self.config.layout, &site.module, &site.unit)?;
        let range = ctx.with_content(&ctx.path_for(&site), |text| {
            let (start, end) = LineIndex::new(text).range(declaration.span);
            Ok(to_range(start, end))
        })?;
        Ok(vec![Location::new(uri, range)])
    }
}

impl std::fmt::Debug for Analysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analysis")
            .field("config", &self.config)
            .field("modules", &self.graph.len())
            .finish_non_exhaustive()
    }
}
