//! Per-request context.
//!
//! Everything a request needs is passed explicitly through a
//! [`RequestContext`] borrowed from the [`Analysis`](crate::Analysis) that
//! serves it: configuration, the module graph snapshot, the compiler and
//! the document manager. There is no ambient or global request state.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lsp_types::Url;
use nav_project::{CompilationUnit, Compiler, DocumentManager, ModuleGraph, ModuleId};

use crate::config::IdeConfig;
use crate::error::{IdeError, IdeResult};

/// A unit of a module.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub(crate) struct UnitSite {
    pub(crate) module: ModuleId,
    pub(crate) unit: String,
}

impl UnitSite {
    pub(crate) fn new(module: ModuleId, unit: impl Into<String>) -> Self {
        UnitSite {
            module,
            unit: unit.into(),
        }
    }
}

impl fmt::Display for UnitSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module, self.unit)
    }
}

#[derive(Copy, Clone)]
pub(crate) struct RequestContext<'a> {
    pub(crate) config: &'a IdeConfig,
    pub(crate) graph: &'a ModuleGraph,
    compiler: &'a dyn Compiler,
    documents: &'a dyn DocumentManager,
}

impl<'a> RequestContext<'a> {
    pub(crate) fn new(
        config: &'a IdeConfig,
        graph: &'a ModuleGraph,
        compiler: &'a dyn Compiler,
        documents: &'a dyn DocumentManager,
    ) -> Self {
        RequestContext {
            config,
            graph,
            compiler,
            documents,
        }
    }

    /// File path and unit of a request URI.
    pub(crate) fn site_for_uri(&self, uri: &Url) -> IdeResult<(PathBuf, UnitSite)> {
        let path = self
            .documents
            .path_from_uri(uri)
            .ok_or_else(|| IdeError::DocumentNotFound {
                target: uri.to_string(),
            })?;
        let (module, unit) =
            self.config
                .layout
                .unit_for_path(&path)
                .ok_or_else(|| IdeError::DocumentNotFound {
                    target: path.display().to_string(),
                })?;
        Ok((path, UnitSite::new(module, unit)))
    }

    #[inline]
    pub(crate) fn path_for(&self, site: &UnitSite) -> PathBuf {
        self.config.layout.path_for(&site.module, &site.unit)
    }

    /// Lock `path`, read it and hand its text to `f`.
    ///
    /// The lock is released when this returns, on success and on error.
    pub(crate) fn with_content<R>(
        &self,
        path: &Path,
        f: impl FnOnce(&str) -> IdeResult<R>,
    ) -> IdeResult<R> {
        let _lock = self.documents.lock(path, self.config.lock_timeout)?;
        let text: Arc<str> = self.documents.content(path)?;
        f(&text)
    }

    /// Lock `path`, compile its current content as `site` and hand the
    /// annotated unit to `f`.
    ///
    /// The lock is released when this returns, on success and on error.
    pub(crate) fn with_unit<R>(
        &self,
        path: &Path,
        site: &UnitSite,
        f: impl FnOnce(&CompilationUnit) -> IdeResult<R>,
    ) -> IdeResult<R> {
        self.with_content(path, |text| {
            let unit = self
                .compiler
                .compile_unit(self.graph, &site.module, &site.unit, text)
                .map_err(|err| IdeError::CompilationFailed {
                    module: site.module.clone(),
                    unit: site.unit.clone(),
                    message: err.message,
                })?;
            tracing::trace!(%site, annotations = unit.annotation_count(), "compiled");
            f(&unit)
        })
    }
}
