//! Module/unit ↔ file path convention.
//!
//! ```text
//! <source_root>/<unit>                        unnamed module "."
//! <source_root>/<modules_dir>/<module>/<unit> named module
//! ```

use std::path::{Component, Path, PathBuf};

use lsp_types::Url;

use crate::module::ModuleId;

/// Default directory holding named modules.
pub const DEFAULT_MODULES_DIR: &str = "src";

/// Where a project's files live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectLayout {
    source_root: PathBuf,
    modules_dir: String,
}

impl ProjectLayout {
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        ProjectLayout {
            source_root: source_root.into(),
            modules_dir: DEFAULT_MODULES_DIR.to_string(),
        }
    }

    #[must_use]
    pub fn with_modules_dir(mut self, dir: impl Into<String>) -> Self {
        self.modules_dir = dir.into();
        self
    }

    #[inline]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    #[inline]
    pub fn modules_dir(&self) -> &str {
        &self.modules_dir
    }

    /// File path of `unit` in `module`.
    pub fn path_for(&self, module: &ModuleId, unit: &str) -> PathBuf {
        if module.is_current() {
            self.source_root.join(unit)
        } else {
            self.source_root
                .join(&self.modules_dir)
                .join(module.as_str())
                .join(unit)
        }
    }

    /// `file://` URI of `unit` in `module`.
    ///
    /// `None` if the resulting path is not absolute.
    pub fn uri_for(&self, module: &ModuleId, unit: &str) -> Option<Url> {
        Url::from_file_path(self.path_for(module, unit)).ok()
    }

    /// Inverse of [`path_for`](Self::path_for).
    ///
    /// `None` for paths outside the source root or not following the
    /// convention (e.g. nested deeper inside a module directory).
    pub fn unit_for_path(&self, path: &Path) -> Option<(ModuleId, String)> {
        let relative = path.strip_prefix(&self.source_root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect::<Option<_>>()?;

        match parts.as_slice() {
            [unit] => Some((ModuleId::current(), (*unit).to_string())),
            [dir, module, unit] if *dir == self.modules_dir => {
                Some((ModuleId::new(module), (*unit).to_string()))
            }
            _ => None,
        }
    }
}
