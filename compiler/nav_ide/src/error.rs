//! Request errors.

use std::path::PathBuf;
use std::time::Duration;

use lsp_types::{Range, Url};
use nav_project::{DocumentError, ModuleId};

/// Why a navigation request produced no result.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdeError {
    /// The semantic pass rejected a unit. No partial results are returned.
    #[error("compilation of `{unit}` in module `{module}` failed: {message}")]
    CompilationFailed {
        module: ModuleId,
        unit: String,
        message: String,
    },

    /// The token under the cursor has no annotated ancestor.
    #[error("no symbol found at `{token}`")]
    UnresolvedSymbolAtCursor { token: String },

    /// The position lies past the last token or outside the document.
    #[error("no token at {line}:{character}")]
    PositionNotFound { line: u32, character: u32 },

    #[error("cannot rename: {reason}")]
    InvalidRenameTarget { reason: String },

    /// A document lock was not acquired in time. Transient.
    #[error("document {} is locked (waited {timeout:?})", path.display())]
    LockUnavailable { path: PathBuf, timeout: Duration },

    /// A URI, path or module unit could not be mapped to a document.
    #[error("document not found: {target}")]
    DocumentNotFound { target: String },

    /// Two rename edits of one file overlap.
    #[error("overlapping edits in {uri}: {first:?} and {second:?}")]
    EditConflict { uri: Url, first: Range, second: Range },

    #[error(transparent)]
    Document(DocumentError),
}

pub type IdeResult<T> = Result<T, IdeError>;

impl From<DocumentError> for IdeError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound { path } => IdeError::DocumentNotFound {
                target: path.display().to_string(),
            },
            DocumentError::InvalidUri { uri } => IdeError::DocumentNotFound {
                target: uri.to_string(),
            },
            DocumentError::LockTimeout { path, timeout } => {
                IdeError::LockUnavailable { path, timeout }
            }
            other => IdeError::Document(other),
        }
    }
}

impl IdeError {
    /// `true` for failures worth retrying unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, IdeError::LockUnavailable { .. })
    }
}
