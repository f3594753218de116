//! Request configuration.

use std::time::Duration;

use nav_project::ProjectLayout;

/// How long a request waits for one document lock by default.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings shared by every request of an [`Analysis`](crate::Analysis).
///
/// # Usage
/// ```
/// use std::time::Duration;
/// use nav_ide::IdeConfig;
/// use nav_project::ProjectLayout;
///
/// let config = IdeConfig::new(ProjectLayout::new("/work/app"))
///     .with_lock_timeout(Duration::from_millis(250))
///     .with_hover_default_text("no information");
/// assert_eq!(config.lock_timeout, Duration::from_millis(250));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdeConfig {
    /// Where modules live on disk; used to turn references into URIs.
    pub layout: ProjectLayout,
    /// Upper bound on each document lock wait.
    pub lock_timeout: Duration,
    /// Hover result when nothing resolvable is under the cursor.
    pub hover_default_text: String,
}

impl IdeConfig {
    pub fn new(layout: ProjectLayout) -> Self {
        IdeConfig {
            layout,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            hover_default_text: String::new(),
        }
    }

    #[must_use]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_hover_default_text(mut self, text: impl Into<String>) -> Self {
        self.hover_default_text = text.into();
        self
    }
}
