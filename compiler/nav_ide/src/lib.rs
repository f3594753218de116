//! Nav IDE - Symbol Navigation Requests
//!
//! Answers editor requests about the symbol under a cursor:
//!
//! - **Find references**: every occurrence across the owning module and the
//!   modules importing it
//! - **Rename**: a workspace edit replacing all of those occurrences
//! - **Hover**: a short markdown description
//! - **Go to definition**: the declaration site
//!
//! # Request Flow
//!
//! ```text
//! (uri, position)
//!   → locate token in the cursor unit
//!   → nearest annotated ancestor → cursor symbol
//!   → walk owner + direct importers, collecting equivalent occurrences
//!   → ReferenceModel (cursor / definitions / usages), pruned
//!   → Locations or WorkspaceEdit
//! ```
//!
//! Every unit is read, compiled and walked under its document lock; nothing
//! is cached between requests.

mod analysis;
mod config;
mod context;
mod error;
mod hover;
mod locations;
pub mod references;
mod rename;
mod resolve;

pub use analysis::Analysis;
pub use config::IdeConfig;
pub use error::{IdeError, IdeResult};
pub use references::{Reference, ReferenceModel, ReferenceRole};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
