//! Error kinds surfaced at the command boundary.
//!
//! Everything else flows through `anyhow`; these variants are the ones the
//! boundary needs to tell apart (silent cancel vs. user-visible failure).
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibmanError {
    /// A required executable (the runtime or the LibMan tool) is missing.
    #[error("{0}")]
    ToolNotFound(String),

    #[error("no libman.json found under {}", root.display())]
    ManifestNotFound { root: PathBuf },

    /// The user dismissed a prompt without choosing.
    #[error("selection cancelled")]
    SelectionCancelled,

    /// The underlying tool exited non-zero.
    #[error("{message}")]
    Process { message: String },
}

impl LibmanError {
    /// Return true when an error chain carries a user cancellation.
    pub fn is_cancelled(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<LibmanError>(),
            Some(LibmanError::SelectionCancelled)
        )
    }
}

/// Turn a dismissed prompt (`None`) into `SelectionCancelled`.
pub fn required<T>(value: Option<T>) -> Result<T, LibmanError> {
    value.ok_or(LibmanError::SelectionCancelled)
}
