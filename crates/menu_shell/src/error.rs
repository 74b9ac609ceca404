//! Engine error taxonomy.
//!
//! Only programmer mistakes and configuration failures are errors. Unrecognized user input is
//! reported as an empty resolution or a `false` validation result instead.

use thiserror::Error;

use crate::menu::MenuId;

/// Errors raised by menu construction, dispatcher wiring, and configuration loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MenuError {
    /// A menu item was built with empty display text.
    #[error("menu item text must not be empty")]
    EmptyItemText,
    /// A menu id does not belong to this dispatcher.
    #[error("menu {0} is not owned by this dispatcher")]
    UnknownMenu(MenuId),
    /// Configuration could not be read or parsed.
    #[error("invalid dispatcher config {path}: {message}")]
    Config {
        /// Source of the configuration.
        path: String,
        /// Underlying read or parse failure.
        message: String,
    },
}

/// Convenience result type for engine internals.
pub type MenuResult<T> = Result<T, MenuError>;
