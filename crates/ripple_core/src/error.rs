//! View tree error types

use thiserror::Error;

use crate::view::ViewId;

/// Errors raised by view tree operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    /// The view is not (or no longer) part of the tree
    #[error("Unknown view: {0:?}")]
    UnknownView(ViewId),
}

/// Result type for view tree operations
pub type Result<T> = std::result::Result<T, ViewError>;
