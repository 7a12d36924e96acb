//! Document Context - Errors

use thiserror::Error;

use super::DocumentStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("invalid document id: {0}")]
    InvalidId(String),

    #[error("document name must not be empty")]
    EmptyName,

    #[error("document name is too long ({0} bytes)")]
    NameTooLong(usize),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: DocumentStatus,
        to: DocumentStatus,
    },
}
