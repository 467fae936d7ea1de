use std::fmt::Display;

use error_stack::Context;

/// Failure categories surfaced by every layer above the driver.
///
/// The `&'static str` payloads are the messages shown to API callers.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum KernelError {
    Validation(&'static str),
    NotFound(&'static str),
    Conflict(&'static str),
    InsufficientStock { stock: i64 },
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::Validation(reason)
            | KernelError::NotFound(reason)
            | KernelError::Conflict(reason) => write!(f, "{reason}"),
            KernelError::InsufficientStock { .. } => write!(f, "insufficient stock"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}
