use thiserror::Error;

use crate::values::Tag;

/// A violation of the stack calling convention.
///
/// These are defects in the calling program (or in whatever generated its
/// code), never conditions it is expected to handle. See
/// [`Context::call`](crate::vm::Context::call).
///
/// The `Display` form is the diagnostic printed before the process is
/// terminated, e.g. `Fatal error in Enable: Stack underflow (needs 1, found 0)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Fatal error in {operation}: {kind}")]
pub struct AdaptorError {
    pub operation: &'static str,
    pub kind: AdaptorErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdaptorErrorKind {
    /// Fewer elements on the stack than the operation consumes.
    #[error("Stack underflow (needs {needed}, found {available})")]
    StackUnderflow { needed: usize, available: usize },

    /// The element at `position` (0 = first declared input) has the wrong tag.
    #[error("Type error (argument {position} `{param}` expects {expected}, found {found})")]
    TypeMismatch {
        position: usize,
        param: &'static str,
        expected: Tag,
        found: Tag,
    },
}

impl AdaptorError {
    pub fn underflow(operation: &'static str, needed: usize, available: usize) -> Self {
        AdaptorError {
            operation,
            kind: AdaptorErrorKind::StackUnderflow { needed, available },
        }
    }

    pub fn mismatch(
        operation: &'static str,
        position: usize,
        param: &'static str,
        expected: Tag,
        found: Tag,
    ) -> Self {
        AdaptorError {
            operation,
            kind: AdaptorErrorKind::TypeMismatch {
                position,
                param,
                expected,
                found,
            },
        }
    }

    pub fn is_underflow(&self) -> bool {
        matches!(self.kind, AdaptorErrorKind::StackUnderflow { .. })
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, AdaptorErrorKind::TypeMismatch { .. })
    }
}
