//! The typed stack-call adaptor.
//!
//! Every native operation is described by a static [`Signature`]. The
//! adaptor validates the stack against it ([`check_args`]), pops the
//! arguments in the order they were pushed ([`pop_args`]), and the operation
//! pushes its results back with [`push_result`].
//!
//! Operations are usually generated with the `#[stack_fn]` attribute from
//! `quadgl-macros`; [`NativeOperation`] covers hand-written ones.

mod args;
mod error;
mod operation;
mod registry;
mod signature;

pub use args::{Args, check_args, pop_args, push_result};
pub use error::{AdaptorError, AdaptorErrorKind};
pub use operation::{NativeOperation, Operation, Outputs};
pub use registry::{DeclarationIssue, Direction, Registry, RegistryError};
pub use signature::{Param, Signature};
