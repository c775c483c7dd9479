//! Typed stack calling convention for native operations.
//!
//! A dynamically-typed, stack-oriented virtual machine calls statically-typed
//! native functions through this crate. Every operation declares a
//! [`Signature`](adaptor::Signature); the adaptor checks the stack against it,
//! pops the arguments, hands them to the native function with their Rust
//! types, and pushes the results back.
//!
//! Misuse of the stack protocol (underflow, wrong tag) is a defect in the
//! calling program, not a condition it can handle: [`Context::call`] treats it
//! as fatal. Failures reported *by* the native subsystem are plain data.
//!
//! [`Context::call`]: vm::Context::call

extern crate alloc;

pub mod adaptor;
pub mod api;
pub mod notation;
pub mod values;
pub mod vm;

pub use adaptor::{
    AdaptorError, AdaptorErrorKind, Args, NativeOperation, Operation, Outputs, Param, Registry,
    Signature,
};
pub use api::{ContextOptions, ViolationPolicy};
pub use values::{Pointer, StackElement, StackValue, Tag, Text};
pub use vm::{Context, Stack};
