//! Configuration for execution contexts.
//!
//! # Example
//!
//! ```
//! use quadgl_core::api::{ContextOptions, ViolationPolicy};
//! use quadgl_core::Context;
//!
//! let ctx = Context::new(ContextOptions {
//!     violation_policy: ViolationPolicy::Panic,
//!     ..ContextOptions::default()
//! });
//! assert!(ctx.stack().is_empty());
//! ```

pub mod options;

pub use options::{ContextOptions, ViolationPolicy};
