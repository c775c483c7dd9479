//! Configuration options for an execution context.

/// What happens when a call violates the stack calling convention.
///
/// Either way the diagnostic `Fatal error in <Operation>: <kind>` is written
/// to stderr first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViolationPolicy {
    /// Terminate the process immediately with [`std::process::abort`].
    #[default]
    Abort,
    /// Panic with the diagnostic as the message.
    ///
    /// For hosts that run programs under a panic boundary, and for tests.
    Panic,
}

/// Configuration options for a [`Context`](crate::vm::Context).
///
/// # Example
///
/// ```
/// use quadgl_core::api::ContextOptions;
///
/// let options = ContextOptions {
///     max_stack_size: 64,
///     trace_calls: true,
///     ..ContextOptions::default()
/// };
/// assert_eq!(options.max_stack_size, 64);
/// ```
#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// Maximum stack depth. Exceeding it is caught by a debug assertion.
    ///
    /// Default: 1024
    pub max_stack_size: usize,

    /// Default: [`ViolationPolicy::Abort`]
    pub violation_policy: ViolationPolicy,

    /// Emit a `trace!` event for every operation call.
    ///
    /// Default: false
    pub trace_calls: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            max_stack_size: 1024,
            violation_policy: ViolationPolicy::default(),
            trace_calls: false,
        }
    }
}
