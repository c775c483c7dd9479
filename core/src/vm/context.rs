use std::io::Write;

use tracing::{error, trace};

use crate::adaptor::{AdaptorError, Operation};
use crate::api::{ContextOptions, ViolationPolicy};
use crate::values::StackElement;
use crate::vm::Stack;

/// One execution context: a stack plus the options governing calls on it.
///
/// `Context` is not `Send`: text elements share their buffers through `Rc`.
pub struct Context {
    stack: Stack<StackElement>,
    options: ContextOptions,
}

impl Context {
    pub fn new(options: ContextOptions) -> Self {
        Context {
            stack: Stack::new(options.max_stack_size),
            options,
        }
    }

    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    pub fn stack(&self) -> &Stack<StackElement> {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut Stack<StackElement> {
        &mut self.stack
    }

    pub fn push(&mut self, element: impl Into<StackElement>) {
        self.stack.push(element.into());
    }

    pub fn pop(&mut self) -> Option<StackElement> {
        self.stack.pop()
    }

    /// Runs `operation`, returning convention violations to the caller.
    ///
    /// On error the stack is exactly as it was before the call.
    pub fn try_call<H: ?Sized>(
        &mut self,
        host: &mut H,
        operation: &dyn Operation<H>,
    ) -> Result<(), AdaptorError> {
        if !self.options.trace_calls {
            return operation.invoke(host, &mut self.stack);
        }

        let name = operation.signature().name;
        let before = self.stack.len();
        let result = operation.invoke(host, &mut self.stack);
        trace!(
            operation = name,
            depth_before = before,
            depth_after = self.stack.len(),
            ok = result.is_ok(),
            "call"
        );
        result
    }

    /// Runs `operation`. A convention violation never returns: it is handled
    /// according to [`ContextOptions::violation_policy`].
    pub fn call<H: ?Sized>(&mut self, host: &mut H, operation: &dyn Operation<H>) {
        if let Err(err) = self.try_call(host, operation) {
            self.violation(err)
        }
    }

    fn violation(&self, err: AdaptorError) -> ! {
        error!(operation = err.operation, depth = self.stack.len(), "{}", err);
        // Unbuffered and independent of any installed subscriber.
        let _ = writeln!(std::io::stderr(), "{}", err);
        match self.options.violation_policy {
            ViolationPolicy::Abort => std::process::abort(),
            ViolationPolicy::Panic => panic!("{}", err),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(ContextOptions::default())
    }
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("stack", &self.stack)
            .field("options", &self.options)
            .finish()
    }
}
