use smallvec::SmallVec;

use super::{AdaptorError, Args, Signature, pop_args};
use crate::values::StackElement;
use crate::vm::Stack;

/// A native operation callable through the stack calling convention.
///
/// `H` is the native subsystem the operation forwards to. Operations are
/// stateless and shared through `&'static` references, hence `Sync`.
pub trait Operation<H: ?Sized>: Sync {
    fn signature(&self) -> &'static Signature;

    /// Pops the declared inputs, performs exactly one native call, and pushes
    /// the declared outputs.
    ///
    /// On error nothing has been popped and the native subsystem has not been
    /// touched.
    fn invoke(&self, host: &mut H, stack: &mut Stack<StackElement>) -> Result<(), AdaptorError>;
}

/// Results of a [`NativeOperation`], in declared order.
pub type Outputs = SmallVec<[StackElement; 2]>;

/// Wrapper for hand-written native functions.
///
/// The function receives its arguments already validated against
/// `signature` and returns its outputs in declared order.
///
/// # Example
///
/// ```
/// use quadgl_core::{Args, NativeOperation, Outputs, Param, Signature, Tag, Context};
///
/// static ADD: Signature = Signature::new(
///     "Add",
///     &[Param::new("a", Tag::Int), Param::new("b", Tag::Int)],
///     &[Param::new("sum", Tag::Int)],
/// );
///
/// fn add(_host: &mut (), args: &mut Args) -> Outputs {
///     let a: i64 = args.take();
///     let b: i64 = args.take();
///     Outputs::from_iter([(a + b).into()])
/// }
///
/// static ADD_OP: NativeOperation<()> = NativeOperation::new(&ADD, add);
///
/// let mut ctx = Context::default();
/// ctx.push(2i64);
/// ctx.push(3i64);
/// ctx.call(&mut (), &ADD_OP);
/// assert_eq!(ctx.pop().and_then(|e| e.as_int()), Some(5));
/// ```
pub struct NativeOperation<H: ?Sized> {
    signature: &'static Signature,
    func: fn(&mut H, &mut Args) -> Outputs,
}

impl<H: ?Sized> NativeOperation<H> {
    pub const fn new(signature: &'static Signature, func: fn(&mut H, &mut Args) -> Outputs) -> Self {
        NativeOperation { signature, func }
    }
}

impl<H: ?Sized> Operation<H> for NativeOperation<H> {
    fn signature(&self) -> &'static Signature {
        self.signature
    }

    fn invoke(&self, host: &mut H, stack: &mut Stack<StackElement>) -> Result<(), AdaptorError> {
        let mut args = pop_args(stack, self.signature)?;
        let outputs = (self.func)(host, &mut args);
        // Release text references before touching the stack again.
        drop(args);

        debug_assert!(
            outputs.len() == self.signature.output_count()
                && outputs
                    .iter()
                    .zip(self.signature.outputs)
                    .all(|(element, param)| element.tag() == param.tag),
            "{} produced outputs that do not match its signature",
            self.signature.name
        );
        for element in outputs {
            stack.push(element);
        }
        Ok(())
    }
}
