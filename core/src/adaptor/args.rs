use smallvec::SmallVec;

use super::{AdaptorError, Signature};
use crate::values::{StackElement, StackValue};
use crate::vm::Stack;

/// Most operations take at most six arguments.
type ArgVec = SmallVec<[StackElement; 6]>;

/// Verifies that the top of `stack` satisfies `signature`'s inputs.
///
/// Arity is checked first, then tags from the first declared input to the
/// last. The stack is never modified, so a failed check leaves it exactly as
/// the caller built it.
pub fn check_args(stack: &Stack<StackElement>, signature: &Signature) -> Result<(), AdaptorError> {
    let needed = signature.arity();
    let Some(args) = stack.top_n(needed) else {
        return Err(AdaptorError::underflow(signature.name, needed, stack.len()));
    };

    for (position, (param, element)) in signature.inputs.iter().zip(args).enumerate() {
        let found = element.tag();
        if found != param.tag {
            return Err(AdaptorError::mismatch(
                signature.name,
                position,
                param.name,
                param.tag,
                found,
            ));
        }
    }
    Ok(())
}

/// Checks and pops exactly `signature.arity()` elements.
///
/// The most recently pushed element is the *last* argument, so the popped
/// elements are handed back in push order, which is the declared order.
pub fn pop_args(stack: &mut Stack<StackElement>, signature: &Signature) -> Result<Args, AdaptorError> {
    check_args(stack, signature)?;
    let elements: ArgVec = stack
        .drain_top(signature.arity())
        .map(Iterator::collect)
        .unwrap_or_default();
    Ok(Args {
        operation: signature.name,
        elements: elements.into_iter(),
    })
}

/// Pushes a typed result, tagged with the type's [`StackValue::TAG`].
#[inline]
pub fn push_result<T: StackValue>(stack: &mut Stack<StackElement>, value: T) {
    stack.push(value.into_element());
}

/// Arguments popped for one call, in declared order.
///
/// Dropping `Args` releases whatever was not taken, including text
/// references.
#[derive(Debug)]
pub struct Args {
    operation: &'static str,
    elements: smallvec::IntoIter<[StackElement; 6]>,
}

impl Args {
    /// Takes the next argument as `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` disagrees with the tag that [`pop_args`] validated, or
    /// if more arguments are taken than were declared. Both mean the
    /// operation's code contradicts its own signature.
    pub fn take<T: StackValue>(&mut self) -> T {
        match self.elements.next().map(T::from_element) {
            Some(Ok(value)) => value,
            Some(Err(element)) => unreachable!(
                "{}: argument validated as {} but read as {}",
                self.operation,
                element.tag(),
                T::TAG
            ),
            None => unreachable!("{}: more arguments read than declared", self.operation),
        }
    }

    pub fn remaining(&self) -> usize {
        self.elements.len()
    }
}
