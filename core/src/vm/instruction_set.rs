//! Instructions of the word-script VM.
//!
//! A script is a flat sequence of words with no control flow, so two
//! instructions are enough:
//!
//! ```text
//! Push(i)   [...] -> [..., constants[i]]
//! Call(i)   runs operations[i] with its own stack effect
//! ```

use core::fmt;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Push a constant from the pool.
    Push(u32),
    /// Call an operation from the operation table.
    Call(u32),
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push(index) => write!(f, "Push({})", index),
            Instruction::Call(index) => write!(f, "Call({})", index),
        }
    }
}

static_assertions::assert_eq_size!(Instruction, u64);
