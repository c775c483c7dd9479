mod code;
mod context;
mod instruction_set;
mod runtime;
mod stack;

pub use code::{Script, ScriptError};
pub use context::Context;
pub use instruction_set::Instruction;
pub use runtime::{RuntimeError, VM};
pub use stack::Stack;
