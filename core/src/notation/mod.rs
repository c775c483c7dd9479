//! Text notations around the calling convention.
//!
//! - Stack-effect declarations, `Name( in:type … -- out:type … )`, the
//!   contract a host-language compiler honors when it emits pushes before and
//!   pops after a call.
//! - Word scripts: whitespace-separated literals and names, executed by the
//!   [`VM`](crate::vm::VM).

mod parser;

pub use parser::{
    Declaration, DeclaredParam, NotationParser, Rule, SyntaxError, Word, WordKind,
    parse_declarations, parse_script,
};
