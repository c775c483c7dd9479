use core::fmt;

use crate::values::Tag;

/// A named, tagged slot in a stack effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub tag: Tag,
}

impl Param {
    pub const fn new(name: &'static str, tag: Tag) -> Self {
        Param { name, tag }
    }
}

/// Static description of one operation's stack effect.
///
/// Inputs and outputs are both listed in logical left-to-right order: the
/// first input is pushed first (deepest), and the first output is pushed
/// first. `Display` renders the conventional notation:
///
/// ```
/// use quadgl_core::{Param, Signature, Tag};
///
/// static BIND_BUFFER: Signature = Signature::new(
///     "BindBuffer",
///     &[Param::new("target", Tag::Int), Param::new("buffer", Tag::Int)],
///     &[],
/// );
/// assert_eq!(BIND_BUFFER.to_string(), "BindBuffer( target:i64 buffer:i64 -- )");
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct Signature {
    pub name: &'static str,
    pub inputs: &'static [Param],
    pub outputs: &'static [Param],
}

impl Signature {
    pub const fn new(
        name: &'static str,
        inputs: &'static [Param],
        outputs: &'static [Param],
    ) -> Self {
        Signature {
            name,
            inputs,
            outputs,
        }
    }

    /// Number of elements consumed.
    pub const fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Number of elements produced.
    pub const fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Net change in stack depth after a successful call.
    pub const fn depth_change(&self) -> isize {
        self.outputs.len() as isize - self.inputs.len() as isize
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for param in self.inputs {
            write!(f, " {}:{}", param.name, param.tag)?;
        }
        f.write_str(" --")?;
        for param in self.outputs {
            write!(f, " {}:{}", param.name, param.tag)?;
        }
        f.write_str(" )")
    }
}
