use core::{fmt, ops::Deref};
use std::rc::Rc;

/// Reference-counted, immutable text buffer.
///
/// Cloning a `Text` takes another reference to the same bytes. A popped
/// `Str` element hands its reference to the operation, which drops it when
/// the native call returns; the caller's own clones are unaffected.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Text(Rc<str>);

impl Text {
    pub fn new(text: &str) -> Self {
        Text(Rc::from(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of live references to this buffer, including `self`.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Whether both handles share one buffer.
    pub fn ptr_eq(&self, other: &Text) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Text {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Text {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Text::new(value)
    }
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        Text(Rc::from(value))
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
