use core::ffi::c_void;
use core::fmt;

use static_assertions::assert_eq_size;

use super::text::Text;

/// Runtime type tag of a [`StackElement`].
///
/// The display form is the type name used in stack-effect signatures
/// (`i64`, `f64`, `str`, `ptr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Int,
    Float,
    Str,
    Ptr,
}

impl Tag {
    /// All tags, in declaration order.
    pub const ALL: [Tag; 4] = [Tag::Int, Tag::Float, Tag::Str, Tag::Ptr];

    /// Name of the tag in stack-effect notation.
    pub const fn name(self) -> &'static str {
        match self {
            Tag::Int => "i64",
            Tag::Float => "f64",
            Tag::Str => "str",
            Tag::Ptr => "ptr",
        }
    }

    /// Inverse of [`Tag::name`].
    pub fn from_name(name: &str) -> Option<Tag> {
        Tag::ALL.into_iter().find(|tag| tag.name() == name)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// An untyped memory address.
///
/// The adaptor carries pointers from the calling program to the native API
/// verbatim and never dereferences them. Whoever pushed the pointer is
/// responsible for keeping the memory alive for the duration of the call.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pointer(*const c_void);

impl Pointer {
    pub const NULL: Pointer = Pointer(core::ptr::null());

    pub const fn new(ptr: *const c_void) -> Self {
        Pointer(ptr)
    }

    /// Points at the first element of `data`.
    pub fn from_slice<T>(data: &[T]) -> Self {
        Pointer(data.as_ptr().cast())
    }

    pub const fn as_ptr(self) -> *const c_void {
        self.0
    }

    pub fn addr(self) -> usize {
        self.0 as usize
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

impl fmt::Debug for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pointer({:p})", self.0)
    }
}

/// One slot of the data stack.
///
/// The variant *is* the tag, so an element can never be read through a tag
/// other than the one it was pushed with.
#[derive(Clone)]
pub enum StackElement {
    Int(i64),
    Float(f64),
    Str(Text),
    Ptr(Pointer),
}

assert_eq_size!(Pointer, *const c_void);

impl StackElement {
    pub fn tag(&self) -> Tag {
        match self {
            StackElement::Int(_) => Tag::Int,
            StackElement::Float(_) => Tag::Float,
            StackElement::Str(_) => Tag::Str,
            StackElement::Ptr(_) => Tag::Ptr,
        }
    }

    pub fn str(text: &str) -> Self {
        StackElement::Str(Text::new(text))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            StackElement::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            StackElement::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            StackElement::Str(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<Pointer> {
        match self {
            StackElement::Ptr(ptr) => Some(*ptr),
            _ => None,
        }
    }
}

impl PartialEq for StackElement {
    /// Tag and value equality. Floats compare bitwise so that a NaN pushed by
    /// an operation still equals the NaN a test expects.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StackElement::Int(a), StackElement::Int(b)) => a == b,
            (StackElement::Float(a), StackElement::Float(b)) => a.to_bits() == b.to_bits(),
            (StackElement::Str(a), StackElement::Str(b)) => a == b,
            (StackElement::Ptr(a), StackElement::Ptr(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for StackElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackElement::Int(value) => write!(f, "Int({})", value),
            StackElement::Float(value) => write!(f, "Float({:?})", value),
            StackElement::Str(text) => write!(f, "Str({:?})", text.as_str()),
            StackElement::Ptr(ptr) => write!(f, "Ptr({:p})", ptr.as_ptr()),
        }
    }
}

impl fmt::Display for StackElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackElement::Int(value) => write!(f, "{}", value),
            StackElement::Float(value) => write!(f, "{:?}", value),
            StackElement::Str(text) => write!(f, "{:?}", text.as_str()),
            StackElement::Ptr(ptr) => write!(f, "{:p}", ptr.as_ptr()),
        }
    }
}

impl From<i64> for StackElement {
    fn from(value: i64) -> Self {
        StackElement::Int(value)
    }
}

impl From<f64> for StackElement {
    fn from(value: f64) -> Self {
        StackElement::Float(value)
    }
}

impl From<Text> for StackElement {
    fn from(value: Text) -> Self {
        StackElement::Str(value)
    }
}

impl From<&str> for StackElement {
    fn from(value: &str) -> Self {
        StackElement::str(value)
    }
}

impl From<Pointer> for StackElement {
    fn from(value: Pointer) -> Self {
        StackElement::Ptr(value)
    }
}
