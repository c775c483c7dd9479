//! Statically-typed view of stack elements.
//!
//! Native functions take and return plain Rust types. `StackValue` converts
//! between those types and [`StackElement`]s, and names the [`Tag`] each type
//! occupies on the stack so signatures can be built at compile time.

use super::element::{Pointer, StackElement, Tag};
use super::text::Text;

pub trait StackValue: Sized {
    /// Tag of the elements this type is read from and written to.
    const TAG: Tag;

    /// Extracts the value, or hands the element back if the tag differs.
    fn from_element(element: StackElement) -> Result<Self, StackElement>;

    fn into_element(self) -> StackElement;
}

impl StackValue for i64 {
    const TAG: Tag = Tag::Int;

    fn from_element(element: StackElement) -> Result<Self, StackElement> {
        match element {
            StackElement::Int(value) => Ok(value),
            other => Err(other),
        }
    }

    fn into_element(self) -> StackElement {
        StackElement::Int(self)
    }
}

impl StackValue for f64 {
    const TAG: Tag = Tag::Float;

    fn from_element(element: StackElement) -> Result<Self, StackElement> {
        match element {
            StackElement::Float(value) => Ok(value),
            other => Err(other),
        }
    }

    fn into_element(self) -> StackElement {
        StackElement::Float(self)
    }
}

impl StackValue for Text {
    const TAG: Tag = Tag::Str;

    fn from_element(element: StackElement) -> Result<Self, StackElement> {
        match element {
            StackElement::Str(text) => Ok(text),
            other => Err(other),
        }
    }

    fn into_element(self) -> StackElement {
        StackElement::Str(self)
    }
}

impl StackValue for Pointer {
    const TAG: Tag = Tag::Ptr;

    fn from_element(element: StackElement) -> Result<Self, StackElement> {
        match element {
            StackElement::Ptr(ptr) => Ok(ptr),
            other => Err(other),
        }
    }

    fn into_element(self) -> StackElement {
        StackElement::Ptr(self)
    }
}
