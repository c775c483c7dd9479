//! Values that live on the virtual machine's data stack.
//!
//! - [`StackElement`]: the tagged union stored in every stack slot.
//! - [`Text`]: reference-counted immutable text carried by `Str` elements.
//! - [`StackValue`]: the bridge between elements and plain Rust types used by
//!   native functions.

pub mod element;
pub mod text;
pub mod typed;

pub use element::{Pointer, StackElement, Tag};
pub use text::Text;
pub use typed::StackValue;

#[cfg(test)]
mod element_test;
