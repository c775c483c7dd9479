//! Procedural macros for quadgl stack operations
//!
//! This crate provides the `#[stack_fn]` attribute macro, which turns a plain
//! typed Rust function into an operation callable through the typed stack
//! calling convention.

extern crate proc_macro;

use proc_macro::TokenStream;

mod stack_fn;

/// Generate a stack operation from a typed Rust function.
///
/// # Example
///
/// ```ignore
/// #[stack_fn(name = "GetUniformLocation", returns = "location")]
/// fn get_uniform_location(gl: &mut dyn GlApi, program: i64, name: Text) -> i64 {
///     gl.get_uniform_location(program as u32, &name) as i64
/// }
/// ```
///
/// This generates:
/// - the function itself, unchanged
/// - a unit struct `GetUniformLocation`
/// - `impl Operation<dyn GlApi> for GetUniformLocation`, whose static
///   signature is `GetUniformLocation( program:i64 name:str -- location:i64 )`
///
/// # Attributes
///
/// - `name` (required): the operation name. This becomes the struct name.
/// - `returns`: comma-separated output names, one per returned value.
///   Required unless the function returns `()`.
///
/// # Parameters
///
/// The first parameter is the native host, `&mut H`; the operation
/// implements `Operation<H>`. Every other parameter must implement
/// `StackValue` (`i64`, `f64`, `Text`, `Pointer`). Input names in the
/// signature are the Rust parameter names (`r#type` becomes `type`).
///
/// # Returns
///
/// `()`, a single `StackValue`, or a tuple of them. Tuple elements are
/// pushed left to right, so the first one ends up deepest.
#[proc_macro_attribute]
pub fn stack_fn(attr: TokenStream, item: TokenStream) -> TokenStream {
    stack_fn::stack_fn_impl(attr, item)
}
