//! quadgl - OpenGL for a stack machine
//!
//! # Overview
//!
//! Programs running on a dynamically-typed stack machine call OpenGL
//! through a fixed set of operations. Each operation pops typed arguments,
//! checks them against its stack-effect signature, makes one GL call, and
//! pushes the results:
//!
//! ```text
//! CreateShader( type:i64 -- shader:i64 )
//! ShaderSource( shader:i64 source:str -- )
//! GetShaderCompileStatus( shader:i64 -- success:i64 )
//! ```
//!
//! A missing or mistyped argument is a defect in the calling program and
//! terminates it. A shader that fails to compile is just data.
//!
//! # Quick Start
//!
//! ```
//! use quadgl::gl::{self, GlApi, HeadlessGl};
//! use quadgl::{Context, StackElement};
//!
//! let mut headless = HeadlessGl::new();
//! let host: &mut dyn GlApi = &mut headless;
//! let mut ctx = Context::default();
//!
//! ctx.push(gl::constants::VERTEX_SHADER as i64);
//! ctx.call(host, &gl::ops::CreateShader);
//! assert_eq!(ctx.pop(), Some(StackElement::Int(1)));
//! ```
//!
//! # Scripts
//!
//! Word scripts are a convenient way to drive operations from text; names
//! resolve to operations first, then to `GL_` constants:
//!
//! ```
//! use quadgl::gl::HeadlessGl;
//! use quadgl::{Context, StackElement};
//!
//! let script = quadgl::compile_script("GL_FRAGMENT_SHADER CreateShader").unwrap();
//! let mut ctx = Context::default();
//! quadgl::run_script(&script, &mut ctx, &mut HeadlessGl::new());
//! assert_eq!(ctx.stack().as_slice(), &[StackElement::Int(1)]);
//! ```

pub mod error_renderer;
pub mod gl;

use quadgl_core::vm::{RuntimeError, Script, ScriptError, VM};

pub use error_renderer::{
    Diagnostic, render_diagnostics, render_diagnostics_to, render_to_string_no_color,
};

// Re-export the calling convention
pub use quadgl_core::{
    AdaptorError, AdaptorErrorKind, Context, ContextOptions, Operation, Param, Pointer, Registry,
    Signature, StackElement, Tag, Text, ViolationPolicy,
};
pub use quadgl_core::{adaptor, notation, vm};

/// Compiles a word script against the GL operations and constants.
pub fn compile_script(source: &str) -> Result<Script<dyn gl::GlApi>, ScriptError> {
    Script::parse(source, gl::registry(), gl::constants::lookup)
}

/// Runs a compiled script. Convention violations are fatal.
pub fn run_script(
    script: &Script<dyn gl::GlApi>,
    ctx: &mut Context,
    gl: &mut (dyn gl::GlApi + 'static),
) {
    VM::new(script).run(ctx, gl);
}

/// Runs a compiled script, reporting the first violation with its location.
pub fn try_run_script(
    script: &Script<dyn gl::GlApi>,
    ctx: &mut Context,
    gl: &mut (dyn gl::GlApi + 'static),
) -> Result<(), RuntimeError> {
    VM::new(script).try_run(ctx, gl)
}
