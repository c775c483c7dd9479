//! OpenGL binding for the typed stack calling convention.
//!
//! [`GlApi`] is the native side: one method per GL entry point, with GL's
//! own narrow types. The operations in [`ops`] adapt it to the stack, and
//! [`registry()`] lists them by name.
//!
//! Two backends are provided. [`HeadlessGl`] simulates the object model in
//! process and needs no GPU. [`LoadedGl`] forwards to a real driver through
//! entry points resolved by a caller-supplied loader.

use core::ffi::c_void;

use lazy_static::lazy_static;
use quadgl_core::{Operation, Registry};

pub mod constants;
mod headless;
mod loader;
pub mod ops;

pub use headless::{DrawCall, HeadlessGl, UniformValue, VertexAttrib};
pub use loader::LoadedGl;

pub type GLenum = u32;
pub type GLbitfield = u32;
pub type GLuint = u32;
pub type GLint = i32;
pub type GLsizei = i32;
pub type GLsizeiptr = isize;
pub type GLfloat = f32;
pub type GLboolean = u8;

/// The native graphics API as seen by the stack operations.
///
/// Handles are plain `GLuint` names; `0` means "none" or "failed", as in GL.
pub trait GlApi {
    /// Resolves entry points. Returns `false` if the API is unusable.
    fn load(&mut self) -> bool;

    fn get_integer(&mut self, pname: GLenum) -> GLint;

    fn enable(&mut self, cap: GLenum);
    fn disable(&mut self, cap: GLenum);
    fn clear_color(&mut self, red: GLfloat, green: GLfloat, blue: GLfloat, alpha: GLfloat);
    fn clear(&mut self, mask: GLbitfield);
    fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);

    fn gen_buffer(&mut self) -> GLuint;
    fn delete_buffer(&mut self, buffer: GLuint);
    fn bind_buffer(&mut self, target: GLenum, buffer: GLuint);

    /// # Safety
    ///
    /// `data` must be null or point to `size` readable bytes.
    unsafe fn buffer_data(
        &mut self,
        target: GLenum,
        size: GLsizeiptr,
        data: *const c_void,
        usage: GLenum,
    );

    fn gen_vertex_array(&mut self) -> GLuint;
    fn delete_vertex_array(&mut self, array: GLuint);
    fn bind_vertex_array(&mut self, array: GLuint);
    fn enable_vertex_attrib_array(&mut self, index: GLuint);
    /// `offset` is a byte offset into the bound array buffer.
    fn vertex_attrib_pointer(
        &mut self,
        index: GLuint,
        size: GLint,
        type_: GLenum,
        normalized: GLboolean,
        stride: GLsizei,
        offset: usize,
    );

    fn create_shader(&mut self, type_: GLenum) -> GLuint;
    fn delete_shader(&mut self, shader: GLuint);
    fn shader_source(&mut self, shader: GLuint, source: &str);
    fn compile_shader(&mut self, shader: GLuint);
    fn get_shader_iv(&mut self, shader: GLuint, pname: GLenum) -> GLint;
    /// Writes at most `buf.len()` bytes including a terminating NUL and
    /// returns the length written, excluding the NUL.
    fn get_shader_info_log(&mut self, shader: GLuint, buf: &mut [u8]) -> usize;

    fn create_program(&mut self) -> GLuint;
    fn delete_program(&mut self, program: GLuint);
    fn attach_shader(&mut self, program: GLuint, shader: GLuint);
    fn link_program(&mut self, program: GLuint);
    fn get_program_iv(&mut self, program: GLuint, pname: GLenum) -> GLint;
    /// Same contract as [`GlApi::get_shader_info_log`].
    fn get_program_info_log(&mut self, program: GLuint, buf: &mut [u8]) -> usize;
    fn use_program(&mut self, program: GLuint);

    fn get_uniform_location(&mut self, program: GLuint, name: &str) -> GLint;
    fn uniform1f(&mut self, location: GLint, v0: GLfloat);
    fn uniform1i(&mut self, location: GLint, v0: GLint);
    fn uniform3f(&mut self, location: GLint, v0: GLfloat, v1: GLfloat, v2: GLfloat);
    fn uniform4f(&mut self, location: GLint, v0: GLfloat, v1: GLfloat, v2: GLfloat, v3: GLfloat);

    fn draw_arrays(&mut self, mode: GLenum, first: GLint, count: GLsizei);
    /// `offset` is a byte offset into the bound element buffer.
    fn draw_elements(&mut self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize);

    fn gen_texture(&mut self) -> GLuint;
    fn delete_texture(&mut self, texture: GLuint);
    fn bind_texture(&mut self, target: GLenum, texture: GLuint);
    fn tex_parameteri(&mut self, target: GLenum, pname: GLenum, param: GLint);
    fn active_texture(&mut self, texture: GLenum);
}

lazy_static! {
    static ref REGISTRY: Registry<dyn GlApi> = {
        let mut registry = Registry::new();
        for operation in ops::OPERATIONS {
            let registered = registry.register(*operation);
            debug_assert!(registered.is_ok(), "{:?}", registered);
        }
        registry
    };
}

/// Every GL operation, by name, in declaration order.
pub fn registry() -> &'static Registry<dyn GlApi> {
    &REGISTRY
}

/// Looks up a GL operation by name.
pub fn operation(name: &str) -> Option<&'static dyn Operation<dyn GlApi>> {
    REGISTRY.get(name)
}
