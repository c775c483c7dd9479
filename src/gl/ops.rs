//! The GL operations.
//!
//! Each function receives its arguments already popped and typed, narrows
//! them to GL's widths with plain truncating casts, and makes the native
//! call. Stack effects are listed beside each operation.

use quadgl_core::{Operation, Pointer, Text};
use quadgl_macros::stack_fn;
use tracing::debug;

use super::constants::{COMPILE_STATUS, INFO_LOG_LENGTH, LINK_STATUS, MAJOR_VERSION, MINOR_VERSION};
use super::{GLuint, GlApi};

// ============================================================================
// Initialization
// ============================================================================

// LoadGL( -- success:i64 )
// Must be called once a GL context is current.
#[stack_fn(name = "LoadGL", returns = "success")]
fn load_gl(gl: &mut dyn GlApi) -> i64 {
    let loaded = gl.load();
    debug!(loaded, "LoadGL");
    loaded as i64
}

// GetVersion( -- major:i64 minor:i64 )
#[stack_fn(name = "GetVersion", returns = "major, minor")]
fn get_version(gl: &mut dyn GlApi) -> (i64, i64) {
    let major = gl.get_integer(MAJOR_VERSION);
    let minor = gl.get_integer(MINOR_VERSION);
    (major as i64, minor as i64)
}

// ============================================================================
// State Management
// ============================================================================

#[stack_fn(name = "Enable")]
fn enable(gl: &mut dyn GlApi, cap: i64) {
    gl.enable(cap as u32);
}

#[stack_fn(name = "Disable")]
fn disable(gl: &mut dyn GlApi, cap: i64) {
    gl.disable(cap as u32);
}

#[stack_fn(name = "ClearColor")]
fn clear_color(gl: &mut dyn GlApi, r: f64, g: f64, b: f64, a: f64) {
    gl.clear_color(r as f32, g as f32, b as f32, a as f32);
}

#[stack_fn(name = "Clear")]
fn clear(gl: &mut dyn GlApi, mask: i64) {
    gl.clear(mask as u32);
}

#[stack_fn(name = "Viewport")]
fn viewport(gl: &mut dyn GlApi, x: i64, y: i64, width: i64, height: i64) {
    gl.viewport(x as i32, y as i32, width as i32, height as i32);
}

// ============================================================================
// Buffers
// ============================================================================

#[stack_fn(name = "GenBuffer", returns = "buffer")]
fn gen_buffer(gl: &mut dyn GlApi) -> i64 {
    gl.gen_buffer() as i64
}

#[stack_fn(name = "DeleteBuffer")]
fn delete_buffer(gl: &mut dyn GlApi, buffer: i64) {
    gl.delete_buffer(buffer as u32);
}

#[stack_fn(name = "BindBuffer")]
fn bind_buffer(gl: &mut dyn GlApi, target: i64, buffer: i64) {
    gl.bind_buffer(target as u32, buffer as u32);
}

// BufferDataFloats( target:i64 data:ptr count:i64 usage:i64 -- )
// `count` is in floats; GL receives the size in bytes.
#[stack_fn(name = "BufferDataFloats")]
fn buffer_data_floats(gl: &mut dyn GlApi, target: i64, data: Pointer, count: i64, usage: i64) {
    let size = count.wrapping_mul(size_of::<f32>() as i64) as isize;
    // SAFETY: whoever pushed `data` vouches for `count` floats behind it.
    unsafe { gl.buffer_data(target as u32, size, data.as_ptr(), usage as u32) }
}

// ============================================================================
// Vertex Arrays
// ============================================================================

#[stack_fn(name = "GenVertexArray", returns = "vao")]
fn gen_vertex_array(gl: &mut dyn GlApi) -> i64 {
    gl.gen_vertex_array() as i64
}

#[stack_fn(name = "DeleteVertexArray")]
fn delete_vertex_array(gl: &mut dyn GlApi, vao: i64) {
    gl.delete_vertex_array(vao as u32);
}

#[stack_fn(name = "BindVertexArray")]
fn bind_vertex_array(gl: &mut dyn GlApi, vao: i64) {
    gl.bind_vertex_array(vao as u32);
}

#[stack_fn(name = "EnableVertexAttribArray")]
fn enable_vertex_attrib_array(gl: &mut dyn GlApi, index: i64) {
    gl.enable_vertex_attrib_array(index as u32);
}

#[stack_fn(name = "VertexAttribPointer")]
fn vertex_attrib_pointer(
    gl: &mut dyn GlApi,
    index: i64,
    size: i64,
    r#type: i64,
    normalized: i64,
    stride: i64,
    offset: i64,
) {
    gl.vertex_attrib_pointer(
        index as u32,
        size as i32,
        r#type as u32,
        normalized as u8,
        stride as i32,
        offset as usize,
    );
}

// ============================================================================
// Shaders
// ============================================================================

// CreateShader( type:i64 -- shader:i64 )
// Pushes 0 if GL rejects the type.
#[stack_fn(name = "CreateShader", returns = "shader")]
fn create_shader(gl: &mut dyn GlApi, r#type: i64) -> i64 {
    gl.create_shader(r#type as u32) as i64
}

#[stack_fn(name = "DeleteShader")]
fn delete_shader(gl: &mut dyn GlApi, shader: i64) {
    gl.delete_shader(shader as u32);
}

#[stack_fn(name = "ShaderSource")]
fn shader_source(gl: &mut dyn GlApi, shader: i64, source: Text) {
    gl.shader_source(shader as u32, &source);
}

#[stack_fn(name = "CompileShader")]
fn compile_shader(gl: &mut dyn GlApi, shader: i64) {
    gl.compile_shader(shader as u32);
}

// GetShaderCompileStatus( shader:i64 -- success:i64 )
// A failed compile is data, not an error.
#[stack_fn(name = "GetShaderCompileStatus", returns = "success")]
fn get_shader_compile_status(gl: &mut dyn GlApi, shader: i64) -> i64 {
    gl.get_shader_iv(shader as u32, COMPILE_STATUS) as i64
}

#[stack_fn(name = "GetShaderInfoLog", returns = "log")]
fn get_shader_info_log(gl: &mut dyn GlApi, shader: i64) -> Text {
    let shader = shader as u32;
    let length = gl.get_shader_iv(shader, INFO_LOG_LENGTH);
    read_info_log(length, |buf| gl.get_shader_info_log(shader, buf))
}

/// Reads an info log of `length` bytes (GL counts the NUL) into a `Text`,
/// stopping at the first NUL.
fn read_info_log(length: i32, fetch: impl FnOnce(&mut [u8]) -> usize) -> Text {
    if length <= 0 {
        return Text::new("");
    }
    let mut buf = vec![0u8; length as usize];
    let written = fetch(&mut buf).min(buf.len());
    let log = &buf[..written];
    let end = log.iter().position(|&b| b == 0).unwrap_or(log.len());
    Text::from(String::from_utf8_lossy(&log[..end]).into_owned())
}

// ============================================================================
// Programs
// ============================================================================

#[stack_fn(name = "CreateProgram", returns = "program")]
fn create_program(gl: &mut dyn GlApi) -> i64 {
    gl.create_program() as i64
}

#[stack_fn(name = "DeleteProgram")]
fn delete_program(gl: &mut dyn GlApi, program: i64) {
    gl.delete_program(program as u32);
}

#[stack_fn(name = "AttachShader")]
fn attach_shader(gl: &mut dyn GlApi, program: i64, shader: i64) {
    gl.attach_shader(program as u32, shader as u32);
}

#[stack_fn(name = "LinkProgram")]
fn link_program(gl: &mut dyn GlApi, program: i64) {
    gl.link_program(program as u32);
}

#[stack_fn(name = "GetProgramLinkStatus", returns = "success")]
fn get_program_link_status(gl: &mut dyn GlApi, program: i64) -> i64 {
    gl.get_program_iv(program as u32, LINK_STATUS) as i64
}

#[stack_fn(name = "GetProgramInfoLog", returns = "log")]
fn get_program_info_log(gl: &mut dyn GlApi, program: i64) -> Text {
    let program = program as GLuint;
    let length = gl.get_program_iv(program, INFO_LOG_LENGTH);
    read_info_log(length, |buf| gl.get_program_info_log(program, buf))
}

#[stack_fn(name = "UseProgram")]
fn use_program(gl: &mut dyn GlApi, program: i64) {
    gl.use_program(program as u32);
}

// ============================================================================
// Uniforms
// ============================================================================

// GetUniformLocation( program:i64 name:str -- location:i64 )
// Unknown names push -1.
#[stack_fn(name = "GetUniformLocation", returns = "location")]
fn get_uniform_location(gl: &mut dyn GlApi, program: i64, name: Text) -> i64 {
    gl.get_uniform_location(program as u32, &name) as i64
}

#[stack_fn(name = "Uniform1f")]
fn uniform1f(gl: &mut dyn GlApi, location: i64, v0: f64) {
    gl.uniform1f(location as i32, v0 as f32);
}

#[stack_fn(name = "Uniform1i")]
fn uniform1i(gl: &mut dyn GlApi, location: i64, v0: i64) {
    gl.uniform1i(location as i32, v0 as i32);
}

#[stack_fn(name = "Uniform3f")]
fn uniform3f(gl: &mut dyn GlApi, location: i64, v0: f64, v1: f64, v2: f64) {
    gl.uniform3f(location as i32, v0 as f32, v1 as f32, v2 as f32);
}

#[stack_fn(name = "Uniform4f")]
fn uniform4f(gl: &mut dyn GlApi, location: i64, v0: f64, v1: f64, v2: f64, v3: f64) {
    gl.uniform4f(location as i32, v0 as f32, v1 as f32, v2 as f32, v3 as f32);
}

// ============================================================================
// Drawing
// ============================================================================

#[stack_fn(name = "DrawArrays")]
fn draw_arrays(gl: &mut dyn GlApi, mode: i64, first: i64, count: i64) {
    gl.draw_arrays(mode as u32, first as i32, count as i32);
}

// DrawElements( mode:i64 count:i64 type:i64 offset:i64 -- )
// `offset` is a byte offset into the bound element buffer.
#[stack_fn(name = "DrawElements")]
fn draw_elements(gl: &mut dyn GlApi, mode: i64, count: i64, r#type: i64, offset: i64) {
    gl.draw_elements(mode as u32, count as i32, r#type as u32, offset as usize);
}

// ============================================================================
// Textures
// ============================================================================

#[stack_fn(name = "GenTexture", returns = "texture")]
fn gen_texture(gl: &mut dyn GlApi) -> i64 {
    gl.gen_texture() as i64
}

#[stack_fn(name = "DeleteTexture")]
fn delete_texture(gl: &mut dyn GlApi, texture: i64) {
    gl.delete_texture(texture as u32);
}

#[stack_fn(name = "BindTexture")]
fn bind_texture(gl: &mut dyn GlApi, target: i64, texture: i64) {
    gl.bind_texture(target as u32, texture as u32);
}

#[stack_fn(name = "TexParameteri")]
fn tex_parameteri(gl: &mut dyn GlApi, target: i64, pname: i64, param: i64) {
    gl.tex_parameteri(target as u32, pname as u32, param as i32);
}

#[stack_fn(name = "ActiveTexture")]
fn active_texture(gl: &mut dyn GlApi, texture: i64) {
    gl.active_texture(texture as u32);
}

/// All operations, in the order they are documented and registered.
pub static OPERATIONS: &[&dyn Operation<dyn GlApi>] = &[
    &LoadGL,
    &GetVersion,
    &Enable,
    &Disable,
    &ClearColor,
    &Clear,
    &Viewport,
    &GenBuffer,
    &DeleteBuffer,
    &BindBuffer,
    &BufferDataFloats,
    &GenVertexArray,
    &DeleteVertexArray,
    &BindVertexArray,
    &EnableVertexAttribArray,
    &VertexAttribPointer,
    &CreateShader,
    &DeleteShader,
    &ShaderSource,
    &CompileShader,
    &GetShaderCompileStatus,
    &GetShaderInfoLog,
    &CreateProgram,
    &DeleteProgram,
    &AttachShader,
    &LinkProgram,
    &GetProgramLinkStatus,
    &GetProgramInfoLog,
    &UseProgram,
    &GetUniformLocation,
    &Uniform1f,
    &Uniform1i,
    &Uniform3f,
    &Uniform4f,
    &DrawArrays,
    &DrawElements,
    &GenTexture,
    &DeleteTexture,
    &BindTexture,
    &TexParameteri,
    &ActiveTexture,
];
