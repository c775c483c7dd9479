//! GL enumerants used by the operations and accepted by name in scripts.

use hashbrown::HashMap;
use lazy_static::lazy_static;

use super::{GLbitfield, GLenum};

pub const FALSE: GLenum = 0;
pub const TRUE: GLenum = 1;

pub const DEPTH_BUFFER_BIT: GLbitfield = 0x0000_0100;
pub const STENCIL_BUFFER_BIT: GLbitfield = 0x0000_0400;
pub const COLOR_BUFFER_BIT: GLbitfield = 0x0000_4000;

pub const POINTS: GLenum = 0x0000;
pub const LINES: GLenum = 0x0001;
pub const LINE_LOOP: GLenum = 0x0002;
pub const LINE_STRIP: GLenum = 0x0003;
pub const TRIANGLES: GLenum = 0x0004;
pub const TRIANGLE_STRIP: GLenum = 0x0005;
pub const TRIANGLE_FAN: GLenum = 0x0006;

pub const CULL_FACE: GLenum = 0x0B44;
pub const DEPTH_TEST: GLenum = 0x0B71;
pub const STENCIL_TEST: GLenum = 0x0B90;
pub const BLEND: GLenum = 0x0BE2;
pub const SCISSOR_TEST: GLenum = 0x0C11;

pub const UNSIGNED_BYTE: GLenum = 0x1401;
pub const UNSIGNED_SHORT: GLenum = 0x1403;
pub const INT: GLenum = 0x1404;
pub const UNSIGNED_INT: GLenum = 0x1405;
pub const FLOAT: GLenum = 0x1406;

pub const NEAREST: GLenum = 0x2600;
pub const LINEAR: GLenum = 0x2601;
pub const TEXTURE_MAG_FILTER: GLenum = 0x2800;
pub const TEXTURE_MIN_FILTER: GLenum = 0x2801;
pub const TEXTURE_WRAP_S: GLenum = 0x2802;
pub const TEXTURE_WRAP_T: GLenum = 0x2803;
pub const REPEAT: GLenum = 0x2901;
pub const CLAMP_TO_EDGE: GLenum = 0x812F;

pub const TEXTURE_2D: GLenum = 0x0DE1;
pub const TEXTURE0: GLenum = 0x84C0;

pub const ARRAY_BUFFER: GLenum = 0x8892;
pub const ELEMENT_ARRAY_BUFFER: GLenum = 0x8893;
pub const STREAM_DRAW: GLenum = 0x88E0;
pub const STATIC_DRAW: GLenum = 0x88E4;
pub const DYNAMIC_DRAW: GLenum = 0x88E8;

pub const FRAGMENT_SHADER: GLenum = 0x8B30;
pub const VERTEX_SHADER: GLenum = 0x8B31;
pub const SHADER_TYPE: GLenum = 0x8B4F;
pub const DELETE_STATUS: GLenum = 0x8B80;
pub const COMPILE_STATUS: GLenum = 0x8B81;
pub const LINK_STATUS: GLenum = 0x8B82;
pub const INFO_LOG_LENGTH: GLenum = 0x8B84;
pub const ATTACHED_SHADERS: GLenum = 0x8B85;
pub const ACTIVE_UNIFORMS: GLenum = 0x8B86;

pub const VERSION: GLenum = 0x1F02;
pub const MAJOR_VERSION: GLenum = 0x821B;
pub const MINOR_VERSION: GLenum = 0x821C;

macro_rules! named {
    ($($name:ident),* $(,)?) => {
        &[$((concat!("GL_", stringify!($name)), $name as i64)),*]
    };
}

/// `GL_`-prefixed names of every constant above, with their values.
pub static NAMED: &[(&str, i64)] = named![
    FALSE,
    TRUE,
    DEPTH_BUFFER_BIT,
    STENCIL_BUFFER_BIT,
    COLOR_BUFFER_BIT,
    POINTS,
    LINES,
    LINE_LOOP,
    LINE_STRIP,
    TRIANGLES,
    TRIANGLE_STRIP,
    TRIANGLE_FAN,
    CULL_FACE,
    DEPTH_TEST,
    STENCIL_TEST,
    BLEND,
    SCISSOR_TEST,
    UNSIGNED_BYTE,
    UNSIGNED_SHORT,
    INT,
    UNSIGNED_INT,
    FLOAT,
    NEAREST,
    LINEAR,
    TEXTURE_MAG_FILTER,
    TEXTURE_MIN_FILTER,
    TEXTURE_WRAP_S,
    TEXTURE_WRAP_T,
    REPEAT,
    CLAMP_TO_EDGE,
    TEXTURE_2D,
    TEXTURE0,
    ARRAY_BUFFER,
    ELEMENT_ARRAY_BUFFER,
    STREAM_DRAW,
    STATIC_DRAW,
    DYNAMIC_DRAW,
    FRAGMENT_SHADER,
    VERTEX_SHADER,
    SHADER_TYPE,
    DELETE_STATUS,
    COMPILE_STATUS,
    LINK_STATUS,
    INFO_LOG_LENGTH,
    ATTACHED_SHADERS,
    ACTIVE_UNIFORMS,
    VERSION,
    MAJOR_VERSION,
    MINOR_VERSION,
];

lazy_static! {
    static ref BY_NAME: HashMap<&'static str, i64> = NAMED.iter().copied().collect();
}

/// Value of a `GL_`-prefixed constant, e.g. `GL_VERTEX_SHADER`.
pub fn lookup(name: &str) -> Option<i64> {
    BY_NAME.get(name).copied()
}
