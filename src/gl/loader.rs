use core::ffi::{CStr, c_char, c_void};
use std::ffi::CString;

use tracing::{debug, warn};

use super::constants::{MAJOR_VERSION, MINOR_VERSION, VERSION};
use super::{
    GLbitfield, GLboolean, GLenum, GLfloat, GLint, GLsizei, GLsizeiptr, GLuint, GlApi,
};

/// Declares the entry-point table: one typed function pointer per GL symbol.
macro_rules! gl_functions {
    ($( $field:ident = $symbol:literal : fn($($ty:ty),*) $(-> $ret:ty)? ;)*) => {
        struct Functions {
            $( $field: unsafe extern "system" fn($($ty),*) $(-> $ret)?, )*
        }

        impl Functions {
            /// Resolves every symbol, or names the first one the loader lacks.
            fn resolve(loader: &mut dyn FnMut(&str) -> *const c_void) -> Result<Self, &'static str> {
                Ok(Functions {
                    $(
                        $field: {
                            let address = loader($symbol);
                            if address.is_null() {
                                return Err($symbol);
                            }
                            // SAFETY: the loader returned the driver's entry
                            // point for this symbol, whose C signature is the
                            // one declared here.
                            unsafe {
                                core::mem::transmute::<
                                    *const c_void,
                                    unsafe extern "system" fn($($ty),*) $(-> $ret)?,
                                >(address)
                            }
                        },
                    )*
                })
            }
        }
    };
}

gl_functions! {
    get_integerv = "glGetIntegerv": fn(GLenum, *mut GLint);
    get_string = "glGetString": fn(GLenum) -> *const u8;
    enable = "glEnable": fn(GLenum);
    disable = "glDisable": fn(GLenum);
    clear_color = "glClearColor": fn(GLfloat, GLfloat, GLfloat, GLfloat);
    clear = "glClear": fn(GLbitfield);
    viewport = "glViewport": fn(GLint, GLint, GLsizei, GLsizei);
    gen_buffers = "glGenBuffers": fn(GLsizei, *mut GLuint);
    delete_buffers = "glDeleteBuffers": fn(GLsizei, *const GLuint);
    bind_buffer = "glBindBuffer": fn(GLenum, GLuint);
    buffer_data = "glBufferData": fn(GLenum, GLsizeiptr, *const c_void, GLenum);
    gen_vertex_arrays = "glGenVertexArrays": fn(GLsizei, *mut GLuint);
    delete_vertex_arrays = "glDeleteVertexArrays": fn(GLsizei, *const GLuint);
    bind_vertex_array = "glBindVertexArray": fn(GLuint);
    enable_vertex_attrib_array = "glEnableVertexAttribArray": fn(GLuint);
    vertex_attrib_pointer = "glVertexAttribPointer":
        fn(GLuint, GLint, GLenum, GLboolean, GLsizei, *const c_void);
    create_shader = "glCreateShader": fn(GLenum) -> GLuint;
    delete_shader = "glDeleteShader": fn(GLuint);
    shader_source = "glShaderSource":
        fn(GLuint, GLsizei, *const *const c_char, *const GLint);
    compile_shader = "glCompileShader": fn(GLuint);
    get_shaderiv = "glGetShaderiv": fn(GLuint, GLenum, *mut GLint);
    get_shader_info_log = "glGetShaderInfoLog":
        fn(GLuint, GLsizei, *mut GLsizei, *mut c_char);
    create_program = "glCreateProgram": fn() -> GLuint;
    delete_program = "glDeleteProgram": fn(GLuint);
    attach_shader = "glAttachShader": fn(GLuint, GLuint);
    link_program = "glLinkProgram": fn(GLuint);
    get_programiv = "glGetProgramiv": fn(GLuint, GLenum, *mut GLint);
    get_program_info_log = "glGetProgramInfoLog":
        fn(GLuint, GLsizei, *mut GLsizei, *mut c_char);
    use_program = "glUseProgram": fn(GLuint);
    get_uniform_location = "glGetUniformLocation": fn(GLuint, *const c_char) -> GLint;
    uniform1f = "glUniform1f": fn(GLint, GLfloat);
    uniform1i = "glUniform1i": fn(GLint, GLint);
    uniform3f = "glUniform3f": fn(GLint, GLfloat, GLfloat, GLfloat);
    uniform4f = "glUniform4f": fn(GLint, GLfloat, GLfloat, GLfloat, GLfloat);
    draw_arrays = "glDrawArrays": fn(GLenum, GLint, GLsizei);
    draw_elements = "glDrawElements": fn(GLenum, GLsizei, GLenum, *const c_void);
    gen_textures = "glGenTextures": fn(GLsizei, *mut GLuint);
    delete_textures = "glDeleteTextures": fn(GLsizei, *const GLuint);
    bind_texture = "glBindTexture": fn(GLenum, GLuint);
    tex_parameteri = "glTexParameteri": fn(GLenum, GLenum, GLint);
    active_texture = "glActiveTexture": fn(GLenum);
}

/// A real GL driver, reached through entry points resolved by a loader.
///
/// The loader is typically the windowing library's `get_proc_address`.
/// Resolution happens on [`GlApi::load`] (the `LoadGL` operation), which must
/// run while a GL context is current. Calls made before a successful load
/// are logged and ignored; queries return 0.
///
/// `GL_MAJOR_VERSION` and `GL_MINOR_VERSION` only exist from GL 3.0; on older
/// contexts the version is read from the `GL_VERSION` string instead.
pub struct LoadedGl {
    loader: Box<dyn FnMut(&str) -> *const c_void>,
    functions: Option<Functions>,
    missing: Option<&'static str>,
}

impl LoadedGl {
    pub fn new(loader: impl FnMut(&str) -> *const c_void + 'static) -> Self {
        LoadedGl {
            loader: Box::new(loader),
            functions: None,
            missing: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.functions.is_some()
    }

    /// The symbol that made the last load fail.
    pub fn missing_symbol(&self) -> Option<&'static str> {
        self.missing
    }

    fn gl(&self, entry_point: &str) -> Option<&Functions> {
        if self.functions.is_none() {
            warn!(entry_point, "GL call before a successful LoadGL; ignored");
        }
        self.functions.as_ref()
    }

    /// `(major, minor)` parsed from the `GL_VERSION` string.
    fn version_from_string(&self) -> Option<(GLint, GLint)> {
        let gl = self.gl("glGetString")?;
        let text = unsafe { (gl.get_string)(VERSION) };
        if text.is_null() {
            return None;
        }
        // SAFETY: glGetString returns a static NUL-terminated string.
        let text = unsafe { CStr::from_ptr(text.cast::<c_char>()) };
        parse_version(&text.to_string_lossy())
    }

    fn gen_one(&self, entry_point: &str, gen_fn: impl FnOnce(&Functions, *mut GLuint)) -> GLuint {
        let mut name: GLuint = 0;
        if let Some(gl) = self.gl(entry_point) {
            gen_fn(gl, &mut name);
        }
        name
    }

    fn read_log(
        &self,
        entry_point: &str,
        buf: &mut [u8],
        fetch: impl FnOnce(&Functions, GLsizei, *mut GLsizei, *mut c_char),
    ) -> usize {
        let Some(gl) = self.gl(entry_point) else {
            return 0;
        };
        let mut written: GLsizei = 0;
        let capacity = GLsizei::try_from(buf.len()).unwrap_or(GLsizei::MAX);
        fetch(gl, capacity, &mut written, buf.as_mut_ptr().cast());
        usize::try_from(written).unwrap_or(0).min(buf.len())
    }
}

impl core::fmt::Debug for LoadedGl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoadedGl")
            .field("loaded", &self.is_loaded())
            .field("missing", &self.missing)
            .finish()
    }
}

// SAFETY (all calls below): the pointers were resolved for a current
// context by `load`, and every pointer argument is either a live local or
// forwarded verbatim from the calling program.
impl GlApi for LoadedGl {
    fn load(&mut self) -> bool {
        match Functions::resolve(&mut *self.loader) {
            Ok(functions) => {
                debug!("GL entry points resolved");
                self.functions = Some(functions);
                self.missing = None;
                true
            }
            Err(symbol) => {
                warn!(symbol, "GL entry point missing");
                self.functions = None;
                self.missing = Some(symbol);
                false
            }
        }
    }

    fn get_integer(&mut self, pname: GLenum) -> GLint {
        let mut value: GLint = 0;
        if let Some(gl) = self.gl("glGetIntegerv") {
            unsafe { (gl.get_integerv)(pname, &mut value) };
        }
        // Pre-3.0 contexts reject these enums and leave `value` untouched.
        if value == 0 && (pname == MAJOR_VERSION || pname == MINOR_VERSION) {
            if let Some((major, minor)) = self.version_from_string() {
                debug!(major, minor, "GL version from GL_VERSION string");
                return if pname == MAJOR_VERSION { major } else { minor };
            }
        }
        value
    }

    fn enable(&mut self, cap: GLenum) {
        if let Some(gl) = self.gl("glEnable") {
            unsafe { (gl.enable)(cap) };
        }
    }

    fn disable(&mut self, cap: GLenum) {
        if let Some(gl) = self.gl("glDisable") {
            unsafe { (gl.disable)(cap) };
        }
    }

    fn clear_color(&mut self, red: GLfloat, green: GLfloat, blue: GLfloat, alpha: GLfloat) {
        if let Some(gl) = self.gl("glClearColor") {
            unsafe { (gl.clear_color)(red, green, blue, alpha) };
        }
    }

    fn clear(&mut self, mask: GLbitfield) {
        if let Some(gl) = self.gl("glClear") {
            unsafe { (gl.clear)(mask) };
        }
    }

    fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        if let Some(gl) = self.gl("glViewport") {
            unsafe { (gl.viewport)(x, y, width, height) };
        }
    }

    fn gen_buffer(&mut self) -> GLuint {
        self.gen_one("glGenBuffers", |gl, name| unsafe { (gl.gen_buffers)(1, name) })
    }

    fn delete_buffer(&mut self, buffer: GLuint) {
        if let Some(gl) = self.gl("glDeleteBuffers") {
            unsafe { (gl.delete_buffers)(1, &buffer) };
        }
    }

    fn bind_buffer(&mut self, target: GLenum, buffer: GLuint) {
        if let Some(gl) = self.gl("glBindBuffer") {
            unsafe { (gl.bind_buffer)(target, buffer) };
        }
    }

    unsafe fn buffer_data(
        &mut self,
        target: GLenum,
        size: GLsizeiptr,
        data: *const c_void,
        usage: GLenum,
    ) {
        if let Some(gl) = self.gl("glBufferData") {
            unsafe { (gl.buffer_data)(target, size, data, usage) };
        }
    }

    fn gen_vertex_array(&mut self) -> GLuint {
        self.gen_one("glGenVertexArrays", |gl, name| unsafe {
            (gl.gen_vertex_arrays)(1, name)
        })
    }

    fn delete_vertex_array(&mut self, array: GLuint) {
        if let Some(gl) = self.gl("glDeleteVertexArrays") {
            unsafe { (gl.delete_vertex_arrays)(1, &array) };
        }
    }

    fn bind_vertex_array(&mut self, array: GLuint) {
        if let Some(gl) = self.gl("glBindVertexArray") {
            unsafe { (gl.bind_vertex_array)(array) };
        }
    }

    fn enable_vertex_attrib_array(&mut self, index: GLuint) {
        if let Some(gl) = self.gl("glEnableVertexAttribArray") {
            unsafe { (gl.enable_vertex_attrib_array)(index) };
        }
    }

    fn vertex_attrib_pointer(
        &mut self,
        index: GLuint,
        size: GLint,
        type_: GLenum,
        normalized: GLboolean,
        stride: GLsizei,
        offset: usize,
    ) {
        if let Some(gl) = self.gl("glVertexAttribPointer") {
            // The offset travels in the pointer argument, as GL requires.
            let offset = offset as *const c_void;
            unsafe { (gl.vertex_attrib_pointer)(index, size, type_, normalized, stride, offset) };
        }
    }

    fn create_shader(&mut self, type_: GLenum) -> GLuint {
        match self.gl("glCreateShader") {
            Some(gl) => unsafe { (gl.create_shader)(type_) },
            None => 0,
        }
    }

    fn delete_shader(&mut self, shader: GLuint) {
        if let Some(gl) = self.gl("glDeleteShader") {
            unsafe { (gl.delete_shader)(shader) };
        }
    }

    fn shader_source(&mut self, shader: GLuint, source: &str) {
        let Some(gl) = self.gl("glShaderSource") else {
            return;
        };
        let Ok(length) = GLint::try_from(source.len()) else {
            warn!(shader, len = source.len(), "shader source too long; ignored");
            return;
        };
        // An explicit length means the text need not be NUL-terminated.
        let string = source.as_ptr().cast::<c_char>();
        unsafe { (gl.shader_source)(shader, 1, &string, &length) };
    }

    fn compile_shader(&mut self, shader: GLuint) {
        if let Some(gl) = self.gl("glCompileShader") {
            unsafe { (gl.compile_shader)(shader) };
        }
    }

    fn get_shader_iv(&mut self, shader: GLuint, pname: GLenum) -> GLint {
        let mut value: GLint = 0;
        if let Some(gl) = self.gl("glGetShaderiv") {
            unsafe { (gl.get_shaderiv)(shader, pname, &mut value) };
        }
        value
    }

    fn get_shader_info_log(&mut self, shader: GLuint, buf: &mut [u8]) -> usize {
        self.read_log("glGetShaderInfoLog", buf, |gl, capacity, written, out| unsafe {
            (gl.get_shader_info_log)(shader, capacity, written, out)
        })
    }

    fn create_program(&mut self) -> GLuint {
        match self.gl("glCreateProgram") {
            Some(gl) => unsafe { (gl.create_program)() },
            None => 0,
        }
    }

    fn delete_program(&mut self, program: GLuint) {
        if let Some(gl) = self.gl("glDeleteProgram") {
            unsafe { (gl.delete_program)(program) };
        }
    }

    fn attach_shader(&mut self, program: GLuint, shader: GLuint) {
        if let Some(gl) = self.gl("glAttachShader") {
            unsafe { (gl.attach_shader)(program, shader) };
        }
    }

    fn link_program(&mut self, program: GLuint) {
        if let Some(gl) = self.gl("glLinkProgram") {
            unsafe { (gl.link_program)(program) };
        }
    }

    fn get_program_iv(&mut self, program: GLuint, pname: GLenum) -> GLint {
        let mut value: GLint = 0;
        if let Some(gl) = self.gl("glGetProgramiv") {
            unsafe { (gl.get_programiv)(program, pname, &mut value) };
        }
        value
    }

    fn get_program_info_log(&mut self, program: GLuint, buf: &mut [u8]) -> usize {
        self.read_log("glGetProgramInfoLog", buf, |gl, capacity, written, out| unsafe {
            (gl.get_program_info_log)(program, capacity, written, out)
        })
    }

    fn use_program(&mut self, program: GLuint) {
        if let Some(gl) = self.gl("glUseProgram") {
            unsafe { (gl.use_program)(program) };
        }
    }

    fn get_uniform_location(&mut self, program: GLuint, name: &str) -> GLint {
        let Some(gl) = self.gl("glGetUniformLocation") else {
            return -1;
        };
        let Ok(name) = CString::new(name) else {
            debug!(program, "uniform name contains NUL");
            return -1;
        };
        unsafe { (gl.get_uniform_location)(program, name.as_ptr()) }
    }

    fn uniform1f(&mut self, location: GLint, v0: GLfloat) {
        if let Some(gl) = self.gl("glUniform1f") {
            unsafe { (gl.uniform1f)(location, v0) };
        }
    }

    fn uniform1i(&mut self, location: GLint, v0: GLint) {
        if let Some(gl) = self.gl("glUniform1i") {
            unsafe { (gl.uniform1i)(location, v0) };
        }
    }

    fn uniform3f(&mut self, location: GLint, v0: GLfloat, v1: GLfloat, v2: GLfloat) {
        if let Some(gl) = self.gl("glUniform3f") {
            unsafe { (gl.uniform3f)(location, v0, v1, v2) };
        }
    }

    fn uniform4f(&mut self, location: GLint, v0: GLfloat, v1: GLfloat, v2: GLfloat, v3: GLfloat) {
        if let Some(gl) = self.gl("glUniform4f") {
            unsafe { (gl.uniform4f)(location, v0, v1, v2, v3) };
        }
    }

    fn draw_arrays(&mut self, mode: GLenum, first: GLint, count: GLsizei) {
        if let Some(gl) = self.gl("glDrawArrays") {
            unsafe { (gl.draw_arrays)(mode, first, count) };
        }
    }

    fn draw_elements(&mut self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize) {
        if let Some(gl) = self.gl("glDrawElements") {
            let offset = offset as *const c_void;
            unsafe { (gl.draw_elements)(mode, count, type_, offset) };
        }
    }

    fn gen_texture(&mut self) -> GLuint {
        self.gen_one("glGenTextures", |gl, name| unsafe { (gl.gen_textures)(1, name) })
    }

    fn delete_texture(&mut self, texture: GLuint) {
        if let Some(gl) = self.gl("glDeleteTextures") {
            unsafe { (gl.delete_textures)(1, &texture) };
        }
    }

    fn bind_texture(&mut self, target: GLenum, texture: GLuint) {
        if let Some(gl) = self.gl("glBindTexture") {
            unsafe { (gl.bind_texture)(target, texture) };
        }
    }

    fn tex_parameteri(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        if let Some(gl) = self.gl("glTexParameteri") {
            unsafe { (gl.tex_parameteri)(target, pname, param) };
        }
    }

    fn active_texture(&mut self, texture: GLenum) {
        if let Some(gl) = self.gl("glActiveTexture") {
            unsafe { (gl.active_texture)(texture) };
        }
    }
}

/// Leading `major.minor` of a `GL_VERSION` string such as `2.1 Mesa 23.0.4`
/// or `OpenGL ES 3.0 build 1.2`.
fn parse_version(text: &str) -> Option<(GLint, GLint)> {
    let number = text
        .split_whitespace()
        .find(|word| word.starts_with(|c: char| c.is_ascii_digit()))?;
    let mut parts = number.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts
        .next()?
        .trim_end_matches(|c: char| !c.is_ascii_digit())
        .parse()
        .ok()?;
    Some((major, minor))
}
