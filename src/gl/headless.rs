use core::ffi::c_void;

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use super::constants::{
    ACTIVE_UNIFORMS, ARRAY_BUFFER, ATTACHED_SHADERS, COMPILE_STATUS, DELETE_STATUS, FLOAT,
    FRAGMENT_SHADER, INFO_LOG_LENGTH, LINK_STATUS, MAJOR_VERSION, MINOR_VERSION, SHADER_TYPE,
    TEXTURE0, VERTEX_SHADER,
};
use super::{
    GLbitfield, GLboolean, GLenum, GLfloat, GLint, GLsizei, GLsizeiptr, GLuint, GlApi,
};

/// Last value written to a uniform location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCall {
    Arrays {
        mode: GLenum,
        first: GLint,
        count: GLsizei,
        program: GLuint,
    },
    Elements {
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        offset: usize,
        program: GLuint,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttrib {
    pub size: GLint,
    pub type_: GLenum,
    pub normalized: bool,
    pub stride: GLsizei,
    pub offset: usize,
    /// Array buffer bound when the pointer was set.
    pub buffer: GLuint,
    pub enabled: bool,
}

#[derive(Debug, Default)]
struct Buffer {
    size: GLsizeiptr,
    usage: GLenum,
}

#[derive(Debug)]
struct Shader {
    kind: GLenum,
    source: String,
    compiled: bool,
    info_log: String,
    delete_pending: bool,
}

#[derive(Debug, Default)]
struct Program {
    attached: Vec<GLuint>,
    linked: bool,
    info_log: String,
    uniforms: HashMap<String, GLint>,
    values: HashMap<GLint, UniformValue>,
}

#[derive(Debug, Default)]
struct Texture {
    target: Option<GLenum>,
    parameters: HashMap<GLenum, GLint>,
}

/// In-process GL simulation.
///
/// Deterministic and GPU-free: names come from per-kind counters starting
/// at 1 (shaders and programs share one counter, as they share a name space
/// in GL), and compile and link outcomes follow simple textual rules:
///
/// - a shader compiles iff its source is non-empty and has no `#error` line;
/// - a program links iff a compiled vertex shader and a compiled fragment
///   shader are attached;
/// - linking assigns uniform locations, in order of first appearance, to
///   every `uniform <type> <name>;` declaration in the attached sources.
///
/// Every entry point bumps a call counter, see [`HeadlessGl::calls`].
#[derive(Debug)]
pub struct HeadlessGl {
    version: (GLint, GLint),
    loaded: bool,

    next_buffer: GLuint,
    next_vertex_array: GLuint,
    next_texture: GLuint,
    next_object: GLuint,

    buffers: HashMap<GLuint, Buffer>,
    vertex_arrays: HashSet<GLuint>,
    textures: HashMap<GLuint, Texture>,
    shaders: HashMap<GLuint, Shader>,
    programs: HashMap<GLuint, Program>,

    capabilities: HashSet<GLenum>,
    clear_color: [GLfloat; 4],
    clears: Vec<GLbitfield>,
    viewport: [GLint; 4],
    bound_buffers: HashMap<GLenum, GLuint>,
    bound_vertex_array: GLuint,
    vertex_attribs: HashMap<GLuint, VertexAttrib>,
    active_texture: GLenum,
    bound_textures: HashMap<(GLenum, GLenum), GLuint>,
    current_program: GLuint,
    draws: Vec<DrawCall>,

    calls: HashMap<&'static str, usize>,
}

impl Default for HeadlessGl {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessGl {
    /// A context reporting GL 3.3.
    pub fn new() -> Self {
        Self::with_version(3, 3)
    }

    pub fn with_version(major: GLint, minor: GLint) -> Self {
        HeadlessGl {
            version: (major, minor),
            loaded: false,
            next_buffer: 1,
            next_vertex_array: 1,
            next_texture: 1,
            next_object: 1,
            buffers: HashMap::new(),
            vertex_arrays: HashSet::new(),
            textures: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            capabilities: HashSet::new(),
            clear_color: [0.0; 4],
            clears: Vec::new(),
            viewport: [0; 4],
            bound_buffers: HashMap::new(),
            bound_vertex_array: 0,
            vertex_attribs: HashMap::new(),
            active_texture: TEXTURE0,
            bound_textures: HashMap::new(),
            current_program: 0,
            draws: Vec::new(),
            calls: HashMap::new(),
        }
    }

    fn record(&mut self, entry_point: &'static str) {
        *self.calls.entry(entry_point).or_insert(0) += 1;
    }

    /// Number of times a GL entry point (e.g. `"glCompileShader"`) was called.
    pub fn calls(&self, entry_point: &str) -> usize {
        self.calls.get(entry_point).copied().unwrap_or(0)
    }

    /// Total number of GL entry-point calls.
    pub fn total_calls(&self) -> usize {
        self.calls.values().sum()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_enabled(&self, cap: GLenum) -> bool {
        self.capabilities.contains(&cap)
    }

    pub fn clear_color_value(&self) -> [GLfloat; 4] {
        self.clear_color
    }

    /// Masks passed to `glClear`, in call order.
    pub fn clears(&self) -> &[GLbitfield] {
        &self.clears
    }

    pub fn viewport_value(&self) -> [GLint; 4] {
        self.viewport
    }

    pub fn bound_buffer(&self, target: GLenum) -> GLuint {
        self.bound_buffers.get(&target).copied().unwrap_or(0)
    }

    /// Byte size of a buffer's data store, if the buffer exists.
    pub fn buffer_size(&self, buffer: GLuint) -> Option<GLsizeiptr> {
        self.buffers.get(&buffer).map(|b| b.size)
    }

    pub fn buffer_usage(&self, buffer: GLuint) -> Option<GLenum> {
        self.buffers.get(&buffer).map(|b| b.usage)
    }

    pub fn is_buffer(&self, buffer: GLuint) -> bool {
        self.buffers.contains_key(&buffer)
    }

    pub fn is_vertex_array(&self, array: GLuint) -> bool {
        self.vertex_arrays.contains(&array)
    }

    pub fn bound_vertex_array(&self) -> GLuint {
        self.bound_vertex_array
    }

    pub fn vertex_attrib(&self, index: GLuint) -> Option<VertexAttrib> {
        self.vertex_attribs.get(&index).copied()
    }

    pub fn is_shader(&self, shader: GLuint) -> bool {
        self.shaders.contains_key(&shader)
    }

    pub fn shader_source_text(&self, shader: GLuint) -> Option<&str> {
        self.shaders.get(&shader).map(|s| s.source.as_str())
    }

    pub fn is_program(&self, program: GLuint) -> bool {
        self.programs.contains_key(&program)
    }

    pub fn current_program(&self) -> GLuint {
        self.current_program
    }

    /// Last value written to `location` of `program`.
    pub fn uniform(&self, program: GLuint, location: GLint) -> Option<UniformValue> {
        self.programs
            .get(&program)
            .and_then(|p| p.values.get(&location).copied())
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn active_texture_unit(&self) -> GLenum {
        self.active_texture
    }

    /// Texture bound to `target` on texture unit `unit` (e.g. `TEXTURE0`).
    pub fn bound_texture(&self, unit: GLenum, target: GLenum) -> GLuint {
        self.bound_textures
            .get(&(unit, target))
            .copied()
            .unwrap_or(0)
    }

    pub fn texture_parameter(&self, texture: GLuint, pname: GLenum) -> Option<GLint> {
        self.textures
            .get(&texture)
            .and_then(|t| t.parameters.get(&pname).copied())
    }

    /// Target the texture was first bound to.
    pub fn texture_target(&self, texture: GLuint) -> Option<GLenum> {
        self.textures.get(&texture).and_then(|t| t.target)
    }

    pub fn is_texture(&self, texture: GLuint) -> bool {
        self.textures.contains_key(&texture)
    }

    fn alloc(counter: &mut GLuint) -> GLuint {
        let name = *counter;
        *counter += 1;
        name
    }

    fn compile(shader: &mut Shader) {
        if shader.source.trim().is_empty() {
            shader.compiled = false;
            shader.info_log = "0:0: error: empty shader source\n".to_string();
            return;
        }
        let error = shader
            .source
            .lines()
            .enumerate()
            .find_map(|(index, line)| {
                let rest = line.trim_start().strip_prefix("#error")?;
                Some((index + 1, rest.trim()))
            });
        match error {
            Some((line, message)) => {
                shader.compiled = false;
                shader.info_log = format!("0:{}: error: #error {}\n", line, message);
            }
            None => {
                shader.compiled = true;
                shader.info_log.clear();
            }
        }
    }

    fn link(&mut self, program: GLuint) {
        let Some(state) = self.programs.get(&program) else {
            debug!(program, "glLinkProgram on unknown program");
            return;
        };

        let has_compiled = |kind: GLenum| {
            state.attached.iter().any(|name| {
                self.shaders
                    .get(name)
                    .is_some_and(|s| s.kind == kind && s.compiled)
            })
        };
        let missing: Vec<&str> = [(VERTEX_SHADER, "vertex"), (FRAGMENT_SHADER, "fragment")]
            .into_iter()
            .filter(|(kind, _)| !has_compiled(*kind))
            .map(|(_, label)| label)
            .collect();

        let mut uniforms = HashMap::new();
        let info_log = if missing.is_empty() {
            for name in &state.attached {
                let Some(shader) = self.shaders.get(name) else {
                    continue;
                };
                for uniform in uniform_names(&shader.source) {
                    let next = uniforms.len() as GLint;
                    uniforms.entry(uniform.to_string()).or_insert(next);
                }
            }
            String::new()
        } else {
            format!(
                "error: no compiled {} shader attached\n",
                missing.join(" or ")
            )
        };

        let linked = info_log.is_empty();
        debug!(program, linked, uniforms = uniforms.len(), "glLinkProgram");
        if let Some(state) = self.programs.get_mut(&program) {
            state.linked = linked;
            state.info_log = info_log;
            state.uniforms = uniforms;
            state.values.clear();
        }
    }

    fn set_uniform(&mut self, location: GLint, value: UniformValue) {
        // Location -1 is silently ignored, as in GL.
        if location < 0 {
            return;
        }
        let Some(program) = self.programs.get_mut(&self.current_program) else {
            debug!(location, "uniform set without a current program");
            return;
        };
        if program.linked && program.uniforms.values().any(|&l| l == location) {
            program.values.insert(location, value);
        } else {
            debug!(location, "uniform set on unknown location");
        }
    }

    fn release_shader(&mut self, shader: GLuint) {
        let attached = self
            .programs
            .values()
            .any(|p| p.attached.contains(&shader));
        if attached {
            if let Some(state) = self.shaders.get_mut(&shader) {
                state.delete_pending = true;
            }
        } else {
            self.shaders.remove(&shader);
        }
    }
}

/// Names declared as `uniform <type> <name>;`, in source order.
///
/// Precision qualifiers and array suffixes are tolerated.
fn uniform_names(source: &str) -> impl Iterator<Item = &str> {
    source
        .split(';')
        .filter_map(|statement| {
            let mut words = statement.split_whitespace();
            loop {
                if words.next()? == "uniform" {
                    break;
                }
            }
            let name = words.last()?;
            let name = name.split('[').next().unwrap_or(name);
            Some(name)
        })
        .filter(|name| !name.is_empty())
}

fn info_log_length(log: &str) -> GLint {
    if log.is_empty() {
        0
    } else {
        log.len() as GLint + 1
    }
}

fn copy_info_log(log: &str, buf: &mut [u8]) -> usize {
    let Some(room) = buf.len().checked_sub(1) else {
        return 0;
    };
    let written = log.len().min(room);
    buf[..written].copy_from_slice(&log.as_bytes()[..written]);
    buf[written] = 0;
    written
}

impl GlApi for HeadlessGl {
    fn load(&mut self) -> bool {
        self.loaded = true;
        true
    }

    fn get_integer(&mut self, pname: GLenum) -> GLint {
        self.record("glGetIntegerv");
        match pname {
            MAJOR_VERSION => self.version.0,
            MINOR_VERSION => self.version.1,
            _ => 0,
        }
    }

    fn enable(&mut self, cap: GLenum) {
        self.record("glEnable");
        self.capabilities.insert(cap);
    }

    fn disable(&mut self, cap: GLenum) {
        self.record("glDisable");
        self.capabilities.remove(&cap);
    }

    fn clear_color(&mut self, red: GLfloat, green: GLfloat, blue: GLfloat, alpha: GLfloat) {
        self.record("glClearColor");
        self.clear_color = [red, green, blue, alpha];
    }

    fn clear(&mut self, mask: GLbitfield) {
        self.record("glClear");
        self.clears.push(mask);
    }

    fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.record("glViewport");
        self.viewport = [x, y, width, height];
    }

    fn gen_buffer(&mut self) -> GLuint {
        self.record("glGenBuffers");
        let name = Self::alloc(&mut self.next_buffer);
        self.buffers.insert(name, Buffer::default());
        name
    }

    fn delete_buffer(&mut self, buffer: GLuint) {
        self.record("glDeleteBuffers");
        if self.buffers.remove(&buffer).is_some() {
            self.bound_buffers.retain(|_, bound| *bound != buffer);
        }
    }

    fn bind_buffer(&mut self, target: GLenum, buffer: GLuint) {
        self.record("glBindBuffer");
        self.bound_buffers.insert(target, buffer);
    }

    unsafe fn buffer_data(
        &mut self,
        target: GLenum,
        size: GLsizeiptr,
        _data: *const c_void,
        usage: GLenum,
    ) {
        self.record("glBufferData");
        let bound = self.bound_buffer(target);
        match self.buffers.get_mut(&bound) {
            Some(buffer) => {
                buffer.size = size;
                buffer.usage = usage;
            }
            None => debug!(target, "glBufferData with no buffer bound"),
        }
    }

    fn gen_vertex_array(&mut self) -> GLuint {
        self.record("glGenVertexArrays");
        let name = Self::alloc(&mut self.next_vertex_array);
        self.vertex_arrays.insert(name);
        name
    }

    fn delete_vertex_array(&mut self, array: GLuint) {
        self.record("glDeleteVertexArrays");
        if self.vertex_arrays.remove(&array) && self.bound_vertex_array == array {
            self.bound_vertex_array = 0;
        }
    }

    fn bind_vertex_array(&mut self, array: GLuint) {
        self.record("glBindVertexArray");
        self.bound_vertex_array = array;
    }

    fn enable_vertex_attrib_array(&mut self, index: GLuint) {
        self.record("glEnableVertexAttribArray");
        self.vertex_attribs
            .entry(index)
            .or_insert(VertexAttrib {
                size: 4,
                type_: FLOAT,
                normalized: false,
                stride: 0,
                offset: 0,
                buffer: 0,
                enabled: false,
            })
            .enabled = true;
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
        self.record("glVertexAttribPointer");
        let buffer = self.bound_buffer(ARRAY_BUFFER);
        let enabled = self
            .vertex_attribs
            .get(&index)
            .is_some_and(|attrib| attrib.enabled);
        self.vertex_attribs.insert(
            index,
            VertexAttrib {
                size,
                type_,
                normalized: normalized != 0,
                stride,
                offset,
                buffer,
                enabled,
            },
        );
    }

    fn create_shader(&mut self, type_: GLenum) -> GLuint {
        self.record("glCreateShader");
        if type_ != VERTEX_SHADER && type_ != FRAGMENT_SHADER {
            debug!(type_, "glCreateShader with invalid type");
            return 0;
        }
        let name = Self::alloc(&mut self.next_object);
        self.shaders.insert(
            name,
            Shader {
                kind: type_,
                source: String::new(),
                compiled: false,
                info_log: String::new(),
                delete_pending: false,
            },
        );
        name
    }

    fn delete_shader(&mut self, shader: GLuint) {
        self.record("glDeleteShader");
        self.release_shader(shader);
    }

    fn shader_source(&mut self, shader: GLuint, source: &str) {
        self.record("glShaderSource");
        match self.shaders.get_mut(&shader) {
            Some(state) => state.source = source.to_string(),
            None => debug!(shader, "glShaderSource on unknown shader"),
        }
    }

    fn compile_shader(&mut self, shader: GLuint) {
        self.record("glCompileShader");
        match self.shaders.get_mut(&shader) {
            Some(state) => {
                Self::compile(state);
                debug!(shader, compiled = state.compiled, "glCompileShader");
            }
            None => debug!(shader, "glCompileShader on unknown shader"),
        }
    }

    fn get_shader_iv(&mut self, shader: GLuint, pname: GLenum) -> GLint {
        self.record("glGetShaderiv");
        let Some(state) = self.shaders.get(&shader) else {
            return 0;
        };
        match pname {
            COMPILE_STATUS => state.compiled as GLint,
            INFO_LOG_LENGTH => info_log_length(&state.info_log),
            SHADER_TYPE => state.kind as GLint,
            DELETE_STATUS => state.delete_pending as GLint,
            _ => 0,
        }
    }

    fn get_shader_info_log(&mut self, shader: GLuint, buf: &mut [u8]) -> usize {
        self.record("glGetShaderInfoLog");
        match self.shaders.get(&shader) {
            Some(state) => copy_info_log(&state.info_log, buf),
            None => copy_info_log("", buf),
        }
    }

    fn create_program(&mut self) -> GLuint {
        self.record("glCreateProgram");
        let name = Self::alloc(&mut self.next_object);
        self.programs.insert(name, Program::default());
        name
    }

    fn delete_program(&mut self, program: GLuint) {
        self.record("glDeleteProgram");
        let Some(state) = self.programs.remove(&program) else {
            return;
        };
        if self.current_program == program {
            self.current_program = 0;
        }
        for shader in state.attached {
            if self.shaders.get(&shader).is_some_and(|s| s.delete_pending) {
                self.release_shader(shader);
            }
        }
    }

    fn attach_shader(&mut self, program: GLuint, shader: GLuint) {
        self.record("glAttachShader");
        if !self.shaders.contains_key(&shader) {
            debug!(shader, "glAttachShader with unknown shader");
            return;
        }
        match self.programs.get_mut(&program) {
            Some(state) if !state.attached.contains(&shader) => state.attached.push(shader),
            Some(_) => {}
            None => debug!(program, "glAttachShader on unknown program"),
        }
    }

    fn link_program(&mut self, program: GLuint) {
        self.record("glLinkProgram");
        self.link(program);
    }

    fn get_program_iv(&mut self, program: GLuint, pname: GLenum) -> GLint {
        self.record("glGetProgramiv");
        let Some(state) = self.programs.get(&program) else {
            return 0;
        };
        match pname {
            LINK_STATUS => state.linked as GLint,
            INFO_LOG_LENGTH => info_log_length(&state.info_log),
            ATTACHED_SHADERS => state.attached.len() as GLint,
            ACTIVE_UNIFORMS => state.uniforms.len() as GLint,
            _ => 0,
        }
    }

    fn get_program_info_log(&mut self, program: GLuint, buf: &mut [u8]) -> usize {
        self.record("glGetProgramInfoLog");
        match self.programs.get(&program) {
            Some(state) => copy_info_log(&state.info_log, buf),
            None => copy_info_log("", buf),
        }
    }

    fn use_program(&mut self, program: GLuint) {
        self.record("glUseProgram");
        self.current_program = program;
    }

    fn get_uniform_location(&mut self, program: GLuint, name: &str) -> GLint {
        self.record("glGetUniformLocation");
        self.programs
            .get(&program)
            .filter(|state| state.linked)
            .and_then(|state| state.uniforms.get(name).copied())
            .unwrap_or(-1)
    }

    fn uniform1f(&mut self, location: GLint, v0: GLfloat) {
        self.record("glUniform1f");
        self.set_uniform(location, UniformValue::Float(v0));
    }

    fn uniform1i(&mut self, location: GLint, v0: GLint) {
        self.record("glUniform1i");
        self.set_uniform(location, UniformValue::Int(v0));
    }

    fn uniform3f(&mut self, location: GLint, v0: GLfloat, v1: GLfloat, v2: GLfloat) {
        self.record("glUniform3f");
        self.set_uniform(location, UniformValue::Vec3([v0, v1, v2]));
    }

    fn uniform4f(&mut self, location: GLint, v0: GLfloat, v1: GLfloat, v2: GLfloat, v3: GLfloat) {
        self.record("glUniform4f");
        self.set_uniform(location, UniformValue::Vec4([v0, v1, v2, v3]));
    }

    fn draw_arrays(&mut self, mode: GLenum, first: GLint, count: GLsizei) {
        self.record("glDrawArrays");
        self.draws.push(DrawCall::Arrays {
            mode,
            first,
            count,
            program: self.current_program,
        });
    }

    fn draw_elements(&mut self, mode: GLenum, count: GLsizei, type_: GLenum, offset: usize) {
        self.record("glDrawElements");
        self.draws.push(DrawCall::Elements {
            mode,
            count,
            type_,
            offset,
            program: self.current_program,
        });
    }

    fn gen_texture(&mut self) -> GLuint {
        self.record("glGenTextures");
        let name = Self::alloc(&mut self.next_texture);
        self.textures.insert(name, Texture::default());
        name
    }

    fn delete_texture(&mut self, texture: GLuint) {
        self.record("glDeleteTextures");
        if self.textures.remove(&texture).is_some() {
            self.bound_textures.retain(|_, bound| *bound != texture);
        }
    }

    fn bind_texture(&mut self, target: GLenum, texture: GLuint) {
        self.record("glBindTexture");
        if let Some(state) = self.textures.get_mut(&texture) {
            state.target.get_or_insert(target);
        }
        self.bound_textures
            .insert((self.active_texture, target), texture);
    }

    fn tex_parameteri(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        self.record("glTexParameteri");
        let bound = self.bound_texture(self.active_texture, target);
        match self.textures.get_mut(&bound) {
            Some(state) => {
                state.parameters.insert(pname, param);
            }
            None => debug!(target, "glTexParameteri with no texture bound"),
        }
    }

    fn active_texture(&mut self, texture: GLenum) {
        self.record("glActiveTexture");
        self.active_texture = texture;
    }
}
