use indoc::indoc;
use pretty_assertions::assert_eq;
use quadgl::gl::constants::*;
use quadgl::gl::ops::*;
use quadgl::gl::{DrawCall, GlApi, HeadlessGl, UniformValue, registry};
use quadgl::{AdaptorErrorKind, Context, Operation, Pointer, StackElement, Tag, Text};

/// A well-typed element for `tag`.
fn valid(tag: Tag) -> StackElement {
    match tag {
        Tag::Int => StackElement::Int(0),
        Tag::Float => StackElement::Float(0.0),
        Tag::Str => StackElement::from(""),
        Tag::Ptr => StackElement::Ptr(Pointer::NULL),
    }
}

/// An element whose tag differs from `tag`.
fn wrong(tag: Tag) -> StackElement {
    match tag {
        Tag::Int => StackElement::Float(1.0),
        Tag::Float => StackElement::from("1.0"),
        Tag::Str => StackElement::Ptr(Pointer::NULL),
        Tag::Ptr => StackElement::Int(1),
    }
}

fn context_with(elements: impl IntoIterator<Item = StackElement>) -> Context {
    let mut ctx = Context::default();
    for element in elements {
        ctx.push(element);
    }
    ctx
}

#[test]
fn test_every_operation_is_registered() {
    assert_eq!(registry().len(), 41);
    for operation in OPERATIONS {
        let name = operation.signature().name;
        let found = registry().get(name).map(|op| op.signature());
        assert_eq!(found, Some(operation.signature()), "{}", name);
    }
}

#[test]
fn test_signatures_match_documented_notation() {
    let expected = indoc! {"
        LoadGL( -- success:i64 )
        GetVersion( -- major:i64 minor:i64 )
        Enable( cap:i64 -- )
        Disable( cap:i64 -- )
        ClearColor( r:f64 g:f64 b:f64 a:f64 -- )
        Clear( mask:i64 -- )
        Viewport( x:i64 y:i64 width:i64 height:i64 -- )
        GenBuffer( -- buffer:i64 )
        DeleteBuffer( buffer:i64 -- )
        BindBuffer( target:i64 buffer:i64 -- )
        BufferDataFloats( target:i64 data:ptr count:i64 usage:i64 -- )
        GenVertexArray( -- vao:i64 )
        DeleteVertexArray( vao:i64 -- )
        BindVertexArray( vao:i64 -- )
        EnableVertexAttribArray( index:i64 -- )
        VertexAttribPointer( index:i64 size:i64 type:i64 normalized:i64 stride:i64 offset:i64 -- )
        CreateShader( type:i64 -- shader:i64 )
        DeleteShader( shader:i64 -- )
        ShaderSource( shader:i64 source:str -- )
        CompileShader( shader:i64 -- )
        GetShaderCompileStatus( shader:i64 -- success:i64 )
        GetShaderInfoLog( shader:i64 -- log:str )
        CreateProgram( -- program:i64 )
        DeleteProgram( program:i64 -- )
        AttachShader( program:i64 shader:i64 -- )
        LinkProgram( program:i64 -- )
        GetProgramLinkStatus( program:i64 -- success:i64 )
        GetProgramInfoLog( program:i64 -- log:str )
        UseProgram( program:i64 -- )
        GetUniformLocation( program:i64 name:str -- location:i64 )
        Uniform1f( location:i64 v0:f64 -- )
        Uniform1i( location:i64 v0:i64 -- )
        Uniform3f( location:i64 v0:f64 v1:f64 v2:f64 -- )
        Uniform4f( location:i64 v0:f64 v1:f64 v2:f64 v3:f64 -- )
        DrawArrays( mode:i64 first:i64 count:i64 -- )
        DrawElements( mode:i64 count:i64 type:i64 offset:i64 -- )
        GenTexture( -- texture:i64 )
        DeleteTexture( texture:i64 -- )
        BindTexture( target:i64 texture:i64 -- )
        TexParameteri( target:i64 pname:i64 param:i64 -- )
        ActiveTexture( texture:i64 -- )
    "};
    let rendered: Vec<String> = registry().signatures().map(|s| s.to_string()).collect();
    assert_eq!(rendered, expected.lines().collect::<Vec<_>>());

    assert_eq!(registry().check_declarations(expected), Ok(vec![]));
}

#[test]
fn test_underflow_at_every_short_depth() {
    for operation in OPERATIONS {
        let signature = operation.signature();
        for depth in 0..signature.arity() {
            let inputs = &signature.inputs[signature.arity() - depth..];
            let elements: Vec<_> = inputs.iter().map(|p| valid(p.tag)).collect();
            let mut ctx = context_with(elements.clone());
            let mut gl = HeadlessGl::new();

            let err = ctx
                .try_call(&mut gl as &mut dyn GlApi, *operation)
                .unwrap_err();
            assert_eq!(err.operation, signature.name);
            assert_eq!(
                err.kind,
                AdaptorErrorKind::StackUnderflow {
                    needed: signature.arity(),
                    available: depth,
                }
            );
            assert_eq!(ctx.stack().as_slice(), elements.as_slice());
            assert_eq!(gl.total_calls(), 0, "{} reached GL", signature.name);
        }
    }
}

#[test]
fn test_type_mismatch_at_every_position() {
    for operation in OPERATIONS {
        let signature = operation.signature();
        for (position, param) in signature.inputs.iter().enumerate() {
            let mut elements: Vec<_> = signature.inputs.iter().map(|p| valid(p.tag)).collect();
            elements[position] = wrong(param.tag);
            let found = elements[position].tag();
            let mut ctx = context_with(elements.clone());
            let mut gl = HeadlessGl::new();

            let err = ctx
                .try_call(&mut gl as &mut dyn GlApi, *operation)
                .unwrap_err();
            assert_eq!(
                err.kind,
                AdaptorErrorKind::TypeMismatch {
                    position,
                    param: param.name,
                    expected: param.tag,
                    found,
                },
                "{}",
                signature
            );
            assert!(err.to_string().starts_with(&format!(
                "Fatal error in {}: Type error",
                signature.name
            )));
            assert_eq!(ctx.stack().as_slice(), elements.as_slice());
            assert_eq!(gl.total_calls(), 0);
        }
    }
}

#[test]
fn test_depth_and_output_tags_after_success() {
    for operation in OPERATIONS {
        let signature = operation.signature();
        let below = StackElement::from("untouched");
        let mut ctx = context_with(
            std::iter::once(below.clone()).chain(signature.inputs.iter().map(|p| valid(p.tag))),
        );
        let before = ctx.stack().len();
        let mut gl = HeadlessGl::new();

        ctx.call(&mut gl as &mut dyn GlApi, *operation);

        assert_eq!(
            ctx.stack().len(),
            before - signature.arity() + signature.output_count(),
            "{}",
            signature
        );
        let outputs = &ctx.stack().as_slice()[1..];
        let tags: Vec<Tag> = outputs.iter().map(|e| e.tag()).collect();
        let declared: Vec<Tag> = signature.outputs.iter().map(|p| p.tag).collect();
        assert_eq!(tags, declared, "{}", signature);
        assert_eq!(ctx.stack().as_slice()[0], below);
    }
}

#[test]
fn test_get_version_pushes_major_first() {
    let mut gl = HeadlessGl::with_version(4, 1);
    let mut ctx = Context::default();
    ctx.call(&mut gl as &mut dyn GlApi, &GetVersion);
    assert_eq!(
        ctx.stack().as_slice(),
        &[StackElement::Int(4), StackElement::Int(1)]
    );
    assert_eq!(gl.calls("glGetIntegerv"), 2);
}

#[test]
fn test_load_gl_pushes_success() {
    let mut gl = HeadlessGl::new();
    let mut ctx = Context::default();
    ctx.call(&mut gl as &mut dyn GlApi, &LoadGL);
    assert_eq!(ctx.pop(), Some(StackElement::Int(1)));
    assert!(gl.is_loaded());
}

#[test]
fn test_create_shader_with_invalid_type() {
    let mut gl = HeadlessGl::new();
    let mut ctx = context_with([StackElement::Int(0)]);
    ctx.call(&mut gl as &mut dyn GlApi, &CreateShader);
    assert_eq!(ctx.stack().as_slice(), &[StackElement::Int(0)]);
    assert_eq!(gl.calls("glCreateShader"), 1);
}

#[test]
fn test_arguments_are_narrowed() {
    let mut gl = HeadlessGl::new();
    let host: &mut dyn GlApi = &mut gl;
    let mut ctx = Context::default();

    ctx.push(0x1_0000_0000 + DEPTH_TEST as i64);
    ctx.call(host, &Enable);

    for value in [-1i64, 2, 640, 480] {
        ctx.push(value);
    }
    ctx.call(host, &Viewport);

    for value in [0.1f64, 0.2, 0.3, 1.0] {
        ctx.push(value);
    }
    ctx.call(host, &ClearColor);

    assert!(gl.is_enabled(DEPTH_TEST));
    assert_eq!(gl.viewport_value(), [-1, 2, 640, 480]);
    assert_eq!(gl.clear_color_value(), [0.1f32, 0.2, 0.3, 1.0]);
}

#[test]
fn test_buffer_data_floats_size_in_bytes() {
    let vertices = [0.0f32, 0.5, -0.5, -0.5, 0.5, -0.5];
    let mut gl = HeadlessGl::new();
    let host: &mut dyn GlApi = &mut gl;
    let mut ctx = Context::default();

    ctx.call(host, &GenBuffer);
    let buffer = ctx.pop().and_then(|e| e.as_int()).unwrap();
    ctx.push(ARRAY_BUFFER as i64);
    ctx.push(buffer);
    ctx.call(host, &BindBuffer);

    ctx.push(ARRAY_BUFFER as i64);
    ctx.push(Pointer::from_slice(&vertices));
    ctx.push(vertices.len() as i64);
    ctx.push(STATIC_DRAW as i64);
    ctx.call(host, &BufferDataFloats);

    assert!(ctx.stack().is_empty());
    assert_eq!(gl.buffer_size(buffer as u32), Some(24));
    assert_eq!(gl.buffer_usage(buffer as u32), Some(STATIC_DRAW));
}

#[test]
fn test_vertex_attrib_pointer_records_offset() {
    let mut gl = HeadlessGl::new();
    let host: &mut dyn GlApi = &mut gl;
    let mut ctx = Context::default();

    ctx.push(0i64);
    ctx.call(host, &EnableVertexAttribArray);
    for value in [0, 3, FLOAT as i64, 0, 12, 8] {
        ctx.push(value);
    }
    ctx.call(host, &VertexAttribPointer);

    let attrib = gl.vertex_attrib(0).unwrap();
    assert!(attrib.enabled);
    assert_eq!(attrib.size, 3);
    assert_eq!(attrib.stride, 12);
    assert_eq!(attrib.offset, 8);
}

#[test]
fn test_shader_source_releases_text() {
    let source = Text::new("void main() { gl_Position = vec4(0.0); }");
    let mut gl = HeadlessGl::new();
    let host: &mut dyn GlApi = &mut gl;
    let mut ctx = Context::default();

    ctx.push(VERTEX_SHADER as i64);
    ctx.call(host, &CreateShader);
    ctx.push(source.clone());
    assert_eq!(source.ref_count(), 2);

    ctx.call(host, &ShaderSource);
    assert_eq!(source.ref_count(), 1);
    assert!(ctx.stack().is_empty());
    assert_eq!(gl.shader_source_text(1), Some(source.as_str()));
}

#[test]
fn test_uniform_location_releases_text() {
    let name = Text::new("color");
    let mut ctx = Context::default();
    ctx.push(1i64);
    ctx.push(name.clone());
    ctx.call(&mut HeadlessGl::new() as &mut dyn GlApi, &GetUniformLocation);
    assert_eq!(name.ref_count(), 1);
    assert_eq!(ctx.pop(), Some(StackElement::Int(-1)));
}

/// Runs `operation` with `inputs` and returns whatever it pushed.
fn call(
    gl: &mut (dyn GlApi + 'static),
    operation: &dyn Operation<dyn GlApi>,
    inputs: impl IntoIterator<Item = StackElement>,
) -> Vec<StackElement> {
    let mut ctx = context_with(inputs);
    ctx.call(gl, operation);
    ctx.stack().as_slice().to_vec()
}

fn handle(
    gl: &mut (dyn GlApi + 'static),
    operation: &dyn Operation<dyn GlApi>,
    inputs: &[i64],
) -> i64 {
    let pushed = call(gl, operation, inputs.iter().map(|&i| StackElement::Int(i)));
    pushed[0].as_int().unwrap()
}

fn compiled_shader(gl: &mut (dyn GlApi + 'static), kind: u32, source: &str) -> i64 {
    let shader = handle(gl, &CreateShader, &[kind as i64]);
    call(gl, &ShaderSource, [shader.into(), source.into()]);
    call(gl, &CompileShader, [shader.into()]);
    shader
}

#[test]
fn test_compile_failure_is_data() {
    let mut gl = HeadlessGl::new();
    let host: &mut dyn GlApi = &mut gl;
    let shader = compiled_shader(host, FRAGMENT_SHADER, "#error missing precision\n");

    assert_eq!(
        call(host, &GetShaderCompileStatus, [shader.into()]),
        vec![StackElement::Int(0)]
    );
    assert_eq!(
        call(host, &GetShaderInfoLog, [shader.into()]),
        vec![StackElement::from("0:1: error: #error missing precision\n")]
    );
}

#[test]
fn test_successful_compile_has_empty_log() {
    let mut gl = HeadlessGl::new();
    let host: &mut dyn GlApi = &mut gl;
    let shader = compiled_shader(host, VERTEX_SHADER, "void main() {}");
    assert_eq!(
        call(host, &GetShaderCompileStatus, [shader.into()]),
        vec![StackElement::Int(1)]
    );
    assert_eq!(
        call(host, &GetShaderInfoLog, [shader.into()]),
        vec![StackElement::from("")]
    );
}

#[test]
fn test_link_failure_is_data() {
    let mut gl = HeadlessGl::new();
    let host: &mut dyn GlApi = &mut gl;
    let vertex = compiled_shader(host, VERTEX_SHADER, "void main() {}");
    let program = handle(host, &CreateProgram, &[]);
    call(host, &AttachShader, [program.into(), vertex.into()]);
    call(host, &LinkProgram, [program.into()]);

    assert_eq!(
        call(host, &GetProgramLinkStatus, [program.into()]),
        vec![StackElement::Int(0)]
    );
    let log = call(host, &GetProgramInfoLog, [program.into()]);
    let log = log[0].as_text().unwrap();
    assert!(log.contains("fragment"), "{}", log);
}

#[test]
fn test_full_pipeline() {
    let vertex_source = indoc! {"
        #version 330 core
        layout (location = 0) in vec3 position;
        uniform mat4 transform;
        void main() { gl_Position = transform * vec4(position, 1.0); }
    "};
    let fragment_source = indoc! {"
        #version 330 core
        uniform vec4 color;
        uniform float time;
        out vec4 frag;
        void main() { frag = color; }
    "};

    let mut gl = HeadlessGl::new();
    let host: &mut dyn GlApi = &mut gl;

    let vertex = compiled_shader(host, VERTEX_SHADER, vertex_source);
    let fragment = compiled_shader(host, FRAGMENT_SHADER, fragment_source);
    let program = handle(host, &CreateProgram, &[]);
    call(host, &AttachShader, [program.into(), vertex.into()]);
    call(host, &AttachShader, [program.into(), fragment.into()]);
    call(host, &LinkProgram, [program.into()]);
    assert_eq!(
        call(host, &GetProgramLinkStatus, [program.into()]),
        vec![StackElement::Int(1)]
    );
    call(host, &DeleteShader, [vertex.into()]);
    call(host, &DeleteShader, [fragment.into()]);
    call(host, &UseProgram, [program.into()]);

    let color = call(host, &GetUniformLocation, [program.into(), "color".into()]);
    let time = call(host, &GetUniformLocation, [program.into(), "time".into()]);
    let missing = call(host, &GetUniformLocation, [program.into(), "missing".into()]);
    assert_eq!(color, vec![StackElement::Int(1)]);
    assert_eq!(time, vec![StackElement::Int(2)]);
    assert_eq!(missing, vec![StackElement::Int(-1)]);

    let color = color[0].clone();
    call(
        host,
        &Uniform4f,
        [color, 1.0f64.into(), 0.5f64.into(), 0.25f64.into(), 1.0f64.into()],
    );
    call(host, &Uniform1f, [time[0].clone(), 2.5f64.into()]);
    call(host, &Uniform1f, [StackElement::Int(-1), 9.0f64.into()]);

    let vao = handle(host, &GenVertexArray, &[]);
    call(host, &BindVertexArray, [vao.into()]);
    call(
        host,
        &DrawArrays,
        [(TRIANGLES as i64).into(), 0i64.into(), 3i64.into()],
    );

    assert_eq!(
        gl.uniform(program as u32, 1),
        Some(UniformValue::Vec4([1.0, 0.5, 0.25, 1.0]))
    );
    assert_eq!(gl.uniform(program as u32, 2), Some(UniformValue::Float(2.5)));
    assert_eq!(
        gl.draws(),
        &[DrawCall::Arrays {
            mode: TRIANGLES,
            first: 0,
            count: 3,
            program: program as u32,
        }]
    );
    assert_eq!(gl.bound_vertex_array(), vao as u32);
    // Flagged for deletion, still attached.
    assert!(gl.is_shader(vertex as u32));
}

#[test]
fn test_textures() {
    let mut gl = HeadlessGl::new();
    let host: &mut dyn GlApi = &mut gl;
    let texture = handle(host, &GenTexture, &[]);
    handle_none(host, &ActiveTexture, &[TEXTURE0 as i64 + 2]);
    handle_none(host, &BindTexture, &[TEXTURE_2D as i64, texture]);
    handle_none(
        host,
        &TexParameteri,
        &[TEXTURE_2D as i64, TEXTURE_MIN_FILTER as i64, LINEAR as i64],
    );

    assert_eq!(gl.bound_texture(TEXTURE0 + 2, TEXTURE_2D), texture as u32);
    assert_eq!(
        gl.texture_parameter(texture as u32, TEXTURE_MIN_FILTER),
        Some(LINEAR as i32)
    );

    let host: &mut dyn GlApi = &mut gl;
    handle_none(host, &DeleteTexture, &[texture]);
    assert!(!gl.is_texture(texture as u32));
    assert_eq!(gl.bound_texture(TEXTURE0 + 2, TEXTURE_2D), 0);
}

fn handle_none(
    gl: &mut (dyn GlApi + 'static),
    operation: &dyn Operation<dyn GlApi>,
    inputs: &[i64],
) {
    let pushed = call(gl, operation, inputs.iter().map(|&i| StackElement::Int(i)));
    assert!(pushed.is_empty());
}

#[test]
fn test_one_native_call_per_operation() {
    let mut gl = HeadlessGl::new();
    let host: &mut dyn GlApi = &mut gl;
    handle_none(host, &Clear, &[(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT) as i64]);
    handle_none(host, &Disable, &[BLEND as i64]);
    handle_none(host, &DrawElements, &[TRIANGLES as i64, 6, UNSIGNED_INT as i64, 0]);

    assert_eq!(gl.calls("glClear"), 1);
    assert_eq!(gl.calls("glDisable"), 1);
    assert_eq!(gl.calls("glDrawElements"), 1);
    assert_eq!(gl.total_calls(), 3);
    assert_eq!(gl.clears(), &[COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT]);
}
