use indoc::indoc;
use pretty_assertions::assert_eq;
use quadgl::gl::constants::{FRAGMENT_SHADER, TRIANGLES, VERTEX_SHADER};
use quadgl::gl::{DrawCall, GlApi, HeadlessGl, UniformValue};
use quadgl::vm::ScriptError;
use quadgl::{
    AdaptorErrorKind, Context, Diagnostic, StackElement, Tag, compile_script,
    render_to_string_no_color, run_script, try_run_script,
};

const TRIANGLE: &str = indoc! {r#"
    // Build and use a program, then draw one triangle.
    LoadGL
    GL_VERTEX_SHADER CreateShader
    GL_FRAGMENT_SHADER CreateShader
    CreateProgram

    1 "void main() {}" ShaderSource
    2 "uniform vec4 tint;\nvoid main() {}" ShaderSource
    1 CompileShader
    2 CompileShader
    3 1 AttachShader
    3 2 AttachShader
    3 LinkProgram
    3 GetProgramLinkStatus
    3 UseProgram
    3 "tint" GetUniformLocation
    1.0 0.5 0.25 1.0 Uniform4f
    GL_TRIANGLES 0 3 DrawArrays
"#};

#[test]
fn test_triangle_script() {
    let script = compile_script(TRIANGLE).unwrap();
    let mut gl = HeadlessGl::new();
    let mut ctx = Context::default();

    run_script(&script, &mut ctx, &mut gl);

    // LoadGL, the three handles and the link status stay behind.
    assert_eq!(
        ctx.stack().as_slice(),
        &[
            StackElement::Int(1),
            StackElement::Int(1),
            StackElement::Int(2),
            StackElement::Int(3),
            StackElement::Int(1),
        ]
    );
    assert!(gl.is_loaded());
    assert_eq!(gl.current_program(), 3);
    assert_eq!(gl.uniform(3, 0), Some(UniformValue::Vec4([1.0, 0.5, 0.25, 1.0])));
    assert_eq!(
        gl.draws(),
        &[DrawCall::Arrays {
            mode: TRIANGLES,
            first: 0,
            count: 3,
            program: 3,
        }]
    );
}

#[test]
fn test_constants_resolve_to_integers() {
    let script = compile_script("GL_VERTEX_SHADER GL_FRAGMENT_SHADER 0x8B31").unwrap();
    let mut ctx = Context::default();
    run_script(&script, &mut ctx, &mut HeadlessGl::new());
    assert_eq!(
        ctx.stack().as_slice(),
        &[
            StackElement::Int(VERTEX_SHADER as i64),
            StackElement::Int(FRAGMENT_SHADER as i64),
            StackElement::Int(VERTEX_SHADER as i64),
        ]
    );
}

#[test]
fn test_compile_errors_are_data() {
    let source = indoc! {r#"
        GL_FRAGMENT_SHADER CreateShader
        1 "\n#error no main" ShaderSource
        1 CompileShader
        1 GetShaderCompileStatus
        1 GetShaderInfoLog
    "#};
    let script = compile_script(source).unwrap();
    let mut ctx = Context::default();
    try_run_script(&script, &mut ctx, &mut HeadlessGl::new()).unwrap();

    assert_eq!(
        ctx.stack().as_slice(),
        &[
            StackElement::Int(1),
            StackElement::Int(0),
            StackElement::from("0:2: error: #error no main\n"),
        ]
    );
}

#[test]
fn test_unknown_word() {
    let err = compile_script("GL_VERTEX_SHADER CreateShadr").unwrap_err();
    assert!(matches!(err, ScriptError::UnknownWord { .. }));
    assert_eq!(err.span(), 17..28);
    assert_eq!(err.to_string(), "unknown word `CreateShadr`");
}

#[test]
fn test_try_run_reports_failing_word() {
    let source = "GL_VERTEX_SHADER CreateShader 1.5 CompileShader";
    let script = compile_script(source).unwrap();
    let mut gl = HeadlessGl::new();
    let mut ctx = Context::default();

    let err = try_run_script(&script, &mut ctx, &mut gl).unwrap_err();

    assert_eq!(&source[err.span.clone()], "CompileShader");
    assert_eq!(
        err.error.kind,
        AdaptorErrorKind::TypeMismatch {
            position: 0,
            param: "shader",
            expected: Tag::Int,
            found: Tag::Float,
        }
    );
    assert_eq!(
        ctx.stack().as_slice(),
        &[StackElement::Int(1), StackElement::Float(1.5)]
    );
    assert_eq!(gl.calls("glCompileShader"), 0);

    let report = render_to_string_no_color("frame.qgl", source, &[Diagnostic::from(&err)]);
    assert!(
        report.contains("Fatal error in CompileShader: Type error"),
        "{}",
        report
    );
}

#[test]
fn test_same_script_runs_twice() {
    let script = compile_script("GenBuffer GenBuffer DeleteBuffer").unwrap();
    let mut gl = HeadlessGl::new();
    let host: &mut dyn GlApi = &mut gl;
    let mut ctx = Context::default();

    run_script(&script, &mut ctx, host);
    run_script(&script, &mut ctx, host);

    assert_eq!(
        ctx.stack().as_slice(),
        &[StackElement::Int(1), StackElement::Int(3)]
    );
    assert!(gl.is_buffer(1));
    assert!(!gl.is_buffer(2));
    assert!(gl.is_buffer(3));
    assert!(!gl.is_buffer(4));
}
