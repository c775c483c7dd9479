use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{Diagnostic as MietteDiagnostic, IntoDiagnostic, Result};
use quadgl::gl::{self, HeadlessGl};
use quadgl::{Context, ContextOptions, Diagnostic, render_diagnostics};
use thiserror::Error;
use tracing::debug;

/// quadgl - OpenGL operations for a stack machine
#[derive(Parser, Debug)]
#[command(name = "quadgl")]
#[command(about = "Inspect and exercise the quadgl stack operations", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stack effect of every operation
    Signatures,

    /// Check a file of stack-effect declarations against the operations
    Check {
        /// Declaration file, one `Name( inputs -- outputs )` per line
        file: PathBuf,
    },

    /// Run a word script against the headless backend and print the stack
    Eval {
        /// Script text, e.g. `GL_VERTEX_SHADER CreateShader`
        script: Option<String>,

        /// Read the script from a file instead
        #[arg(long, short, conflicts_with = "script")]
        file: Option<PathBuf>,

        /// Log every operation call (set RUST_LOG=trace to see them)
        #[arg(long)]
        trace: bool,

        /// Maximum stack depth
        #[arg(long, default_value_t = ContextOptions::default().max_stack_size)]
        max_stack: usize,

        /// Treat violations as fatal, as a real host would
        #[arg(long)]
        abort: bool,
    },
}

#[derive(Debug, Error, MietteDiagnostic)]
enum CliError {
    #[error("{count} declaration issue(s) in {path}")]
    #[diagnostic(code(quadgl::check))]
    Declarations { path: String, count: usize },

    #[error("script rejected")]
    #[diagnostic(code(quadgl::eval))]
    Script,

    #[error("no script given")]
    #[diagnostic(help("pass the script as an argument or use --file"))]
    NoScript,
}

fn main() -> Result<()> {
    let args = Args::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the level; default to WARN.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match args.command {
        Command::Signatures => {
            for signature in gl::registry().signatures() {
                println!("{}", signature);
            }
            Ok(())
        }
        Command::Check { file } => check(&file),
        Command::Eval {
            script,
            file,
            trace,
            max_stack,
            abort,
        } => {
            let (name, source) = match (script, file) {
                (Some(script), _) => ("<script>".to_string(), script),
                (None, Some(file)) => (file.display().to_string(), read(&file)?),
                (None, None) => return Err(CliError::NoScript.into()),
            };
            let options = ContextOptions {
                max_stack_size: max_stack,
                trace_calls: trace,
                ..ContextOptions::default()
            };
            eval(&name, &source, options, abort)
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).into_diagnostic()
}

fn check(path: &Path) -> Result<()> {
    let name = path.display().to_string();
    let source = read(path)?;

    let issues = match gl::registry().check_declarations(&source) {
        Ok(issues) => issues,
        Err(err) => {
            render_diagnostics(&name, &source, &[Diagnostic::from(&err)]);
            return Err(CliError::Declarations {
                path: name,
                count: 1,
            }
            .into());
        }
    };

    if issues.is_empty() {
        println!("{}: ok", name);
        return Ok(());
    }

    let diagnostics: Vec<Diagnostic> = issues.iter().map(Diagnostic::from).collect();
    render_diagnostics(&name, &source, &diagnostics);
    Err(CliError::Declarations {
        path: name,
        count: issues.len(),
    }
    .into())
}

fn eval(name: &str, source: &str, options: ContextOptions, abort: bool) -> Result<()> {
    let script = match quadgl::compile_script(source) {
        Ok(script) => script,
        Err(err) => {
            render_diagnostics(name, source, &[Diagnostic::from(&err)]);
            return Err(CliError::Script.into());
        }
    };
    debug!(words = script.len(), "compiled script");

    let mut headless = HeadlessGl::new();
    let mut ctx = Context::new(options);

    if abort {
        quadgl::run_script(&script, &mut ctx, &mut headless);
    } else if let Err(err) = quadgl::try_run_script(&script, &mut ctx, &mut headless) {
        print_stack(&ctx);
        render_diagnostics(name, source, &[Diagnostic::from(&err)]);
        return Err(CliError::Script.into());
    }

    print_stack(&ctx);
    Ok(())
}

/// Prints the stack bottom to top, one element per line.
fn print_stack(ctx: &Context) {
    for (depth, element) in ctx.stack().iter().enumerate() {
        println!("{:>3}  {:<3}  {}", depth, element.tag(), element);
    }
}
