//! Error rendering using ariadne
//!
//! Declaration checks and scripts report byte spans into their source. This
//! module turns them into annotated source snippets.

use core::ops::Range;
use std::io::Write;

use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use quadgl_core::adaptor::DeclarationIssue;
use quadgl_core::notation::SyntaxError;
use quadgl_core::vm::{RuntimeError, ScriptError};

/// One error message pointing into a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Range<usize>,
    /// Text attached to the underlined span; defaults to the message.
    pub label: Option<String>,
    pub help: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Range<usize>) -> Self {
        Diagnostic {
            message: message.into(),
            span,
            label: None,
            help: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

impl From<&SyntaxError> for Diagnostic {
    fn from(err: &SyntaxError) -> Self {
        Diagnostic::error("syntax error", err.span.clone()).with_label(err.message.clone())
    }
}

impl From<&DeclarationIssue> for Diagnostic {
    fn from(issue: &DeclarationIssue) -> Self {
        let diagnostic = Diagnostic::error(issue.to_string(), issue.span());
        match issue {
            DeclarationIssue::UnknownOperation { .. } => diagnostic
                .with_label("not registered")
                .with_help("run `quadgl signatures` to list the available operations"),
            DeclarationIssue::ArityMismatch { expected, direction, .. } => {
                diagnostic.with_label(format!("expected {} {}(s)", expected, direction))
            }
            DeclarationIssue::TypeMismatch { expected, .. } => {
                diagnostic.with_label(format!("expected {}", expected))
            }
        }
    }
}

impl From<&ScriptError> for Diagnostic {
    fn from(err: &ScriptError) -> Self {
        match err {
            ScriptError::Syntax(err) => err.into(),
            ScriptError::UnknownWord { span, .. } => Diagnostic::error(err.to_string(), span.clone())
                .with_label("neither an operation nor a GL constant"),
        }
    }
}

impl From<&RuntimeError> for Diagnostic {
    fn from(err: &RuntimeError) -> Self {
        Diagnostic::error(err.error.to_string(), err.span.clone()).with_label(err.error.kind.to_string())
    }
}

/// Render diagnostics with formatting to stderr
pub fn render_diagnostics(name: &str, source: &str, diagnostics: &[Diagnostic]) {
    render_to_writer(name, source, diagnostics, &mut std::io::stderr(), true).ok();
}

/// Render diagnostics to a specific writer
pub fn render_diagnostics_to(
    name: &str,
    source: &str,
    diagnostics: &[Diagnostic],
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    render_to_writer(name, source, diagnostics, writer, use_color)
}

/// Render diagnostics to a String without color codes (useful for tests)
pub fn render_to_string_no_color(name: &str, source: &str, diagnostics: &[Diagnostic]) -> String {
    let mut buf = Vec::new();
    render_to_writer(name, source, diagnostics, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_to_writer(
    name: &str,
    source: &str,
    diagnostics: &[Diagnostic],
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    for diag in diagnostics {
        let mut colors = ColorGenerator::new();
        colors.next(); // Skip the first color.

        let mut report = Report::build(ReportKind::Error, (name, diag.span.clone()))
            .with_message(&diag.message)
            .with_config(ariadne::Config::default().with_color(use_color));

        let color = colors.next();
        report = report.with_label(
            Label::new((name, diag.span.clone()))
                .with_message(diag.label.as_deref().unwrap_or(&diag.message))
                .with_color(color),
        );

        for help_msg in &diag.help {
            report = report.with_help(help_msg);
        }

        report.finish().write((name, Source::from(source)), &mut *writer)?;
    }

    Ok(())
}
