use annotate_snippets::AnnotationKind;
use annotate_snippets::Level;
use annotate_snippets::Renderer;
use annotate_snippets::Snippet;

use crate::Span;

/// Severity label printed in front of a rendered diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

#[derive(Debug, Clone)]
pub struct DiagnosticAnnotation<'a> {
    pub span: Span,
    pub label: &'a str,
    pub primary: bool,
}

/// Everything needed to print one diagnostic against its source file.
#[derive(Debug)]
pub struct Diagnostic<'a> {
    pub source: &'a str,
    pub path: &'a str,
    pub code: &'a str,
    pub message: &'a str,
    pub severity: Severity,
    pub annotations: Vec<DiagnosticAnnotation<'a>>,
    pub notes: Vec<&'a str>,
}

impl<'a> Diagnostic<'a> {
    #[must_use]
    pub fn new(
        source: &'a str,
        path: &'a str,
        code: &'a str,
        message: &'a str,
        severity: Severity,
        span: Span,
        label: &'a str,
    ) -> Self {
        Self {
            source,
            path,
            code,
            message,
            severity,
            annotations: vec![DiagnosticAnnotation {
                span,
                label,
                primary: true,
            }],
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn annotation(mut self, span: Span, label: &'a str, primary: bool) -> Self {
        self.annotations.push(DiagnosticAnnotation {
            span,
            label,
            primary,
        });
        self
    }

    #[must_use]
    pub fn note(mut self, note: &'a str) -> Self {
        self.notes.push(note);
        self
    }
}

/// Renders diagnostics with `annotate-snippets`, either plain or with ANSI styling.
#[derive(Debug)]
pub struct DiagnosticRenderer {
    renderer: Renderer,
}

impl DiagnosticRenderer {
    #[must_use]
    pub fn plain() -> Self {
        Self {
            renderer: Renderer::plain(),
        }
    }

    #[must_use]
    pub fn styled() -> Self {
        Self {
            renderer: Renderer::styled(),
        }
    }

    #[must_use]
    pub fn render(&self, diagnostic: &Diagnostic<'_>) -> String {
        let level = match diagnostic.severity {
            Severity::Error => Level::ERROR,
            Severity::Warning => Level::WARNING,
            Severity::Info => Level::INFO,
            Severity::Hint => Level::HELP,
        };

        let source_len = diagnostic.source.len();
        let mut snippet = Snippet::source(diagnostic.source)
            .path(diagnostic.path)
            .line_start(1);

        for ann in &diagnostic.annotations {
            let start = ann.span.start_usize().min(source_len);
            let end = (start + ann.span.length_usize()).min(source_len);
            let kind = if ann.primary {
                AnnotationKind::Primary
            } else {
                AnnotationKind::Context
            };
            snippet = snippet.annotation(kind.span(start..end).label(ann.label));
        }

        let mut title = level
            .primary_title(diagnostic.message)
            .id(diagnostic.code)
            .element(snippet);

        for note in &diagnostic.notes {
            title = title.element(Level::NOTE.message(*note));
        }

        self.renderer.render(&[title]).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "from capture import Capture\n\nrun(lambda: total + 1)\n";

    fn outer_capture() -> Diagnostic<'static> {
        let start = SOURCE.find("lambda").unwrap();
        Diagnostic::new(
            SOURCE,
            "app/main.py",
            "C200",
            "captured lambda refers to outer name `total`",
            Severity::Warning,
            Span::from_bounds(start, start + "lambda: total + 1".len()),
            "this lambda",
        )
    }

    #[test]
    fn renders_header_path_and_label() {
        let output = DiagnosticRenderer::plain().render(&outer_capture());

        assert!(output.contains("warning[C200]"));
        assert!(output.contains("app/main.py"));
        assert!(output.contains("run(lambda: total + 1)"));
        assert!(output.contains("this lambda"));
        assert!(output.contains("^^^"));
    }

    #[test]
    fn renders_notes() {
        let diag = outer_capture().note("add `total` to allowed_names to silence this");
        let output = DiagnosticRenderer::plain().render(&diag);
        assert!(output.contains("note: add `total` to allowed_names"));
    }

    #[test]
    fn secondary_annotation() {
        let start = SOURCE.find("Capture").unwrap();
        let diag = outer_capture().annotation(
            Span::from_bounds(start, start + 7),
            "marker imported here",
            false,
        );
        let output = DiagnosticRenderer::plain().render(&diag);
        assert!(output.contains("marker imported here"));
    }

    #[test]
    fn error_severity() {
        let diag = Diagnostic::new(
            "def f(:\n",
            "bad.py",
            "C001",
            "failed to parse",
            Severity::Error,
            Span::new(6, 1),
            "unexpected token",
        );
        let output = DiagnosticRenderer::plain().render(&diag);
        assert!(output.contains("error[C001]"));
    }

    #[test]
    fn styled_emits_ansi_and_plain_does_not() {
        assert!(DiagnosticRenderer::styled()
            .render(&outer_capture())
            .contains("\x1b["));
        assert!(!DiagnosticRenderer::plain()
            .render(&outer_capture())
            .contains("\x1b["));
    }
}
