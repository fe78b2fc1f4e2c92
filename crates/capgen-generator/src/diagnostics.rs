use camino::Utf8Path;
use camino::Utf8PathBuf;
use capgen_source::Severity;
use capgen_source::Span;
use serde::Serialize;
use thiserror::Error;

/// Problems reported while generating. None of them stop generation; each
/// drops at most one file or one call site.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum GeneratorDiagnostic {
    #[error("Failed to parse Python source: {message}")]
    ParseFailure {
        path: Utf8PathBuf,
        message: String,
        span: Span,
    },

    #[error("Call to '{callee}' is ambiguous between {} definitions", candidates.len())]
    AmbiguousCallee {
        path: Utf8PathBuf,
        callee: String,
        candidates: Vec<String>,
        span: Span,
    },

    #[error(
        "Captured argument for '{parameter}' reads outer variable{} {}",
        if names.len() == 1 { "" } else { "s" },
        names.iter().map(|n| format!("'{n}'")).collect::<Vec<_>>().join(", ")
    )]
    OuterCapture {
        path: Utf8PathBuf,
        parameter: String,
        names: Vec<String>,
        span: Span,
        denied: bool,
    },
}

impl GeneratorDiagnostic {
    #[must_use]
    pub fn diagnostic_code(&self) -> &'static str {
        match self {
            GeneratorDiagnostic::ParseFailure { .. } => "C001",
            GeneratorDiagnostic::AmbiguousCallee { .. } => "C101",
            GeneratorDiagnostic::OuterCapture { .. } => "C200",
        }
    }

    /// Severity before any user configuration is applied.
    #[must_use]
    pub fn default_severity(&self) -> Severity {
        match self {
            GeneratorDiagnostic::ParseFailure { .. }
            | GeneratorDiagnostic::AmbiguousCallee { .. }
            | GeneratorDiagnostic::OuterCapture { denied: true, .. } => Severity::Error,
            GeneratorDiagnostic::OuterCapture { denied: false, .. } => Severity::Warning,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            GeneratorDiagnostic::ParseFailure { path, .. }
            | GeneratorDiagnostic::AmbiguousCallee { path, .. }
            | GeneratorDiagnostic::OuterCapture { path, .. } => path,
        }
    }

    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            GeneratorDiagnostic::ParseFailure { span, .. }
            | GeneratorDiagnostic::AmbiguousCallee { span, .. }
            | GeneratorDiagnostic::OuterCapture { span, .. } => *span,
        }
    }

    /// Short text placed under the highlighted span.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            GeneratorDiagnostic::ParseFailure { .. } => "file skipped",
            GeneratorDiagnostic::AmbiguousCallee { .. } => "call site not intercepted",
            GeneratorDiagnostic::OuterCapture { denied: true, .. } => {
                "call site not intercepted"
            }
            GeneratorDiagnostic::OuterCapture { denied: false, .. } => {
                "not available when the capture is re-parsed"
            }
        }
    }

    #[must_use]
    pub fn notes(&self) -> Vec<String> {
        match self {
            GeneratorDiagnostic::ParseFailure { .. } => Vec::new(),
            GeneratorDiagnostic::AmbiguousCallee { candidates, .. } => candidates
                .iter()
                .map(|candidate| format!("candidate: {candidate}"))
                .collect(),
            GeneratorDiagnostic::OuterCapture { .. } => vec![
                "pass the value as another argument, or list the name in `allowed_names`"
                    .to_string(),
            ],
        }
    }
}
