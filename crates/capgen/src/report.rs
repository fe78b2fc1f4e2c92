use std::io::IsTerminal;

use camino::Utf8Path;
use capgen_conf::DiagnosticSeverity;
use capgen_conf::DiagnosticsConfig;
use capgen_generator::GeneratorDiagnostic;
use capgen_python::Program;
use capgen_source::ByteOffset;
use capgen_source::Diagnostic;
use capgen_source::DiagnosticRenderer;
use capgen_source::Severity;
use capgen_source::SourceFile;
use serde::Serialize;

/// A generator diagnostic with its configured severity applied.
#[derive(Debug)]
pub struct Reported<'a> {
    pub diagnostic: &'a GeneratorDiagnostic,
    pub severity: Severity,
    pub file: Option<&'a SourceFile>,
}

impl Reported<'_> {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn render(&self, renderer: &DiagnosticRenderer) -> String {
        let message = self.diagnostic.to_string();
        let notes = self.diagnostic.notes();
        let path = self.diagnostic.path().as_str();
        let source = self.file.map_or("", SourceFile::source);

        let mut rendered = Diagnostic::new(
            source,
            path,
            self.diagnostic.diagnostic_code(),
            &message,
            self.severity,
            self.diagnostic.span(),
            self.diagnostic.label(),
        );
        for note in &notes {
            rendered = rendered.note(note);
        }
        renderer.render(&rendered)
    }

    pub fn to_json(&self) -> JsonDiagnostic<'_> {
        let (line, column) = self.file.map_or((1, 1), |file| {
            file.line_col(ByteOffset::new(self.diagnostic.span().start()))
                .one_based()
        });
        JsonDiagnostic {
            code: self.diagnostic.diagnostic_code(),
            severity: severity_name(self.severity),
            path: self.diagnostic.path(),
            line,
            column,
            message: self.diagnostic.to_string(),
            notes: self.diagnostic.notes(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonDiagnostic<'a> {
    pub code: &'static str,
    pub severity: &'static str,
    pub path: &'a Utf8Path,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub notes: Vec<String>,
}

/// Apply the diagnostics configuration, dropping diagnostics that are off.
pub fn apply_config<'a>(
    diagnostics: &'a [GeneratorDiagnostic],
    config: &DiagnosticsConfig,
    program: &'a Program,
) -> Vec<Reported<'a>> {
    diagnostics
        .iter()
        .filter_map(|diagnostic| {
            let severity = match config.get_severity(diagnostic.diagnostic_code()) {
                Some(DiagnosticSeverity::Off) => return None,
                Some(DiagnosticSeverity::Error) => Severity::Error,
                Some(DiagnosticSeverity::Warning) => Severity::Warning,
                Some(DiagnosticSeverity::Info) => Severity::Info,
                Some(DiagnosticSeverity::Hint) => Severity::Hint,
                None => diagnostic.default_severity(),
            };
            Some(Reported {
                diagnostic,
                severity,
                file: source_file(program, diagnostic.path()),
            })
        })
        .collect()
}

/// The diagnostics configuration with `--select` codes raised to errors and
/// `--ignore` codes turned off.
pub fn build_diagnostics_config(
    config: &DiagnosticsConfig,
    select: &[String],
    ignore: &[String],
) -> DiagnosticsConfig {
    let mut config = config.clone();

    for code in select {
        config.set_severity(code, DiagnosticSeverity::Error);
    }

    for code in ignore {
        config.set_severity(code, DiagnosticSeverity::Off);
    }

    config
}

fn source_file<'a>(program: &'a Program, path: &Utf8Path) -> Option<&'a SourceFile> {
    program
        .module_by_path(path)
        .map(capgen_python::Module::file)
        .or_else(|| {
            program
                .failures()
                .iter()
                .find(|failure| failure.file.path() == path)
                .map(|failure| &failure.file)
        })
}

fn severity_name(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
        Severity::Hint => "hint",
    }
}

pub fn pick_renderer() -> DiagnosticRenderer {
    if std::io::stdout().is_terminal() {
        DiagnosticRenderer::styled()
    } else {
        DiagnosticRenderer::plain()
    }
}

pub fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use capgen_source::Span;

    use super::*;

    fn outer_capture() -> GeneratorDiagnostic {
        GeneratorDiagnostic::OuterCapture {
            path: Utf8PathBuf::from("main.py"),
            parameter: "insp".to_string(),
            names: vec!["factor".to_string()],
            span: Span::new(4, 6),
            denied: false,
        }
    }

    #[test]
    fn configured_severity_overrides_default() {
        let program = Program::from_files([SourceFile::new(
            "main.py",
            "x = factor\n".to_string(),
        )]);
        let diagnostics = vec![outer_capture()];

        let reported = apply_config(&diagnostics, &DiagnosticsConfig::default(), &program);
        assert_eq!(reported[0].severity, Severity::Warning);
        assert!(reported[0].file.is_some());

        let config = build_diagnostics_config(&DiagnosticsConfig::default(), &["C2".to_string()], &[]);
        let reported = apply_config(&diagnostics, &config, &program);
        assert!(reported[0].is_error());

        let config = build_diagnostics_config(&config, &[], &["C200".to_string()]);
        assert!(apply_config(&diagnostics, &config, &program).is_empty());
    }

    #[test]
    fn json_position_is_one_based() {
        let program = Program::from_files([SourceFile::new(
            "main.py",
            "x = factor\n".to_string(),
        )]);
        let diagnostics = vec![outer_capture()];
        let reported = apply_config(&diagnostics, &DiagnosticsConfig::default(), &program);
        let json = reported[0].to_json();
        assert_eq!((json.line, json.column), (1, 5));
        assert_eq!(json.code, "C200");
        assert_eq!(json.severity, "warning");
    }

    #[test]
    fn plurals() {
        assert_eq!(plural(1, "error"), "1 error");
        assert_eq!(plural(3, "file"), "3 files");
    }
}
