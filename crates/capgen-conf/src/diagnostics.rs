use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Off,
    Error,
    Warning,
    Info,
    Hint,
}

/// Per-code severity overrides.
///
/// ```toml
/// [tool.capgen.diagnostics.severity]
/// C200 = "error"   # treat outer captures as errors
/// "C1" = "off"     # silence every resolution diagnostic
/// ```
///
/// Codes without an override keep the severity the generator assigned.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub severity: HashMap<String, DiagnosticSeverity>,
}

impl DiagnosticsConfig {
    /// The configured severity for `code`: an exact match first, then the
    /// longest matching prefix. Codes compare case-insensitively.
    #[must_use]
    pub fn get_severity(&self, code: &str) -> Option<DiagnosticSeverity> {
        if let Some((_, &severity)) = self
            .severity
            .iter()
            .find(|(pattern, _)| pattern.eq_ignore_ascii_case(code))
        {
            return Some(severity);
        }

        self.severity
            .iter()
            .filter(|(pattern, _)| {
                code.get(..pattern.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(pattern))
            })
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, &severity)| severity)
    }

    #[must_use]
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_severity(code) != Some(DiagnosticSeverity::Off)
    }

    /// Override the severity of `code`, which may also be a prefix.
    pub fn set_severity(&mut self, code: &str, severity: DiagnosticSeverity) {
        self.severity
            .retain(|pattern, _| !pattern.eq_ignore_ascii_case(code));
        self.severity.insert(code.to_string(), severity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(entries: &[(&str, DiagnosticSeverity)]) -> DiagnosticsConfig {
        DiagnosticsConfig {
            severity: entries
                .iter()
                .map(|(code, severity)| ((*code).to_string(), *severity))
                .collect(),
        }
    }

    #[test]
    fn unconfigured_codes_have_no_override() {
        let config = DiagnosticsConfig::default();
        assert_eq!(config.get_severity("C200"), None);
        assert!(config.is_enabled("C200"));
    }

    #[test]
    fn exact_match_wins_over_prefix() {
        let config = config(&[
            ("C", DiagnosticSeverity::Warning),
            ("C2", DiagnosticSeverity::Off),
            ("C200", DiagnosticSeverity::Error),
        ]);
        assert_eq!(config.get_severity("C200"), Some(DiagnosticSeverity::Error));
        assert_eq!(config.get_severity("C201"), Some(DiagnosticSeverity::Off));
        assert_eq!(config.get_severity("C101"), Some(DiagnosticSeverity::Warning));
        assert!(!config.is_enabled("C201"));
    }

    #[test]
    fn deserializes_lowercase_names() {
        let config: DiagnosticsConfig =
            toml::from_str("[severity]\nC001 = \"hint\"\nC1 = \"off\"\n").unwrap();
        assert_eq!(config.get_severity("C001"), Some(DiagnosticSeverity::Hint));
        assert_eq!(config.get_severity("C101"), Some(DiagnosticSeverity::Off));
    }

    #[test]
    fn codes_are_case_insensitive() {
        let mut config = config(&[("c2", DiagnosticSeverity::Off)]);
        assert!(!config.is_enabled("C200"));
        config.set_severity("C2", DiagnosticSeverity::Hint);
        assert_eq!(config.severity.len(), 1);
        assert_eq!(config.get_severity("C201"), Some(DiagnosticSeverity::Hint));
    }

    #[test]
    fn overrides_replace_configured_severity() {
        let mut config = config(&[("C200", DiagnosticSeverity::Warning)]);
        config.set_severity("C200", DiagnosticSeverity::Off);
        config.set_severity("C1", DiagnosticSeverity::Error);
        assert!(!config.is_enabled("C200"));
        assert_eq!(config.get_severity("C101"), Some(DiagnosticSeverity::Error));
    }
}
