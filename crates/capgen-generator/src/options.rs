use capgen_conf::AmbiguityPolicy;
use capgen_conf::OuterCapturePolicy;
use capgen_conf::Settings;

use crate::model::MarkerSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub marker: MarkerSpec,
    /// Module name of the support artifact that defines `intercepts_location`.
    pub support_module: String,
    pub ambiguity: AmbiguityPolicy,
    pub outer_captures: OuterCapturePolicy,
    /// Extra names a captured expression may read without being flagged.
    pub allowed_names: Vec<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            marker: MarkerSpec::default(),
            support_module: "capture_interception".to_string(),
            ambiguity: AmbiguityPolicy::default(),
            outer_captures: OuterCapturePolicy::default(),
            allowed_names: Vec::new(),
        }
    }
}

impl From<&Settings> for GeneratorOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            marker: MarkerSpec::new(&settings.marker.name, &settings.marker.module),
            support_module: settings.support_module.clone(),
            ambiguity: settings.ambiguity,
            outer_captures: settings.outer_captures,
            allowed_names: settings.allowed_names.clone(),
        }
    }
}
