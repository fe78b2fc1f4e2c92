use serde::Deserialize;

/// What to do when a callee name is bound to more than one definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityPolicy {
    /// Take the first candidate in source order.
    #[default]
    First,
    /// Report the call and generate nothing for it.
    Error,
}

/// What to do when a captured expression reads a variable from its surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OuterCapturePolicy {
    Allow,
    #[default]
    Warn,
    Deny,
}
