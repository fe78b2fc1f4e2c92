use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InspectError {
    #[error("Failed to parse capture source: {message}")]
    Parse { message: String },

    #[error("No assignment to `{binding}` in capture source")]
    BindingNotFound { binding: String },

    #[error("`{binding}` is assigned {count} times in capture source")]
    AmbiguousBinding { binding: String, count: usize },

    #[error("Unsupported construct in captured expression at offset {offset}: {construct}")]
    UnsupportedConstruct {
        construct: &'static str,
        offset: usize,
    },

    #[error("Captured expression refers to outer variables: {}", names.join(", "))]
    OuterCapture { names: Vec<String> },
}
