use crate::overload::HEADER;

const BODY: &str = r#"from collections import defaultdict

_INTERCEPTORS = defaultdict(list)


def intercepts_location(file_path, line, column):
    """Bind the decorated function to the call that starts at ``file_path:line:column``."""

    def register(function):
        _INTERCEPTORS[(file_path, line, column)].append(function)
        return function

    return register


def interceptors_for(file_path, line, column):
    """Functions bound to the call at ``file_path:line:column``, in registration order."""
    return tuple(_INTERCEPTORS.get((file_path, line, column), ()))
"#;

/// The module that defines `intercepts_location` and its registry.
#[must_use]
pub fn synthesize_support() -> String {
    format!("{HEADER}\n{BODY}")
}
