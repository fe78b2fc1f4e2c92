use crate::model::GeneratedParameter;
use crate::model::ParameterKind;

/// Which annotation to print for each parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Annotations {
    /// As declared, including capture markers.
    Declared,
    /// With capture markers replaced by their inner type.
    Emitted,
}

/// Render a parameter list the way it would appear between `def f(` and `)`,
/// including `/` and bare `*` separators.
pub(crate) fn render_parameters(params: &[GeneratedParameter], annotations: Annotations) -> String {
    let mut parts = Vec::with_capacity(params.len() + 2);
    let has_var_positional = params
        .iter()
        .any(|p| p.kind == ParameterKind::VarPositional);
    let mut keyword_only_started = false;

    for (index, param) in params.iter().enumerate() {
        if param.kind == ParameterKind::KeywordOnly && !keyword_only_started {
            keyword_only_started = true;
            if !has_var_positional {
                parts.push("*".to_string());
            }
        }

        parts.push(render_parameter(param, annotations));

        let next_is_positional_only = params
            .get(index + 1)
            .is_some_and(|next| next.kind == ParameterKind::PositionalOnly);
        if param.kind == ParameterKind::PositionalOnly && !next_is_positional_only {
            parts.push("/".to_string());
        }
    }

    parts.join(", ")
}

fn render_parameter(param: &GeneratedParameter, annotations: Annotations) -> String {
    let prefix = match param.kind {
        ParameterKind::VarPositional => "*",
        ParameterKind::VarKeyword => "**",
        _ => "",
    };
    let annotation = match annotations {
        Annotations::Declared => param.annotation.as_deref(),
        Annotations::Emitted => param.emitted_annotation(),
    };

    match (annotation, &param.default) {
        (Some(annotation), Some(default)) => {
            format!("{prefix}{}: {annotation} = {default}", param.name)
        }
        (Some(annotation), None) => format!("{prefix}{}: {annotation}", param.name),
        (None, Some(default)) => format!("{prefix}{}={default}", param.name),
        (None, None) => format!("{prefix}{}", param.name),
    }
}

/// The expression that forwards `param`'s interceptor alias to the original
/// function.
pub(crate) fn forward_argument(param: &GeneratedParameter, alias: &str) -> String {
    match param.kind {
        ParameterKind::PositionalOnly | ParameterKind::PositionalOrKeyword => alias.to_string(),
        ParameterKind::VarPositional => format!("*{alias}"),
        ParameterKind::KeywordOnly => format!("{}={alias}", param.name),
        ParameterKind::VarKeyword => format!("**{alias}"),
    }
}
