use ruff_python_ast::Expr;
use ruff_python_ast::Stmt;
use ruff_python_ast::StmtAssign;

use crate::InspectError;

/// The self-contained module text that carries a captured expression from
/// generation time to run time.
///
/// The text is the capture's import statements, a blank line, and a single
/// assignment of the parenthesized expression to a uniquely named binding.
/// Parsing it back and taking the value of that assignment yields the
/// original expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSnippet {
    binding: String,
    imports: Vec<String>,
    text: String,
}

impl CaptureSnippet {
    #[must_use]
    pub fn new(binding: impl Into<String>, imports: Vec<String>, text: impl Into<String>) -> Self {
        Self {
            binding: binding.into(),
            imports,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn binding(&self) -> &str {
        &self.binding
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for import in &self.imports {
            out.push_str(import);
            out.push('\n');
        }
        if !self.imports.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.binding);
        out.push_str(" = (");
        out.push_str(&self.text);
        out.push_str(")\n");
        out
    }

    /// [`render`](Self::render) as the body of a `"""` string literal.
    #[must_use]
    pub fn render_escaped(&self) -> String {
        escape_triple_quoted(&self.render())
    }

    /// Parse `source` and return the value assigned to this snippet's binding.
    pub fn locate(&self, source: &str) -> Result<Expr, InspectError> {
        locate_binding(source, &self.binding)
    }
}

/// Escape text for embedding between `"""` delimiters.
///
/// Backslashes and double quotes are backslash-escaped, so the literal
/// evaluates to exactly `text`.
#[must_use]
pub fn escape_triple_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out
}

/// Find the single top-level `binding = <expr>` assignment in `source`.
pub fn locate_binding(source: &str, binding: &str) -> Result<Expr, InspectError> {
    let parsed = ruff_python_parser::parse_module(source).map_err(|err| InspectError::Parse {
        message: err.error.to_string(),
    })?;

    let mut matches = parsed
        .into_syntax()
        .body
        .into_iter()
        .filter_map(|stmt| match stmt {
            Stmt::Assign(StmtAssign { targets, value, .. })
                if targets.len() == 1
                    && targets[0]
                        .as_name_expr()
                        .is_some_and(|name| name.id.as_str() == binding) =>
            {
                Some(*value)
            }
            _ => None,
        })
        .collect::<Vec<_>>();

    match matches.len() {
        0 => Err(InspectError::BindingNotFound {
            binding: binding.to_string(),
        }),
        1 => Ok(matches.remove(0)),
        count => Err(InspectError::AmbiguousBinding {
            binding: binding.to_string(),
            count,
        }),
    }
}
