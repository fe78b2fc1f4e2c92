use crate::model::CandidateDeclaration;
use crate::signature::render_parameters;
use crate::signature::Annotations;
use crate::writer::SourceWriter;

pub(crate) const HEADER: &str = "# <auto-generated/>";

/// Stand-in for `declaration` with every captured parameter typed as its
/// inner type, so type checkers accept the plain callable at call sites.
#[must_use]
pub fn synthesize_overload(declaration: &CandidateDeclaration) -> String {
    let mut w = SourceWriter::new();
    w.line(HEADER);
    for import in &declaration.imports {
        w.line(import);
    }
    w.blank();

    open_classes(&mut w, &declaration.id.class_path);

    if let Some(decorator) = declaration.receiver.decorator() {
        w.line(format!("@{decorator}"));
    }
    w.line(def_line(declaration, &declaration.id.name));
    w.indent();
    w.line(format!(
        "\"\"\"Stand-in for `{}` taking captured arguments as their inner type.\"\"\"",
        declaration.id.qualified_name()
    ));
    match default_return(declaration.returns.as_deref()) {
        Some(value) => w.line(format!("return {value}")),
        None => w.line("return"),
    };

    w.finish()
}

pub(crate) fn open_classes(w: &mut SourceWriter, class_path: &[String]) {
    for class in class_path {
        w.line(format!("class {class}:"));
        w.indent();
    }
}

/// `[async ]def name(params)[ -> returns]:` with emitted annotations.
pub(crate) fn def_line(declaration: &CandidateDeclaration, name: &str) -> String {
    let prefix = if declaration.is_async { "async def" } else { "def" };
    let params = render_parameters(&declaration.parameters, Annotations::Emitted);
    match &declaration.returns {
        Some(returns) => format!("{prefix} {name}({params}) -> {returns}:"),
        None => format!("{prefix} {name}({params}):"),
    }
}

/// A neutral value for a return annotation. `None` means a bare `return`.
fn default_return(returns: Option<&str>) -> Option<&'static str> {
    let Some(returns) = returns.map(str::trim) else {
        return Some("None");
    };
    if returns == "None" {
        return None;
    }

    let head = returns.split('[').next().unwrap_or(returns).trim();
    let head = head.rsplit('.').next().unwrap_or(head);
    let value = match head {
        "int" => "0",
        "float" => "0.0",
        "bool" => "False",
        "str" => "\"\"",
        "bytes" => "b\"\"",
        "list" | "List" => "[]",
        "dict" | "Dict" => "{}",
        "set" | "Set" => "set()",
        "tuple" | "Tuple" => "()",
        _ => "None",
    };
    Some(value)
}
