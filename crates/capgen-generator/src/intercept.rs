use capgen_inspect::escape_triple_quoted;
use capgen_inspect::CaptureSnippet;
use capgen_python::Receiver;

use crate::model::CallSite;
use crate::model::CandidateDeclaration;
use crate::model::MarkerSpec;
use crate::naming::interceptor_function_name;
use crate::overload::def_line;
use crate::overload::open_classes;
use crate::overload::HEADER;
use crate::signature::forward_argument;
use crate::writer::SourceWriter;

/// Renders the interceptor for one call site.
pub(crate) struct InterceptorSynthesizer<'a> {
    pub(crate) marker: &'a MarkerSpec,
    pub(crate) support_module: &'a str,
}

impl InterceptorSynthesizer<'_> {
    #[must_use]
    pub(crate) fn synthesize(&self, declaration: &CandidateDeclaration, site: &CallSite) -> String {
        let mut w = SourceWriter::new();
        w.line(HEADER);
        for import in &declaration.imports {
            w.line(import);
        }
        w.blank();
        w.line("import ast");
        w.line("import symtable");
        w.line(format!(
            "from {} import {}",
            self.marker.module, self.marker.name
        ));
        w.line(format!(
            "from {} import intercepts_location",
            self.support_module
        ));
        w.line(forward_import(declaration));
        w.blank();

        open_classes(&mut w, &declaration.id.class_path);

        if let Some(decorator) = declaration.receiver.decorator() {
            w.line(format!("@{decorator}"));
        }
        w.line(format!(
            "@intercepts_location(\"{}\", line={}, column={})",
            escape_triple_quoted(site.id.path.as_str()),
            site.id.line,
            site.id.column
        ));
        let name = interceptor_function_name(&declaration.id.name, &site.id);
        w.line(def_line(declaration, &name));
        w.indent();

        for param in declaration.call_parameters() {
            let alias = format!("intercepted_{}", param.name);
            match site.captures.iter().find(|c| c.parameter == param.name) {
                Some(capture) => {
                    let snippet = CaptureSnippet::new(
                        format!("{alias}_lambda"),
                        declaration.imports.clone(),
                        capture.text.as_str(),
                    );
                    self.capture_lines(&mut w, &param.name, &alias, &snippet);
                }
                None => {
                    w.line(format!("{alias} = {}", param.name));
                }
            }
        }

        let arguments = declaration
            .call_parameters()
            .map(|param| forward_argument(param, &format!("intercepted_{}", param.name)))
            .collect::<Vec<_>>()
            .join(", ");
        let awaited = if declaration.is_async { "await " } else { "" };
        let call = format!("{awaited}{}({arguments})", forward_target(declaration));
        if declaration.returns_none() {
            w.line(call);
        } else {
            w.line(format!("return {call}"));
        }

        w.finish()
    }

    fn capture_lines(&self, w: &mut SourceWriter, param: &str, alias: &str, snippet: &CaptureSnippet) {
        w.line(format!(
            "{alias}_source = \"\"\"{}\"\"\"",
            snippet.render_escaped()
        ));
        w.line(format!("{alias}_tree = ast.parse({alias}_source)"));
        w.line(format!(
            "{alias}_expression, = [node.value for node in {alias}_tree.body \
             if isinstance(node, ast.Assign) and any(isinstance(target, ast.Name) \
             and target.id == \"{}\" for target in node.targets)]",
            snippet.binding()
        ));
        w.line(format!(
            "{alias}_semantic_model = symtable.symtable({alias}_source, \"<capture>\", \"exec\")"
        ));
        w.line(format!(
            "{alias} = {}({param}, {alias}_expression, {alias}_semantic_model)",
            self.marker.name
        ));
    }
}

/// Local name the declaring top-level class is imported under. The
/// re-opened class of the same name would otherwise shadow it.
fn original_class(class: &str) -> String {
    format!("original_{class}")
}

/// Import that makes the forwarding target reachable from the artifact.
fn forward_import(declaration: &CandidateDeclaration) -> String {
    let id = &declaration.id;
    match id.class_path.first() {
        Some(class) => format!(
            "from {} import {class} as {}",
            id.namespace,
            original_class(class)
        ),
        None => format!("from {} import {}", id.namespace, id.name),
    }
}

/// The callable expression the interceptor forwards to.
fn forward_target(declaration: &CandidateDeclaration) -> String {
    let name = &declaration.id.name;
    match declaration.receiver {
        Receiver::Module => name.clone(),
        Receiver::Static => {
            let mut path = declaration.id.class_path.clone();
            if let Some(class) = path.first_mut() {
                *class = original_class(class);
            }
            path.push(name.clone());
            path.join(".")
        }
        Receiver::Class | Receiver::Instance => {
            let fallback = if declaration.receiver == Receiver::Class {
                "cls"
            } else {
                "self"
            };
            let receiver = declaration
                .receiver_parameter()
                .map_or(fallback, |param| param.name.as_str());
            format!("{receiver}.{name}")
        }
    }
}
