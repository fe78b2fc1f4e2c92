use capgen_python::FunctionDefExt;
use capgen_python::Module;
use capgen_python::Program;
use itertools::Itertools;
use ruff_python_ast::ExceptHandler;
use ruff_python_ast::Parameter;
use ruff_python_ast::Stmt;
use ruff_python_ast::StmtFunctionDef;
use ruff_text_size::Ranged;
use rustc_hash::FxHashSet;

use crate::model::CandidateDeclaration;
use crate::model::DeclarationId;
use crate::model::GeneratedParameter;
use crate::model::MarkerSpec;
use crate::model::ParameterKind;
use crate::model::ParameterRole;
use crate::signature::render_parameters;
use crate::signature::Annotations;

/// Find every module-level function and class method with at least one
/// parameter annotated with the capture marker.
///
/// Functions nested in other functions are not reachable from other modules
/// and are skipped. Declarations repeating an identity already seen are
/// dropped.
#[must_use]
pub fn discover_declarations(program: &Program, marker: &MarkerSpec) -> Vec<CandidateDeclaration> {
    let mut declarations = Vec::new();
    let mut seen = FxHashSet::default();

    for module in program.modules() {
        let mut discoverer = Discoverer {
            module,
            marker,
            imports: None,
            found: Vec::new(),
        };
        discoverer.visit_body(module.body(), &mut Vec::new());

        for declaration in discoverer.found {
            if seen.insert(declaration.id.clone()) {
                tracing::debug!(declaration = %declaration.id, "found capture declaration");
                declarations.push(declaration);
            } else {
                tracing::debug!(declaration = %declaration.id, "skipping duplicate declaration");
            }
        }
    }

    declarations
}

struct Discoverer<'a> {
    module: &'a Module,
    marker: &'a MarkerSpec,
    imports: Option<Vec<String>>,
    found: Vec<CandidateDeclaration>,
}

impl Discoverer<'_> {
    fn visit_body(&mut self, body: &[Stmt], class_path: &mut Vec<String>) {
        for stmt in body {
            self.visit_stmt(stmt, class_path);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt, class_path: &mut Vec<String>) {
        match stmt {
            Stmt::FunctionDef(def) => {
                if let Some(declaration) = self.declaration(def, class_path) {
                    self.found.push(declaration);
                }
            }
            Stmt::ClassDef(class) => {
                class_path.push(class.name.as_str().to_string());
                self.visit_body(&class.body, class_path);
                class_path.pop();
            }
            Stmt::If(if_stmt) => {
                self.visit_body(&if_stmt.body, class_path);
                for clause in &if_stmt.elif_else_clauses {
                    self.visit_body(&clause.body, class_path);
                }
            }
            Stmt::Try(try_stmt) => {
                self.visit_body(&try_stmt.body, class_path);
                for handler in &try_stmt.handlers {
                    let ExceptHandler::ExceptHandler(handler) = handler;
                    self.visit_body(&handler.body, class_path);
                }
                self.visit_body(&try_stmt.orelse, class_path);
                self.visit_body(&try_stmt.finalbody, class_path);
            }
            Stmt::With(with) => self.visit_body(&with.body, class_path),
            _ => {}
        }
    }

    fn declaration(
        &mut self,
        def: &StmtFunctionDef,
        class_path: &[String],
    ) -> Option<CandidateDeclaration> {
        let receiver = def.receiver(!class_path.is_empty());
        let parameters = self.parameters(def, receiver.binds_first_argument());

        if !parameters.iter().any(GeneratedParameter::is_captured) {
            return None;
        }

        let id = DeclarationId {
            namespace: self.module.name().to_string(),
            class_path: class_path.to_vec(),
            name: def.name.as_str().to_string(),
            signature: render_parameters(&parameters, Annotations::Declared),
        };

        Some(CandidateDeclaration {
            id,
            path: self.module.path().to_path_buf(),
            range: def.range(),
            is_async: def.is_async,
            receiver,
            returns: def
                .returns
                .as_deref()
                .map(|returns| self.module.text_of(returns).to_string()),
            parameters,
            imports: self.imports().to_vec(),
        })
    }

    fn parameters(&self, def: &StmtFunctionDef, has_receiver: bool) -> Vec<GeneratedParameter> {
        let params = &def.parameters;
        let mut out = Vec::new();

        let positional = params
            .posonlyargs
            .iter()
            .map(|p| (p, ParameterKind::PositionalOnly))
            .chain(
                params
                    .args
                    .iter()
                    .map(|p| (p, ParameterKind::PositionalOrKeyword)),
            );
        for (index, (param, kind)) in positional.enumerate() {
            let is_receiver = has_receiver && index == 0;
            out.push(self.parameter(
                &param.parameter,
                kind,
                param.default.as_deref(),
                is_receiver,
            ));
        }

        if let Some(vararg) = &params.vararg {
            out.push(self.parameter(vararg, ParameterKind::VarPositional, None, false));
        }
        for param in &params.kwonlyargs {
            out.push(self.parameter(
                &param.parameter,
                ParameterKind::KeywordOnly,
                param.default.as_deref(),
                false,
            ));
        }
        if let Some(kwarg) = &params.kwarg {
            out.push(self.parameter(kwarg, ParameterKind::VarKeyword, None, false));
        }

        out
    }

    fn parameter(
        &self,
        param: &Parameter,
        kind: ParameterKind,
        default: Option<&ruff_python_ast::Expr>,
        is_receiver: bool,
    ) -> GeneratedParameter {
        let annotation = param
            .annotation
            .as_deref()
            .map(|annotation| self.module.text_of(annotation).to_string());

        let role = if is_receiver {
            ParameterRole::Receiver
        } else {
            match annotation
                .as_deref()
                .filter(|_| !kind.is_variadic())
                .and_then(|annotation| self.marker.inner_type(annotation))
            {
                Some(inner) => ParameterRole::Captured {
                    inner: inner.to_string(),
                },
                None => ParameterRole::Plain,
            }
        };

        GeneratedParameter {
            name: param.name.as_str().to_string(),
            kind,
            default: default.map(|default| self.module.text_of(default).to_string()),
            annotation,
            role,
        }
    }

    /// Distinct unconditional module-level imports, minus the marker module.
    fn imports(&mut self) -> &[String] {
        let module = self.module;
        let marker_module = self.marker.module.as_str();
        self.imports.get_or_insert_with(|| {
            module
                .imports()
                .iter()
                .filter(|directive| directive.is_top_level())
                .filter_map(|directive| directive.render_without(marker_module))
                .unique()
                .collect()
        })
    }
}
