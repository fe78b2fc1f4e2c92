use ruff_python_ast::ExceptHandler;
use ruff_python_ast::Expr;
use ruff_python_ast::Stmt;
use ruff_text_size::Ranged;
use ruff_text_size::TextRange;
use rustc_hash::FxHashMap;

use crate::calls::CallExpr;
use crate::ext::ExprExt;
use crate::imports::ImportDirective;
use crate::imports::ImportTarget;
use crate::Module;
use crate::Program;

const MAX_IMPORT_DEPTH: usize = 16;

/// A function or method definition a call resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub module: String,
    pub class_path: Vec<String>,
    pub name: String,
    /// Range of the `def` statement in its module.
    pub range: TextRange,
}

impl Symbol {
    /// `module.Class.name` with empty parts left out.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        std::iter::once(self.module.as_str())
            .chain(self.class_path.iter().map(String::as_str))
            .chain(std::iter::once(self.name.as_str()))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Outcome of resolving a callee.
///
/// `symbol` is set when exactly one definition is reachable. When the name is
/// bound several times (conditional definitions, competing imports), `symbol`
/// is empty and every reachable definition is listed in `candidates` in
/// source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolInfo {
    pub symbol: Option<Symbol>,
    pub candidates: Vec<Symbol>,
}

impl SymbolInfo {
    fn from_resolved(mut resolved: Vec<Symbol>) -> Self {
        let mut seen = Vec::with_capacity(resolved.len());
        resolved.retain(|symbol| {
            if seen.contains(symbol) {
                false
            } else {
                seen.push(symbol.clone());
                true
            }
        });

        if resolved.len() == 1 {
            Self {
                symbol: resolved.pop(),
                candidates: Vec::new(),
            }
        } else {
            Self {
                symbol: None,
                candidates: resolved,
            }
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.symbol.is_some() || !self.candidates.is_empty()
    }

    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.symbol.is_none() && self.candidates.len() > 1
    }

    /// The resolved symbol, or the first candidate.
    #[must_use]
    pub fn first(&self) -> Option<&Symbol> {
        self.symbol.as_ref().or_else(|| self.candidates.first())
    }
}

#[derive(Debug)]
enum Binding {
    Function(TextRange),
    Class(Scope),
    Import(ImportTarget),
    Value,
}

#[derive(Debug, Default)]
struct Scope {
    bindings: FxHashMap<String, Vec<Binding>>,
}

impl Scope {
    fn bind(&mut self, name: &str, binding: Binding) {
        self.bindings
            .entry(name.to_string())
            .or_default()
            .push(binding);
    }

    fn class(&self, path: &[String]) -> Option<&Scope> {
        let Some((head, rest)) = path.split_first() else {
            return Some(self);
        };
        self.bindings.get(head)?.iter().find_map(|binding| match binding {
            Binding::Class(scope) => scope.class(rest),
            _ => None,
        })
    }
}

/// Name bindings of every module in a program, enough to resolve the callee
/// of a call expression to a function or method definition.
///
/// Only module and class scopes are modelled. Names bound inside function
/// bodies are not tracked.
#[derive(Debug)]
pub struct SemanticModel<'p> {
    program: &'p Program,
    scopes: FxHashMap<String, Scope>,
}

impl<'p> SemanticModel<'p> {
    #[must_use]
    pub fn new(program: &'p Program) -> Self {
        let mut scopes = FxHashMap::default();
        for module in program.modules() {
            if scopes.contains_key(module.name()) {
                continue;
            }
            let mut scope = Scope::default();
            bind_body(&mut scope, module.body(), module);
            scopes.insert(module.name().to_string(), scope);
        }
        Self { program, scopes }
    }

    #[must_use]
    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// Resolve the callee of `call`, which appears in `module`.
    #[must_use]
    pub fn resolve_call(&self, module: &Module, call: &CallExpr<'_>) -> SymbolInfo {
        let Some(path) = call.call.func.dotted_path() else {
            return SymbolInfo::default();
        };

        let resolved = match &call.receiver {
            Some(receiver) if path.len() > 1 && path[0] == receiver.name => self
                .scopes
                .get(module.name())
                .and_then(|scope| scope.class(&receiver.class_path))
                .map(|scope| {
                    self.resolve_in(module.name(), &receiver.class_path, scope, &path[1..], 0)
                })
                .unwrap_or_default(),
            _ => self.resolve_path(module.name(), &path, 0),
        };

        SymbolInfo::from_resolved(resolved)
    }

    fn resolve_path(&self, module: &str, path: &[&str], depth: usize) -> Vec<Symbol> {
        match self.scopes.get(module) {
            Some(scope) => self.resolve_in(module, &[], scope, path, depth),
            None => Vec::new(),
        }
    }

    fn resolve_in(
        &self,
        module: &str,
        class_path: &[String],
        scope: &Scope,
        path: &[&str],
        depth: usize,
    ) -> Vec<Symbol> {
        let Some((head, rest)) = path.split_first() else {
            return Vec::new();
        };
        let Some(bindings) = scope.bindings.get(*head) else {
            return Vec::new();
        };

        let mut resolved = Vec::new();
        for binding in bindings {
            match binding {
                Binding::Function(range) if rest.is_empty() => resolved.push(Symbol {
                    module: module.to_string(),
                    class_path: class_path.to_vec(),
                    name: (*head).to_string(),
                    range: *range,
                }),
                Binding::Class(inner) if !rest.is_empty() => {
                    let mut nested = class_path.to_vec();
                    nested.push((*head).to_string());
                    resolved.extend(self.resolve_in(module, &nested, inner, rest, depth));
                }
                Binding::Import(target) if depth < MAX_IMPORT_DEPTH => {
                    resolved.extend(self.resolve_import(target, rest, depth + 1));
                }
                _ => {}
            }
        }
        resolved
    }

    fn resolve_import(&self, target: &ImportTarget, rest: &[&str], depth: usize) -> Vec<Symbol> {
        match target {
            ImportTarget::Module(module) => self.resolve_module_path(module, rest, depth),
            ImportTarget::Member { module, name } => {
                let mut path = Vec::with_capacity(rest.len() + 1);
                path.push(name.as_str());
                path.extend_from_slice(rest);
                let resolved = self.resolve_path(module, &path, depth);
                if resolved.is_empty() {
                    self.resolve_module_path(&format!("{module}.{name}"), rest, depth)
                } else {
                    resolved
                }
            }
        }
    }

    /// Resolve `rest` against module `module`, letting leading segments of
    /// `rest` name submodules. The longest module prefix wins.
    fn resolve_module_path(&self, module: &str, rest: &[&str], depth: usize) -> Vec<Symbol> {
        for split in (0..rest.len()).rev() {
            let candidate = std::iter::once(module)
                .chain(rest[..split].iter().copied())
                .collect::<Vec<_>>()
                .join(".");
            if self.scopes.contains_key(&candidate) {
                return self.resolve_path(&candidate, &rest[split..], depth);
            }
        }
        Vec::new()
    }
}

fn bind_body(scope: &mut Scope, body: &[Stmt], module: &Module) {
    for stmt in body {
        bind_stmt(scope, stmt, module);
    }
}

fn bind_stmt(scope: &mut Scope, stmt: &Stmt, module: &Module) {
    match stmt {
        Stmt::FunctionDef(def) => scope.bind(def.name.as_str(), Binding::Function(def.range())),
        Stmt::ClassDef(class) => {
            let mut inner = Scope::default();
            bind_body(&mut inner, &class.body, module);
            scope.bind(class.name.as_str(), Binding::Class(inner));
        }
        Stmt::Import(_) | Stmt::ImportFrom(_) => {
            let directive =
                ImportDirective::from_stmt(stmt, module.source(), module.name(), module.is_package());
            for binding in directive.iter().flat_map(ImportDirective::bindings) {
                scope.bind(&binding.local, Binding::Import(binding.target.clone()));
            }
        }
        Stmt::Assign(assign) => {
            for target in &assign.targets {
                bind_target(scope, target);
            }
        }
        Stmt::AnnAssign(assign) => bind_target(scope, &assign.target),
        Stmt::If(if_stmt) => {
            bind_body(scope, &if_stmt.body, module);
            for clause in &if_stmt.elif_else_clauses {
                bind_body(scope, &clause.body, module);
            }
        }
        Stmt::Try(try_stmt) => {
            bind_body(scope, &try_stmt.body, module);
            for handler in &try_stmt.handlers {
                let ExceptHandler::ExceptHandler(handler) = handler;
                bind_body(scope, &handler.body, module);
            }
            bind_body(scope, &try_stmt.orelse, module);
            bind_body(scope, &try_stmt.finalbody, module);
        }
        Stmt::With(with) => bind_body(scope, &with.body, module),
        Stmt::For(for_stmt) => {
            bind_body(scope, &for_stmt.body, module);
            bind_body(scope, &for_stmt.orelse, module);
        }
        Stmt::While(while_stmt) => {
            bind_body(scope, &while_stmt.body, module);
            bind_body(scope, &while_stmt.orelse, module);
        }
        _ => {}
    }
}

fn bind_target(scope: &mut Scope, target: &Expr) {
    match target {
        Expr::Name(name) => scope.bind(name.id.as_str(), Binding::Value),
        Expr::Tuple(tuple) => {
            for elt in &tuple.elts {
                bind_target(scope, elt);
            }
        }
        Expr::List(list) => {
            for elt in &list.elts {
                bind_target(scope, elt);
            }
        }
        _ => {}
    }
}
