use ruff_python_ast::visitor::walk_expr;
use ruff_python_ast::visitor::Visitor;
use ruff_python_ast::Comprehension;
use ruff_python_ast::Expr;
use ruff_python_ast::ExprContext;
use ruff_python_ast::Parameters;
use rustc_hash::FxHashSet;

/// Names available in every Python module without an import.
const BUILTINS: &[&str] = &[
    "abs", "aiter", "all", "anext", "any", "ascii", "bin", "bool", "breakpoint", "bytearray",
    "bytes", "callable", "chr", "classmethod", "compile", "complex", "delattr", "dict", "dir",
    "divmod", "enumerate", "eval", "exec", "filter", "float", "format", "frozenset", "getattr",
    "globals", "hasattr", "hash", "help", "hex", "id", "input", "int", "isinstance",
    "issubclass", "iter", "len", "list", "locals", "map", "max", "memoryview", "min", "next",
    "object", "oct", "open", "ord", "pow", "print", "property", "range", "repr", "reversed",
    "round", "set", "setattr", "slice", "sorted", "staticmethod", "str", "sum", "super",
    "tuple", "type", "vars", "zip", "__import__", "__name__", "__file__", "Ellipsis",
    "NotImplemented", "BaseException", "Exception", "ArithmeticError", "AssertionError",
    "AttributeError", "IndexError", "KeyError", "LookupError", "NameError",
    "NotImplementedError", "OverflowError", "RuntimeError", "StopIteration", "TypeError",
    "ValueError", "ZeroDivisionError",
];

/// Detects identifiers a captured expression reads from its surroundings.
///
/// A name counts as outer when it is loaded but bound neither inside the
/// expression (lambda parameters, comprehension targets, `:=` targets) nor
/// by the allow-list, which always contains the Python builtins.
#[derive(Debug, Clone)]
pub struct OuterCaptures {
    allowed: FxHashSet<String>,
}

impl Default for OuterCaptures {
    fn default() -> Self {
        Self {
            allowed: BUILTINS.iter().map(|name| (*name).to_string()).collect(),
        }
    }
}

impl OuterCaptures {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also accept `names`, typically the names bound by the capture's imports.
    #[must_use]
    pub fn allow<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed.extend(names.into_iter().map(Into::into));
        self
    }

    /// Outer names read by `expr`, in order of first appearance.
    #[must_use]
    pub fn find(&self, expr: &Expr) -> Vec<String> {
        let mut finder = FreeNameFinder {
            allowed: &self.allowed,
            scopes: vec![FxHashSet::default()],
            found: Vec::new(),
        };
        finder.visit_expr(expr);
        finder.found
    }
}

struct FreeNameFinder<'a> {
    allowed: &'a FxHashSet<String>,
    scopes: Vec<FxHashSet<String>>,
    found: Vec<String>,
}

impl FreeNameFinder<'_> {
    fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    fn bind(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    fn bind_target(&mut self, target: &Expr) {
        match target {
            Expr::Name(name) => self.bind(name.id.as_str()),
            Expr::Tuple(tuple) => tuple.elts.iter().for_each(|elt| self.bind_target(elt)),
            Expr::List(list) => list.elts.iter().for_each(|elt| self.bind_target(elt)),
            Expr::Starred(starred) => self.bind_target(&starred.value),
            _ => {}
        }
    }

    fn visit_lambda(&mut self, parameters: Option<&Parameters>, body: &Expr) {
        let mut scope = FxHashSet::default();
        if let Some(parameters) = parameters {
            for param in parameters.iter_non_variadic_params() {
                if let Some(default) = &param.default {
                    self.visit_expr(default);
                }
                scope.insert(param.parameter.name.as_str().to_string());
            }
            for variadic in parameters.vararg.iter().chain(&parameters.kwarg) {
                scope.insert(variadic.name.as_str().to_string());
            }
        }
        scope.extend(walrus_targets(body));

        self.scopes.push(scope);
        self.visit_expr(body);
        self.scopes.pop();
    }

    fn visit_comprehension_scope(&mut self, generators: &[Comprehension], elements: &[&Expr]) {
        let Some((first, rest)) = generators.split_first() else {
            elements.iter().for_each(|e| self.visit_expr(e));
            return;
        };

        // The first iterable is evaluated in the enclosing scope.
        self.visit_expr(&first.iter);
        self.scopes.push(FxHashSet::default());
        self.bind_target(&first.target);
        for cond in &first.ifs {
            self.visit_expr(cond);
        }
        for generator in rest {
            self.visit_expr(&generator.iter);
            self.bind_target(&generator.target);
            for cond in &generator.ifs {
                self.visit_expr(cond);
            }
        }
        for element in elements {
            self.visit_expr(element);
        }
        self.scopes.pop();
    }
}

impl<'a> Visitor<'a> for FreeNameFinder<'_> {
    fn visit_expr(&mut self, expr: &'a Expr) {
        match expr {
            Expr::Name(name) => {
                let id = name.id.as_str();
                if matches!(name.ctx, ExprContext::Load)
                    && !self.is_bound(id)
                    && !self.allowed.contains(id)
                    && !self.found.iter().any(|found| found == id)
                {
                    self.found.push(id.to_string());
                }
            }
            Expr::Lambda(lambda) => {
                self.visit_lambda(lambda.parameters.as_deref(), &lambda.body);
            }
            Expr::ListComp(comp) => self.visit_comprehension_scope(&comp.generators, &[&*comp.elt]),
            Expr::SetComp(comp) => self.visit_comprehension_scope(&comp.generators, &[&*comp.elt]),
            Expr::Generator(comp) => {
                self.visit_comprehension_scope(&comp.generators, &[&*comp.elt]);
            }
            Expr::DictComp(comp) => {
                self.visit_comprehension_scope(&comp.generators, &[&*comp.key, &*comp.value]);
            }
            Expr::Named(named) => {
                self.visit_expr(&named.value);
                self.bind_target(&named.target);
            }
            _ => walk_expr(self, expr),
        }
    }
}

/// Targets of `:=` inside `body` that bind in the lambda's own scope.
///
/// Nested lambdas have their own scope and are not searched.
fn walrus_targets(body: &Expr) -> Vec<String> {
    struct WalrusTargets(Vec<String>);

    impl<'a> Visitor<'a> for WalrusTargets {
        fn visit_expr(&mut self, expr: &'a Expr) {
            match expr {
                Expr::Lambda(_) => {}
                Expr::Named(named) => {
                    if let Some(name) = named.target.as_name_expr() {
                        self.0.push(name.id.as_str().to_string());
                    }
                    self.visit_expr(&named.value);
                }
                _ => walk_expr(self, expr),
            }
        }
    }

    let mut targets = WalrusTargets(Vec::new());
    targets.visit_expr(body);
    targets.0
}
