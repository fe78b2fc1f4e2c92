use ruff_python_ast::statement_visitor::walk_stmt;
use ruff_python_ast::statement_visitor::StatementVisitor;
use ruff_python_ast::Stmt;
use ruff_python_ast::StmtImport;
use ruff_python_ast::StmtImportFrom;
use ruff_text_size::Ranged;
use ruff_text_size::TextRange;

use crate::names::resolve_relative;

/// What an imported local name refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportTarget {
    /// `import a.b` binds `a` to module `a`; `import a.b as x` binds `x` to `a.b`.
    Module(String),
    /// `from m import n` binds `n` to member `n` of module `m`, which may
    /// itself turn out to be a submodule.
    Member { module: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local: String,
    pub target: ImportTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ImportForm {
    Import {
        aliases: Vec<(String, Option<String>)>,
    },
    From {
        written: String,
        resolved: Option<String>,
    },
}

/// One `import` or `from ... import` statement, kept with its exact source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDirective {
    text: String,
    range: TextRange,
    form: ImportForm,
    bindings: Vec<ImportBinding>,
    top_level: bool,
}

impl ImportDirective {
    /// Build a directive from an import statement, resolving relative imports
    /// against `current`.
    #[must_use]
    pub fn from_stmt(stmt: &Stmt, source: &str, current: &str, is_package: bool) -> Option<Self> {
        match stmt {
            Stmt::Import(import) => Some(Self::from_import(import, source)),
            Stmt::ImportFrom(import) => {
                Some(Self::from_import_from(import, source, current, is_package))
            }
            _ => None,
        }
    }

    fn from_import(import: &StmtImport, source: &str) -> Self {
        let mut aliases = Vec::new();
        let mut bindings = Vec::new();

        for alias in &import.names {
            let module = alias.name.as_str().to_string();
            let asname = alias.asname.as_ref().map(|a| a.as_str().to_string());

            let binding = match &asname {
                Some(local) => ImportBinding {
                    local: local.clone(),
                    target: ImportTarget::Module(module.clone()),
                },
                None => {
                    let head = module.split('.').next().unwrap_or(&module).to_string();
                    ImportBinding {
                        local: head.clone(),
                        target: ImportTarget::Module(head),
                    }
                }
            };
            bindings.push(binding);
            aliases.push((module, asname));
        }

        Self {
            text: source[import.range()].to_string(),
            range: import.range(),
            form: ImportForm::Import { aliases },
            bindings,
            top_level: true,
        }
    }

    fn from_import_from(
        import: &StmtImportFrom,
        source: &str,
        current: &str,
        is_package: bool,
    ) -> Self {
        let module = import.module.as_ref().map(|m| m.as_str());
        let written = format!(
            "{}{}",
            ".".repeat(import.level as usize),
            module.unwrap_or_default()
        );
        let resolved = resolve_relative(current, is_package, import.level, module);

        let bindings = match &resolved {
            Some(resolved) => import
                .names
                .iter()
                .filter(|alias| alias.name.as_str() != "*")
                .map(|alias| ImportBinding {
                    local: alias
                        .asname
                        .as_ref()
                        .unwrap_or(&alias.name)
                        .as_str()
                        .to_string(),
                    target: ImportTarget::Member {
                        module: resolved.clone(),
                        name: alias.name.as_str().to_string(),
                    },
                })
                .collect(),
            None => Vec::new(),
        };

        Self {
            text: source[import.range()].to_string(),
            range: import.range(),
            form: ImportForm::From { written, resolved },
            bindings,
            top_level: true,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn range(&self) -> TextRange {
        self.range
    }

    #[must_use]
    pub fn bindings(&self) -> &[ImportBinding] {
        &self.bindings
    }

    /// Whether the statement runs unconditionally on import: directly in the
    /// module body, not under `if`, `try`, `with`, a function or a class.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.top_level
    }

    /// Names this statement binds in the importing scope.
    pub fn bound_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.local.as_str())
    }

    /// Source text of this directive with every import of `excluded` (or one
    /// of its submodules) removed. `None` if nothing is left.
    #[must_use]
    pub fn render_without(&self, excluded: &str) -> Option<String> {
        match &self.form {
            ImportForm::Import { aliases } => {
                let kept: Vec<_> = aliases
                    .iter()
                    .filter(|(module, _)| !is_within(module, excluded))
                    .collect();
                if kept.is_empty() {
                    None
                } else if kept.len() == aliases.len() {
                    Some(self.text.clone())
                } else {
                    let names = kept
                        .iter()
                        .map(|(module, asname)| match asname {
                            Some(asname) => format!("{module} as {asname}"),
                            None => module.clone(),
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    Some(format!("import {names}"))
                }
            }
            ImportForm::From { written, resolved } => {
                let written = written.trim_start_matches('.');
                let excluded_here = is_within(written, excluded)
                    || resolved.as_deref().is_some_and(|r| is_within(r, excluded));
                if excluded_here {
                    None
                } else {
                    Some(self.text.clone())
                }
            }
        }
    }
}

fn is_within(module: &str, parent: &str) -> bool {
    module == parent
        || module
            .strip_prefix(parent)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Every import statement in the module, at any nesting depth, in source order.
#[must_use]
pub fn collect_imports(
    body: &[Stmt],
    source: &str,
    current: &str,
    is_package: bool,
) -> Vec<ImportDirective> {
    let mut collector = ImportCollector {
        source,
        current,
        is_package,
        depth: 0,
        directives: Vec::new(),
    };
    collector.visit_body(body);
    collector.directives
}

struct ImportCollector<'a> {
    source: &'a str,
    current: &'a str,
    is_package: bool,
    depth: usize,
    directives: Vec<ImportDirective>,
}

impl StatementVisitor<'_> for ImportCollector<'_> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Import(_) | Stmt::ImportFrom(_) => {
                if let Some(mut directive) =
                    ImportDirective::from_stmt(stmt, self.source, self.current, self.is_package)
                {
                    directive.top_level = self.depth == 0;
                    self.directives.push(directive);
                }
            }
            _ => {
                self.depth += 1;
                walk_stmt(self, stmt);
                self.depth -= 1;
            }
        }
    }
}
