use camino::Utf8Path;
use capgen_source::SourceFile;
use rustc_hash::FxHashMap;

use crate::Module;
use crate::PythonError;

/// A file that could not be parsed and was left out of the program.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub file: SourceFile,
    pub error: PythonError,
}

/// Every successfully parsed module of a project, in a stable order.
#[derive(Debug, Default)]
pub struct Program {
    modules: Vec<Module>,
    by_name: FxHashMap<String, usize>,
    failures: Vec<ParseFailure>,
}

impl Program {
    /// Parse all files. Files that fail to parse are recorded and skipped.
    ///
    /// Modules are ordered by path so that everything derived from the
    /// program is deterministic.
    #[must_use]
    pub fn from_files(files: impl IntoIterator<Item = SourceFile>) -> Self {
        let mut files: Vec<SourceFile> = files.into_iter().collect();
        files.sort_by(|a, b| a.path().cmp(b.path()));

        let mut program = Program::default();
        for file in files {
            match Module::parse(file.clone()) {
                Ok(module) => program.push(module),
                Err(error) => {
                    tracing::warn!(path = %file.path(), %error, "skipping file that failed to parse");
                    program.failures.push(ParseFailure { file, error });
                }
            }
        }
        program
    }

    fn push(&mut self, module: Module) {
        let index = self.modules.len();
        if self.by_name.contains_key(module.name()) {
            tracing::debug!(
                name = module.name(),
                path = %module.path(),
                "module name already taken, later file is not importable by name"
            );
        } else {
            self.by_name.insert(module.name().to_string(), index);
        }
        self.modules.push(module);
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    #[must_use]
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.by_name.get(name).map(|&index| &self.modules[index])
    }

    #[must_use]
    pub fn module_by_path(&self, path: &Utf8Path) -> Option<&Module> {
        self.modules.iter().find(|m| m.path() == path)
    }

    #[must_use]
    pub fn failures(&self) -> &[ParseFailure] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_modules_and_records_failures() {
        let program = Program::from_files([
            SourceFile::new("b.py", "x = 1\n".to_string()),
            SourceFile::new("a.py", "y = 2\n".to_string()),
            SourceFile::new("broken.py", "def (\n".to_string()),
        ]);

        let names: Vec<_> = program.modules().iter().map(Module::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(program.failures().len(), 1);
        assert_eq!(program.failures()[0].file.path(), Utf8Path::new("broken.py"));
        assert!(program.module("a").is_some());
        assert!(program.module("broken").is_none());
    }
}
