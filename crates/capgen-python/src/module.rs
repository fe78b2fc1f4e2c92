use camino::Utf8Path;
use capgen_source::LineCol;
use capgen_source::SourceFile;
use ruff_python_ast::Stmt;
use ruff_text_size::Ranged;
use ruff_text_size::TextRange;

use crate::imports::collect_imports;
use crate::imports::ImportDirective;
use crate::names::module_name_for_path;
use crate::parser::parse_module;
use crate::parser::ParsedModule;
use crate::PythonError;

/// A parsed Python file together with its dotted module name and imports.
#[derive(Debug)]
pub struct Module {
    file: SourceFile,
    name: String,
    is_package: bool,
    parsed: ParsedModule,
    imports: Vec<ImportDirective>,
}

impl Module {
    pub fn parse(file: SourceFile) -> Result<Self, PythonError> {
        let (name, is_package) = module_name_for_path(file.path());
        let parsed =
            parse_module(file.source()).map_err(|err| err.in_file(file.path().to_path_buf()))?;
        let imports = collect_imports(parsed.body(), file.source(), &name, is_package);

        Ok(Self {
            file,
            name,
            is_package,
            parsed,
            imports,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_package(&self) -> bool {
        self.is_package
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        self.file.path()
    }

    #[must_use]
    pub fn file(&self) -> &SourceFile {
        &self.file
    }

    #[must_use]
    pub fn source(&self) -> &str {
        self.file.source()
    }

    #[must_use]
    pub fn body(&self) -> &[Stmt] {
        self.parsed.body()
    }

    #[must_use]
    pub fn imports(&self) -> &[ImportDirective] {
        &self.imports
    }

    /// Exact source text of a node.
    #[must_use]
    pub fn text_of(&self, node: &impl Ranged) -> &str {
        &self.file.source()[node.range()]
    }

    /// One-based line and character column of the start of `range`.
    #[must_use]
    pub fn location(&self, range: TextRange) -> (u32, u32) {
        let offset = capgen_source::ByteOffset::new(range.start().to_u32());
        let pos: LineCol = self.file.line_col(offset);
        pos.one_based()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_name_and_imports() {
        let file = SourceFile::new("app/views.py", "import os\nx = os.sep\n".to_string());
        let module = Module::parse(file).unwrap();
        assert_eq!(module.name(), "app.views");
        assert!(!module.is_package());
        assert_eq!(module.imports().len(), 1);
    }

    #[test]
    fn location_is_one_based() {
        let source = "x = 1\nfoo(bar)\n";
        let module = Module::parse(SourceFile::new("m.py", source.to_string())).unwrap();
        let start = u32::try_from(source.find("foo").unwrap()).unwrap();
        let range = TextRange::new(start.into(), (start + 3).into());
        assert_eq!(module.location(range), (2, 1));
    }

    #[test]
    fn parse_error_names_file() {
        let err = Module::parse(SourceFile::new("bad.py", "def (:\n".to_string())).unwrap_err();
        assert!(err.to_string().starts_with("bad.py: "));
    }
}
