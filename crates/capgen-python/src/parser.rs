use ruff_python_ast::ModModule;
use ruff_python_ast::Stmt;
use ruff_python_parser::Parsed;

use crate::PythonError;

#[derive(Debug)]
pub struct ParsedModule {
    parsed: Parsed<ModModule>,
}

impl ParsedModule {
    #[must_use]
    pub fn ast(&self) -> &ModModule {
        self.parsed.syntax()
    }

    #[must_use]
    pub fn body(&self) -> &[Stmt] {
        &self.parsed.syntax().body
    }
}

pub fn parse_module(source: &str) -> Result<ParsedModule, PythonError> {
    ruff_python_parser::parse_module(source).map_or_else(
        |error| {
            let range = error.location;
            Err(PythonError::Parse {
                message: error.error.to_string(),
                offset: range.start().to_usize(),
                length: range.len().to_usize(),
            })
        },
        |parsed| Ok(ParsedModule { parsed }),
    )
}
