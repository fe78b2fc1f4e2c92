use std::sync::Arc;

use camino::Utf8Path;
use camino::Utf8PathBuf;

use crate::position::ByteOffset;
use crate::position::LineCol;
use crate::position::LineIndex;

/// A source file loaded into memory, with its path as seen by the generator.
///
/// The path is kept exactly as given (normally relative to the project root)
/// because it becomes part of every call-site identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: Utf8PathBuf,
    source: Arc<str>,
    line_index: Arc<LineIndex>,
}

impl SourceFile {
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, source: String) -> Self {
        let line_index = Arc::new(LineIndex::from_text(&source));
        Self {
            path: path.into(),
            source: Arc::from(source),
            line_index,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Zero-based line and character column of a byte offset.
    #[must_use]
    pub fn line_col(&self, offset: ByteOffset) -> LineCol {
        self.line_index.to_line_col(&self.source, offset)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FileKind {
    Other,
    Python,
    Stub,
}

impl FileKind {
    /// Determine [`FileKind`] from a file path extension.
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Self {
        match path.extension() {
            Some("py") => FileKind::Python,
            Some("pyi") => FileKind::Stub,
            _ => FileKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension() {
        assert_eq!(FileKind::from_path(Utf8Path::new("app/main.py")), FileKind::Python);
        assert_eq!(FileKind::from_path(Utf8Path::new("app/main.pyi")), FileKind::Stub);
        assert_eq!(FileKind::from_path(Utf8Path::new("README.md")), FileKind::Other);
    }

    #[test]
    fn line_col_counts_characters() {
        let file = SourceFile::new("a.py", "s = 'é'; f(x)\n".to_string());
        let offset = file.source().find("f(").unwrap();
        let offset = ByteOffset::new(u32::try_from(offset).unwrap());
        assert_eq!(file.line_col(offset), LineCol::new(0, 9));
    }

    #[test]
    fn line_col_after_carriage_return() {
        let file = SourceFile::new("a.py", "x = 1\ry = f(x)\r\nz = 3\n".to_string());
        let offset = file.source().find("f(").unwrap();
        let offset = ByteOffset::new(u32::try_from(offset).unwrap());
        assert_eq!(file.line_col(offset).one_based(), (2, 5));

        let offset = file.source().find('z').unwrap();
        let offset = ByteOffset::new(u32::try_from(offset).unwrap());
        assert_eq!(file.line_col(offset).one_based(), (3, 1));
    }
}
