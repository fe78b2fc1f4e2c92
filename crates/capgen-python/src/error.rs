use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PythonError {
    #[error("Failed to parse Python source: {message}")]
    Parse {
        message: String,
        offset: usize,
        length: usize,
    },

    #[error("{path}: {source}")]
    InFile {
        path: Utf8PathBuf,
        #[source]
        source: Box<PythonError>,
    },
}

impl PythonError {
    #[must_use]
    pub fn in_file(self, path: impl Into<Utf8PathBuf>) -> Self {
        PythonError::InFile {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// Byte range the error points at, if any.
    #[must_use]
    pub fn range(&self) -> Option<(usize, usize)> {
        match self {
            PythonError::Parse { offset, length, .. } => Some((*offset, *length)),
            PythonError::InFile { source, .. } => source.range(),
        }
    }

    /// The innermost message, without any file prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            PythonError::Parse { message, .. } => message.clone(),
            PythonError::InFile { source, .. } => source.message(),
        }
    }
}
