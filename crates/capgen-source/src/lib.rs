mod file;
mod path;
mod position;
mod render;
mod span;
mod walk;

pub use file::FileKind;
pub use file::SourceFile;
pub use path::relative_to;
pub use position::ByteOffset;
pub use position::LineCol;
pub use render::Diagnostic;
pub use render::DiagnosticAnnotation;
pub use render::DiagnosticRenderer;
pub use render::Severity;
pub use span::Span;
pub use walk::walk_files;
pub use walk::WalkOptions;
