//! Python-side plumbing for capgen: parsing files into a [`Program`],
//! per-module import tables, call collection and a small [`SemanticModel`]
//! that resolves callees to their definitions.
//!
//! Resolution is deliberately shallow. It understands module-level and class
//! bindings, imports (absolute and relative), `self`/`cls` receivers, and
//! attribute chains through imported modules. Names bound inside function
//! bodies are not tracked.

mod calls;
mod error;
mod ext;
mod imports;
mod module;
mod names;
mod parser;
mod program;
mod receiver;
mod semantic;

pub use calls::collect_calls;
pub use calls::CallExpr;
pub use calls::ReceiverScope;
pub use error::PythonError;
pub use ext::ExprExt;
pub use ext::FunctionDefExt;
pub use imports::collect_imports;
pub use imports::ImportBinding;
pub use imports::ImportDirective;
pub use imports::ImportTarget;
pub use module::Module;
pub use names::module_name_for_path;
pub use names::resolve_relative;
pub use parser::parse_module;
pub use parser::ParsedModule;
pub use program::ParseFailure;
pub use program::Program;
pub use receiver::Receiver;
pub use semantic::SemanticModel;
pub use semantic::Symbol;
pub use semantic::SymbolInfo;
