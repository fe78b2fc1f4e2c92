//! Plain records passed between the generation stages.

use std::fmt;

use camino::Utf8PathBuf;
use capgen_python::Receiver;
use ruff_text_size::TextRange;
use serde::Serialize;

/// The annotation that marks a parameter as captured, e.g. `Capture[...]`,
/// and the module its runtime type lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSpec {
    pub name: String,
    pub module: String,
}

impl MarkerSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
        }
    }

    /// The inner type of a capture annotation, or `None` if `annotation` is
    /// not one.
    ///
    /// `Capture[Callable[[int], int]]` yields `Callable[[int], int]`.
    #[must_use]
    pub fn inner_type<'a>(&self, annotation: &'a str) -> Option<&'a str> {
        let rest = annotation.strip_prefix(self.name.as_str())?;
        let inner = rest.strip_prefix('[')?.trim_end().strip_suffix(']')?;
        Some(inner.trim())
    }
}

impl Default for MarkerSpec {
    fn default() -> Self {
        Self::new("Capture", "capture")
    }
}

/// Identity of a declaration: where it lives and its rendered parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeclarationId {
    pub namespace: String,
    pub class_path: Vec<String>,
    pub name: String,
    pub signature: String,
}

impl DeclarationId {
    /// `namespace.Class.name`, leaving out empty parts.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        std::iter::once(self.namespace.as_str())
            .chain(self.class_path.iter().map(String::as_str))
            .chain(std::iter::once(self.name.as_str()))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.qualified_name(), self.signature)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterKind {
    PositionalOnly,
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

impl ParameterKind {
    #[must_use]
    pub fn is_variadic(self) -> bool {
        matches!(self, ParameterKind::VarPositional | ParameterKind::VarKeyword)
    }

    #[must_use]
    pub fn accepts_positional(self) -> bool {
        matches!(
            self,
            ParameterKind::PositionalOnly | ParameterKind::PositionalOrKeyword
        )
    }

    #[must_use]
    pub fn accepts_keyword(self) -> bool {
        matches!(
            self,
            ParameterKind::PositionalOrKeyword | ParameterKind::KeywordOnly
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParameterRole {
    /// `self` or `cls`.
    Receiver,
    Plain,
    /// A parameter annotated with the capture marker; `inner` is the wrapped type.
    Captured { inner: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedParameter {
    pub name: String,
    pub kind: ParameterKind,
    pub annotation: Option<String>,
    pub default: Option<String>,
    pub role: ParameterRole,
}

impl GeneratedParameter {
    #[must_use]
    pub fn is_captured(&self) -> bool {
        matches!(self.role, ParameterRole::Captured { .. })
    }

    #[must_use]
    pub fn is_receiver(&self) -> bool {
        matches!(self.role, ParameterRole::Receiver)
    }

    /// The annotation as it appears on stand-ins and interceptors: captured
    /// parameters take their inner type.
    #[must_use]
    pub fn emitted_annotation(&self) -> Option<&str> {
        match &self.role {
            ParameterRole::Captured { inner } => Some(inner.as_str()),
            ParameterRole::Receiver | ParameterRole::Plain => self.annotation.as_deref(),
        }
    }
}

/// A function or method that requests a capture for at least one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateDeclaration {
    pub id: DeclarationId,
    pub path: Utf8PathBuf,
    #[serde(skip)]
    pub range: TextRange,
    pub is_async: bool,
    #[serde(serialize_with = "serialize_display")]
    pub receiver: Receiver,
    pub returns: Option<String>,
    pub parameters: Vec<GeneratedParameter>,
    /// Import statements of the declaring file, minus the marker module.
    pub imports: Vec<String>,
}

impl CandidateDeclaration {
    pub fn captured(&self) -> impl Iterator<Item = &GeneratedParameter> {
        self.parameters.iter().filter(|p| p.is_captured())
    }

    #[must_use]
    pub fn has_captures(&self) -> bool {
        self.captured().next().is_some()
    }

    #[must_use]
    pub fn receiver_parameter(&self) -> Option<&GeneratedParameter> {
        self.parameters.iter().find(|p| p.is_receiver())
    }

    /// Parameters a caller supplies, i.e. everything but `self`/`cls`.
    pub fn call_parameters(&self) -> impl Iterator<Item = &GeneratedParameter> {
        self.parameters.iter().filter(|p| !p.is_receiver())
    }

    #[must_use]
    pub fn returns_none(&self) -> bool {
        self.returns.as_deref().map(str::trim) == Some("None")
    }
}

fn serialize_display<T: fmt::Display, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Identity of a call site: file path plus one-based line and column of the
/// start of the call expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CallSiteId {
    pub path: Utf8PathBuf,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for CallSiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoundBy {
    Positional(usize),
    Keyword,
    /// Left to the parameter's default.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentBinding {
    pub parameter: String,
    pub bound_by: BoundBy,
}

/// The source of the argument a caller passed for a captured parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturedArgument {
    pub parameter: String,
    /// Index of the parameter in the declaration.
    pub position: usize,
    /// Exact argument text, internal formatting preserved.
    pub text: String,
    #[serde(skip)]
    pub range: TextRange,
}

/// A resolved call to a capture-requesting declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSite {
    pub id: CallSiteId,
    /// Index into the generation's declaration list.
    pub declaration: usize,
    pub bindings: Vec<ArgumentBinding>,
    pub captures: Vec<CapturedArgument>,
    #[serde(skip)]
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArtifactKind {
    Overload,
    Interceptor,
    Support,
}

/// One generated file: its name and full text. Never modified once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    pub name: String,
    pub kind: ArtifactKind,
    pub text: String,
}
