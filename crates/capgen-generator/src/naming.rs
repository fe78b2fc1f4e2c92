//! Deterministic artifact names.

use camino::Utf8Path;
use rustc_hash::FxHashMap;
use sha2::Digest;
use sha2::Sha256;

use crate::model::ArtifactKind;
use crate::model::CallSiteId;
use crate::model::CandidateDeclaration;
use crate::model::GeneratedArtifact;
use crate::GenerateError;

pub const ARTIFACT_EXTENSION: &str = ".g.py";

/// Replace every character that is not an ASCII letter, digit or `_` with `_`.
#[must_use]
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[must_use]
pub fn sanitized_path(path: &Utf8Path) -> String {
    sanitize(path.as_str())
}

/// `{namespace}_{class path}_{method}_Overload.g.py`, empty parts left out.
#[must_use]
pub fn overload_name(declaration: &CandidateDeclaration) -> String {
    let id = &declaration.id;
    let stem = std::iter::once(id.namespace.as_str())
        .chain(id.class_path.iter().map(String::as_str))
        .chain(std::iter::once(id.name.as_str()))
        .filter(|part| !part.is_empty())
        .map(sanitize)
        .collect::<Vec<_>>()
        .join("_");
    format!("{stem}_Overload{ARTIFACT_EXTENSION}")
}

/// `Intercepted_{method}_{path}_{line}_{column}.g.py`.
#[must_use]
pub fn interceptor_name(method: &str, site: &CallSiteId) -> String {
    format!(
        "Intercepted_{}_{}_{}_{}{ARTIFACT_EXTENSION}",
        sanitize(method),
        sanitized_path(&site.path),
        site.line,
        site.column
    )
}

/// Name of the function emitted for one call site.
#[must_use]
pub fn interceptor_function_name(method: &str, site: &CallSiteId) -> String {
    format!(
        "{method}__intercepted_{}_{}_{}",
        sanitized_path(&site.path),
        site.line,
        site.column
    )
}

#[must_use]
pub fn support_name(module: &str) -> String {
    format!("{module}{ARTIFACT_EXTENSION}")
}

/// First eight hex digits of the SHA-256 of `identity`.
#[must_use]
pub fn identity_hash(identity: &str) -> String {
    Sha256::digest(identity.as_bytes())
        .iter()
        .take(4)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

fn with_suffix(name: &str, suffix: &str) -> String {
    match name.strip_suffix(ARTIFACT_EXTENSION) {
        Some(stem) => format!("{stem}_{suffix}{ARTIFACT_EXTENSION}"),
        None => format!("{name}_{suffix}"),
    }
}

/// The artifacts of one generation, unique by name.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    artifacts: Vec<GeneratedArtifact>,
    by_name: FxHashMap<String, usize>,
}

impl ArtifactSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artifact for `identity` under `name`.
    ///
    /// Re-adding identical text under a taken name is a no-op. Different text
    /// under a taken name is moved to `name` suffixed with the identity hash;
    /// if that name is taken too, the artifact is rejected.
    pub fn insert(
        &mut self,
        identity: &str,
        name: String,
        kind: ArtifactKind,
        text: String,
    ) -> Result<&GeneratedArtifact, GenerateError> {
        let name = match self.by_name.get(&name) {
            None => name,
            Some(&index) if self.artifacts[index].text == text => {
                return Ok(&self.artifacts[index]);
            }
            Some(_) => {
                let suffixed = with_suffix(&name, &identity_hash(identity));
                tracing::debug!(%name, %suffixed, identity, "artifact name collision");
                match self.by_name.get(&suffixed) {
                    None => suffixed,
                    Some(&index) if self.artifacts[index].text == text => {
                        return Ok(&self.artifacts[index]);
                    }
                    Some(_) => return Err(GenerateError::DuplicateArtifact { name: suffixed }),
                }
            }
        };

        let index = self.artifacts.len();
        self.by_name.insert(name.clone(), index);
        self.artifacts.push(GeneratedArtifact { name, kind, text });
        Ok(&self.artifacts[index])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    #[must_use]
    pub fn contains_kind(&self, kind: ArtifactKind) -> bool {
        self.artifacts.iter().any(|a| a.kind == kind)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<GeneratedArtifact> {
        self.artifacts
    }
}
