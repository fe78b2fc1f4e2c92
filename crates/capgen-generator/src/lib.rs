//! The capture generator: finds functions that ask for a capture of their
//! argument's source, resolves every call to them, and emits an interceptor
//! per call site plus a stand-in per declaration.
//!
//! [`Generator::generate`] is a pure function of the parsed [`Program`]; the
//! same program always yields byte-identical artifacts in the same order.

mod diagnostics;
mod discover;
mod error;
mod extract;
mod intercept;
pub mod model;
pub mod naming;
mod options;
mod overload;
mod resolve;
mod signature;
mod support;
mod writer;

use capgen_python::Program;
use capgen_python::SemanticModel;
use capgen_source::Span;
use serde::Serialize;

pub use crate::diagnostics::GeneratorDiagnostic;
pub use crate::discover::discover_declarations;
pub use crate::error::GenerateError;
use crate::extract::SourceExtractor;
use crate::intercept::InterceptorSynthesizer;
use crate::model::ArtifactKind;
use crate::model::CallSite;
use crate::model::CandidateDeclaration;
use crate::model::GeneratedArtifact;
use crate::naming::ArtifactSet;
pub use crate::options::GeneratorOptions;
pub use crate::overload::synthesize_overload;
use crate::resolve::CallResolver;
pub use crate::support::synthesize_support;

/// Everything one generation pass produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationOutput {
    pub artifacts: Vec<GeneratedArtifact>,
    pub diagnostics: Vec<GeneratorDiagnostic>,
    pub declarations: Vec<CandidateDeclaration>,
    /// Intercepted call sites; `CallSite::declaration` indexes `declarations`.
    pub call_sites: Vec<CallSite>,
}

#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GeneratorOptions,
}

impl Generator {
    #[must_use]
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn generate(&self, program: &Program) -> Result<GenerationOutput, GenerateError> {
        let mut diagnostics: Vec<GeneratorDiagnostic> = program
            .failures()
            .iter()
            .map(|failure| {
                let span = failure
                    .error
                    .range()
                    .map_or(Span::new(0, 0), |(start, length)| Span::from_parts(start, length));
                GeneratorDiagnostic::ParseFailure {
                    path: failure.file.path().to_path_buf(),
                    message: failure.error.message(),
                    span,
                }
            })
            .collect();

        let declarations = discover_declarations(program, &self.options.marker);
        let model = SemanticModel::new(program);

        let resolved = CallResolver {
            program,
            model: &model,
            declarations: &declarations,
            ambiguity: self.options.ambiguity,
        }
        .resolve(&mut diagnostics);

        let extractor = SourceExtractor {
            program,
            marker: &self.options.marker,
            policy: self.options.outer_captures,
            allowed_names: &self.options.allowed_names,
        };
        let call_sites: Vec<CallSite> = resolved
            .iter()
            .filter_map(|call| {
                extractor.extract(call, &declarations[call.declaration], &mut diagnostics)
            })
            .collect();

        let mut artifacts = ArtifactSet::new();
        for declaration in &declarations {
            artifacts.insert(
                &declaration.id.to_string(),
                naming::overload_name(declaration),
                ArtifactKind::Overload,
                synthesize_overload(declaration),
            )?;
        }

        let interceptors = InterceptorSynthesizer {
            marker: &self.options.marker,
            support_module: &self.options.support_module,
        };
        for site in &call_sites {
            let declaration = &declarations[site.declaration];
            let artifact = artifacts.insert(
                &site.id.to_string(),
                naming::interceptor_name(&declaration.id.name, &site.id),
                ArtifactKind::Interceptor,
                interceptors.synthesize(declaration, site),
            )?;
            tracing::debug!(site = %site.id, artifact = %artifact.name, "intercepted call site");
        }

        if artifacts.contains_kind(ArtifactKind::Interceptor) {
            artifacts.insert(
                &self.options.support_module,
                naming::support_name(&self.options.support_module),
                ArtifactKind::Support,
                synthesize_support(),
            )?;
        }

        tracing::info!(
            declarations = declarations.len(),
            call_sites = call_sites.len(),
            artifacts = artifacts.len(),
            diagnostics = diagnostics.len(),
            "generation finished"
        );

        Ok(GenerationOutput {
            artifacts: artifacts.into_vec(),
            diagnostics,
            declarations,
            call_sites,
        })
    }
}

impl GenerationOutput {
    /// The declaration a call site resolved to.
    #[must_use]
    pub fn declaration_of(&self, site: &CallSite) -> &CandidateDeclaration {
        &self.declarations[site.declaration]
    }

    #[must_use]
    pub fn artifact(&self, name: &str) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().find(|artifact| artifact.name == name)
    }
}
