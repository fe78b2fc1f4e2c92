use capgen_conf::OuterCapturePolicy;
use capgen_inspect::OuterCaptures;
use capgen_python::Program;
use ruff_text_size::Ranged;

use crate::diagnostics::GeneratorDiagnostic;
use crate::model::ArgumentBinding;
use crate::model::CallSite;
use crate::model::CandidateDeclaration;
use crate::model::CapturedArgument;
use crate::model::MarkerSpec;
use crate::resolve::span_of;
use crate::resolve::Aligned;
use crate::resolve::ResolvedCall;

pub(crate) struct SourceExtractor<'a> {
    pub(crate) program: &'a Program,
    pub(crate) marker: &'a MarkerSpec,
    pub(crate) policy: OuterCapturePolicy,
    pub(crate) allowed_names: &'a [String],
}

impl SourceExtractor<'_> {
    /// Turn a resolved call into a [`CallSite`] carrying the exact text of
    /// every captured argument.
    ///
    /// Returns `None` when the outer-capture policy is `deny` and a captured
    /// argument reads a name the re-parsed snippet cannot see.
    pub(crate) fn extract(
        &self,
        resolved: &ResolvedCall<'_>,
        declaration: &CandidateDeclaration,
        diagnostics: &mut Vec<GeneratorDiagnostic>,
    ) -> Option<CallSite> {
        let mut bindings = Vec::new();
        let mut captures = Vec::new();
        let mut denied = false;

        for (position, (param, aligned)) in declaration
            .parameters
            .iter()
            .zip(&resolved.arguments)
            .enumerate()
        {
            let bound_by = match *aligned {
                Aligned::Receiver => continue,
                Aligned::Rest(bound_by) => bound_by,
                Aligned::Argument { expr, bound_by } => {
                    if param.is_captured() {
                        denied |= self.check_outer(resolved, declaration, &param.name, expr, diagnostics);
                        captures.push(CapturedArgument {
                            parameter: param.name.clone(),
                            position,
                            text: resolved.module.text_of(expr).to_string(),
                            range: expr.range(),
                        });
                    }
                    bound_by
                }
            };
            bindings.push(ArgumentBinding {
                parameter: param.name.clone(),
                bound_by,
            });
        }

        if denied {
            tracing::debug!(site = %resolved.id, "dropping call site that reads outer variables");
            return None;
        }

        Some(CallSite {
            id: resolved.id.clone(),
            declaration: resolved.declaration,
            bindings,
            captures,
            range: resolved.call.range(),
        })
    }

    /// Report outer names read by a captured argument. Returns `true` if
    /// the call site must be dropped.
    fn check_outer(
        &self,
        resolved: &ResolvedCall<'_>,
        declaration: &CandidateDeclaration,
        parameter: &str,
        expr: &ruff_python_ast::Expr,
        diagnostics: &mut Vec<GeneratorDiagnostic>,
    ) -> bool {
        if self.policy == OuterCapturePolicy::Allow {
            return false;
        }

        let names = self.outer_captures(declaration).find(expr);
        if names.is_empty() {
            return false;
        }

        let denied = self.policy == OuterCapturePolicy::Deny;
        diagnostics.push(GeneratorDiagnostic::OuterCapture {
            path: resolved.module.path().to_path_buf(),
            parameter: parameter.to_string(),
            names,
            span: span_of(expr),
            denied,
        });
        denied
    }

    /// Names visible to the re-parsed snippet: builtins, whatever the
    /// declaration file's kept imports bind, and configured extras.
    fn outer_captures(&self, declaration: &CandidateDeclaration) -> OuterCaptures {
        let imported = self
            .program
            .module_by_path(&declaration.path)
            .into_iter()
            .flat_map(|module| module.imports())
            .filter(|directive| directive.is_top_level())
            .filter(|directive| directive.render_without(&self.marker.module).is_some())
            .flat_map(|directive| directive.bound_names())
            .map(str::to_string)
            .collect::<Vec<_>>();

        OuterCaptures::new()
            .allow(imported)
            .allow(self.allowed_names.iter().cloned())
    }
}
