use capgen_conf::AmbiguityPolicy;
use capgen_python::collect_calls;
use capgen_python::CallExpr;
use capgen_python::Module;
use capgen_python::Program;
use capgen_python::SemanticModel;
use capgen_python::Symbol;
use capgen_source::Span;
use ruff_python_ast::Expr;
use ruff_python_ast::ExprCall;
use ruff_text_size::Ranged;
use thiserror::Error;

use crate::diagnostics::GeneratorDiagnostic;
use crate::model::BoundBy;
use crate::model::CallSiteId;
use crate::model::CandidateDeclaration;
use crate::model::ParameterKind;

/// A call whose callee is a capture declaration and whose arguments line up
/// with that declaration's parameters.
#[derive(Debug)]
pub(crate) struct ResolvedCall<'p> {
    pub(crate) module: &'p Module,
    pub(crate) call: &'p ExprCall,
    pub(crate) id: CallSiteId,
    pub(crate) declaration: usize,
    /// One entry per declaration parameter, receiver included.
    pub(crate) arguments: Vec<Aligned<'p>>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Aligned<'p> {
    Receiver,
    Argument { expr: &'p Expr, bound_by: BoundBy },
    /// A variadic parameter that receives whatever is left over.
    Rest(BoundBy),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum AlignError {
    #[error("argument unpacking with `*`")]
    StarredArgument,
    #[error("argument unpacking with `**`")]
    KeywordUnpacking,
    #[error("{count} positional argument(s) too many")]
    SurplusPositional { count: usize },
    #[error("unexpected keyword argument '{name}'")]
    UnknownKeyword { name: String },
    #[error("'{name}' given more than once")]
    DuplicateArgument { name: String },
    #[error("captured parameter '{name}' has no argument")]
    UnboundCapture { name: String },
    #[error("required parameter '{name}' has no argument")]
    MissingArgument { name: String },
}

pub(crate) struct CallResolver<'a, 'p> {
    pub(crate) program: &'p Program,
    pub(crate) model: &'a SemanticModel<'p>,
    pub(crate) declarations: &'a [CandidateDeclaration],
    pub(crate) ambiguity: AmbiguityPolicy,
}

impl<'p> CallResolver<'_, 'p> {
    /// Every call in the program that targets a capture declaration, in
    /// file order and then source order.
    pub(crate) fn resolve(&self, diagnostics: &mut Vec<GeneratorDiagnostic>) -> Vec<ResolvedCall<'p>> {
        let mut resolved = Vec::new();
        if self.declarations.is_empty() {
            return resolved;
        }

        for module in self.program.modules() {
            for call in collect_calls(module.body()) {
                if let Some(call) = self.resolve_one(module, &call, diagnostics) {
                    resolved.push(call);
                }
            }
        }
        resolved
    }

    fn resolve_one(
        &self,
        module: &'p Module,
        call: &CallExpr<'p>,
        diagnostics: &mut Vec<GeneratorDiagnostic>,
    ) -> Option<ResolvedCall<'p>> {
        let callee = module.text_of(&*call.call.func);
        let (line, column) = module.location(call.call.range());
        let info = self.model.resolve_call(module, call);

        if !info.is_resolved() {
            return None;
        }

        if info.is_ambiguous() && self.ambiguity == AmbiguityPolicy::Error {
            tracing::debug!(path = %module.path(), line, column, callee, "ambiguous callee");
            diagnostics.push(GeneratorDiagnostic::AmbiguousCallee {
                path: module.path().to_path_buf(),
                callee: callee.to_string(),
                candidates: info.candidates.iter().map(Symbol::qualified_name).collect(),
                span: span_of(call.call),
            });
            return None;
        }

        let symbol = info.first()?;
        let Some(index) = locate_declaration(self.declarations, symbol) else {
            tracing::trace!(symbol = %symbol.qualified_name(), "callee is not a capture declaration");
            return None;
        };
        let declaration = &self.declarations[index];

        let arguments = match align_arguments(declaration, call.call) {
            Ok(arguments) => arguments,
            Err(reason) => {
                tracing::debug!(
                    path = %module.path(),
                    line,
                    column,
                    declaration = %declaration.id,
                    %reason,
                    "dropping call site"
                );
                return None;
            }
        };

        Some(ResolvedCall {
            module,
            call: call.call,
            id: CallSiteId {
                path: module.path().to_path_buf(),
                line,
                column,
            },
            declaration: index,
            arguments,
        })
    }
}

pub(crate) fn span_of(node: &impl Ranged) -> Span {
    let range = node.range();
    Span::from_bounds(range.start().to_usize(), range.end().to_usize())
}

/// Find the declaration a resolved symbol refers to.
///
/// Tried in order: the exact definition, then the same qualified name (a
/// conditional redefinition dropped as a duplicate), then the first
/// declaration in program order with the same name.
pub(crate) fn locate_declaration(
    declarations: &[CandidateDeclaration],
    symbol: &Symbol,
) -> Option<usize> {
    let same_place = |d: &CandidateDeclaration| {
        d.id.namespace == symbol.module && d.id.class_path == symbol.class_path && d.id.name == symbol.name
    };

    declarations
        .iter()
        .position(|d| same_place(d) && d.range == symbol.range)
        .or_else(|| declarations.iter().position(same_place))
        .or_else(|| declarations.iter().position(|d| d.id.name == symbol.name))
}

/// Match the arguments of `call` to the parameters of `declaration`.
pub(crate) fn align_arguments<'p>(
    declaration: &CandidateDeclaration,
    call: &'p ExprCall,
) -> Result<Vec<Aligned<'p>>, AlignError> {
    let params = &declaration.parameters;
    let mut slots: Vec<Option<Aligned<'p>>> = params
        .iter()
        .map(|p| p.is_receiver().then_some(Aligned::Receiver))
        .collect();

    let positional_slots: Vec<usize> = params
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_receiver() && p.kind.accepts_positional())
        .map(|(index, _)| index)
        .collect();
    let var_positional = params
        .iter()
        .position(|p| p.kind == ParameterKind::VarPositional);
    let var_keyword = params
        .iter()
        .position(|p| p.kind == ParameterKind::VarKeyword);

    for (position, arg) in call.arguments.args.iter().enumerate() {
        if arg.is_starred_expr() {
            return Err(AlignError::StarredArgument);
        }
        if let Some(&slot) = positional_slots.get(position) {
            slots[slot] = Some(Aligned::Argument {
                expr: arg,
                bound_by: BoundBy::Positional(position),
            });
        } else if let Some(slot) = var_positional {
            slots[slot].get_or_insert(Aligned::Rest(BoundBy::Positional(position)));
        } else {
            return Err(AlignError::SurplusPositional {
                count: call.arguments.args.len() - positional_slots.len(),
            });
        }
    }

    for keyword in &call.arguments.keywords {
        let Some(name) = keyword.arg.as_ref().map(|arg| arg.as_str()) else {
            return Err(AlignError::KeywordUnpacking);
        };
        let target = params
            .iter()
            .position(|p| !p.is_receiver() && p.kind.accepts_keyword() && p.name == name);

        match target {
            Some(slot) if slots[slot].is_some() => {
                return Err(AlignError::DuplicateArgument {
                    name: name.to_string(),
                });
            }
            Some(slot) => {
                slots[slot] = Some(Aligned::Argument {
                    expr: &keyword.value,
                    bound_by: BoundBy::Keyword,
                });
            }
            None => match var_keyword {
                Some(slot) => {
                    slots[slot].get_or_insert(Aligned::Rest(BoundBy::Keyword));
                }
                None => {
                    return Err(AlignError::UnknownKeyword {
                        name: name.to_string(),
                    });
                }
            },
        }
    }

    params
        .iter()
        .zip(slots)
        .map(|(param, slot)| match slot {
            Some(aligned) => Ok(aligned),
            None if param.kind.is_variadic() => Ok(Aligned::Rest(BoundBy::Default)),
            None if param.is_captured() => Err(AlignError::UnboundCapture {
                name: param.name.clone(),
            }),
            None if param.default.is_some() => Ok(Aligned::Rest(BoundBy::Default)),
            None => Err(AlignError::MissingArgument {
                name: param.name.clone(),
            }),
        })
        .collect()
}
