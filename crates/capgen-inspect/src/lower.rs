use ruff_python_ast::BoolOp;
use ruff_python_ast::CmpOp;
use ruff_python_ast::Expr;
use ruff_python_ast::Number;
use ruff_python_ast::Operator;
use ruff_python_ast::Parameters;
use ruff_python_ast::UnaryOp;
use ruff_text_size::Ranged;

use crate::InspectError;
use crate::OuterCaptures;

/// The closed set of expression shapes a captured lambda may use.
#[derive(Debug, Clone, PartialEq)]
pub enum CapturedExpr {
    Lambda {
        parameters: Vec<String>,
        body: Box<CapturedExpr>,
    },
    Binary {
        op: Operator,
        left: Box<CapturedExpr>,
        right: Box<CapturedExpr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<CapturedExpr>,
    },
    Bool {
        op: BoolOp,
        values: Vec<CapturedExpr>,
    },
    Compare {
        left: Box<CapturedExpr>,
        comparisons: Vec<(CmpOp, CapturedExpr)>,
    },
    Conditional {
        test: Box<CapturedExpr>,
        body: Box<CapturedExpr>,
        orelse: Box<CapturedExpr>,
    },
    /// `name := value`
    Declare {
        name: String,
        value: Box<CapturedExpr>,
    },
    /// A call, which covers object construction.
    Call {
        func: Box<CapturedExpr>,
        args: Vec<CapturedExpr>,
        keywords: Vec<(String, CapturedExpr)>,
    },
    Attribute {
        value: Box<CapturedExpr>,
        attr: String,
    },
    Tuple(Vec<CapturedExpr>),
    Literal(Literal),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Ellipsis,
}

/// Converts captured expressions into [`CapturedExpr`], refusing anything
/// outside the closed grammar and any reference to an outer variable.
#[derive(Debug, Clone, Default)]
pub struct Lowering {
    outer: OuterCaptures,
}

impl Lowering {
    #[must_use]
    pub fn new(outer: OuterCaptures) -> Self {
        Self { outer }
    }

    pub fn lower(&self, expr: &Expr) -> Result<CapturedExpr, InspectError> {
        let names = self.outer.find(expr);
        if !names.is_empty() {
            return Err(InspectError::OuterCapture { names });
        }
        lower_expr(expr)
    }
}

/// Lower `expr` with only the builtins allowed as free names.
pub fn lower_capture(expr: &Expr) -> Result<CapturedExpr, InspectError> {
    Lowering::default().lower(expr)
}

fn boxed(expr: &Expr) -> Result<Box<CapturedExpr>, InspectError> {
    lower_expr(expr).map(Box::new)
}

fn lower_all<'a>(
    exprs: impl IntoIterator<Item = &'a Expr>,
) -> Result<Vec<CapturedExpr>, InspectError> {
    exprs.into_iter().map(lower_expr).collect()
}

fn unsupported(construct: &'static str, node: &impl Ranged) -> InspectError {
    InspectError::UnsupportedConstruct {
        construct,
        offset: node.start().to_usize(),
    }
}

fn lower_expr(expr: &Expr) -> Result<CapturedExpr, InspectError> {
    let lowered = match expr {
        Expr::Lambda(lambda) => CapturedExpr::Lambda {
            parameters: lower_parameters(lambda.parameters.as_deref())?,
            body: boxed(&lambda.body)?,
        },
        Expr::BinOp(bin) => CapturedExpr::Binary {
            op: bin.op,
            left: boxed(&bin.left)?,
            right: boxed(&bin.right)?,
        },
        Expr::UnaryOp(unary) => CapturedExpr::Unary {
            op: unary.op,
            operand: boxed(&unary.operand)?,
        },
        Expr::BoolOp(bool_op) => CapturedExpr::Bool {
            op: bool_op.op,
            values: lower_all(&bool_op.values)?,
        },
        Expr::Compare(compare) => CapturedExpr::Compare {
            left: boxed(&compare.left)?,
            comparisons: compare
                .ops
                .iter()
                .zip(compare.comparators.iter())
                .map(|(op, right)| lower_expr(right).map(|right| (*op, right)))
                .collect::<Result<_, _>>()?,
        },
        Expr::If(if_expr) => CapturedExpr::Conditional {
            test: boxed(&if_expr.test)?,
            body: boxed(&if_expr.body)?,
            orelse: boxed(&if_expr.orelse)?,
        },
        Expr::Named(named) => {
            let Some(target) = named.target.as_name_expr() else {
                return Err(unsupported("assignment target", &*named.target));
            };
            CapturedExpr::Declare {
                name: target.id.as_str().to_string(),
                value: boxed(&named.value)?,
            }
        }
        Expr::Call(call) => {
            let keywords = call
                .arguments
                .keywords
                .iter()
                .map(|keyword| match &keyword.arg {
                    Some(arg) => lower_expr(&keyword.value).map(|v| (arg.as_str().to_string(), v)),
                    None => Err(unsupported("keyword unpacking", keyword)),
                })
                .collect::<Result<_, _>>()?;
            CapturedExpr::Call {
                func: boxed(&call.func)?,
                args: lower_all(call.arguments.args.iter())?,
                keywords,
            }
        }
        Expr::Attribute(attribute) => CapturedExpr::Attribute {
            value: boxed(&attribute.value)?,
            attr: attribute.attr.as_str().to_string(),
        },
        Expr::Tuple(tuple) => CapturedExpr::Tuple(lower_all(&tuple.elts)?),
        Expr::Name(name) => CapturedExpr::Name(name.id.as_str().to_string()),
        Expr::NoneLiteral(_) => CapturedExpr::Literal(Literal::None),
        Expr::BooleanLiteral(lit) => CapturedExpr::Literal(Literal::Bool(lit.value)),
        Expr::EllipsisLiteral(_) => CapturedExpr::Literal(Literal::Ellipsis),
        Expr::StringLiteral(lit) => {
            CapturedExpr::Literal(Literal::Str(lit.value.to_str().to_string()))
        }
        Expr::NumberLiteral(lit) => match &lit.value {
            Number::Int(int) => match int.as_i64() {
                Some(value) => CapturedExpr::Literal(Literal::Int(value)),
                None => return Err(unsupported("integer literal out of range", expr)),
            },
            Number::Float(value) => CapturedExpr::Literal(Literal::Float(*value)),
            Number::Complex { .. } => return Err(unsupported("complex literal", expr)),
        },
        other => return Err(unsupported(construct_name(other), other)),
    };
    Ok(lowered)
}

fn lower_parameters(parameters: Option<&Parameters>) -> Result<Vec<String>, InspectError> {
    let Some(parameters) = parameters else {
        return Ok(Vec::new());
    };

    if let Some(variadic) = parameters.vararg.as_deref().or(parameters.kwarg.as_deref()) {
        return Err(unsupported("variadic lambda parameter", variadic));
    }
    if let Some(kwonly) = parameters.kwonlyargs.first() {
        return Err(unsupported("keyword-only lambda parameter", kwonly));
    }

    parameters
        .posonlyargs
        .iter()
        .chain(&parameters.args)
        .map(|param| match &param.default {
            Some(default) => Err(unsupported("lambda parameter default", &**default)),
            None => Ok(param.parameter.name.as_str().to_string()),
        })
        .collect()
}

fn construct_name(expr: &Expr) -> &'static str {
    match expr {
        Expr::List(_) => "list display",
        Expr::Dict(_) => "dict display",
        Expr::Set(_) => "set display",
        Expr::ListComp(_) => "list comprehension",
        Expr::SetComp(_) => "set comprehension",
        Expr::DictComp(_) => "dict comprehension",
        Expr::Generator(_) => "generator expression",
        Expr::Await(_) => "await expression",
        Expr::Yield(_) | Expr::YieldFrom(_) => "yield expression",
        Expr::FString(_) => "formatted string",
        Expr::BytesLiteral(_) => "bytes literal",
        Expr::Subscript(_) => "subscript",
        Expr::Starred(_) => "starred expression",
        Expr::Slice(_) => "slice",
        _ => "expression",
    }
}
