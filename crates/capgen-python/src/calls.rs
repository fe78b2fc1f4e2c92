use ruff_python_ast::visitor::walk_expr;
use ruff_python_ast::visitor::walk_stmt;
use ruff_python_ast::visitor::Visitor;
use ruff_python_ast::Expr;
use ruff_python_ast::ExprCall;
use ruff_python_ast::Stmt;

use crate::ext::FunctionDefExt;

/// The implicit receiver in scope at a call: `self` or `cls` of the
/// innermost enclosing method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverScope {
    pub name: String,
    pub class_path: Vec<String>,
}

/// A call expression and the lexical context needed to resolve its callee.
#[derive(Debug, Clone)]
pub struct CallExpr<'a> {
    pub call: &'a ExprCall,
    pub receiver: Option<ReceiverScope>,
}

/// Every call in a module body, in source order of the call's start.
///
/// Calls nested in arguments, lambdas, decorators, default values and class
/// bodies are all included.
#[must_use]
pub fn collect_calls(body: &[Stmt]) -> Vec<CallExpr<'_>> {
    let mut collector = CallCollector::default();
    collector.visit_body(body);
    collector.calls.sort_by_key(|c| c.call.range.start());
    collector.calls
}

#[derive(Debug)]
enum Frame {
    Class(String),
    Function(Option<ReceiverScope>),
}

#[derive(Default)]
struct CallCollector<'a> {
    frames: Vec<Frame>,
    calls: Vec<CallExpr<'a>>,
}

impl CallCollector<'_> {
    fn class_path(&self) -> Vec<String> {
        self.frames
            .iter()
            .rev()
            .map_while(|frame| match frame {
                Frame::Class(name) => Some(name.clone()),
                Frame::Function(_) => None,
            })
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect()
    }

    fn in_class_body(&self) -> bool {
        matches!(self.frames.last(), Some(Frame::Class(_)))
    }

    fn receiver(&self) -> Option<ReceiverScope> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Function(receiver) => receiver.clone(),
            Frame::Class(_) => None,
        })
    }
}

impl<'a> Visitor<'a> for CallCollector<'a> {
    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::FunctionDef(def) => {
                for decorator in &def.decorator_list {
                    self.visit_expr(&decorator.expression);
                }
                let params = &def.parameters;
                for param in params
                    .posonlyargs
                    .iter()
                    .chain(&params.args)
                    .chain(&params.kwonlyargs)
                {
                    if let Some(default) = &param.default {
                        self.visit_expr(default);
                    }
                }

                let in_class = self.in_class_body();
                let receiver = def.receiver_name(in_class).map(|name| ReceiverScope {
                    name: name.to_string(),
                    class_path: self.class_path(),
                });

                self.frames.push(Frame::Function(receiver));
                self.visit_body(&def.body);
                self.frames.pop();
            }
            Stmt::ClassDef(class) => {
                for decorator in &class.decorator_list {
                    self.visit_expr(&decorator.expression);
                }
                if let Some(arguments) = &class.arguments {
                    self.visit_arguments(arguments);
                }

                self.frames.push(Frame::Class(class.name.as_str().to_string()));
                self.visit_body(&class.body);
                self.frames.pop();
            }
            _ => walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &'a Expr) {
        if let Expr::Call(call) = expr {
            self.calls.push(CallExpr {
                call,
                receiver: self.receiver(),
            });
        }
        walk_expr(self, expr);
    }
}
