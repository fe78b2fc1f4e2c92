use ruff_python_ast::Expr;
use ruff_python_ast::ExprAttribute;
use ruff_python_ast::ExprName;
use ruff_python_ast::StmtFunctionDef;

use crate::Receiver;

pub trait ExprExt {
    /// `pkg.mod.func` as `["pkg", "mod", "func"]`, or `None` if the chain
    /// does not bottom out in a plain name.
    fn dotted_path(&self) -> Option<Vec<&str>>;

    /// The final name of a `Name` or `Attribute` expression.
    fn terminal_name(&self) -> Option<&str>;
}

impl ExprExt for Expr {
    fn dotted_path(&self) -> Option<Vec<&str>> {
        match self {
            Expr::Name(ExprName { id, .. }) => Some(vec![id.as_str()]),
            Expr::Attribute(ExprAttribute { value, attr, .. }) => {
                let mut path = value.dotted_path()?;
                path.push(attr.as_str());
                Some(path)
            }
            _ => None,
        }
    }

    fn terminal_name(&self) -> Option<&str> {
        match self {
            Expr::Name(ExprName { id, .. }) => Some(id.as_str()),
            Expr::Attribute(ExprAttribute { attr, .. }) => Some(attr.as_str()),
            _ => None,
        }
    }
}

pub trait FunctionDefExt {
    fn has_decorator(&self, name: &str) -> bool;

    /// How the function receives its first argument, given whether it is
    /// defined directly in a class body.
    fn receiver(&self, in_class: bool) -> Receiver;

    /// Name of the implicit first parameter (`self`, `cls`), if any.
    fn receiver_name(&self, in_class: bool) -> Option<&str>;
}

impl FunctionDefExt for StmtFunctionDef {
    fn has_decorator(&self, name: &str) -> bool {
        self.decorator_list
            .iter()
            .any(|decorator| decorator.expression.terminal_name() == Some(name))
    }

    fn receiver(&self, in_class: bool) -> Receiver {
        if !in_class {
            Receiver::Module
        } else if self.has_decorator("staticmethod") {
            Receiver::Static
        } else if self.has_decorator("classmethod") {
            Receiver::Class
        } else {
            Receiver::Instance
        }
    }

    fn receiver_name(&self, in_class: bool) -> Option<&str> {
        if !self.receiver(in_class).binds_first_argument() {
            return None;
        }
        let params = &self.parameters;
        params
            .posonlyargs
            .first()
            .or_else(|| params.args.first())
            .map(|p| p.parameter.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use ruff_python_ast::Stmt;

    use super::*;

    fn first_expr(source: &str) -> Expr {
        let parsed = ruff_python_parser::parse_module(source).unwrap();
        match parsed.into_syntax().body.into_iter().next() {
            Some(Stmt::Expr(stmt)) => *stmt.value,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn method(source: &str) -> StmtFunctionDef {
        let parsed = ruff_python_parser::parse_module(source).unwrap();
        let body = parsed.into_syntax().body;
        let Some(Stmt::ClassDef(class)) = body.into_iter().next() else {
            panic!("expected class");
        };
        match class.body.into_iter().next() {
            Some(Stmt::FunctionDef(def)) => def,
            other => panic!("expected method, got {other:?}"),
        }
    }

    #[test]
    fn dotted_path_of_attribute_chain() {
        let expr = first_expr("pkg.mod.func\n");
        assert_eq!(expr.dotted_path(), Some(vec!["pkg", "mod", "func"]));
    }

    #[test]
    fn dotted_path_rejects_calls() {
        let expr = first_expr("make().func\n");
        assert_eq!(expr.dotted_path(), None);
    }

    #[test]
    fn receiver_kinds() {
        let instance = method("class A:\n    def f(this, x): pass\n");
        assert_eq!(instance.receiver(true), Receiver::Instance);
        assert_eq!(instance.receiver_name(true), Some("this"));

        let class = method("class A:\n    @classmethod\n    def f(klass): pass\n");
        assert_eq!(class.receiver(true), Receiver::Class);
        assert_eq!(class.receiver_name(true), Some("klass"));

        let stat = method("class A:\n    @staticmethod\n    def f(x): pass\n");
        assert_eq!(stat.receiver(true), Receiver::Static);
        assert_eq!(stat.receiver_name(true), None);
    }
}
