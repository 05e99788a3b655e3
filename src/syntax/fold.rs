//! Owned tree folding
//!
//! Each `Fold` method consumes a node and returns its replacement. The default
//! implementations delegate to the free `fold_*` functions in this module,
//! which fold every child and rebuild the node with the same shape. An
//! implementor overrides the node kinds it cares about and calls the matching
//! free function to keep the children-first traversal.

use super::{Block, Expr, LocalDecl, MemberAccess, MethodDecl, Parameter, Stmt, TypeRef};

pub trait Fold {
    type Error;

    fn fold_method(&mut self, node: MethodDecl) -> Result<MethodDecl, Self::Error> {
        fold_method(self, node)
    }

    fn fold_parameter(&mut self, node: Parameter) -> Result<Parameter, Self::Error> {
        fold_parameter(self, node)
    }

    fn fold_block(&mut self, node: Block) -> Result<Block, Self::Error> {
        fold_block(self, node)
    }

    fn fold_stmt(&mut self, node: Stmt) -> Result<Stmt, Self::Error> {
        fold_stmt(self, node)
    }

    fn fold_local(&mut self, node: LocalDecl) -> Result<LocalDecl, Self::Error> {
        fold_local(self, node)
    }

    fn fold_expr(&mut self, node: Expr) -> Result<Expr, Self::Error> {
        fold_expr(self, node)
    }

    fn fold_member_access(&mut self, node: MemberAccess) -> Result<Expr, Self::Error> {
        fold_member_access(self, node)
    }

    fn fold_cast(&mut self, ty: TypeRef, expr: Expr) -> Result<Expr, Self::Error> {
        fold_cast(self, ty, expr)
    }

    fn fold_object_creation(
        &mut self,
        ty: TypeRef,
        args: Vec<Expr>,
        initializer: Option<Vec<(String, Expr)>>,
    ) -> Result<Expr, Self::Error> {
        fold_object_creation(self, ty, args, initializer)
    }

    fn fold_default(&mut self, ty: TypeRef) -> Result<Expr, Self::Error> {
        Ok(Expr::Default(ty))
    }
}

pub fn fold_method<F: Fold + ?Sized>(f: &mut F, node: MethodDecl) -> Result<MethodDecl, F::Error> {
    let parameters = node
        .parameters
        .into_iter()
        .map(|parameter| f.fold_parameter(parameter))
        .collect::<Result<Vec<_>, _>>()?;
    let body = f.fold_block(node.body)?;

    Ok(MethodDecl {
        parameters,
        body,
        ..node
    })
}

pub fn fold_parameter<F: Fold + ?Sized>(
    f: &mut F,
    node: Parameter,
) -> Result<Parameter, F::Error> {
    let attributes = node
        .attributes
        .into_iter()
        .map(|mut attribute| {
            attribute.arguments = fold_exprs(f, attribute.arguments)?;
            Ok(attribute)
        })
        .collect::<Result<Vec<_>, F::Error>>()?;

    Ok(Parameter { attributes, ..node })
}

pub fn fold_block<F: Fold + ?Sized>(f: &mut F, node: Block) -> Result<Block, F::Error> {
    let statements = node
        .statements
        .into_iter()
        .map(|stmt| f.fold_stmt(stmt))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Block { statements })
}

pub fn fold_stmt<F: Fold + ?Sized>(f: &mut F, node: Stmt) -> Result<Stmt, F::Error> {
    Ok(match node {
        Stmt::Local(local) => Stmt::Local(f.fold_local(local)?),
        Stmt::Expr(expr) => Stmt::Expr(f.fold_expr(expr)?),
        Stmt::Return(value) => Stmt::Return(value.map(|expr| f.fold_expr(expr)).transpose()?),
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => Stmt::If {
            cond: f.fold_expr(cond)?,
            then_branch: f.fold_block(then_branch)?,
            else_branch: else_branch.map(|block| f.fold_block(block)).transpose()?,
        },
        Stmt::For {
            init,
            cond,
            step,
            body,
        } => Stmt::For {
            init: match init {
                Some(init) => Some(Box::new(f.fold_stmt(*init)?)),
                None => None,
            },
            cond: cond.map(|expr| f.fold_expr(expr)).transpose()?,
            step: fold_exprs(f, step)?,
            body: f.fold_block(body)?,
        },
        Stmt::While { cond, body } => Stmt::While {
            cond: f.fold_expr(cond)?,
            body: f.fold_block(body)?,
        },
        Stmt::Foreach {
            ty,
            name,
            collection,
            body,
        } => Stmt::Foreach {
            ty,
            name,
            collection: f.fold_expr(collection)?,
            body: f.fold_block(body)?,
        },
        Stmt::Block(block) => Stmt::Block(f.fold_block(block)?),
        Stmt::Break => Stmt::Break,
        Stmt::Continue => Stmt::Continue,
    })
}

pub fn fold_local<F: Fold + ?Sized>(f: &mut F, node: LocalDecl) -> Result<LocalDecl, F::Error> {
    let declarators = node
        .declarators
        .into_iter()
        .map(|mut declarator| {
            declarator.init = declarator.init.map(|expr| f.fold_expr(expr)).transpose()?;
            Ok(declarator)
        })
        .collect::<Result<Vec<_>, F::Error>>()?;

    Ok(LocalDecl {
        ty: node.ty,
        declarators,
    })
}

pub fn fold_expr<F: Fold + ?Sized>(f: &mut F, node: Expr) -> Result<Expr, F::Error> {
    Ok(match node {
        Expr::Literal(_) | Expr::Ident(_) => node,
        Expr::MemberAccess(access) => return f.fold_member_access(access),
        Expr::Cast { ty, expr } => return f.fold_cast(ty, *expr),
        Expr::ObjectCreation {
            ty,
            args,
            initializer,
        } => return f.fold_object_creation(ty, args, initializer),
        Expr::Default(ty) => return f.fold_default(ty),
        Expr::Invocation { callee, args } => Expr::Invocation {
            callee: Box::new(f.fold_expr(*callee)?),
            args: fold_exprs(f, args)?,
        },
        Expr::ElementAccess { target, index } => Expr::ElementAccess {
            target: Box::new(f.fold_expr(*target)?),
            index: Box::new(f.fold_expr(*index)?),
        },
        Expr::Unary { op, expr } => Expr::Unary {
            op,
            expr: Box::new(f.fold_expr(*expr)?),
        },
        Expr::Binary { op, lhs, rhs } => Expr::Binary {
            op,
            lhs: Box::new(f.fold_expr(*lhs)?),
            rhs: Box::new(f.fold_expr(*rhs)?),
        },
        Expr::Assign { op, target, value } => Expr::Assign {
            op,
            target: Box::new(f.fold_expr(*target)?),
            value: Box::new(f.fold_expr(*value)?),
        },
        Expr::Conditional {
            cond,
            then_expr,
            else_expr,
        } => Expr::Conditional {
            cond: Box::new(f.fold_expr(*cond)?),
            then_expr: Box::new(f.fold_expr(*then_expr)?),
            else_expr: Box::new(f.fold_expr(*else_expr)?),
        },
        Expr::Paren(inner) => Expr::Paren(Box::new(f.fold_expr(*inner)?)),
        Expr::Lambda { params, body } => Expr::Lambda {
            params,
            body: Box::new(f.fold_expr(*body)?),
        },
    })
}

pub fn fold_member_access<F: Fold + ?Sized>(
    f: &mut F,
    node: MemberAccess,
) -> Result<Expr, F::Error> {
    Ok(Expr::MemberAccess(MemberAccess {
        target: Box::new(f.fold_expr(*node.target)?),
        member: node.member,
        span: node.span,
    }))
}

pub fn fold_cast<F: Fold + ?Sized>(f: &mut F, ty: TypeRef, expr: Expr) -> Result<Expr, F::Error> {
    Ok(Expr::Cast {
        ty,
        expr: Box::new(f.fold_expr(expr)?),
    })
}

pub fn fold_object_creation<F: Fold + ?Sized>(
    f: &mut F,
    ty: TypeRef,
    args: Vec<Expr>,
    initializer: Option<Vec<(String, Expr)>>,
) -> Result<Expr, F::Error> {
    let initializer = initializer
        .map(|fields| {
            fields
                .into_iter()
                .map(|(name, value)| Ok((name, f.fold_expr(value)?)))
                .collect::<Result<Vec<_>, F::Error>>()
        })
        .transpose()?;

    Ok(Expr::ObjectCreation {
        ty,
        args: fold_exprs(f, args)?,
        initializer,
    })
}

pub fn fold_exprs<F: Fold + ?Sized>(f: &mut F, exprs: Vec<Expr>) -> Result<Vec<Expr>, F::Error> {
    exprs.into_iter().map(|expr| f.fold_expr(expr)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{BinaryOp, Literal};
    use std::convert::Infallible;

    /// Doubles every integer literal.
    struct DoubleInts;

    impl Fold for DoubleInts {
        type Error = Infallible;

        fn fold_expr(&mut self, node: Expr) -> Result<Expr, Infallible> {
            match node {
                Expr::Literal(Literal::Int(value)) => Ok(Expr::int(value * 2)),
                other => fold_expr(self, other),
            }
        }
    }

    #[test]
    fn test_default_fold_reaches_nested_children() {
        let expr = Expr::cast(
            TypeRef::new("int"),
            Expr::binary(
                BinaryOp::Add,
                Expr::int(1),
                Expr::call(Expr::ident("f"), vec![Expr::int(2)]),
            ),
        );

        let folded = DoubleInts.fold_expr(expr).unwrap();
        let expected = Expr::cast(
            TypeRef::new("int"),
            Expr::binary(
                BinaryOp::Add,
                Expr::int(2),
                Expr::call(Expr::ident("f"), vec![Expr::int(4)]),
            ),
        );
        assert_eq!(folded, expected);
    }

    #[test]
    fn test_fold_returns_new_tree_and_leaves_original_intact() {
        let original = Block::new(vec![Stmt::Return(Some(Expr::int(21)))]);
        let folded = DoubleInts.fold_block(original.clone()).unwrap();

        assert_eq!(original.statements, vec![Stmt::Return(Some(Expr::int(21)))]);
        assert_eq!(folded.statements, vec![Stmt::Return(Some(Expr::int(42)))]);
    }
}
