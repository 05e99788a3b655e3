//! Source printer
//!
//! Renders trees with C-family syntax. Constructs that only exist in the host
//! language (`new`, `default`, attributes, lambdas) keep their host spelling,
//! so a tree that went through the shader rewriter prints as plain HLSL.

use super::{
    Attribute, Block, Expr, Literal, LocalDecl, MethodDecl, Parameter, Stmt, UnaryOp,
};

const INDENT: &str = "    ";

/// Render a method declaration, body included.
pub fn render_method(method: &MethodDecl) -> String {
    let mut writer = SourceWriter::new();
    writer.emit_method(method);
    writer.finish()
}

/// Render a single statement (nested blocks are indented relative to it).
pub fn render_stmt(stmt: &Stmt) -> String {
    let mut writer = SourceWriter::new();
    writer.emit_stmt(stmt);
    writer.finish()
}

/// Render an expression on a single line.
pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(literal) => render_literal(literal),
        Expr::Ident(name) => name.clone(),
        Expr::MemberAccess(access) => {
            format!("{}.{}", render_operand(&access.target), access.member)
        }
        Expr::Invocation { callee, args } => {
            format!("{}({})", render_operand(callee), render_args(args))
        }
        Expr::ElementAccess { target, index } => {
            format!("{}[{}]", render_operand(target), render_expr(index))
        }
        Expr::Cast { ty, expr } => format!("({}){}", ty.name, render_operand(expr)),
        Expr::ObjectCreation {
            ty,
            args,
            initializer,
        } => {
            let mut out = format!("new {}({})", ty.name, render_args(args));
            if let Some(fields) = initializer {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|(name, value)| format!("{} = {}", name, render_expr(value)))
                    .collect();
                out.push_str(&format!(" {{ {} }}", fields.join(", ")));
            }
            out
        }
        Expr::Default(ty) => format!("default({})", ty.name),
        Expr::Unary { op, expr } => {
            let operand = render_operand(expr);
            match op {
                UnaryOp::Neg => format!("-{}", operand),
                UnaryOp::Not => format!("!{}", operand),
                UnaryOp::BitNot => format!("~{}", operand),
                UnaryOp::PreIncrement => format!("++{}", operand),
                UnaryOp::PreDecrement => format!("--{}", operand),
                UnaryOp::PostIncrement => format!("{}++", operand),
                UnaryOp::PostDecrement => format!("{}--", operand),
            }
        }
        Expr::Binary { op, lhs, rhs } => format!(
            "{} {} {}",
            render_binary_operand(lhs, op.precedence(), false),
            op.symbol(),
            render_binary_operand(rhs, op.precedence(), true)
        ),
        Expr::Assign { op, target, value } => {
            let symbol = op.map(|op| op.symbol()).unwrap_or("");
            format!("{} {}= {}", render_expr(target), symbol, render_expr(value))
        }
        Expr::Conditional {
            cond,
            then_expr,
            else_expr,
        } => format!(
            "{} ? {} : {}",
            render_expr(cond),
            render_expr(then_expr),
            render_expr(else_expr)
        ),
        Expr::Paren(inner) => format!("({})", render_expr(inner)),
        Expr::Lambda { params, body } => {
            format!("({}) => {}", params.join(", "), render_expr(body))
        }
    }
}

/// Operands of postfix/prefix forms need parentheses unless they are primary.
fn render_operand(expr: &Expr) -> String {
    match expr {
        Expr::Binary { .. } | Expr::Assign { .. } | Expr::Conditional { .. } | Expr::Lambda { .. } => {
            format!("({})", render_expr(expr))
        }
        _ => render_expr(expr),
    }
}

/// A child of a binary expression keeps its grouping: looser operators are
/// parenthesized, and so is an equally tight one on the right.
fn render_binary_operand(expr: &Expr, parent: u8, right: bool) -> String {
    match expr {
        Expr::Binary { op, .. } => {
            let child = op.precedence();
            if child < parent || (right && child == parent) {
                format!("({})", render_expr(expr))
            } else {
                render_expr(expr)
            }
        }
        Expr::Assign { .. } | Expr::Conditional { .. } | Expr::Lambda { .. } => {
            format!("({})", render_expr(expr))
        }
        _ => render_expr(expr),
    }
}

fn render_args(args: &[Expr]) -> String {
    args.iter().map(render_expr).collect::<Vec<_>>().join(", ")
}

fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Bool(value) => value.to_string(),
        Literal::Int(value) => value.to_string(),
        Literal::UInt(value) => format!("{}u", value),
        Literal::Float(value) => format!("{:?}f", value),
        Literal::Double(value) => format!("{:?}L", value),
        Literal::String(value) => format!("{:?}", value),
        Literal::Null => "null".to_string(),
    }
}

fn render_attributes(attributes: &[Attribute]) -> String {
    attributes
        .iter()
        .map(|attribute| {
            if attribute.arguments.is_empty() {
                format!("[{}]", attribute.name)
            } else {
                format!("[{}({})]", attribute.name, render_args(&attribute.arguments))
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

fn render_parameter(parameter: &Parameter) -> String {
    let mut out = render_attributes(&parameter.attributes);
    if !out.is_empty() {
        out.push(' ');
    }
    if let Some(keyword) = parameter.modifier.keyword() {
        out.push_str(keyword);
        out.push(' ');
    }
    out.push_str(&format!("{} {}", parameter.ty.name, parameter.name));
    out
}

fn render_local(local: &LocalDecl) -> String {
    let ty = local.ty.as_ref().map(|ty| ty.name.as_str()).unwrap_or("var");
    let declarators: Vec<String> = local
        .declarators
        .iter()
        .map(|declarator| match &declarator.init {
            Some(init) => format!("{} = {}", declarator.name, render_expr(init)),
            None => declarator.name.clone(),
        })
        .collect();
    format!("{} {}", ty, declarators.join(", "))
}

/// Statement forms that can appear in a `for` header.
fn render_inline_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Local(local) => render_local(local),
        Stmt::Expr(expr) => render_expr(expr),
        other => render_stmt(other).trim_end_matches(';').to_string(),
    }
}

/// Line-oriented writer with indentation tracking.
struct SourceWriter {
    code: String,
    indent: usize,
}

impl SourceWriter {
    fn new() -> Self {
        Self {
            code: String::new(),
            indent: 0,
        }
    }

    fn finish(self) -> String {
        self.code.trim_end().to_string()
    }

    fn push_line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.code.push_str(INDENT);
        }
        self.code.push_str(line);
        self.code.push('\n');
    }

    fn emit_method(&mut self, method: &MethodDecl) {
        let attributes = render_attributes(&method.attributes);
        if !attributes.is_empty() {
            self.push_line(&attributes);
        }
        let parameters: Vec<String> = method.parameters.iter().map(render_parameter).collect();
        self.push_line(&format!(
            "{} {}({})",
            method.return_type.name,
            method.name,
            parameters.join(", ")
        ));
        self.emit_block(&method.body);
    }

    fn emit_block(&mut self, block: &Block) {
        self.push_line("{");
        self.indent += 1;
        for stmt in &block.statements {
            self.emit_stmt(stmt);
        }
        self.indent -= 1;
        self.push_line("}");
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Local(local) => self.push_line(&format!("{};", render_local(local))),
            Stmt::Expr(expr) => self.push_line(&format!("{};", render_expr(expr))),
            Stmt::Return(Some(value)) => {
                self.push_line(&format!("return {};", render_expr(value)))
            }
            Stmt::Return(None) => self.push_line("return;"),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.push_line(&format!("if ({})", render_expr(cond)));
                self.emit_block(then_branch);
                if let Some(else_branch) = else_branch {
                    self.push_line("else");
                    self.emit_block(else_branch);
                }
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                let init = init.as_deref().map(render_inline_stmt).unwrap_or_default();
                let cond = cond.as_ref().map(render_expr).unwrap_or_default();
                self.push_line(&format!("for ({}; {}; {})", init, cond, render_args(step)));
                self.emit_block(body);
            }
            Stmt::While { cond, body } => {
                self.push_line(&format!("while ({})", render_expr(cond)));
                self.emit_block(body);
            }
            Stmt::Foreach {
                ty,
                name,
                collection,
                body,
            } => {
                self.push_line(&format!(
                    "foreach ({} {} in {})",
                    ty.name,
                    name,
                    render_expr(collection)
                ));
                self.emit_block(body);
            }
            Stmt::Block(block) => self.emit_block(block),
            Stmt::Break => self.push_line("break;"),
            Stmt::Continue => self.push_line("continue;"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{BinaryOp, ParamModifier, TypeRef};

    #[test]
    fn test_render_cast_wraps_compound_operand() {
        let expr = Expr::cast(
            TypeRef::new("float"),
            Expr::binary(BinaryOp::Add, Expr::ident("a"), Expr::int(1)),
        );
        assert_eq!(render_expr(&expr), "(float)(a + 1)");
        assert_eq!(render_expr(&Expr::zero_of(TypeRef::new("float3"))), "(float3)0");
    }

    #[test]
    fn test_render_binary_keeps_grouping() {
        let a = || Expr::ident("a");
        let b = || Expr::ident("b");
        let c = || Expr::ident("c");

        let nested_right = Expr::binary(BinaryOp::Sub, a(), Expr::binary(BinaryOp::Sub, b(), c()));
        assert_eq!(render_expr(&nested_right), "a - (b - c)");

        let nested_left = Expr::binary(BinaryOp::Sub, Expr::binary(BinaryOp::Sub, a(), b()), c());
        assert_eq!(render_expr(&nested_left), "a - b - c");

        let looser_left = Expr::binary(BinaryOp::Mul, Expr::binary(BinaryOp::Add, a(), b()), c());
        assert_eq!(render_expr(&looser_left), "(a + b) * c");

        let tighter_right = Expr::binary(BinaryOp::Add, a(), Expr::binary(BinaryOp::Mul, b(), c()));
        assert_eq!(render_expr(&tighter_right), "a + b * c");

        let logical = Expr::binary(
            BinaryOp::And,
            Expr::binary(BinaryOp::Or, a(), b()),
            Expr::binary(BinaryOp::Lt, c(), Expr::int(1)),
        );
        assert_eq!(render_expr(&logical), "(a || b) && c < 1");
    }

    #[test]
    fn test_render_literals() {
        assert_eq!(render_expr(&Expr::float(1.0)), "1.0f");
        assert_eq!(render_expr(&Expr::float(0.25)), "0.25f");
        assert_eq!(render_expr(&Expr::Literal(Literal::UInt(7))), "7u");
        assert_eq!(render_expr(&Expr::Literal(Literal::Bool(true))), "true");
    }

    #[test]
    fn test_render_method_layout() {
        let method = MethodDecl::new(TypeRef::new("void"), "Run")
            .with_parameter(
                Parameter::new(TypeRef::new("float"), "t").with_modifier(ParamModifier::InOut),
            )
            .with_body(vec![
                Stmt::Local(LocalDecl::single(
                    TypeRef::new("float"),
                    "x",
                    Some(Expr::float(2.0)),
                )),
                Stmt::If {
                    cond: Expr::binary(BinaryOp::Gt, Expr::ident("x"), Expr::ident("t")),
                    then_branch: Block::new(vec![Stmt::Expr(Expr::assign(
                        Expr::ident("t"),
                        Expr::ident("x"),
                    ))]),
                    else_branch: None,
                },
            ]);

        let expected = "void Run(inout float t)\n{\n    float x = 2.0f;\n    if (x > t)\n    {\n        t = x;\n    }\n}";
        assert_eq!(render_method(&method), expected);
    }

    #[test]
    fn test_render_for_header() {
        let stmt = Stmt::For {
            init: Some(Box::new(Stmt::Local(LocalDecl::single(
                TypeRef::new("int"),
                "i",
                Some(Expr::int(0)),
            )))),
            cond: Some(Expr::binary(BinaryOp::Lt, Expr::ident("i"), Expr::int(4))),
            step: vec![Expr::Unary {
                op: UnaryOp::PostIncrement,
                expr: Box::new(Expr::ident("i")),
            }],
            body: Block::default(),
        };
        assert_eq!(render_stmt(&stmt), "for (int i = 0; i < 4; i++)\n{\n}");
    }
}
