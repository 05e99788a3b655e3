//! Host-language syntax tree
//!
//! An owned, immutable tree for the translatable subset of a C#-style method
//! body. Trees are produced by the caller (usually a parser that lives outside
//! this crate), rewritten by folding into new trees, and rendered back to
//! source with [`printer`]. Host and HLSL syntax overlap closely, so a tree that
//! only contains HLSL-legal shapes prints as HLSL.

pub mod fold;
pub mod printer;

use std::fmt;

/// Source position of a node, 1-based. `Span::UNKNOWN` for synthesized nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub const UNKNOWN: Span = Span { line: 0, column: 0 };

    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn is_known(&self) -> bool {
        self.line != 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "line {}, column {}", self.line, self.column)
        } else {
            f.write_str("unknown location")
        }
    }
}

/// A reference to a type by name, e.g. `System.Numerics.Vector3` or `float3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: String,
    pub span: Span,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            span: Span::UNKNOWN,
        }
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub arguments: Vec<Expr>,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }
}

/// Parameter passing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamModifier {
    #[default]
    None,
    In,
    Out,
    Ref,
    InOut,
}

impl ParamModifier {
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            ParamModifier::None => None,
            ParamModifier::In => Some("in"),
            ParamModifier::Out => Some("out"),
            ParamModifier::Ref => Some("ref"),
            ParamModifier::InOut => Some("inout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub attributes: Vec<Attribute>,
    pub modifier: ParamModifier,
    pub ty: TypeRef,
    pub name: String,
}

impl Parameter {
    pub fn new(ty: TypeRef, name: impl Into<String>) -> Self {
        Self {
            attributes: Vec::new(),
            modifier: ParamModifier::None,
            ty,
            name: name.into(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_modifier(mut self, modifier: ParamModifier) -> Self {
        self.modifier = modifier;
        self
    }
}

/// A method declaration: the unit of translation.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub attributes: Vec<Attribute>,
    pub return_type: TypeRef,
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub body: Block,
}

impl MethodDecl {
    pub fn new(return_type: TypeRef, name: impl Into<String>) -> Self {
        Self {
            attributes: Vec::new(),
            return_type,
            name: name.into(),
            parameters: Vec::new(),
            body: Block::default(),
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_body(mut self, statements: Vec<Stmt>) -> Self {
        self.body = Block::new(statements);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

impl Block {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Expr>,
}

/// A local variable declaration. `ty` is `None` for implicitly typed (`var`) locals.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalDecl {
    pub ty: Option<TypeRef>,
    pub declarators: Vec<Declarator>,
}

impl LocalDecl {
    pub fn single(ty: TypeRef, name: impl Into<String>, init: Option<Expr>) -> Self {
        Self {
            ty: Some(ty),
            declarators: vec![Declarator {
                name: name.into(),
                init,
            }],
        }
    }

    pub fn implicit(name: impl Into<String>, init: Expr) -> Self {
        Self {
            ty: None,
            declarators: vec![Declarator {
                name: name.into(),
                init: Some(init),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Local(LocalDecl),
    Expr(Expr),
    Return(Option<Expr>),
    If {
        cond: Expr,
        then_branch: Block,
        else_branch: Option<Block>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Vec<Expr>,
        body: Block,
    },
    While {
        cond: Expr,
        body: Block,
    },
    Foreach {
        ty: TypeRef,
        name: String,
        collection: Expr,
        body: Block,
    },
    Block(Block),
    Break,
    Continue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    String(String),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }

    /// Binding strength, C rules; higher binds tighter. All binary operators
    /// are left-associative.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 10,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Shl | BinaryOp::Shr => 8,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 7,
            BinaryOp::Eq | BinaryOp::Ne => 6,
            BinaryOp::BitAnd => 5,
            BinaryOp::BitXor => 4,
            BinaryOp::BitOr => 3,
            BinaryOp::And => 2,
            BinaryOp::Or => 1,
        }
    }
}

/// Assignment operator; `None` is plain `=`, otherwise a compound assignment.
pub type AssignOp = Option<BinaryOp>;

/// `target.member`
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess {
    pub target: Box<Expr>,
    pub member: String,
    pub span: Span,
}

impl MemberAccess {
    /// The dotted path of the target when it is a plain chain of identifiers,
    /// e.g. `System.Math` for `System.Math.PI`.
    pub fn target_path(&self) -> Option<String> {
        self.target.as_path()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Ident(String),
    MemberAccess(MemberAccess),
    Invocation {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    ElementAccess {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Cast {
        ty: TypeRef,
        expr: Box<Expr>,
    },
    /// `new T(args) { initializer }`
    ObjectCreation {
        ty: TypeRef,
        args: Vec<Expr>,
        initializer: Option<Vec<(String, Expr)>>,
    },
    /// `default(T)`
    Default(TypeRef),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Paren(Box<Expr>),
    Lambda {
        params: Vec<String>,
        body: Box<Expr>,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }

    pub fn float(value: f32) -> Self {
        Expr::Literal(Literal::Float(value))
    }

    pub fn member(target: Expr, member: impl Into<String>) -> Self {
        Expr::MemberAccess(MemberAccess {
            target: Box::new(target),
            member: member.into(),
            span: Span::UNKNOWN,
        })
    }

    /// Builds a member access chain from a dotted path, e.g. `Constants.Scale`.
    pub fn path(path: &str) -> Self {
        let mut segments = path.split('.');
        let first = Expr::ident(segments.next().unwrap_or_default());
        segments.fold(first, Expr::member)
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Invocation {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn new_object(ty: TypeRef, args: Vec<Expr>) -> Self {
        Expr::ObjectCreation {
            ty,
            args,
            initializer: None,
        }
    }

    pub fn cast(ty: TypeRef, expr: Expr) -> Self {
        Expr::Cast {
            ty,
            expr: Box::new(expr),
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Assign {
            op: None,
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    /// `(T)0`, the HLSL zero value of any numeric or vector type.
    pub fn zero_of(ty: TypeRef) -> Self {
        Expr::cast(ty, Expr::int(0))
    }

    /// Dotted path for identifier/member-access chains.
    pub fn as_path(&self) -> Option<String> {
        match self {
            Expr::Ident(name) => Some(name.clone()),
            Expr::MemberAccess(access) => access
                .target
                .as_path()
                .map(|target| format!("{}.{}", target, access.member)),
            _ => None,
        }
    }

    /// Short name of the node shape, used in diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Expr::Literal(Literal::String(_)) => "string literal",
            Expr::Literal(Literal::Null) => "null literal",
            Expr::Literal(_) => "literal",
            Expr::Ident(_) => "identifier",
            Expr::MemberAccess(_) => "member access",
            Expr::Invocation { .. } => "invocation",
            Expr::ElementAccess { .. } => "element access",
            Expr::Cast { .. } => "cast",
            Expr::ObjectCreation {
                initializer: Some(_),
                ..
            } => "object initializer",
            Expr::ObjectCreation { .. } => "object creation",
            Expr::Default(_) => "default expression",
            Expr::Unary { .. } => "unary expression",
            Expr::Binary { .. } => "binary expression",
            Expr::Assign { .. } => "assignment",
            Expr::Conditional { .. } => "conditional expression",
            Expr::Paren(_) => "parenthesized expression",
            Expr::Lambda { .. } => "lambda expression",
        }
    }
}
