//! HLSL rewriting of host method bodies

use super::captures::{CaptureInsert, CaptureTable};
use super::error::{Result, TranslateError};
use super::resolver::{LocalScope, MemberHandle, Resolution, SymbolResolver};
use super::type_map::TypeMap;
use crate::constants::translation::DEFAULT_CAPTURE_PREFIX;
use crate::syntax::fold::{self, Fold};
use crate::syntax::printer::{render_expr, render_stmt};
use crate::syntax::{
    Block, Expr, Literal, LocalDecl, MemberAccess, MethodDecl, ParamModifier, Parameter, Span,
    Stmt, TypeRef,
};

/// Rewrites one host method into an HLSL-legal tree and records the static
/// members it reads.
///
/// An instance translates a single method. Its capture table only grows while
/// [`rewrite_method`](Self::rewrite_method) runs and is handed out read-only
/// afterwards.
pub struct ShaderSyntaxRewriter<'a, R: SymbolResolver + ?Sized> {
    resolver: &'a R,
    types: &'a TypeMap,
    capture_prefix: String,
    captures: CaptureTable,
    scope: LocalScope,
    method: String,
    /// Most recent source location seen, for errors on nodes without one.
    location: Span,
}

impl<'a, R: SymbolResolver + ?Sized> ShaderSyntaxRewriter<'a, R> {
    pub fn new(resolver: &'a R, types: &'a TypeMap) -> Self {
        Self {
            resolver,
            types,
            capture_prefix: DEFAULT_CAPTURE_PREFIX.to_string(),
            captures: CaptureTable::new(),
            scope: LocalScope::new(),
            method: String::new(),
            location: Span::UNKNOWN,
        }
    }

    pub fn with_capture_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.capture_prefix = prefix.into();
        self
    }

    pub fn rewrite_method(&mut self, method: MethodDecl) -> Result<MethodDecl> {
        self.fold_method(method)
    }

    /// Static members captured so far.
    pub fn captures(&self) -> &CaptureTable {
        &self.captures
    }

    pub fn into_captures(self) -> CaptureTable {
        self.captures
    }

    /// Identifier the shader uses for a captured member:
    /// `<prefix><DeclaringType>__<Member>` with non-identifier characters
    /// replaced by `_`.
    pub fn capture_name(&self, member: &MemberHandle) -> String {
        format!(
            "{}{}__{}",
            self.capture_prefix,
            sanitize_identifier(&member.declaring_type),
            sanitize_identifier(&member.name)
        )
    }

    fn unsupported(&self, construct: &'static str, node: String, span: Span) -> TranslateError {
        TranslateError::UnsupportedNode {
            method: self.method.clone(),
            construct,
            node,
            span: if span.is_known() { span } else { self.location },
        }
    }

    fn note_location(&mut self, span: Span) {
        if span.is_known() {
            self.location = span;
        }
    }

    fn map_type(&mut self, ty: &TypeRef) -> Result<TypeRef> {
        self.note_location(ty.span);
        self.types.map(ty)
    }

    fn record_capture(&mut self, member: MemberHandle) -> String {
        let name = self.capture_name(&member);
        match self.captures.insert(name.clone(), member) {
            CaptureInsert::Added => {
                log::debug!(
                    "[ShaderSyntaxRewriter] {}: captured {} as {}",
                    self.method,
                    self.captures
                        .get(&name)
                        .map(MemberHandle::qualified_name)
                        .unwrap_or_default(),
                    name
                );
            }
            CaptureInsert::Known => {}
            CaptureInsert::Collision => {
                log::warn!(
                    "[ShaderSyntaxRewriter] {}: capture name {} already bound to {}, keeping the first binding",
                    self.method,
                    name,
                    self.captures
                        .get(&name)
                        .map(MemberHandle::qualified_name)
                        .unwrap_or_default()
                );
            }
        }
        name
    }
}

fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

impl<'a, R: SymbolResolver + ?Sized> Fold for ShaderSyntaxRewriter<'a, R> {
    type Error = TranslateError;

    fn fold_method(&mut self, node: MethodDecl) -> Result<MethodDecl> {
        self.method = node.name.clone();
        self.scope = LocalScope::new();
        self.location = Span::UNKNOWN;
        log::trace!("[ShaderSyntaxRewriter] rewriting {}", self.method);

        let node = fold::fold_method(self, node)?;
        let return_type = self.map_type(&node.return_type)?;

        Ok(MethodDecl {
            attributes: Vec::new(),
            return_type,
            ..node
        })
    }

    fn fold_parameter(&mut self, node: Parameter) -> Result<Parameter> {
        // Attributes are dropped unvisited; their arguments never reach HLSL.
        let ty = self.map_type(&node.ty)?;
        let modifier = match node.modifier {
            ParamModifier::Ref => ParamModifier::InOut,
            other => other,
        };
        self.scope.declare(node.name.clone());

        Ok(Parameter {
            attributes: Vec::new(),
            modifier,
            ty,
            name: node.name,
        })
    }

    fn fold_block(&mut self, node: Block) -> Result<Block> {
        self.scope.push_frame();
        let result = fold::fold_block(self, node);
        self.scope.pop_frame();
        result
    }

    fn fold_stmt(&mut self, node: Stmt) -> Result<Stmt> {
        match node {
            Stmt::Foreach { ref ty, .. } => {
                Err(self.unsupported("foreach loop", render_stmt(&node), ty.span))
            }
            Stmt::For { .. } => {
                // The loop variable is only visible inside the loop.
                self.scope.push_frame();
                let result = fold::fold_stmt(self, node);
                self.scope.pop_frame();
                result
            }
            other => fold::fold_stmt(self, other),
        }
    }

    fn fold_local(&mut self, node: LocalDecl) -> Result<LocalDecl> {
        if node.ty.is_none() {
            return Err(self.unsupported(
                "implicitly typed local",
                render_stmt(&Stmt::Local(node)),
                Span::UNKNOWN,
            ));
        }

        let mut declarators = Vec::with_capacity(node.declarators.len());
        for mut declarator in node.declarators {
            declarator.init = declarator
                .init
                .map(|init| self.fold_expr(init))
                .transpose()?;
            self.scope.declare(declarator.name.clone());
            declarators.push(declarator);
        }
        let ty = node.ty.as_ref().map(|ty| self.map_type(ty)).transpose()?;

        Ok(LocalDecl { ty, declarators })
    }

    fn fold_expr(&mut self, node: Expr) -> Result<Expr> {
        if matches!(
            node,
            Expr::Literal(Literal::String(_)) | Expr::Literal(Literal::Null) | Expr::Lambda { .. }
        ) {
            return Err(self.unsupported(node.shape(), render_expr(&node), Span::UNKNOWN));
        }
        fold::fold_expr(self, node)
    }

    fn fold_member_access(&mut self, node: MemberAccess) -> Result<Expr> {
        self.note_location(node.span);
        let access = match fold::fold_member_access(self, node)? {
            Expr::MemberAccess(access) => access,
            other => return Ok(other),
        };

        match self.resolver.resolve_member(&access, &self.scope)? {
            Resolution::Capture(member) => Ok(Expr::Ident(self.record_capture(member))),
            Resolution::Direct(replacement) => Ok(replacement),
        }
    }

    fn fold_cast(&mut self, ty: TypeRef, expr: Expr) -> Result<Expr> {
        let expr = self.fold_expr(expr)?;
        let ty = self.map_type(&ty)?;
        Ok(Expr::cast(ty, expr))
    }

    fn fold_object_creation(
        &mut self,
        ty: TypeRef,
        args: Vec<Expr>,
        initializer: Option<Vec<(String, Expr)>>,
    ) -> Result<Expr> {
        if initializer.is_some() {
            let span = ty.span;
            let node = Expr::ObjectCreation {
                ty,
                args,
                initializer,
            };
            return Err(self.unsupported("object initializer", render_expr(&node), span));
        }

        let args = fold::fold_exprs(self, args)?;
        let ty = self.map_type(&ty)?;

        if args.is_empty() {
            return Ok(Expr::zero_of(ty));
        }

        Ok(Expr::call(Expr::Ident(ty.name), args))
    }

    fn fold_default(&mut self, ty: TypeRef) -> Result<Expr> {
        let ty = self.map_type(&ty)?;
        Ok(Expr::zero_of(ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::printer::render_method;
    use crate::syntax::{Attribute, BinaryOp, Span};
    use crate::translation::resolver::{MemberKind, StaticMemberTable};

    fn float3() -> TypeRef {
        TypeRef::new("Float3")
    }

    fn rewrite_expr(expr: Expr) -> Result<Expr> {
        let resolver = StaticMemberTable::new();
        let types = TypeMap::new();
        let mut rewriter = ShaderSyntaxRewriter::new(&resolver, &types);
        rewriter.fold_expr(expr)
    }

    #[test]
    fn test_zero_argument_creation_becomes_cast() {
        let rewritten = rewrite_expr(Expr::new_object(float3(), vec![])).unwrap();
        assert_eq!(rewritten, Expr::zero_of(TypeRef::new("float3")));
        assert_eq!(render_expr(&rewritten), "(float3)0");
    }

    #[test]
    fn test_creation_with_arguments_becomes_constructor_call() {
        let args = vec![Expr::float(1.0), Expr::ident("y"), Expr::float(3.0)];
        let rewritten = rewrite_expr(Expr::new_object(float3(), args.clone())).unwrap();
        assert_eq!(rewritten, Expr::call(Expr::ident("float3"), args));
        assert_eq!(render_expr(&rewritten), "float3(1.0f, y, 3.0f)");
    }

    #[test]
    fn test_default_matches_zero_argument_creation() {
        let from_default = rewrite_expr(Expr::Default(TypeRef::new("Vector4"))).unwrap();
        let from_new = rewrite_expr(Expr::new_object(TypeRef::new("Vector4"), vec![])).unwrap();
        assert_eq!(from_default, from_new);
        assert_eq!(render_expr(&from_default), "(float4)0");
    }

    #[test]
    fn test_cast_type_is_mapped_after_operand() {
        let expr = Expr::cast(
            TypeRef::new("System.Single"),
            Expr::new_object(TypeRef::new("Int2"), vec![]),
        );
        assert_eq!(render_expr(&rewrite_expr(expr).unwrap()), "(float)(int2)0");
    }

    #[test]
    fn test_unmapped_cast_type_fails() {
        let expr = Expr::cast(TypeRef::new("System.Decimal").at(Span::new(8, 13)), Expr::int(1));
        let err = rewrite_expr(expr).unwrap_err();
        assert_eq!(
            err,
            TranslateError::UnmappedType {
                name: "System.Decimal".to_string(),
                span: Span::new(8, 13),
            }
        );
    }

    #[test]
    fn test_object_initializer_is_unsupported() {
        let expr = Expr::ObjectCreation {
            ty: float3(),
            args: vec![],
            initializer: Some(vec![("X".to_string(), Expr::float(1.0))]),
        };
        let err = rewrite_expr(expr).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::UnsupportedNode { construct: "object initializer", .. }
        ));
    }

    #[test]
    fn test_parameters_lose_attributes_and_map_types() {
        let resolver = StaticMemberTable::new();
        let types = TypeMap::new();
        let mut rewriter = ShaderSyntaxRewriter::new(&resolver, &types);

        let method = MethodDecl::new(TypeRef::new("void"), "Kernel")
            .with_parameter(
                Parameter::new(TypeRef::new("System.Numerics.Vector2"), "uv")
                    .with_attribute(Attribute::new("ReadOnly")),
            )
            .with_parameter(
                Parameter::new(TypeRef::new("int"), "count").with_modifier(ParamModifier::Ref),
            );

        let rewritten = rewriter.rewrite_method(method).unwrap();
        assert!(rewritten.parameters.iter().all(|p| p.attributes.is_empty()));
        assert_eq!(rewritten.parameters[0].ty.name, "float2");
        assert_eq!(rewritten.parameters[1].modifier, ParamModifier::InOut);
        assert_eq!(
            render_method(&rewritten),
            "void Kernel(float2 uv, inout int count)\n{\n}"
        );
    }

    #[test]
    fn test_capture_name_sanitizes_namespaces() {
        let resolver = StaticMemberTable::new();
        let types = TypeMap::new();
        let rewriter = ShaderSyntaxRewriter::new(&resolver, &types);

        let member = MemberHandle::new(
            "Demo.Settings<int>",
            "Scale",
            TypeRef::new("float"),
            MemberKind::Field,
        );
        assert_eq!(rewriter.capture_name(&member), "__Demo_Settings_int___Scale");

        let prefixed = ShaderSyntaxRewriter::new(&resolver, &types).with_capture_prefix("cb_");
        assert_eq!(prefixed.capture_name(&member), "cb_Demo_Settings_int___Scale");
    }

    #[test]
    fn test_local_shadowing_prevents_capture() {
        let mut resolver = StaticMemberTable::new();
        resolver.register_static(MemberHandle::new(
            "Settings",
            "Scale",
            TypeRef::new("float"),
            MemberKind::Field,
        ));
        let types = TypeMap::new();
        let mut rewriter = ShaderSyntaxRewriter::new(&resolver, &types);

        let method = MethodDecl::new(TypeRef::new("float"), "Scaled").with_body(vec![
            Stmt::Local(LocalDecl::single(
                TypeRef::new("float"),
                "a",
                Some(Expr::path("Settings.Scale")),
            )),
            Stmt::Block(Block::new(vec![
                Stmt::Local(LocalDecl::single(
                    TypeRef::new("Vector3"),
                    "Settings",
                    Some(Expr::Default(TypeRef::new("Vector3"))),
                )),
                Stmt::Expr(Expr::assign(Expr::ident("a"), Expr::path("Settings.Scale"))),
            ])),
            Stmt::Return(Some(Expr::binary(
                BinaryOp::Mul,
                Expr::ident("a"),
                Expr::path("Settings.Scale"),
            ))),
        ]);

        let rewritten = rewriter.rewrite_method(method).unwrap();
        let hlsl = render_method(&rewritten);
        assert!(hlsl.contains("float a = __Settings__Scale;"));
        assert!(hlsl.contains("a = Settings.Scale;"));
        assert!(hlsl.contains("return a * __Settings__Scale;"));
        assert_eq!(rewriter.captures().len(), 1);
    }

    #[test]
    fn test_parameter_attribute_arguments_are_not_translated() {
        let mut resolver = StaticMemberTable::new();
        resolver.register_static(MemberHandle::new(
            "Settings",
            "Scale",
            TypeRef::new("float"),
            MemberKind::Field,
        ));
        let types = TypeMap::new();
        let mut rewriter = ShaderSyntaxRewriter::new(&resolver, &types);

        let mut description = Attribute::new("Description");
        description.arguments = vec![
            Expr::Literal(Literal::String("uv coords".to_string())),
            Expr::path("Settings.Scale"),
        ];
        let method = MethodDecl::new(TypeRef::new("void"), "K")
            .with_parameter(Parameter::new(TypeRef::new("Float2"), "uv").with_attribute(description));

        let rewritten = rewriter.rewrite_method(method).unwrap();
        assert_eq!(render_method(&rewritten), "void K(float2 uv)\n{\n}");
        assert!(rewriter.captures().is_empty());
    }

    #[test]
    fn test_unsupported_node_reports_location() {
        let resolver = StaticMemberTable::new();
        let types = TypeMap::new();
        let mut rewriter = ShaderSyntaxRewriter::new(&resolver, &types);

        let method = MethodDecl::new(TypeRef::new("void"), "Loop").with_body(vec![Stmt::Foreach {
            ty: TypeRef::new("int").at(Span::new(4, 18)),
            name: "i".to_string(),
            collection: Expr::ident("items"),
            body: Block::new(vec![]),
        }]);

        let err = rewriter.rewrite_method(method).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::UnsupportedNode { construct: "foreach loop", span, .. } if span == Span::new(4, 18)
        ));
        assert!(err.to_string().contains("(line 4, column 18)"), "{}", err);
    }

    #[test]
    fn test_unlocated_node_uses_closest_location() {
        let resolver = StaticMemberTable::new();
        let types = TypeMap::new();
        let mut rewriter = ShaderSyntaxRewriter::new(&resolver, &types);

        let method = MethodDecl::new(TypeRef::new("void"), "Log").with_body(vec![
            Stmt::Local(LocalDecl::single(
                TypeRef::new("float").at(Span::new(2, 5)),
                "x",
                Some(Expr::float(1.0)),
            )),
            Stmt::Expr(Expr::call(
                Expr::ident("print"),
                vec![Expr::Literal(Literal::String("x".to_string()))],
            )),
        ]);

        let err = rewriter.rewrite_method(method).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::UnsupportedNode { construct: "string literal", span, .. } if span == Span::new(2, 5)
        ));
    }

    #[test]
    fn test_children_are_rewritten_before_types() {
        let resolver = StaticMemberTable::new();
        let types = TypeMap::new();

        let local = MethodDecl::new(TypeRef::new("void"), "Local").with_body(vec![Stmt::Local(
            LocalDecl::single(
                TypeRef::new("System.Decimal"),
                "d",
                Some(Expr::Literal(Literal::Null)),
            ),
        )]);
        let err = ShaderSyntaxRewriter::new(&resolver, &types)
            .rewrite_method(local)
            .unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedNode { construct: "null literal", .. }));

        let signature = MethodDecl::new(TypeRef::new("System.Decimal"), "Signature").with_body(
            vec![Stmt::Expr(Expr::Literal(Literal::String("s".to_string())))],
        );
        let err = ShaderSyntaxRewriter::new(&resolver, &types)
            .rewrite_method(signature)
            .unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedNode { construct: "string literal", .. }));
    }
}
