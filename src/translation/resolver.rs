//! Symbol resolution
//!
//! The rewriter never inspects host semantics itself. It asks a
//! [`SymbolResolver`] what a member access refers to and acts on the answer.

use super::error::{Result, TranslateError};
use crate::syntax::{Expr, MemberAccess, TypeRef};
use rustc_hash::{FxHashMap, FxHashSet};

/// How the captured member is stored on the host side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Property,
    Constant,
}

/// Handle to an external static member whose value the shader reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberHandle {
    pub declaring_type: String,
    pub name: String,
    pub ty: TypeRef,
    pub kind: MemberKind,
}

impl MemberHandle {
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        ty: TypeRef,
        kind: MemberKind,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            ty,
            kind,
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.name)
    }
}

/// Outcome of resolving a member access.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The access reads an external static member; its value must be captured.
    Capture(MemberHandle),
    /// The access is expressible directly; replace it with this node.
    Direct(Expr),
}

/// Names visible at the point of a member access, innermost frame last.
#[derive(Debug, Clone, Default)]
pub struct LocalScope {
    frames: Vec<Vec<String>>,
}

impl LocalScope {
    pub fn new() -> Self {
        Self {
            frames: vec![Vec::new()],
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Vec::new());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    pub fn declare(&mut self, name: impl Into<String>) {
        if self.frames.is_empty() {
            self.frames.push(Vec::new());
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.push(name.into());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.frames
            .iter()
            .rev()
            .any(|frame| frame.iter().any(|declared| declared == name))
    }
}

/// Answers "what does this member access refer to".
pub trait SymbolResolver {
    fn resolve_member(&self, access: &MemberAccess, scope: &LocalScope) -> Result<Resolution>;
}

impl<R: SymbolResolver + ?Sized> SymbolResolver for &R {
    fn resolve_member(&self, access: &MemberAccess, scope: &LocalScope) -> Result<Resolution> {
        (**self).resolve_member(access, scope)
    }
}

/// Table-driven resolver.
///
/// * `Type.Member` where `Type` is not a local name and the pair is
///   registered resolves to a capture.
/// * A full path registered as an alias (`Math.Sqrt` -> `sqrt`) is replaced by
///   the alias identifier.
/// * Any other access keeps its target and has its member renamed when a field
///   rename is registered (`v.X` -> `v.x`).
#[derive(Debug, Clone)]
pub struct StaticMemberTable {
    statics: FxHashMap<(String, String), MemberHandle>,
    aliases: FxHashMap<String, String>,
    field_renames: FxHashMap<String, String>,
    rejected: FxHashSet<String>,
}

impl StaticMemberTable {
    /// A table that renames the `X`/`Y`/`Z`/`W` vector fields to HLSL swizzles.
    pub fn new() -> Self {
        let mut table = Self::empty();
        for (host, hlsl) in [("X", "x"), ("Y", "y"), ("Z", "z"), ("W", "w")] {
            table.register_field_rename(host, hlsl);
        }
        table
    }

    pub fn empty() -> Self {
        Self {
            statics: FxHashMap::default(),
            aliases: FxHashMap::default(),
            field_renames: FxHashMap::default(),
            rejected: FxHashSet::default(),
        }
    }

    /// Register a capturable static member under its declaring type path.
    pub fn register_static(&mut self, member: MemberHandle) -> &mut Self {
        self.statics.insert(
            (member.declaring_type.clone(), member.name.clone()),
            member,
        );
        self
    }

    /// Replace the full member path with a bare identifier.
    pub fn register_alias(&mut self, path: impl Into<String>, replacement: impl Into<String>) -> &mut Self {
        self.aliases.insert(path.into(), replacement.into());
        self
    }

    pub fn register_field_rename(
        &mut self,
        member: impl Into<String>,
        replacement: impl Into<String>,
    ) -> &mut Self {
        self.field_renames.insert(member.into(), replacement.into());
        self
    }

    /// Member paths that must not appear in shader code at all.
    pub fn reject(&mut self, path: impl Into<String>) -> &mut Self {
        self.rejected.insert(path.into());
        self
    }
}

impl Default for StaticMemberTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolResolver for StaticMemberTable {
    fn resolve_member(&self, access: &MemberAccess, scope: &LocalScope) -> Result<Resolution> {
        let target_path = access.target_path();
        let is_local = match access.target.as_ref() {
            Expr::Ident(root) => scope.contains(root),
            _ => target_path
                .as_deref()
                .and_then(|path| path.split('.').next())
                .is_some_and(|root| scope.contains(root)),
        };

        if !is_local {
            if let Some(path) = &target_path {
                let full_path = format!("{}.{}", path, access.member);

                if self.rejected.contains(&full_path) {
                    return Err(TranslateError::Resolution {
                        member: full_path,
                        reason: "member is not available in shader code".to_string(),
                    });
                }

                if let Some(member) = self.statics.get(&(path.clone(), access.member.clone())) {
                    return Ok(Resolution::Capture(member.clone()));
                }

                if let Some(alias) = self.aliases.get(&full_path) {
                    return Ok(Resolution::Direct(Expr::Ident(alias.clone())));
                }
            }
        }

        let member = self
            .field_renames
            .get(&access.member)
            .cloned()
            .unwrap_or_else(|| access.member.clone());

        Ok(Resolution::Direct(Expr::MemberAccess(MemberAccess {
            target: access.target.clone(),
            member,
            span: access.span,
        })))
    }
}
