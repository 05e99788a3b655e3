//! Host type -> HLSL type name table

use super::error::{Result, TranslateError};
use crate::syntax::TypeRef;
use rustc_hash::FxHashMap;

/// Built-in mappings. Each host type is listed under its qualified and its
/// short name.
const BUILTIN_TYPES: &[(&str, &str)] = &[
    ("void", "void"),
    ("System.Void", "void"),
    ("bool", "bool"),
    ("System.Boolean", "bool"),
    ("int", "int"),
    ("System.Int32", "int"),
    ("uint", "uint"),
    ("System.UInt32", "uint"),
    ("float", "float"),
    ("System.Single", "float"),
    ("double", "double"),
    ("System.Double", "double"),
    ("Bool2", "bool2"),
    ("Bool3", "bool3"),
    ("Bool4", "bool4"),
    ("Int2", "int2"),
    ("Int3", "int3"),
    ("Int4", "int4"),
    ("UInt2", "uint2"),
    ("UInt3", "uint3"),
    ("UInt4", "uint4"),
    ("Float2", "float2"),
    ("Float3", "float3"),
    ("Float4", "float4"),
    ("Double2", "double2"),
    ("Double3", "double3"),
    ("Double4", "double4"),
    ("Float2x2", "float2x2"),
    ("Float3x3", "float3x3"),
    ("Float4x4", "float4x4"),
    ("Vector2", "float2"),
    ("Vector3", "float3"),
    ("Vector4", "float4"),
    ("System.Numerics.Vector2", "float2"),
    ("System.Numerics.Vector3", "float3"),
    ("System.Numerics.Vector4", "float4"),
    ("Matrix4x4", "float4x4"),
    ("System.Numerics.Matrix4x4", "float4x4"),
];

/// Pure lookup from host type names to HLSL type names.
#[derive(Debug, Clone)]
pub struct TypeMap {
    entries: FxHashMap<String, String>,
}

impl TypeMap {
    /// The built-in table.
    pub fn new() -> Self {
        let entries = BUILTIN_TYPES
            .iter()
            .map(|(host, hlsl)| (host.to_string(), hlsl.to_string()))
            .collect();
        Self { entries }
    }

    /// A table with no entries; every lookup fails until types are registered.
    pub fn empty() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Add or replace a mapping.
    pub fn register(&mut self, host: impl Into<String>, hlsl: impl Into<String>) -> &mut Self {
        self.entries.insert(host.into(), hlsl.into());
        self
    }

    pub fn lookup(&self, host: &str) -> Option<&str> {
        self.entries.get(host).map(String::as_str)
    }

    /// Map a host type reference to its HLSL equivalent, keeping the span.
    pub fn map(&self, ty: &TypeRef) -> Result<TypeRef> {
        self.lookup(&ty.name)
            .map(|hlsl| TypeRef {
                name: hlsl.to_string(),
                span: ty.span,
            })
            .ok_or_else(|| TranslateError::UnmappedType {
                name: ty.name.clone(),
                span: ty.span,
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TypeMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Span;

    #[test]
    fn test_builtin_vector_types() {
        let map = TypeMap::new();
        assert_eq!(map.lookup("System.Numerics.Vector3"), Some("float3"));
        assert_eq!(map.lookup("Vector3"), Some("float3"));
        assert_eq!(map.lookup("Float3"), Some("float3"));
        assert_eq!(map.lookup("Int4"), Some("int4"));
        assert_eq!(map.lookup("System.Int32"), Some("int"));
    }

    #[test]
    fn test_map_keeps_span() {
        let map = TypeMap::new();
        let ty = TypeRef::new("UInt2").at(Span::new(4, 9));
        let mapped = map.map(&ty).unwrap();
        assert_eq!(mapped.name, "uint2");
        assert_eq!(mapped.span, Span::new(4, 9));
    }

    #[test]
    fn test_unmapped_type_is_an_error() {
        let map = TypeMap::new();
        let err = map
            .map(&TypeRef::new("System.String").at(Span::new(2, 5)))
            .unwrap_err();
        assert_eq!(
            err,
            TranslateError::UnmappedType {
                name: "System.String".to_string(),
                span: Span::new(2, 5),
            }
        );
        assert!(err.to_string().contains("line 2, column 5"));
    }

    #[test]
    fn test_register_overrides() {
        let mut map = TypeMap::empty();
        assert!(map.map(&TypeRef::new("Color")).is_err());

        map.register("Color", "float4");
        assert_eq!(map.map(&TypeRef::new("Color")).unwrap().name, "float4");
        assert_eq!(map.len(), 1);
    }
}
