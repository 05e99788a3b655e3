//! Shader bridge
//!
//! Rewrites host-language method bodies into HLSL and packs host values into
//! constant buffers laid out the way HLSL reads them.

pub mod config;
pub mod constants;
pub mod gpu;
pub mod syntax;
pub mod translation;

pub use config::{ConfigError, TranslatorConfig};
pub use gpu::{
    allocate_constant_buffer, pack, pack_reflected, ConstantBufferAllocator,
    ConstantBufferHandle, GpuBufferManager, GpuError, HostBufferAllocator, PackError,
    PackedLayout, ReflectedValue, ShaderValue, ValueKind,
};
pub use syntax::{Expr, MethodDecl, Stmt, TypeRef};
pub use translation::{
    translate_method, translate_method_with_config, translate_methods, CaptureTable,
    ShaderSyntaxRewriter, StaticMemberTable, SymbolResolver, TranslateError, TranslatedMethod,
    TypeMap,
};
