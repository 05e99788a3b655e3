//! Values that can be packed into a constant buffer
//!
//! [`ShaderValue`] is the closed set of scalar and vector kinds a constant
//! buffer can hold. Dynamically typed input is classified with
//! [`ShaderValue::from_reflected`]; anything outside the set is rejected.

use crate::constants::layout::BOOL_SIZE;
use crate::gpu::types::{
    Bool2, Bool3, Bool4, Double2, Double3, Double4, Float2, Float3, Float4, GpuData, Int2, Int3,
    Int4, UInt2, UInt3, UInt4,
};
use glam::{Vec2, Vec3, Vec4};
use std::any::Any;

/// A dynamically typed value with a printable type name.
pub trait ReflectedValue: Any {
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> ReflectedValue for T {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn copy_gpu_data<T: GpuData>(value: &T, out: &mut [u8]) {
    out.copy_from_slice(bytemuck::bytes_of(value))
}

macro_rules! shader_values {
    ($( $variant:ident($ty:ty) => $hlsl:literal ),* $(,)?) => {
        /// One value in a constant buffer. Booleans are stored as 32-bit words.
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub enum ShaderValue {
            Bool(bool),
            $($variant($ty),)*
        }

        /// Type tag of a [`ShaderValue`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ValueKind {
            Bool,
            $($variant,)*
        }

        impl ValueKind {
            pub const ALL: &'static [ValueKind] = &[ValueKind::Bool, $(ValueKind::$variant,)*];

            /// Bytes the value occupies in the buffer.
            pub fn size(&self) -> usize {
                match self {
                    ValueKind::Bool => BOOL_SIZE,
                    $(ValueKind::$variant => std::mem::size_of::<$ty>(),)*
                }
            }

            pub fn hlsl_name(&self) -> &'static str {
                match self {
                    ValueKind::Bool => "bool",
                    $(ValueKind::$variant => $hlsl,)*
                }
            }
        }

        impl ShaderValue {
            pub fn kind(&self) -> ValueKind {
                match self {
                    ShaderValue::Bool(_) => ValueKind::Bool,
                    $(ShaderValue::$variant(_) => ValueKind::$variant,)*
                }
            }

            /// Classify a dynamically typed value. Returns `None` when its
            /// runtime type is not one of the supported kinds.
            pub fn from_reflected(value: &dyn ReflectedValue) -> Option<Self> {
                let any = value.as_any();
                if let Some(value) = any.downcast_ref::<ShaderValue>() {
                    return Some(*value);
                }
                if let Some(value) = any.downcast_ref::<bool>() {
                    return Some(ShaderValue::Bool(*value));
                }
                $(
                    if let Some(value) = any.downcast_ref::<$ty>() {
                        return Some(ShaderValue::$variant(*value));
                    }
                )*
                None
            }

            /// Copy the value's buffer representation into `out`, which must be
            /// exactly [`ValueKind::size`] bytes long.
            pub fn write_bytes(&self, out: &mut [u8]) {
                match self {
                    ShaderValue::Bool(value) => {
                        out.copy_from_slice(&u32::from(*value).to_ne_bytes())
                    }
                    $(ShaderValue::$variant(value) => copy_gpu_data(value, out),)*
                }
            }
        }

        impl From<bool> for ShaderValue {
            fn from(value: bool) -> Self {
                ShaderValue::Bool(value)
            }
        }

        $(
            impl From<$ty> for ShaderValue {
                fn from(value: $ty) -> Self {
                    ShaderValue::$variant(value)
                }
            }
        )*
    };
}

shader_values! {
    Bool2(Bool2) => "bool2",
    Bool3(Bool3) => "bool3",
    Bool4(Bool4) => "bool4",
    Int(i32) => "int",
    Int2(Int2) => "int2",
    Int3(Int3) => "int3",
    Int4(Int4) => "int4",
    UInt(u32) => "uint",
    UInt2(UInt2) => "uint2",
    UInt3(UInt3) => "uint3",
    UInt4(UInt4) => "uint4",
    Float(f32) => "float",
    Float2(Float2) => "float2",
    Float3(Float3) => "float3",
    Float4(Float4) => "float4",
    Vector2(Vec2) => "float2",
    Vector3(Vec3) => "float3",
    Vector4(Vec4) => "float4",
    Double(f64) => "double",
    Double2(Double2) => "double2",
    Double3(Double3) => "double3",
    Double4(Double4) => "double4",
}

impl ShaderValue {
    pub fn size(&self) -> usize {
        self.kind().size()
    }
}
