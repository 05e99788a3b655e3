//! HLSL-shaped value types
//!
//! Plain `#[repr(C)]` vectors whose byte layout matches the HLSL type they are
//! named after, so they can be copied into constant buffers as raw bytes.

use bytemuck::{Pod, Zeroable};

/// Marker trait for values that can be copied into GPU memory byte for byte.
pub trait GpuData: Pod + Zeroable + Send + Sync + 'static {}

impl<T> GpuData for T where T: Pod + Zeroable + Send + Sync + 'static {}

macro_rules! gpu_vector {
    ($(#[$meta:meta])* $name:ident, $scalar:ty, $hlsl:literal, [$($field:ident),+]) => {
        $(#[$meta])*
        #[repr(C)]
        #[derive(Pod, Zeroable, Copy, Clone, Debug, Default, PartialEq)]
        pub struct $name {
            $(pub $field: $scalar,)+
        }

        impl $name {
            pub const HLSL_NAME: &'static str = $hlsl;

            pub fn new($($field: $scalar),+) -> Self {
                Self { $($field),+ }
            }
        }
    };
}

macro_rules! gpu_bool_vector {
    ($(#[$meta:meta])* $name:ident, $hlsl:literal, [$($field:ident),+]) => {
        $(#[$meta])*
        #[repr(C)]
        #[derive(Pod, Zeroable, Copy, Clone, Debug, Default, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: u32,)+
        }

        impl $name {
            pub const HLSL_NAME: &'static str = $hlsl;

            pub fn new($($field: bool),+) -> Self {
                Self { $($field: u32::from($field)),+ }
            }
        }
    };
}

gpu_bool_vector!(
    /// `bool2`: one 32-bit word per component.
    Bool2, "bool2", [x, y]
);
gpu_bool_vector!(Bool3, "bool3", [x, y, z]);
gpu_bool_vector!(Bool4, "bool4", [x, y, z, w]);

gpu_vector!(Int2, i32, "int2", [x, y]);
gpu_vector!(Int3, i32, "int3", [x, y, z]);
gpu_vector!(Int4, i32, "int4", [x, y, z, w]);

gpu_vector!(UInt2, u32, "uint2", [x, y]);
gpu_vector!(UInt3, u32, "uint3", [x, y, z]);
gpu_vector!(UInt4, u32, "uint4", [x, y, z, w]);

gpu_vector!(Float2, f32, "float2", [x, y]);
gpu_vector!(Float3, f32, "float3", [x, y, z]);
gpu_vector!(Float4, f32, "float4", [x, y, z, w]);

gpu_vector!(
    /// `double2` fills a whole 16-byte register.
    Double2, f64, "double2", [x, y]
);
gpu_vector!(Double3, f64, "double3", [x, y, z]);
gpu_vector!(Double4, f64, "double4", [x, y, z, w]);

/// Validate GPU type size at compile time
#[macro_export]
macro_rules! validate_gpu_type {
    ($type:ty, $expected_size:expr) => {
        const _: () = {
            let size = std::mem::size_of::<$type>();
            assert!(
                size == $expected_size,
                concat!(
                    "GPU type ",
                    stringify!($type),
                    " has incorrect size. Expected ",
                    stringify!($expected_size)
                )
            );
        };
    };
}

validate_gpu_type!(Bool2, 8);
validate_gpu_type!(Bool3, 12);
validate_gpu_type!(Bool4, 16);
validate_gpu_type!(Int3, 12);
validate_gpu_type!(UInt3, 12);
validate_gpu_type!(Float3, 12);
validate_gpu_type!(Float4, 16);
validate_gpu_type!(Double2, 16);
validate_gpu_type!(Double3, 24);
validate_gpu_type!(Double4, 32);
