//! Constant buffer packing and allocation
//!
//! Host values are classified into [`ShaderValue`]s, laid out with the HLSL
//! 16-byte register rule and uploaded through a [`ConstantBufferAllocator`].

pub mod buffer_manager;
pub mod packer;
pub mod types;
pub mod values;

pub use buffer_manager::{
    ConstantBuffer, ConstantBufferAllocator, ConstantBufferHandle, GpuBufferManager, GpuError,
    HostBufferAllocator, HostConstantBuffer,
};
pub use packer::{
    allocate_constant_buffer, pack, pack_reflected, upload_layout, PackError, PackedEntry,
    PackedLayout,
};
pub use types::GpuData;
pub use values::{ReflectedValue, ShaderValue, ValueKind};
