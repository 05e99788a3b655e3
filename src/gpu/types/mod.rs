//! GPU value type definitions

pub mod core;

pub use self::core::{
    Bool2, Bool3, Bool4, Double2, Double3, Double4, Float2, Float3, Float4, GpuData, Int2, Int3,
    Int4, UInt2, UInt3, UInt4,
};
