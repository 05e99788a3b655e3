// Shader bridge constants - single source of truth for layout and naming values.

/// Constant buffer layout
pub mod layout {
    /// Constant buffers are addressed in 16-byte registers (one `float4`).
    pub const SLOT_SIZE: usize = 16;

    /// Size of a packed boolean: HLSL stores `bool` as a 32-bit value.
    pub const BOOL_SIZE: usize = 4;
}

/// Translation naming
pub mod translation {
    /// Prefix of generated identifiers for captured static members.
    pub const DEFAULT_CAPTURE_PREFIX: &str = "__";
}
