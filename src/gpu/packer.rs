//! Constant buffer packing
//!
//! Values are laid out in order using the HLSL packing rule: a value may not
//! straddle a 16-byte register, so when it does not fit in what is left of
//! the current register it starts at the next one. Values wider than a
//! register (`double3`, `double4`) always start on a register boundary; the
//! free space in the current register is compared against `16 - size`
//! clamped at zero, so an already aligned wide value stays where it is.
//!
//! The buffer has one register per value, which is enough for anything up to
//! 16 bytes wide; wider values grow it as needed.

use crate::constants::layout::SLOT_SIZE;
use crate::gpu::buffer_manager::{ConstantBufferAllocator, ConstantBufferHandle, GpuError};
use crate::gpu::values::{ReflectedValue, ShaderValue, ValueKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("Value {index} has unsupported type {type_name}")]
    UnsupportedValueType {
        index: usize,
        type_name: &'static str,
    },

    #[error("Constant buffer allocation failed: {0}")]
    Allocation(#[from] GpuError),
}

/// Placement of one value in a packed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedEntry {
    pub offset: usize,
    pub size: usize,
    pub kind: ValueKind,
}

/// Zero-initialised buffer bytes plus where each value landed
#[derive(Debug, Clone, PartialEq)]
pub struct PackedLayout {
    pub bytes: Vec<u8>,
    pub entries: Vec<PackedEntry>,
    /// Offset just past the last value.
    pub used: usize,
    pub slot_count: usize,
}

impl PackedLayout {
    /// Total buffer size in bytes
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!(
            "Total size: {} bytes ({} slots, {} used)\n",
            self.size(),
            self.slot_count,
            self.used
        ));
        s.push_str("Values:\n");

        for (index, entry) in self.entries.iter().enumerate() {
            s.push_str(&format!(
                "  [{:2}] {:8} @ {:4} ({:2} bytes)\n",
                index,
                entry.kind.hlsl_name(),
                entry.offset,
                entry.size
            ));
        }

        s
    }
}

/// Offset at which a value of `size` bytes goes when the cursor is at `offset`.
pub fn aligned_offset(offset: usize, size: usize) -> usize {
    let in_slot = offset % SLOT_SIZE;
    if in_slot > SLOT_SIZE.saturating_sub(size) {
        offset + (SLOT_SIZE - in_slot)
    } else {
        offset
    }
}

/// Lay out `values` in a fresh buffer.
pub fn pack(values: &[ShaderValue]) -> PackedLayout {
    let mut entries = Vec::with_capacity(values.len());
    let mut offset = 0;

    for value in values {
        let kind = value.kind();
        let size = kind.size();
        let start = aligned_offset(offset, size);
        if start != offset {
            log::trace!(
                "[ConstantBufferPacker] Padding {} bytes before {} at offset {}",
                start - offset,
                kind.hlsl_name(),
                offset
            );
        }
        entries.push(PackedEntry {
            offset: start,
            size,
            kind,
        });
        offset = start + size;
    }

    let used = offset;
    let slot_count = values.len().max(used.div_ceil(SLOT_SIZE));
    let mut bytes = vec![0u8; slot_count * SLOT_SIZE];

    for (value, entry) in values.iter().zip(&entries) {
        value.write_bytes(&mut bytes[entry.offset..entry.offset + entry.size]);
    }

    log::debug!(
        "[ConstantBufferPacker] Packed {} values into {} slots ({} of {} bytes used)",
        values.len(),
        slot_count,
        used,
        bytes.len()
    );

    PackedLayout {
        bytes,
        entries,
        used,
        slot_count,
    }
}

/// Classify dynamically typed values and lay them out. Fails on the first
/// value whose runtime type is not supported.
pub fn pack_reflected(values: &[&dyn ReflectedValue]) -> Result<PackedLayout, PackError> {
    let classified = values
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            ShaderValue::from_reflected(value).ok_or_else(|| PackError::UnsupportedValueType {
                index,
                type_name: value.type_name(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(pack(&classified))
}

/// Allocate a buffer sized for `layout` and upload its bytes.
pub fn upload_layout<A: ConstantBufferAllocator>(
    allocator: &A,
    layout: &PackedLayout,
) -> Result<A::Handle, PackError> {
    let mut handle = allocator.allocate_constant_buffer(layout.slot_count)?;
    handle.upload(&layout.bytes)?;
    Ok(handle)
}

/// Pack `values` and upload them into a new constant buffer. Nothing is
/// allocated when a value is unsupported.
pub fn allocate_constant_buffer<A: ConstantBufferAllocator>(
    allocator: &A,
    values: &[&dyn ReflectedValue],
) -> Result<A::Handle, PackError> {
    let layout = pack_reflected(values)?;
    upload_layout(allocator, &layout)
}
