//! Constant buffer allocation
//!
//! The packer only needs two things from a device: a buffer of N 16-byte
//! slots, and a way to copy bytes into it. [`GpuBufferManager`] provides them
//! over wgpu; [`HostBufferAllocator`] keeps the bytes in memory.

use crate::constants::layout::SLOT_SIZE;
use std::cell::Cell;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GpuError {
    #[error("Buffer creation failed: {0}")]
    Creation(String),

    #[error("Buffer upload failed: {0}")]
    Upload(String),

    #[error("Buffer size mismatch: expected at most {expected} bytes, got {actual} bytes")]
    SizeMismatch { expected: usize, actual: usize },
}

/// A device constant buffer that packed bytes can be uploaded into.
pub trait ConstantBufferHandle {
    /// Copy `bytes` to the start of the buffer.
    fn upload(&mut self, bytes: &[u8]) -> Result<(), GpuError>;

    /// Capacity in bytes.
    fn capacity(&self) -> usize;
}

/// Source of constant buffers measured in 16-byte slots.
pub trait ConstantBufferAllocator {
    type Handle: ConstantBufferHandle;

    fn allocate_constant_buffer(&self, slots: usize) -> Result<Self::Handle, GpuError>;
}

fn check_upload_size(capacity: usize, bytes: &[u8]) -> Result<(), GpuError> {
    if bytes.len() > capacity {
        return Err(GpuError::SizeMismatch {
            expected: capacity,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Allocates uniform buffers on a wgpu device
pub struct GpuBufferManager {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl GpuBufferManager {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self { device, queue }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }
}

/// A `UNIFORM | COPY_DST` buffer of whole slots, each one `float4` wide.
pub struct ConstantBuffer {
    buffer: wgpu::Buffer,
    queue: Arc<wgpu::Queue>,
    slots: usize,
}

impl ConstantBuffer {
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn slots(&self) -> usize {
        self.slots
    }
}

impl ConstantBufferAllocator for GpuBufferManager {
    type Handle = ConstantBuffer;

    fn allocate_constant_buffer(&self, slots: usize) -> Result<ConstantBuffer, GpuError> {
        // Zero-sized buffers cannot be bound, so an empty layout still gets one slot.
        let slots = slots.max(1);
        let size = slots
            .checked_mul(std::mem::size_of::<glam::Vec4>())
            .ok_or_else(|| GpuError::Creation(format!("{} slots overflow usize", slots)))?;

        let max = self.device.limits().max_uniform_buffer_binding_size as usize;
        if size > max {
            return Err(GpuError::Creation(format!(
                "{} bytes exceeds the device uniform binding limit of {} bytes",
                size, max
            )));
        }

        log::debug!(
            "[GpuBufferManager] Creating constant buffer with {} slots ({} bytes)",
            slots,
            size
        );

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("ConstantBuffer<float4; {}>", slots)),
            size: size as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(ConstantBuffer {
            buffer,
            queue: Arc::clone(&self.queue),
            slots,
        })
    }
}

impl ConstantBufferHandle for ConstantBuffer {
    fn upload(&mut self, bytes: &[u8]) -> Result<(), GpuError> {
        check_upload_size(self.capacity(), bytes)?;
        if bytes.len() as wgpu::BufferAddress % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
            return Err(GpuError::Upload(format!(
                "{} bytes is not a multiple of {}",
                bytes.len(),
                wgpu::COPY_BUFFER_ALIGNMENT
            )));
        }
        self.queue.write_buffer(&self.buffer, 0, bytes);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.slots * SLOT_SIZE
    }
}

/// In-memory allocator mirroring [`GpuBufferManager`]. Counts the buffers it
/// hands out so callers can check that a failed pack allocated nothing.
#[derive(Debug, Default)]
pub struct HostBufferAllocator {
    allocations: Cell<usize>,
}

impl HostBufferAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConstantBuffer {
    bytes: Vec<u8>,
}

impl HostConstantBuffer {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The buffer viewed as `float4` registers.
    pub fn slots(&self) -> Vec<glam::Vec4> {
        self.bytes
            .chunks_exact(SLOT_SIZE)
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }
}

impl ConstantBufferAllocator for HostBufferAllocator {
    type Handle = HostConstantBuffer;

    fn allocate_constant_buffer(&self, slots: usize) -> Result<HostConstantBuffer, GpuError> {
        let size = slots
            .checked_mul(SLOT_SIZE)
            .ok_or_else(|| GpuError::Creation(format!("{} slots overflow usize", slots)))?;
        self.allocations.set(self.allocations.get() + 1);
        Ok(HostConstantBuffer {
            bytes: vec![0; size],
        })
    }
}

impl ConstantBufferHandle for HostConstantBuffer {
    fn upload(&mut self, bytes: &[u8]) -> Result<(), GpuError> {
        check_upload_size(self.capacity(), bytes)?;
        self.bytes[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.bytes.len()
    }
}
