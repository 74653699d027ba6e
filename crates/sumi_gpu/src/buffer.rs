//! Dynamically resizable GPU buffers
//!
//! Stroke batches vary in length from gesture to gesture; `DynamicBuffer`
//! grows on demand instead of allocating worst-case up front.

/// A GPU buffer that recreates itself when it runs out of room.
///
/// Growing replaces the underlying `wgpu::Buffer`, so any bind group built
/// against it must be rebuilt; [`ensure_capacity`](Self::ensure_capacity)
/// reports that through its return value.
pub struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    usage: wgpu::BufferUsages,
    label: &'static str,
}

impl DynamicBuffer {
    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        initial_capacity: u64,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let usage = usage | wgpu::BufferUsages::COPY_DST;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: initial_capacity,
            usage,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            capacity: initial_capacity,
            usage,
            label,
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Make sure the buffer can hold at least `size` bytes.
    ///
    /// Returns `true` if the buffer was recreated.
    pub fn ensure_capacity(&mut self, device: &wgpu::Device, size: u64) -> bool {
        if size <= self.capacity {
            return false;
        }

        // Grow by 50% or to the required size, whichever is larger.
        let new_capacity = (self.capacity * 3 / 2).max(size);
        tracing::debug!(
            label = self.label,
            old = self.capacity,
            new = new_capacity,
            "growing dynamic buffer"
        );
        self.buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(self.label),
            size: new_capacity,
            usage: self.usage,
            mapped_at_creation: false,
        });
        self.capacity = new_capacity;
        true
    }

    /// Upload `data`, growing first if needed. Returns `true` if the buffer
    /// was recreated and dependent bind groups are stale.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[u8]) -> bool {
        let grew = self.ensure_capacity(device, data.len() as u64);
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, data);
        }
        grew
    }
}
