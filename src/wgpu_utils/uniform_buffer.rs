// src/wgpu_utils/uniform_buffer.rs
use std::marker::PhantomData;

/// Rounds `size` up to the next multiple of `alignment`
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// Lays `items` out back to back, each starting on a `stride` boundary
fn pack<Content: bytemuck::Pod>(items: &[Content], stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; items.len() * stride];
    for (chunk, item) in bytes.chunks_exact_mut(stride).zip(items) {
        let src = bytemuck::bytes_of(item);
        chunk[..src.len()].copy_from_slice(src);
    }
    bytes
}

/// Uniform buffer holding one `Content` per draw, addressed by dynamic offset
///
/// Elements are spaced by the device's `min_uniform_buffer_offset_alignment`.
/// The buffer grows on demand; callers must rebuild their bind group whenever
/// [`ensure_capacity`](Self::ensure_capacity) reports a reallocation.
pub struct DynamicUniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    stride: u64,
    capacity: usize,
}

impl<Content: bytemuck::Pod> DynamicUniformBuffer<Content> {
    fn name() -> &'static str {
        let type_name = std::any::type_name::<Content>();
        match type_name.rfind(':') {
            Some(pos) => &type_name[(pos + 1)..],
            None => type_name,
        }
    }

    fn allocate(device: &wgpu::Device, stride: u64, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("DynamicUniformBuffer: {}", Self::name())),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = aligned_stride(std::mem::size_of::<Content>() as u64, alignment);
        let capacity = capacity.max(1);

        Self {
            buffer: Self::allocate(device, stride, capacity),
            content_type: PhantomData,
            stride,
            capacity,
        }
    }

    /// Grows the buffer to hold at least `count` elements
    ///
    /// Returns `true` when the underlying buffer was replaced.
    pub fn ensure_capacity(&mut self, device: &wgpu::Device, count: usize) -> bool {
        if count <= self.capacity {
            return false;
        }
        let capacity = count.next_power_of_two();
        log::debug!(
            "Growing {} uniforms from {} to {} elements",
            Self::name(),
            self.capacity,
            capacity
        );
        self.buffer = Self::allocate(device, self.stride, capacity);
        self.capacity = capacity;
        true
    }

    /// Uploads `items`, element `i` landing at [`offset(i)`](Self::offset)
    pub fn write_all(&self, queue: &wgpu::Queue, items: &[Content]) {
        if items.is_empty() {
            return;
        }
        debug_assert!(items.len() <= self.capacity);
        queue.write_buffer(&self.buffer, 0, &pack(items, self.stride));
    }

    /// Dynamic offset of element `index`
    pub fn offset(&self, index: usize) -> wgpu::DynamicOffset {
        (index as u64 * self.stride) as wgpu::DynamicOffset
    }

    /// Binding covering a single element
    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &self.buffer,
            offset: 0,
            size: wgpu::BufferSize::new(std::mem::size_of::<Content>() as u64),
        })
    }
}
