//! WGPU binding type utilities

/// Uniform buffer bound at a per-draw dynamic offset
///
/// `min_binding_size` is the size of one element, so every offset handed to
/// `set_bind_group` must leave room for a full element.
pub fn uniform_dynamic(element_size: u64) -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: true,
        min_binding_size: wgpu::BufferSize::new(element_size),
    }
}
