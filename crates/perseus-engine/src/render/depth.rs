/// Depth attachment sized to the current render target.
pub(super) struct DepthTarget {
    size: (u32, u32),
    // Keeps the texture alive for `view`.
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthTarget {
    pub(super) fn new(device: &wgpu::Device, format: wgpu::TextureFormat, size: (u32, u32)) -> Self {
        let (width, height) = (size.0.max(1), size.1.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("perseus depth target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!("depth target {width}x{height} ({format:?})");

        Self {
            size,
            _texture: texture,
            view,
        }
    }

    pub(super) fn matches(&self, size: (u32, u32)) -> bool {
        self.size == size
    }

    pub(super) fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}
