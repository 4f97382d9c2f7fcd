/// One acquired swapchain image, handed to the renderer for a single frame.
///
/// Short-lived: holding it blocks acquisition of the next image. Presented by
/// the renderer after the frame's command buffer is submitted.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

impl GpuFrame {
    pub fn new(surface_texture: wgpu::SurfaceTexture) -> Self {
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            surface_texture,
            view,
        }
    }

    /// Target size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        let texture = &self.surface_texture.texture;
        (texture.width(), texture.height())
    }

    pub fn present(self) {
        drop(self.view);
        self.surface_texture.present();
    }
}
