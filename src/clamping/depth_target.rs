//! Offscreen depth target the terrain is rendered into
//!
//! Square, depth-only, clamp-to-edge. Geometry whose projection lands
//! outside the texture still samples the nearest edge value, which keeps
//! primitives with some off-screen verts clamped sanely.

use wgpu::{Device, Sampler, Texture, TextureFormat, TextureView};

/// Depth format for the terrain capture.
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Fixed-size square depth render target for one view.
pub struct DepthTarget {
    /// Depth texture (Depth32Float)
    pub texture: Texture,
    /// View for rendering (depth attachment)
    pub render_view: TextureView,
    /// View for sampling in the clamp shader
    pub sample_view: TextureView,
    /// Clamp-to-edge, nearest-filtered sampler. Depth formats are never
    /// filterable under WebGPU, so lookups read single texels.
    pub sampler: Sampler,
    /// Side length in texels
    pub size: u32,
}

impl DepthTarget {
    pub fn new(device: &Device, size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("clamp-depth-target"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let render_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("clamp-depth-render-view"),
            format: Some(DEPTH_FORMAT),
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::DepthOnly,
            ..Default::default()
        });

        let sample_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("clamp-depth-sample-view"),
            format: Some(DEPTH_FORMAT),
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::DepthOnly,
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("clamp-depth-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: None,
            ..Default::default()
        });

        Self {
            texture,
            render_view,
            sample_view,
            sampler,
            size,
        }
    }

    /// GPU memory held by the depth texture.
    pub fn memory_bytes(&self) -> u64 {
        // Depth32Float = 4 bytes per texel
        (self.size as u64) * (self.size as u64) * 4
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_memory_accounting() {
        // 4096² texels at 4 bytes each; no device needed for the arithmetic.
        let bytes = 4096u64 * 4096 * 4;
        assert_eq!(bytes, 67_108_864);
    }
}
