//! Offscreen depth camera
//!
//! Renders the terrain subgraph, and nothing else, into the per-view depth
//! target. The pass carries no color attachments, so color writes and
//! blending are impossible by construction, and the solid-fill depth
//! pipeline is baked in so no inherited debug fill mode can corrupt the
//! capture.

use glam::Mat4;

use super::pipeline::ClampPipelines;
use crate::overlay::TerrainDepthSource;

/// View-projection uniforms for the depth pass
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DepthCameraUniforms {
    pub view_proj: [[f32; 4]; 4],
}

/// Depth camera for one view: matrices on the GPU plus the viewport square.
pub struct RttCamera {
    viewproj_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    viewport: u32,
}

impl RttCamera {
    pub fn new(device: &wgpu::Device, pipelines: &ClampPipelines, viewport: u32) -> Self {
        let viewproj_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("clamp-depth-camera-uniforms"),
            size: std::mem::size_of::<DepthCameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("clamp-depth-camera-bind-group"),
            layout: &pipelines.depth_bind_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewproj_buffer.as_entire_binding(),
            }],
        });

        Self {
            viewproj_buffer,
            bind_group,
            viewport,
        }
    }

    /// Push this frame's depth-camera matrices. The caller supplies exact
    /// matrices; nothing here recomputes near/far.
    pub fn set_matrices(&self, queue: &wgpu::Queue, view: Mat4, proj: Mat4) {
        let uniforms = DepthCameraUniforms {
            view_proj: (proj * view).to_cols_array_2d(),
        };
        queue.write_buffer(&self.viewproj_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Record the terrain depth pass. Must be recorded before the overlay
    /// pass that samples the target.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipelines: &ClampPipelines,
        depth_view: &wgpu::TextureView,
        terrain: &dyn TerrainDepthSource,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clamp-depth-pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let size = self.viewport as f32;
        pass.set_viewport(0.0, 0.0, size, size, 0.0, 1.0);
        pass.set_pipeline(&pipelines.depth_pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        terrain.draw_depth(&mut pass);
    }
}
