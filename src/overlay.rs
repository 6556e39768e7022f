// src/overlay.rs
// Overlay geometry model: the clampable node group draped onto terrain, plus
// the terrain depth-source trait the offscreen depth camera renders.
// RELEVANT FILES: src/clamping/mod.rs, src/clamping/rtt_camera.rs, src/cull.rs

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::cull::BoundingSphere;
use crate::error::{DrapeError, DrapeResult};

/// Vertex attribute layout shared by terrain depth rendering and overlay
/// meshes: a single position stream.
const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

pub(crate) fn position_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRIBUTES,
    }
}

/// Renderable terrain content for the offscreen depth pass.
///
/// The pass arrives with the depth pipeline and view-projection bind group
/// already set; implementations bind their position-stream vertex data
/// (layout per [`position_vertex_layout`]) and issue draws.
pub trait TerrainDepthSource: Send + Sync {
    fn draw_depth<'rp>(&'rp self, pass: &mut wgpu::RenderPass<'rp>);
}

/// Indexed triangle mesh with a position-only vertex stream.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl Mesh {
    pub fn new(device: &wgpu::Device, label: &str, positions: &[[f32; 3]], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}-vertices", label)),
            contents: bytemuck::cast_slice(positions),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}-indices", label)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

impl TerrainDepthSource for Mesh {
    fn draw_depth<'rp>(&'rp self, pass: &mut wgpu::RenderPass<'rp>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Range-mapped depth offset for one clampable node.
///
/// The offset bias applied to a clamped vertex grows with its distance from
/// the camera: `range` is clamped into `[min_range, max_range]` and linearly
/// mapped to a bias in `[min_bias, max_bias]`.
#[derive(Debug, Clone, Copy)]
pub struct DepthOffset {
    pub min_bias: f32,
    pub max_bias: f32,
    pub min_range: f32,
    pub max_range: f32,
}

impl Default for DepthOffset {
    fn default() -> Self {
        Self {
            min_bias: 100.0,
            max_bias: 10_000.0,
            min_range: 1_000.0,
            max_range: 10_000_000.0,
        }
    }
}

impl DepthOffset {
    pub fn validate(&self) -> DrapeResult<()> {
        let fields = [self.min_bias, self.max_bias, self.min_range, self.max_range];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(DrapeError::validation("depth offset values must be finite"));
        }
        if self.min_bias < 0.0 || self.min_range < 0.0 {
            return Err(DrapeError::validation("depth offset values must be >= 0"));
        }
        if self.min_bias > self.max_bias {
            return Err(DrapeError::validation("min_bias must be <= max_bias"));
        }
        if self.min_range >= self.max_range {
            return Err(DrapeError::validation("min_range must be < max_range"));
        }
        Ok(())
    }
}

/// One overlay node clamped onto the terrain surface.
pub struct ClampableNode {
    pub(crate) mesh: Mesh,
    pub(crate) bounds: BoundingSphere,
    pub(crate) model: Mat4,
    pub(crate) color: [f32; 4],
    pub(crate) depth_offset: DepthOffset,
    pub(crate) object_buffer: wgpu::Buffer,
    pub(crate) bind_group: once_cell::sync::OnceCell<wgpu::BindGroup>,
}

impl ClampableNode {
    pub fn new(
        device: &wgpu::Device,
        mesh: Mesh,
        bounds: BoundingSphere,
        model: Mat4,
        color: [f32; 4],
        depth_offset: DepthOffset,
    ) -> DrapeResult<Self> {
        depth_offset.validate()?;
        if color.iter().any(|c| !c.is_finite()) {
            return Err(DrapeError::validation("node color must be finite"));
        }

        let object_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("clamp-object-uniforms"),
            size: std::mem::size_of::<crate::clamping::uniforms::ObjectUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            mesh,
            bounds,
            model,
            color,
            depth_offset,
            object_buffer,
            bind_group: once_cell::sync::OnceCell::new(),
        })
    }

    pub fn bounds(&self) -> BoundingSphere {
        self.bounds
    }

    pub fn depth_offset(&self) -> DepthOffset {
        self.depth_offset
    }

    pub fn set_depth_offset(&mut self, depth_offset: DepthOffset) -> DrapeResult<()> {
        depth_offset.validate()?;
        self.depth_offset = depth_offset;
        Ok(())
    }

    pub fn set_model(&mut self, model: Mat4) {
        self.model = model;
    }
}

/// The clampable overlay subgraph for one view, owned by the orchestrator.
#[derive(Default)]
pub struct OverlayGroup {
    nodes: Vec<ClampableNode>,
}

impl OverlayGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: ClampableNode) {
        self.nodes.push(node);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn num_children(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[ClampableNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [ClampableNode] {
        &mut self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_offset_default_is_valid() {
        assert!(DepthOffset::default().validate().is_ok());
    }

    #[test]
    fn test_depth_offset_rejects_inverted_bias() {
        let offset = DepthOffset {
            min_bias: 10.0,
            max_bias: 1.0,
            ..Default::default()
        };
        assert!(offset.validate().is_err());
    }

    #[test]
    fn test_depth_offset_rejects_non_finite() {
        let offset = DepthOffset {
            max_range: f32::NAN,
            ..Default::default()
        };
        assert!(offset.validate().is_err());
    }

    #[test]
    fn test_depth_offset_rejects_degenerate_range() {
        let offset = DepthOffset {
            min_range: 500.0,
            max_range: 500.0,
            ..Default::default()
        };
        assert!(offset.validate().is_err());
    }
}
