//! GPU uniform layouts for the clamping technique
//!
//! One frame-uniform layout per transform mode; the inactive mode's matrices
//! never exist on the GPU. Layouts mirror the WGSL structs field for field.

use glam::Mat4;

use crate::overlay::DepthOffset;
use crate::transforms::TransformChain;

/// Transform-mode selection, fixed at technique construction.
///
/// `GroundOffset` routes the clamped point through depth-view space so the
/// vertex's model-space height above ground can be reapplied; `Direct` maps
/// the reconstructed ground point straight back to camera view space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampMode {
    GroundOffset,
    Direct,
}

/// Frame uniforms for [`ClampMode::GroundOffset`]
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GroundOffsetFrameUniforms {
    /// Main camera world-to-view matrix
    pub camera_view: [[f32; 4]; 4],

    /// Main camera projection matrix
    pub camera_projection: [[f32; 4]; 4],

    /// Camera-view to depth-texture-clip, scale-bias included
    pub camera_view_to_depth_clip: [[f32; 4]; 4],

    /// Depth-texture-clip back to depth-view
    pub depth_clip_to_depth_view: [[f32; 4]; 4],

    /// Depth-view back to camera-view
    pub depth_view_to_camera_view: [[f32; 4]; 4],

    /// Maximum clamping distance
    pub horizon_distance: f32,

    /// Padding for 16-byte uniform alignment
    pub _pad: [f32; 3],
}

/// Frame uniforms for [`ClampMode::Direct`]
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectFrameUniforms {
    /// Main camera world-to-view matrix
    pub camera_view: [[f32; 4]; 4],

    /// Main camera projection matrix
    pub camera_projection: [[f32; 4]; 4],

    /// Camera-view to depth-texture-clip, scale-bias included
    pub camera_view_to_depth_clip: [[f32; 4]; 4],

    /// Depth-texture-clip back to camera-view, one combined inverse
    pub depth_clip_to_camera_view: [[f32; 4]; 4],

    /// Maximum clamping distance
    pub horizon_distance: f32,

    /// Padding for 16-byte uniform alignment
    pub _pad: [f32; 3],
}

/// Per-object uniforms: model transform, flat color, and the depth-offset
/// bias/range windows
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// (min_bias, max_bias)
    pub bias: [f32; 2],
    /// (min_range, max_range)
    pub range: [f32; 2],
}

impl ObjectUniforms {
    pub fn new(model: Mat4, color: [f32; 4], depth_offset: DepthOffset) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
            bias: [depth_offset.min_bias, depth_offset.max_bias],
            range: [depth_offset.min_range, depth_offset.max_range],
        }
    }
}

/// Mode-tagged frame uniform payload
#[derive(Debug, Clone, Copy)]
pub enum FrameUniforms {
    GroundOffset(GroundOffsetFrameUniforms),
    Direct(DirectFrameUniforms),
}

impl FrameUniforms {
    /// Assemble the active mode's uniforms from the frame's transform chain.
    pub fn for_mode(
        mode: ClampMode,
        chain: &TransformChain,
        camera_view: Mat4,
        camera_projection: Mat4,
        horizon_distance: f32,
    ) -> Self {
        match mode {
            ClampMode::GroundOffset => FrameUniforms::GroundOffset(GroundOffsetFrameUniforms {
                camera_view: camera_view.to_cols_array_2d(),
                camera_projection: camera_projection.to_cols_array_2d(),
                camera_view_to_depth_clip: chain.camera_view_to_depth_clip.to_cols_array_2d(),
                depth_clip_to_depth_view: chain.depth_clip_to_depth_view.to_cols_array_2d(),
                depth_view_to_camera_view: chain.depth_view_to_camera_view.to_cols_array_2d(),
                horizon_distance,
                _pad: [0.0; 3],
            }),
            ClampMode::Direct => FrameUniforms::Direct(DirectFrameUniforms {
                camera_view: camera_view.to_cols_array_2d(),
                camera_projection: camera_projection.to_cols_array_2d(),
                camera_view_to_depth_clip: chain.camera_view_to_depth_clip.to_cols_array_2d(),
                depth_clip_to_camera_view: chain.depth_clip_to_camera_view.to_cols_array_2d(),
                horizon_distance,
                _pad: [0.0; 3],
            }),
        }
    }

    /// Byte size of the active mode's uniform buffer.
    pub fn size_for(mode: ClampMode) -> u64 {
        match mode {
            ClampMode::GroundOffset => std::mem::size_of::<GroundOffsetFrameUniforms>() as u64,
            ClampMode::Direct => std::mem::size_of::<DirectFrameUniforms>() as u64,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FrameUniforms::GroundOffset(u) => bytemuck::bytes_of(u),
            FrameUniforms::Direct(u) => bytemuck::bytes_of(u),
        }
    }
}
