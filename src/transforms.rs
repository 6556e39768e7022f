//! Matrix transform chain relating camera view, depth-camera view, and
//! depth-camera clip spaces
//!
//! The depth camera renders terrain into an offscreen depth target; clamping
//! a vertex means carrying it from the main camera's view space into the
//! depth camera's texture space, substituting the sampled ground depth, and
//! carrying it back. All composition follows right-handed, column-vector
//! conventions.

use glam::{Mat4, Vec3};

/// Clip-to-texture mapping: remaps the [-1,1] clip cube to the [0,1] range a
/// texture lookup expects. Translation applies before the scale.
pub fn scale_bias() -> Mat4 {
    Mat4::from_scale(Vec3::splat(0.5)) * Mat4::from_translation(Vec3::ONE)
}

/// Per-frame matrices bridging the three coordinate spaces.
///
/// Forward matrices are exact compositions of the caller's view/projection
/// inputs; the inverse members come from runtime matrix inversion, so a
/// singular input (degenerate projection, zero-scale view) yields
/// non-finite values that corrupt clamping for the frame rather than
/// raising an error.
#[derive(Debug, Clone, Copy)]
pub struct TransformChain {
    /// Main-camera view space -> depth-camera view space
    pub camera_view_to_depth_view: Mat4,
    /// Depth-camera view space -> depth-camera texture-clip space
    pub depth_view_to_depth_clip: Mat4,
    /// Main-camera view space -> depth-camera texture-clip space
    pub camera_view_to_depth_clip: Mat4,
    /// Inverse of `depth_view_to_depth_clip`
    pub depth_clip_to_depth_view: Mat4,
    /// Inverse of `camera_view_to_depth_view`
    pub depth_view_to_camera_view: Mat4,
    /// Inverse of `camera_view_to_depth_clip`
    pub depth_clip_to_camera_view: Mat4,
}

impl TransformChain {
    /// Build the chain for one frame.
    ///
    /// `camera_view` is the main camera's world-to-view matrix; `rtt_view`
    /// and `rtt_proj` are the depth camera's world-to-view and projection
    /// matrices. The combined `camera_view_to_depth_clip` is composed here
    /// rather than in the shader, which would lose precision multiplying the
    /// stages at 32 bits.
    pub fn compute(camera_view: Mat4, rtt_view: Mat4, rtt_proj: Mat4) -> Self {
        let camera_view_to_depth_view = rtt_view * camera_view.inverse();
        let depth_view_to_depth_clip = scale_bias() * rtt_proj;
        let camera_view_to_depth_clip = depth_view_to_depth_clip * camera_view_to_depth_view;

        Self {
            camera_view_to_depth_view,
            depth_view_to_depth_clip,
            camera_view_to_depth_clip,
            depth_clip_to_depth_view: depth_view_to_depth_clip.inverse(),
            depth_view_to_camera_view: camera_view_to_depth_view.inverse(),
            depth_clip_to_camera_view: camera_view_to_depth_clip.inverse(),
        }
    }
}
