//! Terrain draping for wgpu: clamp overlay geometry onto a depth-captured
//! terrain surface, with depth offsetting that keeps the draped result from
//! z-fighting the ground it sits on.
//!
//! The host renderer owns the scene and the frame loop; this crate owns the
//! offscreen depth capture, the matrix chain between camera, depth-camera,
//! and texture-clip spaces, and the GPU clamp program. See
//! [`clamping::ClampingTechnique`] for the per-frame driving contract.

pub mod clamping;
pub mod cull;
pub mod device_caps;
pub mod error;
pub mod gpu;
pub mod overlay;
pub mod transforms;

pub use clamping::per_view::{PerViewState, PerViewStore, ViewId};
pub use clamping::uniforms::ClampMode;
pub use clamping::{ClampingConfig, ClampingTechnique, CullContext, FrameParams};
pub use cull::{BoundingSphere, Frustum};
pub use device_caps::DeviceCaps;
pub use error::{DrapeError, DrapeResult};
pub use overlay::{ClampableNode, DepthOffset, Mesh, OverlayGroup, TerrainDepthSource};
pub use transforms::TransformChain;
