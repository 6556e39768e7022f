//! Terrain clamping technique
//!
//! Drapes overlay geometry onto terrain by capturing the terrain's depth
//! from an offscreen camera each frame, then reconstructing every overlay
//! vertex's position from the sampled ground depth on the GPU, with a
//! depth-offset pass that keeps the draped result from z-fighting the
//! terrain underneath.
//!
//! The host drives the technique once per view per frame: `pre_cull` builds
//! per-view GPU state the first time a view has overlay data, `cull_overlay`
//! records the depth pass and the clamped overlay pass.

pub mod depth_target;
pub mod math;
pub mod per_view;
pub mod pipeline;
pub mod rtt_camera;
pub mod shader;
pub mod uniforms;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::Mat4;
use once_cell::sync::OnceCell;

use crate::cull::Frustum;
use crate::device_caps::DeviceCaps;
use crate::overlay::{ClampableNode, OverlayGroup, TerrainDepthSource};
use crate::transforms::TransformChain;

use per_view::{PerViewState, PerViewStore, ViewId};
use pipeline::ClampPipelines;
use uniforms::{ClampMode, FrameUniforms, ObjectUniforms};

/// Hard ceiling on the default depth-target size; devices reporting more
/// fast-texture headroom still start here.
pub const DEFAULT_MAX_TEXTURE_SIZE: u32 = 4096;

/// Environment variable enabling per-frame statistics logging
/// (`DRAPE3D_CLAMP_DEBUG=stats`).
pub const CLAMP_DEBUG_ENV: &str = "DRAPE3D_CLAMP_DEBUG";

/// Technique configuration, fixed at construction apart from the texture
/// size.
#[derive(Debug, Clone)]
pub struct ClampingConfig {
    /// Transform mode; `Direct` matches the reference default
    pub mode: ClampMode,

    /// Depth-target side length; resolved at install when unset
    pub texture_size: Option<u32>,

    /// Color format of the host pass the overlay renders into
    pub color_format: wgpu::TextureFormat,

    /// Depth format of the host pass the overlay renders into
    pub depth_format: wgpu::TextureFormat,

    /// Debug statistics logging:
    ///   0 = disabled
    ///   1 = per-frame culled/drawn node counts at debug level
    /// Set via DRAPE3D_CLAMP_DEBUG env var: "stats"
    pub debug_mode: u32,
}

impl Default for ClampingConfig {
    fn default() -> Self {
        let debug_mode = match std::env::var(CLAMP_DEBUG_ENV).as_deref() {
            Ok("stats") => 1,
            _ => 0,
        };
        Self {
            mode: ClampMode::Direct,
            texture_size: None,
            color_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            depth_format: wgpu::TextureFormat::Depth32Float,
            debug_mode,
        }
    }
}

/// Per-frame, per-view inputs, owned by the host orchestrator and borrowed
/// for the duration of the cull hooks.
pub struct FrameParams<'a> {
    /// Stable identity of the view being processed
    pub view_id: ViewId,

    /// Overlay geometry to clamp
    pub overlay: &'a OverlayGroup,

    /// Main camera world-to-view matrix
    pub camera_view: Mat4,

    /// Main camera projection matrix
    pub camera_proj: Mat4,

    /// Depth camera world-to-view matrix
    pub rtt_view: Mat4,

    /// Depth camera projection matrix
    pub rtt_proj: Mat4,

    /// Maximum visibility distance for clamped geometry
    pub horizon_distance: f32,
}

/// Host render targets the overlay pass draws into.
pub struct CullContext<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub depth_view: &'a wgpu::TextureView,
}

/// The clamping technique: lifecycle hooks plus the per-frame cull hooks.
///
/// One instance serves every view; per-view GPU state lives in a concurrent
/// store keyed by [`ViewId`], so different views may run their cull passes
/// on different threads.
pub struct ClampingTechnique {
    config: ClampingConfig,
    caps: DeviceCaps,
    supported: bool,
    engine: Option<Arc<dyn TerrainDepthSource>>,
    pipelines: OnceCell<ClampPipelines>,
    views: PerViewStore<PerViewState>,
    warned_unsupported: AtomicBool,
}

impl ClampingTechnique {
    /// Create the technique. An unsupported device yields a constructed but
    /// inert technique; callers check [`Self::is_supported`] before driving
    /// the cull hooks.
    pub fn new(caps: DeviceCaps, config: ClampingConfig) -> Self {
        let supported = caps.supports_clamping();
        if !supported {
            log::warn!(
                "clamping technique unsupported on {} ({})",
                caps.adapter_name,
                caps.backend
            );
        }
        Self {
            config,
            caps,
            supported,
            engine: None,
            pipelines: OnceCell::new(),
            views: PerViewStore::new(),
            warned_unsupported: AtomicBool::new(false),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Error-typed variant of [`Self::is_supported`] for hosts that treat an
    /// unsupported device as a setup failure.
    pub fn require_supported(&self) -> crate::error::DrapeResult<()> {
        if self.supported {
            Ok(())
        } else {
            Err(crate::error::DrapeError::unsupported(format!(
                "clamping technique cannot run on {} ({})",
                self.caps.adapter_name, self.caps.backend
            )))
        }
    }

    pub fn mode(&self) -> ClampMode {
        self.config.mode
    }

    /// Composed WGSL source for the active mode, for hosts building their
    /// own overlay pipelines around the clamp program.
    pub fn shader_source(&self) -> String {
        shader::overlay_shader_source(self.config.mode)
    }

    /// Bind the terrain engine. Resolves the default depth-target size on
    /// first install when none was configured.
    pub fn install(&mut self, engine: Arc<dyn TerrainDepthSource>) {
        self.engine = Some(engine);

        if self.config.texture_size.is_none() {
            let resolved = DEFAULT_MAX_TEXTURE_SIZE.min(self.caps.max_fast_texture_size());
            self.config.texture_size = Some(resolved);
            log::info!("clamping depth-target size = {}", resolved);
        }
    }

    /// Release the terrain engine; every per-view state is reclaimed.
    pub fn uninstall(&mut self) {
        self.engine = None;
        self.views.clear();
    }

    /// Terrain content changes need no rebuild: the depth capture re-renders
    /// every frame.
    pub fn reestablish(&self) {}

    /// Update the configured depth-target size. A matching value is a no-op.
    /// A new value applies to views set up afterwards; existing targets are
    /// never resized in place.
    pub fn set_texture_size(&mut self, size: u32) {
        if Some(size) != self.config.texture_size {
            self.config.texture_size = Some(size);
        }
    }

    /// Configured (or install-resolved) depth-target size.
    pub fn texture_size(&self) -> Option<u32> {
        self.config.texture_size
    }

    /// True iff the overlay group has anything to clamp. No side effects.
    pub fn has_data(&self, params: &FrameParams) -> bool {
        params.overlay.num_children() > 0
    }

    /// Number of views with live GPU state.
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Pre-cull hook: lazily builds this view's GPU state the first time the
    /// view has overlay data. Idempotent and safe to call from concurrent
    /// per-view cull passes.
    pub fn pre_cull(&self, device: &wgpu::Device, params: &FrameParams) {
        if !self.check_supported() || self.engine.is_none() {
            return;
        }
        if self.views.contains(params.view_id) || !self.has_data(params) {
            return;
        }

        let Some(texture_size) = self.config.texture_size else {
            log::debug!("clamping pre_cull before install; skipping setup");
            return;
        };

        let pipelines = self.ensure_pipelines(device);
        self.views.get_or_insert_with(params.view_id, || {
            PerViewState::new(device, pipelines, self.config.mode, texture_size)
        });
    }

    /// Cull-time hook: records the terrain depth pass, refreshes the
    /// transform-chain uniforms, and records the clamped overlay pass.
    ///
    /// A view whose state is not ready yet (including the benign race where
    /// another thread is mid-setup) skips the frame.
    pub fn cull_overlay(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        params: &FrameParams,
        ctx: &mut CullContext,
    ) {
        if !self.check_supported() {
            return;
        }
        let Some(engine) = self.engine.as_deref() else {
            return;
        };
        let Some(state) = self.views.get(params.view_id) else {
            log::debug!("clamping state not ready for view {}", params.view_id.0);
            return;
        };
        if !self.has_data(params) {
            return;
        }
        let Some(pipelines) = self.pipelines.get() else {
            return;
        };

        // Depth capture first; the overlay pass below samples it.
        state
            .rtt_camera
            .set_matrices(queue, params.rtt_view, params.rtt_proj);
        state
            .rtt_camera
            .render(ctx.encoder, pipelines, &state.depth_target.render_view, engine);

        // Compose the full view-to-texture-clip chain on the CPU so the
        // 32-bit shader never multiplies the stages itself.
        let chain = TransformChain::compute(params.camera_view, params.rtt_view, params.rtt_proj);
        let frame = FrameUniforms::for_mode(
            self.config.mode,
            &chain,
            params.camera_view,
            params.camera_proj,
            params.horizon_distance,
        );
        state.write_frame_uniforms(queue, &frame);

        // Clamping moves verts to wherever the terrain is, so visibility
        // must be judged with the depth camera's frustum: geometry invisible
        // un-clamped can be visible clamped, and vice versa.
        let frustum = Frustum::from_view_proj(&(params.rtt_proj * params.rtt_view));
        let visible: Vec<&ClampableNode> = params
            .overlay
            .nodes()
            .iter()
            .filter(|node| frustum.intersects_sphere(&node.bounds()))
            .collect();

        state.record_drawn_nodes(visible.len() as u32);
        if self.config.debug_mode == 1 {
            log::debug!(
                "clamping view {}: {} of {} nodes visible",
                params.view_id.0,
                visible.len(),
                params.overlay.num_children()
            );
        }

        if visible.is_empty() {
            return;
        }

        for node in &visible {
            let uniforms = ObjectUniforms::new(node.model, node.color, node.depth_offset);
            queue.write_buffer(&node.object_buffer, 0, bytemuck::bytes_of(&uniforms));
        }

        let mut pass = ctx.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clamp-overlay-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: ctx.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&pipelines.overlay_pipeline);
        pass.set_bind_group(0, &state.shared_bind_group, &[]);

        for node in &visible {
            let bind_group = node.bind_group.get_or_init(|| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("clamp-object-bind-group"),
                    layout: &pipelines.object_bind_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: node.object_buffer.as_entire_binding(),
                    }],
                })
            });
            pass.set_bind_group(1, bind_group, &[]);
            pass.set_vertex_buffer(0, node.mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(node.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..node.mesh.index_count, 0, 0..1);
        }
    }

    fn ensure_pipelines(&self, device: &wgpu::Device) -> &ClampPipelines {
        self.pipelines.get_or_init(|| {
            ClampPipelines::new(
                device,
                self.config.mode,
                self.config.color_format,
                self.config.depth_format,
            )
        })
    }

    fn check_supported(&self) -> bool {
        if self.supported {
            return true;
        }
        if !self.warned_unsupported.swap(true, Ordering::Relaxed) {
            log::warn!("clamping cull hooks invoked on an unsupported device; ignoring");
        }
        false
    }
}
