//! Per-view resources and the concurrent keyed store that holds them
//!
//! Views (cameras/viewports) are processed by the host on independent cull
//! passes, so the store must tolerate concurrent insert/lookup for distinct
//! views. Within one view everything is sequential.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::depth_target::DepthTarget;
use super::pipeline::ClampPipelines;
use super::rtt_camera::RttCamera;
use super::uniforms::{ClampMode, FrameUniforms};

/// Stable identity of a rendering view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

impl From<u64> for ViewId {
    fn from(raw: u64) -> Self {
        ViewId(raw)
    }
}

/// Concurrent view-keyed store with atomic get-or-insert.
///
/// Lookups take a shared lock; the insert path upgrades to exclusive and
/// re-checks, so two views racing on different keys never clobber each other
/// and two racers on the same key converge on one entry.
pub struct PerViewStore<T> {
    inner: RwLock<HashMap<ViewId, Arc<T>>>,
}

impl<T> Default for PerViewStore<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> PerViewStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, view: ViewId) -> Option<Arc<T>> {
        self.inner.read().get(&view).cloned()
    }

    /// Fetch the entry for `view`, building it with `init` if absent.
    pub fn get_or_insert_with(&self, view: ViewId, init: impl FnOnce() -> T) -> Arc<T> {
        if let Some(existing) = self.get(view) {
            return existing;
        }
        let mut map = self.inner.write();
        map.entry(view).or_insert_with(|| Arc::new(init())).clone()
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.inner.read().contains_key(&view)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

/// GPU resources scoped to one rendering view.
pub struct PerViewState {
    /// Offscreen terrain depth target
    pub depth_target: DepthTarget,

    /// Depth camera rendering into the target
    pub rtt_camera: RttCamera,

    /// Frame uniform buffer; layout follows the technique's clamp mode
    pub frame_buffer: wgpu::Buffer,

    /// Shared clamp bind group: frame uniforms + depth texture + sampler
    pub shared_bind_group: wgpu::BindGroup,

    /// Overlay nodes drawn last frame (debug statistics)
    pub drawn_nodes: AtomicU32,
}

impl PerViewState {
    pub fn new(
        device: &wgpu::Device,
        pipelines: &ClampPipelines,
        mode: ClampMode,
        texture_size: u32,
    ) -> Self {
        let depth_target = DepthTarget::new(device, texture_size);
        let rtt_camera = RttCamera::new(device, pipelines, texture_size);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("clamp-frame-uniforms"),
            size: FrameUniforms::size_for(mode),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shared_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("clamp-shared-bind-group"),
            layout: &pipelines.shared_bind_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&depth_target.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&depth_target.sample_view),
                },
            ],
        });

        Self {
            depth_target,
            rtt_camera,
            frame_buffer,
            shared_bind_group,
            drawn_nodes: AtomicU32::new(0),
        }
    }

    /// Upload this frame's transform-chain uniforms.
    pub fn write_frame_uniforms(&self, queue: &wgpu::Queue, uniforms: &FrameUniforms) {
        queue.write_buffer(&self.frame_buffer, 0, uniforms.as_bytes());
    }

    pub fn record_drawn_nodes(&self, count: u32) {
        self.drawn_nodes.store(count, Ordering::Relaxed);
    }

    pub fn last_drawn_nodes(&self) -> u32 {
        self.drawn_nodes.load(Ordering::Relaxed)
    }
}
