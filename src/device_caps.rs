//! Device capabilities and diagnostics
//!
//! Provides structured access to the GPU limits and features the clamping
//! technique depends on: texture dimensions, sampler binding counts, and
//! depth-texture filtering support.

/// Device capabilities queried once at technique construction
#[derive(Debug, Clone)]
pub struct DeviceCaps {
    /// Backend identifier (vulkan, dx12, metal, gl)
    pub backend: String,

    /// Adapter name from driver
    pub adapter_name: String,

    /// Device type (integrated, discrete, virtual, cpu, other)
    pub device_type: wgpu::DeviceType,

    /// Maximum 2D texture dimension
    pub max_texture_dimension_2d: u32,

    /// Maximum sampled textures per shader stage
    pub max_sampled_textures_per_shader_stage: u32,
}

impl DeviceCaps {
    /// Query capabilities from an adapter/device pair
    pub fn from_device(adapter: &wgpu::Adapter, device: &wgpu::Device) -> Self {
        let adapter_info = adapter.get_info();
        let limits = device.limits();

        DeviceCaps {
            backend: format!("{:?}", adapter_info.backend).to_lowercase(),
            adapter_name: adapter_info.name.clone(),
            device_type: adapter_info.device_type,
            max_texture_dimension_2d: limits.max_texture_dimension_2d,
            max_sampled_textures_per_shader_stage: limits.max_sampled_textures_per_shader_stage,
        }
    }

    /// Largest square texture the device renders to at full speed.
    ///
    /// Discrete GPUs take the reported maximum; shared-memory and software
    /// devices get progressively tighter caps since a full-resolution depth
    /// target on those parts stalls the frame.
    pub fn max_fast_texture_size(&self) -> u32 {
        match self.device_type {
            wgpu::DeviceType::DiscreteGpu => self.max_texture_dimension_2d,
            wgpu::DeviceType::IntegratedGpu => self.max_texture_dimension_2d.min(8192),
            wgpu::DeviceType::VirtualGpu => self.max_texture_dimension_2d.min(4096),
            wgpu::DeviceType::Cpu => self.max_texture_dimension_2d.min(2048),
            _ => self.max_texture_dimension_2d.min(4096),
        }
    }

    /// Whether the device can host the clamping technique at all: it needs at
    /// least a depth texture binding alongside the host's own textures, and a
    /// renderable depth target.
    pub fn supports_clamping(&self) -> bool {
        self.max_sampled_textures_per_shader_stage >= 2 && self.max_texture_dimension_2d >= 1024
    }
}
