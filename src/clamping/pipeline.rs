//! Pipeline and bind-group-layout creation for the clamping technique
//!
//! Built once per technique and shared by every view: the depth-only terrain
//! pipeline, the composed overlay pipeline, and the layouts their bind
//! groups follow.

use std::num::NonZeroU64;

use super::rtt_camera::DepthCameraUniforms;
use super::shader;
use super::uniforms::{ClampMode, FrameUniforms, ObjectUniforms};
use crate::overlay::position_vertex_layout;

/// Shared GPU pipeline state for the technique.
pub struct ClampPipelines {
    /// Layout for the depth camera's view-projection uniforms
    pub depth_bind_layout: wgpu::BindGroupLayout,
    /// Depth-only terrain pipeline: solid fill, no color targets
    pub depth_pipeline: wgpu::RenderPipeline,
    /// Layout for the shared clamp bind group (frame uniforms, sampler,
    /// depth texture at the highest binding)
    pub shared_bind_layout: wgpu::BindGroupLayout,
    /// Layout for per-node object uniforms
    pub object_bind_layout: wgpu::BindGroupLayout,
    /// Overlay pipeline with the clamp program composed in
    pub overlay_pipeline: wgpu::RenderPipeline,
}

impl ClampPipelines {
    pub fn new(
        device: &wgpu::Device,
        mode: ClampMode,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let depth_bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("clamp-depth-camera-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(
                        std::mem::size_of::<DepthCameraUniforms>() as u64
                    ),
                },
                count: None,
            }],
        });

        let depth_pipeline = create_depth_pipeline(device, &depth_bind_layout);

        let shared_bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("clamp-shared-layout"),
            entries: &[
                // frame uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(FrameUniforms::size_for(mode)),
                    },
                    count: None,
                },
                // depth sampler (non-comparison; depth formats never filter)
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
                // depth texture, highest binding in the group
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Depth,
                    },
                    count: None,
                },
            ],
        });

        let object_bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("clamp-object-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<ObjectUniforms>() as u64),
                },
                count: None,
            }],
        });

        let overlay_pipeline = create_overlay_pipeline(
            device,
            mode,
            &shared_bind_layout,
            &object_bind_layout,
            color_format,
            depth_format,
        );

        Self {
            depth_bind_layout,
            depth_pipeline,
            shared_bind_layout,
            object_bind_layout,
            overlay_pipeline,
        }
    }
}

fn create_depth_pipeline(
    device: &wgpu::Device,
    depth_bind_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("clamp-depth-pass-shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/depth_pass.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("clamp-depth-pipeline-layout"),
        bind_group_layouts: &[depth_bind_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("clamp-depth-pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[position_vertex_layout()],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // terrain tiles are drawn double-sided into the capture
            cull_mode: None,
            // solid fill regardless of any host debug fill modes
            polygon_mode: wgpu::PolygonMode::Fill,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: super::depth_target::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: None,
        multiview: None,
    })
}

fn create_overlay_pipeline(
    device: &wgpu::Device,
    mode: ClampMode,
    shared_bind_layout: &wgpu::BindGroupLayout,
    object_bind_layout: &wgpu::BindGroupLayout,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let source = shader::overlay_shader_source(mode);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("clamp-overlay-shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("clamp-overlay-pipeline-layout"),
        bind_group_layouts: &[shared_bind_layout, object_bind_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("clamp-overlay-pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: "vs_main",
            buffers: &[position_vertex_layout()],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            ..Default::default()
        },
        // LessEqual with depth writes: draped geometry must win ties against
        // the terrain it sits on.
        depth_stencil: Some(wgpu::DepthStencilState {
            format: depth_format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                // overlay sorts with transparents; standard alpha blending
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
    })
}
