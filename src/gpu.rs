use once_cell::sync::OnceCell;

pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter: wgpu::Adapter,
}

static CTX: OnceCell<GpuContext> = OnceCell::new();

/// Process-wide GPU context. First call performs adapter/device acquisition;
/// failure here is unrecoverable and panics.
pub fn ctx() -> &'static GpuContext {
    CTX.get_or_init(|| {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .expect("No suitable GPU adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                label: Some("drape3d-device"),
            },
            None,
        ))
        .expect("request_device failed");

        GpuContext {
            device,
            queue,
            adapter,
        }
    })
}

/// Acquire a standalone context for tests. Returns `None` when the host has
/// no usable adapter so GPU-bound tests can skip instead of failing.
pub fn create_context_for_test() -> Option<GpuContext> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: true,
    }))?;

    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            label: Some("drape3d-test-device"),
        },
        None,
    ))
    .ok()?;

    Some(GpuContext {
        device,
        queue,
        adapter,
    })
}

/// Device/queue pair for tests that need no adapter introspection.
pub fn create_device_and_queue_for_test() -> Option<(wgpu::Device, wgpu::Queue)> {
    create_context_for_test().map(|ctx| (ctx.device, ctx.queue))
}
