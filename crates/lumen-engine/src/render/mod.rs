//! GPU rendering subsystem.
//!
//! CPU-side pieces (attribute layout, uniform protocol, reference shading) are
//! plain data and testable without a device; `program` and `mesh` own the wgpu
//! objects built from them.
//!
//! Convention:
//! - one vertex buffer per planar attribute, or one interleaved buffer
//! - all uniform blocks live in bind group 0
//! - depth test `Less` against a cleared depth attachment

mod ctx;
pub mod layout;
pub mod lighting;
mod mesh;
mod program;
pub mod shading;
mod uniforms;

pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::MeshRenderer;
pub use program::GpuProgram;
pub use uniforms::{UniformSink, UniformStorage};

#[cfg(test)]
pub(crate) mod testing {
    //! Device-level tests run on wgpu's no-op backend: full validation, no GPU.

    pub(crate) const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
    pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub(crate) fn device() -> (wgpu::Device, wgpu::Queue) {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::NOOP,
            backend_options: wgpu::BackendOptions {
                noop: wgpu::NoopBackendOptions { enable: true },
                ..Default::default()
            },
            ..Default::default()
        });
        let adapter = pollster::block_on(instance.request_adapter(&Default::default()))
            .expect("no-op adapter");
        pollster::block_on(adapter.request_device(&Default::default())).expect("no-op device")
    }

    pub(crate) fn ctx<'a>(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> super::RenderCtx<'a> {
        super::RenderCtx::new(device, queue, COLOR_FORMAT, DEPTH_FORMAT)
    }

    /// Color and depth views for a small offscreen target.
    pub(crate) fn target_views(device: &wgpu::Device) -> (wgpu::TextureView, wgpu::TextureView) {
        let view = |label: &str, format: wgpu::TextureFormat| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size: wgpu::Extent3d {
                        width: 4,
                        height: 4,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        };
        (view("test color", COLOR_FORMAT), view("test depth", DEPTH_FORMAT))
    }
}
