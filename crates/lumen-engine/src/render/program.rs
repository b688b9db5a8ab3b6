use std::borrow::Cow;
use std::num::NonZeroU64;

use crate::diagnostics::{self, Diagnostics};
use crate::render::layout::AttributeLayout;
use crate::render::{RenderCtx, UniformStorage};
use crate::shader::{BlockBinding, CompiledStage, ShaderError, ShaderProgram};

/// A linked [`ShaderProgram`] turned into a wgpu render pipeline, with one
/// uniform buffer per block in bind group 0.
pub struct GpuProgram {
    label: String,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffers: Vec<(BlockBinding, wgpu::Buffer)>,
}

impl GpuProgram {
    /// `Ok(None)` for a program that never linked: there is nothing to draw with.
    ///
    /// Pipeline creation is the last link step. Its errors are always captured;
    /// with diagnostics on they become [`ShaderError::Link`], otherwise the
    /// program is quietly unusable.
    pub fn new(
        ctx: &RenderCtx<'_>,
        program: &ShaderProgram,
        layout: &AttributeLayout,
        diagnostics: Diagnostics,
    ) -> Result<Option<Self>, ShaderError> {
        let Some((vertex, fragment)) = program.stages() else {
            return Ok(None);
        };
        let label = program.label().to_owned();

        let (built, errors) = diagnostics::scoped(ctx.device, || {
            Self::build(ctx, &label, program, vertex, fragment, layout)
        });
        if errors.is_empty() {
            return Ok(Some(built));
        }
        if !diagnostics.is_enabled() {
            return Ok(None);
        }
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        Err(ShaderError::Link { message })
    }

    fn build(
        ctx: &RenderCtx<'_>,
        label: &str,
        program: &ShaderProgram,
        vertex: &CompiledStage,
        fragment: &CompiledStage,
        layout: &AttributeLayout,
    ) -> Self {
        let device = ctx.device;

        let vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} vs")),
            source: wgpu::ShaderSource::Naga(Cow::Owned(vertex.module.clone())),
        });
        let fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} fs")),
            source: wgpu::ShaderSource::Naga(Cow::Owned(fragment.module.clone())),
        });

        let blocks = program.uniform_blocks();
        let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = blocks
            .iter()
            .map(|block| wgpu::BindGroupLayoutEntry {
                binding: block.binding.binding,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(u64::from(block.size)),
                },
                count: None,
            })
            .collect();

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} bgl")),
            entries: &layout_entries,
        });

        let uniform_buffers: Vec<(BlockBinding, wgpu::Buffer)> = blocks
            .iter()
            .map(|block| {
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!(
                        "{label} ubo {}",
                        block.name.as_deref().unwrap_or("block")
                    )),
                    size: u64::from(block.size),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                (block.binding, buffer)
            })
            .collect();

        // Group 0 is empty for programs without uniforms.
        let entries: Vec<wgpu::BindGroupEntry> = uniform_buffers
            .iter()
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding: binding.binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} bind group")),
            layout: &bind_group_layout,
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} pipeline layout")),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let attributes = layout.wgpu_attributes();
        let buffers: Vec<wgpu::VertexBufferLayout> = layout
            .buffers()
            .iter()
            .zip(&attributes)
            .map(|(buffer, attributes)| wgpu::VertexBufferLayout {
                array_stride: buffer.stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            })
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{label} pipeline")),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(vertex.entry_point()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(fragment.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        log::debug!(
            "program `{label}`: pipeline created ({} vertex buffers, {} uniform blocks)",
            buffers.len(),
            uniform_buffers.len()
        );

        Self {
            label: label.to_owned(),
            pipeline,
            bind_group,
            uniform_buffers,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Copies the CPU images of every block to the GPU.
    pub fn upload(&self, queue: &wgpu::Queue, storage: &UniformStorage) {
        for (binding, buffer) in &self.uniform_buffers {
            if let Some(bytes) = storage.bytes(*binding) {
                queue.write_buffer(buffer, 0, bytes);
            }
        }
    }

    /// Selects the pipeline and its uniforms on `pass`.
    pub(crate) fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
    }

    /// Destroys the uniform buffers; the pipeline goes with `self`.
    pub fn release(self) {
        for (_, buffer) in &self.uniform_buffers {
            buffer.destroy();
        }
        log::debug!("program `{}` released", self.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::VertexAttribute;
    use crate::render::testing;
    use crate::shader::{sources, ShaderProgramBuilder, ShaderSources};

    const POSITION_VS: &str = "#version 450
layout(location = 0) in vec3 aPos;
void main() {
    gl_Position = vec4(aPos, 1.0);
}
";

    // Valid GLSL, but the color target is four components wide.
    const VEC2_FS: &str = "#version 450
layout(location = 0) out vec2 FragColor;
void main() {
    FragColor = vec2(1.0, 0.0);
}
";

    fn narrow_output_program() -> ShaderProgram {
        let program = ShaderProgramBuilder::new("narrow", ShaderSources::new(POSITION_VS, VEC2_FS))
            .diagnostics(true)
            .build()
            .unwrap();
        assert!(program.is_linked());
        program
    }

    #[test]
    fn flat_color_pipeline_builds() {
        let (device, queue) = testing::device();
        let ctx = testing::ctx(&device, &queue);
        let program = ShaderProgramBuilder::new("flat", sources::flat_color())
            .build()
            .unwrap();
        let layout = AttributeLayout::interleaved(&[VertexAttribute::Position, VertexAttribute::Color]);

        let built = GpuProgram::new(&ctx, &program, &layout, Diagnostics::enabled()).unwrap();
        assert_eq!(built.map(|p| p.label().to_owned()).as_deref(), Some("flat"));
    }

    #[test]
    fn unlinked_program_has_no_pipeline() {
        let (device, queue) = testing::device();
        let ctx = testing::ctx(&device, &queue);
        let layout = AttributeLayout::planar(&[VertexAttribute::Position]);

        let built = GpuProgram::new(&ctx, &ShaderProgram::invalid("x"), &layout, Diagnostics::enabled());
        assert!(matches!(built, Ok(None)));
    }

    #[test]
    fn rejected_pipeline_is_a_link_error_with_diagnostics() {
        let (device, queue) = testing::device();
        let ctx = testing::ctx(&device, &queue);
        let layout = AttributeLayout::planar(&[VertexAttribute::Position]);

        let err = GpuProgram::new(&ctx, &narrow_output_program(), &layout, Diagnostics::enabled())
            .err()
            .expect("pipeline creation must fail");
        let ShaderError::Link { message } = err else {
            panic!("expected link error, got {err:?}");
        };
        assert!(!message.is_empty());
    }

    #[test]
    fn rejected_pipeline_is_quietly_unusable_without_diagnostics() {
        let (device, queue) = testing::device();
        let ctx = testing::ctx(&device, &queue);
        let layout = AttributeLayout::planar(&[VertexAttribute::Position]);

        let built = GpuProgram::new(&ctx, &narrow_output_program(), &layout, Diagnostics::disabled());
        assert!(matches!(built, Ok(None)));
    }
}
