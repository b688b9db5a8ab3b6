use crate::diagnostics::Diagnostics;
use crate::render::layout::{LayoutError, VertexArray};
use crate::render::{GpuProgram, RenderCtx, RenderTarget, UniformStorage};
use crate::shader::ShaderProgram;

/// Draws one unindexed mesh with one program.
///
/// Owns everything acquired for the draw: the vertex buffers, the GPU program
/// and the CPU uniform images. A program that failed to build is kept as
/// "nothing to draw" rather than an error.
pub struct MeshRenderer {
    label: String,
    vertices: VertexArray<wgpu::Buffer>,
    program: Option<GpuProgram>,
    uniforms: UniformStorage,
}

impl MeshRenderer {
    pub fn new(
        ctx: &RenderCtx<'_>,
        program: &ShaderProgram,
        vertices: VertexArray<wgpu::Buffer>,
        diagnostics: Diagnostics,
    ) -> Result<Self, LayoutError> {
        vertices.layout().check_against(program)?;

        let gpu_program = match GpuProgram::new(ctx, program, vertices.layout(), diagnostics) {
            Ok(p) => p,
            Err(err) => {
                log::error!("program `{}`: {err}", program.label());
                None
            }
        };
        if gpu_program.is_none() {
            log::debug!("mesh `{}` has no usable program; draws are skipped", program.label());
        }

        Ok(Self {
            label: program.label().to_owned(),
            vertices,
            program: gpu_program,
            uniforms: UniformStorage::new(program.uniform_blocks()),
        })
    }

    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }

    pub fn uniforms(&self) -> &UniformStorage {
        &self.uniforms
    }

    /// Uniform images written by the frame's lighting push.
    pub fn uniforms_mut(&mut self) -> &mut UniformStorage {
        &mut self.uniforms
    }

    /// Uploads uniforms and records the draw into `target`, on top of what is there.
    ///
    /// Pass validation is deferred to `CommandEncoder::finish`, so draw errors
    /// surface at the frame's submit checkpoint.
    pub fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        let Some(program) = self.program.as_ref() else {
            return;
        };
        program.upload(ctx.queue, &self.uniforms);

        let mut pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        program.bind(&mut pass);
        let count = self.vertices.bind(&mut pass);
        pass.draw(0..count, 0..1);
        drop(pass);
        self.vertices.release();
    }

    /// Tears down in reverse acquisition order: vertex buffers, then the program.
    pub fn release(self) {
        for buffer in self.vertices.into_buffers() {
            buffer.destroy();
        }
        if let Some(program) = self.program {
            program.release();
        }
        log::info!("mesh `{}` released", self.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{ErrorCode, RuntimeError};
    use crate::mesh::{interleave, Geometry};
    use crate::render::layout::{upload_interleaved, upload_planar, AttributeLayout, VertexAttribute};
    use crate::render::testing;
    use crate::shader::{sources, ShaderProgramBuilder};

    const FLAT: [VertexAttribute; 2] = [VertexAttribute::Position, VertexAttribute::Color];

    fn triangle_mesh(ctx: &RenderCtx<'_>, vertex_count: Option<u32>) -> MeshRenderer {
        let program = ShaderProgramBuilder::new("flat", sources::flat_color())
            .build()
            .unwrap();
        let triangle = Geometry::triangle();
        let data = interleave(&[triangle.positions(), triangle.colors()]).unwrap();
        let mut vertices = upload_interleaved(ctx.device, "triangle", &FLAT, &data).unwrap();
        if let Some(count) = vertex_count {
            vertices =
                VertexArray::new(AttributeLayout::interleaved(&FLAT), vertices.into_buffers(), count)
                    .unwrap();
        }
        MeshRenderer::new(ctx, &program, vertices, Diagnostics::enabled()).unwrap()
    }

    fn draw_and_submit(ctx: &RenderCtx<'_>, mesh: &mut MeshRenderer) -> Vec<RuntimeError> {
        let (color, depth) = testing::target_views(ctx.device);
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        mesh.draw(ctx, &mut RenderTarget::new(&mut encoder, &color, &depth));
        Diagnostics::enabled().submit(ctx.device, ctx.queue, encoder)
    }

    #[test]
    fn triangle_draws_cleanly() {
        let (device, queue) = testing::device();
        let ctx = testing::ctx(&device, &queue);
        let mut mesh = triangle_mesh(&ctx, None);
        assert!(mesh.has_program());

        assert!(draw_and_submit(&ctx, &mut mesh).is_empty());
        mesh.release();
    }

    #[test]
    fn overlong_draw_is_reported_at_submit() {
        let (device, queue) = testing::device();
        let ctx = testing::ctx(&device, &queue);
        // 36 vertices over a 3-vertex buffer.
        let mut mesh = triangle_mesh(&ctx, Some(36));

        let errors = draw_and_submit(&ctx, &mut mesh);
        assert!(!errors.is_empty());
        assert!(errors.iter().all(|e| e.call_site == "submit frame"));
        assert_eq!(errors[0].code, ErrorCode::Validation);
        mesh.release();
    }

    #[test]
    fn layout_mismatch_is_rejected_before_any_pipeline() {
        let (device, queue) = testing::device();
        let ctx = testing::ctx(&device, &queue);
        let program = ShaderProgramBuilder::new("flat", sources::flat_color())
            .build()
            .unwrap();
        let triangle = Geometry::triangle();
        let vertices = upload_planar(
            ctx.device,
            "positions only",
            &[(VertexAttribute::Position, triangle.positions())],
        )
        .unwrap();

        let err = MeshRenderer::new(&ctx, &program, vertices, Diagnostics::enabled()).err();
        assert!(matches!(err, Some(LayoutError::MissingAttribute { .. })));
    }
}
