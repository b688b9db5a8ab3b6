//! Per-fragment lit cube with a light orbiting above it.

use std::process::ExitCode;

use anyhow::Result;

use lumen_engine::config::DemoConfig;
use lumen_engine::core::{App, AppControl, FrameCtx, StartCtx};
use lumen_engine::diagnostics::Diagnostics;
use lumen_engine::mesh::Geometry;
use lumen_engine::render::layout::{upload_planar, VertexAttribute};
use lumen_engine::render::lighting::{LightingScene, LightingSlots, LightingUniform};
use lumen_engine::render::MeshRenderer;
use lumen_engine::shader::{sources, ShaderProgram, ShaderProgramBuilder};
use lumen_engine::window::Runtime;

const LABEL: &str = "phong";

struct CubeDemo {
    diagnostics: Diagnostics,
    scene: LightingScene,
    slots: LightingSlots,
    mesh: Option<MeshRenderer>,
}

impl App for CubeDemo {
    fn on_start(&mut self, ctx: &StartCtx<'_, '_>) -> Result<()> {
        let rctx = ctx.render_ctx();

        // Normals are complete before anything reaches the GPU.
        let lit = Geometry::cube().with_normals()?;

        let program = ShaderProgramBuilder::new(LABEL, sources::phong())
            .uniforms(LightingUniform::names())
            .diagnostics(self.diagnostics.is_enabled())
            .build()
            .unwrap_or_else(|_| ShaderProgram::invalid(LABEL));
        self.slots = LightingSlots::resolve(&program);

        let (vertices, _) = self.diagnostics.checked(rctx.device, "vertex buffers", || {
            upload_planar(
                rctx.device,
                "cube",
                &[
                    (VertexAttribute::Position, lit.positions()),
                    (VertexAttribute::Color, lit.colors()),
                    (VertexAttribute::Normal, lit.normal_floats()),
                ],
            )
        });

        self.mesh = Some(MeshRenderer::new(&rctx, &program, vertices?, self.diagnostics)?);
        log::info!("cube ready: {} vertices", lit.vertex_count());
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(mesh) = self.mesh.as_mut() else {
            return AppControl::Continue;
        };

        let frame = self.scene.frame(ctx.time.frame_index);
        self.slots.push(&frame, mesh.uniforms_mut());

        ctx.render(wgpu::Color::BLACK, |rctx, target| mesh.draw(rctx, target))
    }

    fn on_exit(&mut self) {
        if let Some(mesh) = self.mesh.take() {
            mesh.release();
        }
    }
}

fn main() -> ExitCode {
    let config = DemoConfig::new("lumen: cube");
    let app = CubeDemo {
        diagnostics: config.diagnostics(),
        scene: LightingScene::reference(),
        slots: LightingSlots::default(),
        mesh: None,
    };
    Runtime::launch(config, app)
}
