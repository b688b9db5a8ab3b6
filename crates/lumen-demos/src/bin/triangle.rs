//! Flat-colored 2D triangle: one interleaved position+color buffer, no uniforms.

use std::process::ExitCode;

use anyhow::{Context, Result};

use lumen_engine::config::DemoConfig;
use lumen_engine::core::{App, AppControl, FrameCtx, StartCtx};
use lumen_engine::diagnostics::Diagnostics;
use lumen_engine::mesh::{interleave, Geometry};
use lumen_engine::render::layout::{upload_interleaved, VertexAttribute};
use lumen_engine::render::MeshRenderer;
use lumen_engine::shader::{sources, ShaderProgram, ShaderProgramBuilder};
use lumen_engine::window::Runtime;

const LABEL: &str = "flat color";

struct TriangleDemo {
    diagnostics: Diagnostics,
    mesh: Option<MeshRenderer>,
}

impl App for TriangleDemo {
    fn on_start(&mut self, ctx: &StartCtx<'_, '_>) -> Result<()> {
        let rctx = ctx.render_ctx();

        // A failed build is already reported; draw nothing and keep running.
        let program = ShaderProgramBuilder::new(LABEL, sources::flat_color())
            .diagnostics(self.diagnostics.is_enabled())
            .build()
            .unwrap_or_else(|_| ShaderProgram::invalid(LABEL));

        let geometry = Geometry::triangle();
        let data = interleave(&[geometry.positions(), geometry.colors()])
            .context("triangle attributes differ in length")?;
        let vertices = upload_interleaved(
            rctx.device,
            "triangle",
            &[VertexAttribute::Position, VertexAttribute::Color],
            &data,
        )?;

        self.mesh = Some(MeshRenderer::new(&rctx, &program, vertices, self.diagnostics)?);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let mesh = &mut self.mesh;
        ctx.render(wgpu::Color::BLACK, |rctx, target| {
            if let Some(mesh) = mesh {
                mesh.draw(rctx, target);
            }
        })
    }

    fn on_exit(&mut self) {
        if let Some(mesh) = self.mesh.take() {
            mesh.release();
        }
    }
}

fn main() -> ExitCode {
    let config = DemoConfig::new("lumen: triangle");
    let app = TriangleDemo {
        diagnostics: config.diagnostics(),
        mesh: None,
    };
    Runtime::launch(config, app)
}
