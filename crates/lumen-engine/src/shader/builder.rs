use std::borrow::Cow;
use std::collections::HashMap;

use naga::front::glsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::reflect;
use super::{CompiledStage, ProgramState, ShaderError, ShaderProgram, ShaderStage};

/// GLSL text for the two stages of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl ShaderSources {
    pub fn new(
        vertex: impl Into<Cow<'static, str>>,
        fragment: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// Compiles and links a vertex/fragment pair into a [`ShaderProgram`].
///
/// With diagnostics enabled a failed build returns the [`ShaderError`] and logs
/// it. With diagnostics disabled (the default) a failed build still succeeds at
/// the API level: it returns a program in [`ProgramState::Invalid`] and reports
/// nothing, so the only symptom is that draws with it produce no output.
#[derive(Debug, Clone)]
pub struct ShaderProgramBuilder {
    label: String,
    sources: ShaderSources,
    uniforms: Vec<String>,
    diagnostics: bool,
    state: ProgramState,
}

impl ShaderProgramBuilder {
    pub fn new(label: impl Into<String>, sources: ShaderSources) -> Self {
        Self {
            label: label.into(),
            sources,
            uniforms: Vec::new(),
            diagnostics: false,
            state: ProgramState::Unbuilt,
        }
    }

    /// Uniform names to resolve into slots once the program links.
    pub fn uniforms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uniforms.extend(names.into_iter().map(Into::into));
        self
    }

    /// Enables compile/link error reporting.
    pub fn diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn state(&self) -> ProgramState {
        self.state
    }

    /// Replaces the sources for a retry. The next build starts from `Unbuilt`.
    pub fn set_sources(&mut self, sources: ShaderSources) {
        self.sources = sources;
        self.state = ProgramState::Unbuilt;
    }

    /// Compiles both stages without linking: `Unbuilt` to `Compiled`, or `Invalid`.
    ///
    /// Failures follow the same diagnostics rule as [`Self::build`].
    pub fn compile(&mut self) -> Result<(), ShaderError> {
        self.state = ProgramState::Unbuilt;
        match self.compile_stages() {
            Ok(_) => Ok(()),
            Err(err) => self.fail(err).map(drop),
        }
    }

    pub fn build(&mut self) -> Result<ShaderProgram, ShaderError> {
        self.state = ProgramState::Unbuilt;
        match self.try_build() {
            Ok(program) => Ok(program),
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: ShaderError) -> Result<ShaderProgram, ShaderError> {
        self.state = ProgramState::Invalid;
        if self.diagnostics {
            log::error!("program `{}`: {err}", self.label);
            Err(err)
        } else {
            Ok(ShaderProgram::invalid(self.label.clone()))
        }
    }

    fn compile_stages(&mut self) -> Result<(CompiledStage, CompiledStage), ShaderError> {
        let vertex = compile_stage(ShaderStage::Vertex, &self.sources.vertex)?;
        let fragment = compile_stage(ShaderStage::Fragment, &self.sources.fragment)?;
        self.state = ProgramState::Compiled;
        Ok((vertex, fragment))
    }

    fn try_build(&mut self) -> Result<ShaderProgram, ShaderError> {
        let (vertex, fragment) = self.compile_stages()?;

        let linked =
            reflect::link(&vertex, &fragment).map_err(|message| ShaderError::Link { message })?;
        self.state = ProgramState::Linked;

        let mut uniforms = HashMap::with_capacity(self.uniforms.len());
        for name in &self.uniforms {
            let slot = linked.blocks.iter().find_map(|block| {
                block.members.iter().find(|m| m.name == *name).map(|m| {
                    super::UniformSlot {
                        block: block.binding,
                        offset: m.offset,
                        kind: m.kind,
                    }
                })
            });
            if slot.is_none() && self.diagnostics {
                log::debug!("program `{}`: uniform `{name}` is not declared", self.label);
            }
            uniforms.insert(name.clone(), slot);
        }

        log::debug!(
            "program `{}` linked: {} vertex inputs, {} uniform blocks",
            self.label,
            linked.vertex_inputs.len(),
            linked.blocks.len()
        );

        Ok(ShaderProgram {
            label: self.label.clone(),
            state: ProgramState::Linked,
            stages: Some((vertex, fragment)),
            vertex_inputs: linked.vertex_inputs,
            blocks: linked.blocks,
            uniforms,
        })
    }
}

fn compile_stage(stage: ShaderStage, source: &str) -> Result<CompiledStage, ShaderError> {
    let fail = |message: String| ShaderError::Compilation { stage, message };

    if source.trim().is_empty() {
        return Err(fail("shader source is empty".to_owned()));
    }

    let mut frontend = glsl::Frontend::default();
    let module = frontend
        .parse(&glsl::Options::from(stage.naga()), source)
        .map_err(|e| fail(e.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| fail(e.emit_to_string(source)))?;

    if reflect::entry_point(&module, stage).is_none() {
        return Err(fail(format!("no {stage} entry point")));
    }

    Ok(CompiledStage { stage, module })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{sources, UniformKind};

    const LIGHTING_NAMES: [&str; 11] = [
        "Model",
        "View",
        "Projection",
        "cameraPosition",
        "lightPosition",
        "lightColor",
        "lightPower",
        "materialDiffuse",
        "materialAmbient",
        "materialSpecular",
        "materialShininess",
    ];

    const PASS_VS: &str = "#version 450
layout(location = 0) in vec3 aPos;
layout(location = 0) out vec3 vColor;
void main() {
    gl_Position = vec4(aPos, 1.0);
    vColor = aPos;
}
";

    const PASS_FS: &str = "#version 450
layout(location = 0) in vec3 vColor;
layout(location = 0) out vec4 FragColor;
void main() {
    FragColor = vec4(vColor, 1.0);
}
";

    fn phong() -> ShaderProgramBuilder {
        ShaderProgramBuilder::new("phong", sources::phong())
            .uniforms(LIGHTING_NAMES)
            .diagnostics(true)
    }

    #[test]
    fn fresh_builder_is_unbuilt() {
        assert_eq!(phong().state(), ProgramState::Unbuilt);
    }

    #[test]
    fn phong_program_links() {
        let mut builder = phong();
        let program = builder.build().unwrap();
        assert_eq!(builder.state(), ProgramState::Linked);
        assert_eq!(program.state(), ProgramState::Linked);
        assert!(program.stages().is_some());
    }

    #[test]
    fn flat_color_program_links() {
        let mut builder =
            ShaderProgramBuilder::new("flat", sources::flat_color()).diagnostics(true);
        let program = builder.build().unwrap();
        assert!(program.is_linked());
        assert!(program.uniform_blocks().is_empty());
        let locations: Vec<u32> = program.vertex_inputs().iter().map(|i| i.location).collect();
        assert_eq!(locations, [0, 1]);
    }

    #[test]
    fn phong_vertex_inputs() {
        let program = phong().build().unwrap();
        let inputs = program.vertex_inputs();
        assert_eq!(inputs.len(), 3);
        for (i, input) in inputs.iter().enumerate() {
            assert_eq!(input.location, i as u32);
            assert_eq!(input.components, 3);
            assert!(input.float);
        }
    }

    #[test]
    fn resolves_every_lighting_uniform() {
        let program = phong().build().unwrap();
        for name in LIGHTING_NAMES {
            assert!(program.uniform(name).is_some(), "{name} unresolved");
        }
        assert_eq!(program.uniform("Model").unwrap().kind, UniformKind::Mat4);
        assert_eq!(program.uniform("lightPosition").unwrap().kind, UniformKind::Vec3);
        assert_eq!(program.uniform("lightPower").unwrap().kind, UniformKind::F32);
        assert_eq!(program.uniform("materialShininess").unwrap().kind, UniformKind::F32);
    }

    #[test]
    fn uniform_slots_do_not_overlap() {
        let program = phong().build().unwrap();
        let mut spans: Vec<_> = LIGHTING_NAMES
            .iter()
            .map(|n| {
                let s = program.uniform(n).unwrap();
                (s.block, s.offset, s.offset + s.kind.size().unwrap() as u32)
            })
            .collect();
        spans.sort();
        for pair in spans.windows(2) {
            if pair[0].0 == pair[1].0 {
                assert!(pair[0].2 <= pair[1].1, "{pair:?}");
            }
        }
    }

    #[test]
    fn undeclared_uniform_has_no_slot() {
        let program = phong().uniforms(["fogDensity"]).build().unwrap();
        assert!(program.uniform("fogDensity").is_none());
        // Never requested.
        assert!(program.uniform("somethingElse").is_none());
    }

    #[test]
    fn vertex_syntax_error_is_reported() {
        let mut builder = ShaderProgramBuilder::new(
            "broken",
            ShaderSources::new("#version 450\nvoid main() { gl_Position = vec4(1.0) }\n", PASS_FS),
        )
        .diagnostics(true);

        let err = builder.build().unwrap_err();
        assert_eq!(builder.state(), ProgramState::Invalid);
        match err {
            ShaderError::Compilation { stage, message } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!message.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn fragment_error_names_fragment_stage() {
        let mut builder = ShaderProgramBuilder::new(
            "broken",
            ShaderSources::new(
                PASS_VS,
                "#version 450\nlayout(location = 0) out vec4 c;\nvoid main() { c = undefinedThing; }\n",
            ),
        )
        .diagnostics(true);

        let err = builder.build().unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Compilation { stage: ShaderStage::Fragment, .. }
        ));
        assert_eq!(err.to_string().lines().next(), Some("fragment shader compilation failed:"));
    }

    #[test]
    fn empty_source_fails_compilation() {
        let mut builder =
            ShaderProgramBuilder::new("empty", ShaderSources::new("  \n", PASS_FS)).diagnostics(true);
        let err = builder.build().unwrap_err();
        assert_eq!(
            err,
            ShaderError::Compilation {
                stage: ShaderStage::Vertex,
                message: "shader source is empty".into()
            }
        );
    }

    #[test]
    fn unmatched_fragment_input_fails_link() {
        let fs = "#version 450
layout(location = 0) in vec3 vColor;
layout(location = 3) in vec3 vExtra;
layout(location = 0) out vec4 FragColor;
void main() {
    FragColor = vec4(vColor + vExtra, 1.0);
}
";
        let mut builder =
            ShaderProgramBuilder::new("link", ShaderSources::new(PASS_VS, fs)).diagnostics(true);
        let err = builder.build().unwrap_err();
        assert_eq!(builder.state(), ProgramState::Invalid);
        let ShaderError::Link { message } = err else {
            panic!("expected link error, got {err:?}");
        };
        assert!(message.contains("location 3"), "{message}");
    }

    #[test]
    fn link_failure_happens_after_both_stages_compile() {
        let fs = "#version 450
layout(location = 3) in vec3 vExtra;
layout(location = 0) out vec4 FragColor;
void main() {
    FragColor = vec4(vExtra, 1.0);
}
";
        let mut builder =
            ShaderProgramBuilder::new("link", ShaderSources::new(PASS_VS, fs)).diagnostics(true);
        builder.compile().expect("both stages are valid GLSL");
        assert_eq!(builder.state(), ProgramState::Compiled);

        assert!(matches!(builder.build(), Err(ShaderError::Link { .. })));
        assert_eq!(builder.state(), ProgramState::Invalid);
    }

    #[test]
    fn compile_failure_skips_compiled() {
        let mut builder = ShaderProgramBuilder::new(
            "broken",
            ShaderSources::new("#version 450\nvoid main() {\n", PASS_FS),
        );
        builder.compile().expect("silent mode never returns an error");
        assert_eq!(builder.state(), ProgramState::Invalid);
    }

    #[test]
    fn mismatched_interface_type_fails_link() {
        let fs = "#version 450
layout(location = 0) in vec4 vColor;
layout(location = 0) out vec4 FragColor;
void main() {
    FragColor = vColor;
}
";
        let mut builder =
            ShaderProgramBuilder::new("link", ShaderSources::new(PASS_VS, fs)).diagnostics(true);
        let err = builder.build().unwrap_err();
        let ShaderError::Link { message } = err else {
            panic!("expected link error, got {err:?}");
        };
        assert!(message.contains("vec4") && message.contains("vec3"), "{message}");
    }

    #[test]
    fn silent_mode_yields_invalid_program() {
        let mut builder = ShaderProgramBuilder::new(
            "silent",
            ShaderSources::new("#version 450\nvoid main() { nope }\n", PASS_FS),
        );

        let program = builder.build().expect("silent mode never returns an error");
        assert_eq!(builder.state(), ProgramState::Invalid);
        assert_eq!(program.state(), ProgramState::Invalid);
        assert!(!program.is_linked());
        assert!(program.stages().is_none());
    }

    #[test]
    fn retry_with_fixed_source_relinks() {
        let mut builder = ShaderProgramBuilder::new(
            "retry",
            ShaderSources::new("#version 450\nvoid main() {\n", PASS_FS),
        )
        .diagnostics(true);
        assert!(builder.build().is_err());
        assert_eq!(builder.state(), ProgramState::Invalid);

        builder.set_sources(ShaderSources::new(PASS_VS, PASS_FS));
        assert_eq!(builder.state(), ProgramState::Unbuilt);

        let program = builder.build().unwrap();
        assert_eq!(builder.state(), ProgramState::Linked);
        assert!(program.is_linked());
    }
}
