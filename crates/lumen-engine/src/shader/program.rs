use std::collections::HashMap;

use super::ShaderStage;

/// Build state of a shader program.
///
/// `Unbuilt → Compiled → Linked`; any compile or link failure moves to
/// `Invalid`, which is terminal for that build attempt.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProgramState {
    Unbuilt,
    Compiled,
    Linked,
    Invalid,
}

/// Semantic type of a uniform slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformKind {
    /// 4×4 `f32` matrix, column-major.
    Mat4,
    Vec3,
    F32,
    /// Any type the lighting protocol does not write.
    Other,
}

impl UniformKind {
    pub(crate) fn of(inner: &naga::TypeInner) -> Self {
        use naga::{Scalar, TypeInner, VectorSize};

        match *inner {
            TypeInner::Matrix {
                columns: VectorSize::Quad,
                rows: VectorSize::Quad,
                scalar,
            } if scalar == Scalar::F32 => Self::Mat4,
            TypeInner::Vector {
                size: VectorSize::Tri,
                scalar,
            } if scalar == Scalar::F32 => Self::Vec3,
            TypeInner::Scalar(scalar) if scalar == Scalar::F32 => Self::F32,
            _ => Self::Other,
        }
    }

    /// Bytes written for a value of this kind.
    pub fn size(self) -> Option<usize> {
        match self {
            Self::Mat4 => Some(64),
            Self::Vec3 => Some(12),
            Self::F32 => Some(4),
            Self::Other => None,
        }
    }
}

/// `(set, binding)` of a uniform block.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BlockBinding {
    pub group: u32,
    pub binding: u32,
}

/// A named member of a uniform block.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformMember {
    pub name: String,
    pub offset: u32,
    pub kind: UniformKind,
}

/// Reflected layout of one uniform block.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformBlockLayout {
    /// Block (struct) name as declared in GLSL.
    pub name: Option<String>,
    pub binding: BlockBinding,
    /// Size of the block in bytes, including trailing padding.
    pub size: u32,
    pub members: Vec<UniformMember>,
}

/// Resolved location of a named uniform: which block, where in it, and what it holds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformSlot {
    pub block: BlockBinding,
    pub offset: u32,
    pub kind: UniformKind,
}

/// A vertex-stage input the program expects to be fed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexInput {
    pub name: Option<String>,
    pub location: u32,
    /// Scalar count: 1 for scalars, 2..=4 for vectors.
    pub components: u32,
    pub float: bool,
}

/// One successfully compiled and validated stage.
#[derive(Debug, Clone)]
pub struct CompiledStage {
    pub stage: ShaderStage,
    pub module: naga::Module,
}

impl CompiledStage {
    /// Name of the entry point for this stage (`main` for GLSL).
    pub fn entry_point(&self) -> &str {
        self.module
            .entry_points
            .iter()
            .find(|ep| ep.stage == self.stage.naga())
            .map_or("main", |ep| ep.name.as_str())
    }
}

/// Result of a build attempt.
///
/// A program in any state other than [`ProgramState::Linked`] carries no stages
/// and draws nothing.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub(crate) label: String,
    pub(crate) state: ProgramState,
    pub(crate) stages: Option<(CompiledStage, CompiledStage)>,
    pub(crate) vertex_inputs: Vec<VertexInput>,
    pub(crate) blocks: Vec<UniformBlockLayout>,
    pub(crate) uniforms: HashMap<String, Option<UniformSlot>>,
}

impl ShaderProgram {
    /// A program that never linked. Draws with it produce nothing.
    pub fn invalid(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            state: ProgramState::Invalid,
            stages: None,
            vertex_inputs: Vec::new(),
            blocks: Vec::new(),
            uniforms: HashMap::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> ProgramState {
        self.state
    }

    /// Whether the program is executable.
    pub fn is_linked(&self) -> bool {
        self.state == ProgramState::Linked
    }

    /// The `(vertex, fragment)` stages of a linked program.
    pub fn stages(&self) -> Option<(&CompiledStage, &CompiledStage)> {
        self.stages.as_ref().map(|(v, f)| (v, f))
    }

    /// Vertex inputs, sorted by location.
    pub fn vertex_inputs(&self) -> &[VertexInput] {
        &self.vertex_inputs
    }

    /// Uniform blocks of both stages, merged and sorted by binding.
    pub fn uniform_blocks(&self) -> &[UniformBlockLayout] {
        &self.blocks
    }

    /// Slot of a uniform requested at build time.
    ///
    /// `None` when the name was not requested, or the program does not declare it.
    pub fn uniform(&self, name: &str) -> Option<UniformSlot> {
        self.uniforms.get(name).copied().flatten()
    }
}
