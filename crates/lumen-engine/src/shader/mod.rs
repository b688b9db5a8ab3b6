//! Shader program construction.
//!
//! Each stage is GLSL compiled on its own through naga's GLSL front end and
//! validated; linking checks the stage interface and merges uniform blocks.
//! The resulting [`ShaderProgram`] is pure CPU data; `render::GpuProgram` turns
//! it into a wgpu pipeline.

mod builder;
mod error;
mod program;
mod reflect;
pub mod sources;

pub use builder::{ShaderProgramBuilder, ShaderSources};
pub use error::{ShaderError, ShaderStage};
pub use program::{
    BlockBinding, CompiledStage, ProgramState, ShaderProgram, UniformBlockLayout, UniformKind,
    UniformMember, UniformSlot, VertexInput,
};
