use std::fmt;

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

/// Shader build failure.
///
/// Never fatal at this layer; the caller decides whether to abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// A stage failed to compile. `message` is the compiler's diagnostic.
    Compilation { stage: ShaderStage, message: String },
    /// Both stages compiled but the program failed to link.
    Link { message: String },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compilation { stage, message } => {
                write!(f, "{stage} shader compilation failed:\n{message}")
            }
            Self::Link { message } => write!(f, "shader program linking failed:\n{message}"),
        }
    }
}

impl std::error::Error for ShaderError {}
