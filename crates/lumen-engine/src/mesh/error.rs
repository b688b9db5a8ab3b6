use std::fmt;

/// Malformed triangle-soup input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A flat attribute array does not hold whole triangles.
    PartialTriangle { attribute: &'static str, len: usize },
    /// Two attribute arrays describe a different number of vertices.
    LengthMismatch { positions: usize, other: &'static str, len: usize },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PartialTriangle { attribute, len } => write!(
                f,
                "{attribute} array has {len} floats, which is not a whole number of triangles"
            ),
            Self::LengthMismatch { positions, other, len } => write!(
                f,
                "{other} array has {len} floats but positions has {positions}"
            ),
        }
    }
}

impl std::error::Error for MeshError {}
