//! CPU-side mesh data.
//!
//! Meshes are unindexed triangle soups: every three consecutive vertices form a
//! triangle and coincident corners are separate vertex occurrences.

mod error;
mod geometry;
mod normals;

pub use error::MeshError;
pub use geometry::{interleave, Geometry, LitGeometry};
pub use normals::synthesize_normals;

/// Number of `f32` components per vertex attribute (x/y/z or r/g/b).
pub const COMPONENTS: usize = 3;

/// Number of `f32` values making up one triangle of a position array.
pub const FLOATS_PER_TRIANGLE: usize = 3 * COMPONENTS;
