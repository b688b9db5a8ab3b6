use std::borrow::Cow;

use glam::Vec3;

use super::{synthesize_normals, MeshError, COMPONENTS, FLOATS_PER_TRIANGLE};

/// Immutable triangle soup: flat positions plus one RGB color per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    positions: Cow<'static, [f32]>,
    colors: Cow<'static, [f32]>,
}

impl Geometry {
    /// Validates and wraps a triangle soup.
    ///
    /// Both arrays must hold the same number of vertices and only whole triangles.
    pub fn new(
        positions: impl Into<Cow<'static, [f32]>>,
        colors: impl Into<Cow<'static, [f32]>>,
    ) -> Result<Self, MeshError> {
        let positions = positions.into();
        let colors = colors.into();

        if positions.len() % FLOATS_PER_TRIANGLE != 0 {
            return Err(MeshError::PartialTriangle {
                attribute: "position",
                len: positions.len(),
            });
        }
        if colors.len() != positions.len() {
            return Err(MeshError::LengthMismatch {
                positions: positions.len(),
                other: "color",
                len: colors.len(),
            });
        }

        Ok(Self { positions, colors })
    }

    /// The 2×2×2 cube centred at the origin, 12 triangles.
    pub fn cube() -> Self {
        Self {
            positions: Cow::Borrowed(&CUBE_POSITIONS),
            colors: Cow::Borrowed(&CUBE_COLORS),
        }
    }

    /// A single flat-colored triangle in normalized device coordinates.
    pub fn triangle() -> Self {
        Self {
            positions: Cow::Borrowed(&TRIANGLE_POSITIONS),
            colors: Cow::Borrowed(&TRIANGLE_COLORS),
        }
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / COMPONENTS
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / FLOATS_PER_TRIANGLE
    }

    /// Runs normal synthesis to completion and pairs the result with this geometry.
    pub fn with_normals(self) -> Result<LitGeometry, MeshError> {
        let normals = synthesize_normals(&self.positions)?;
        Ok(LitGeometry {
            geometry: self,
            normals,
        })
    }
}

/// Geometry together with its fully synthesized per-occurrence normals.
#[derive(Debug, Clone, PartialEq)]
pub struct LitGeometry {
    geometry: Geometry,
    normals: Vec<Vec3>,
}

impl LitGeometry {
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn positions(&self) -> &[f32] {
        self.geometry.positions()
    }

    pub fn colors(&self) -> &[f32] {
        self.geometry.colors()
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Normals as a flat `f32` array, laid out like positions and colors.
    pub fn normal_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.normals)
    }

    pub fn vertex_count(&self) -> usize {
        self.geometry.vertex_count()
    }
}

/// Interleaves per-vertex attribute arrays of three floats each.
///
/// Returns `None` if the arrays describe different vertex counts.
pub fn interleave(attributes: &[&[f32]]) -> Option<Vec<f32>> {
    let first = attributes.first()?;
    let vertices = first.len() / COMPONENTS;
    if attributes
        .iter()
        .any(|a| a.len() % COMPONENTS != 0 || a.len() / COMPONENTS != vertices)
    {
        return None;
    }

    let mut out = Vec::with_capacity(vertices * COMPONENTS * attributes.len());
    for v in 0..vertices {
        for a in attributes {
            out.extend_from_slice(&a[v * COMPONENTS..(v + 1) * COMPONENTS]);
        }
    }
    Some(out)
}

// Three consecutive floats give a vertex, three consecutive vertices a triangle.
#[rustfmt::skip]
static CUBE_POSITIONS: [f32; 108] = [
    -1.0, -1.0, -1.0,
    -1.0, -1.0,  1.0,
    -1.0,  1.0,  1.0,
     1.0,  1.0, -1.0,
    -1.0, -1.0, -1.0,
    -1.0,  1.0, -1.0,
     1.0, -1.0,  1.0,
    -1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,
     1.0,  1.0, -1.0,
     1.0, -1.0, -1.0,
    -1.0, -1.0, -1.0,
    -1.0, -1.0, -1.0,
    -1.0,  1.0,  1.0,
    -1.0,  1.0, -1.0,
     1.0, -1.0,  1.0,
    -1.0, -1.0,  1.0,
    -1.0, -1.0, -1.0,
    -1.0,  1.0,  1.0,
    -1.0, -1.0,  1.0,
     1.0, -1.0,  1.0,
     1.0,  1.0,  1.0,
     1.0, -1.0, -1.0,
     1.0,  1.0, -1.0,
     1.0, -1.0, -1.0,
     1.0,  1.0,  1.0,
     1.0, -1.0,  1.0,
     1.0,  1.0,  1.0,
     1.0,  1.0, -1.0,
    -1.0,  1.0, -1.0,
     1.0,  1.0,  1.0,
    -1.0,  1.0, -1.0,
    -1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,
    -1.0,  1.0,  1.0,
     1.0, -1.0,  1.0,
];

#[rustfmt::skip]
static CUBE_COLORS: [f32; 108] = [
    0.583, 0.771, 0.014,
    0.609, 0.115, 0.436,
    0.327, 0.483, 0.844,
    0.822, 0.569, 0.201,
    0.435, 0.602, 0.223,
    0.310, 0.747, 0.185,
    0.597, 0.770, 0.761,
    0.559, 0.436, 0.730,
    0.359, 0.583, 0.152,
    0.483, 0.596, 0.789,
    0.559, 0.861, 0.639,
    0.195, 0.548, 0.859,
    0.014, 0.184, 0.576,
    0.771, 0.328, 0.970,
    0.406, 0.615, 0.116,
    0.676, 0.977, 0.133,
    0.971, 0.572, 0.833,
    0.140, 0.616, 0.489,
    0.997, 0.513, 0.064,
    0.945, 0.719, 0.592,
    0.543, 0.021, 0.978,
    0.279, 0.317, 0.505,
    0.167, 0.620, 0.077,
    0.347, 0.857, 0.137,
    0.055, 0.953, 0.042,
    0.714, 0.505, 0.345,
    0.783, 0.290, 0.734,
    0.722, 0.645, 0.174,
    0.302, 0.455, 0.848,
    0.225, 0.587, 0.040,
    0.517, 0.713, 0.338,
    0.053, 0.959, 0.120,
    0.393, 0.621, 0.362,
    0.673, 0.211, 0.457,
    0.820, 0.883, 0.371,
    0.982, 0.099, 0.879,
];

#[rustfmt::skip]
static TRIANGLE_POSITIONS: [f32; 9] = [
     0.0,  0.5, 0.0,
    -0.5, -0.5, 0.0,
     0.5, -0.5, 0.0,
];

#[rustfmt::skip]
static TRIANGLE_COLORS: [f32; 9] = [
    1.0, 0.0, 0.0,
    0.0, 1.0, 0.0,
    0.0, 0.0, 1.0,
];
