//! CPU evaluation of the Phong fragment stage, term by term.

use glam::{Vec3, Vec4};

use super::lighting::LightingFrame;

/// Interpolated fragment inputs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3,
    pub normal: Vec3,
    pub base_color: Vec3,
}

/// The three lighting terms before the base color is applied.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Shading {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    base_color: Vec3,
}

impl Shading {
    /// Final opaque color.
    pub fn color(&self) -> Vec4 {
        ((self.ambient + self.diffuse + self.specular) * self.base_color).extend(1.0)
    }
}

/// GLSL `reflect`: mirrors incident `i` about normal `n`.
fn reflect(i: Vec3, n: Vec3) -> Vec3 {
    i - 2.0 * n.dot(i) * n
}

pub fn shade(point: &SurfacePoint, frame: &LightingFrame) -> Shading {
    let material = &frame.material;
    let normal = point.normal.normalize_or_zero();

    let ambient = material.ambient * frame.light_color * material.diffuse;

    let to_light = frame.light_position - point.position;
    let distance = to_light.length();
    let light_dir = to_light.normalize_or_zero();
    let falloff = frame.light_power / (distance * distance);

    let diffuse_strength = normal.dot(light_dir).max(0.0);
    let diffuse = diffuse_strength * frame.light_color * material.diffuse * falloff;

    let view_dir = (frame.camera_position - point.position).normalize_or_zero();
    let reflect_dir = reflect(-light_dir, normal);
    let specular_strength = view_dir.dot(reflect_dir).max(0.0).powf(material.shininess);
    let specular = specular_strength * frame.light_color * material.specular * falloff;

    Shading {
        ambient,
        diffuse,
        specular,
        base_color: point.base_color,
    }
}
