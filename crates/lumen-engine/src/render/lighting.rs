//! Per-frame lighting uniforms: camera, orbiting point light and material.
//!
//! Slots are resolved once from a linked program; values are recomputed every
//! frame from a [`LightingScene`] and pushed into any [`UniformSink`].

use std::f64::consts::TAU;

use glam::{Mat4, Vec3};

use crate::render::UniformSink;
use crate::shader::{ShaderProgram, UniformKind, UniformSlot};

/// The named uniforms of the lighting protocol.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LightingUniform {
    Model,
    View,
    Projection,
    CameraPosition,
    LightPosition,
    LightColor,
    LightPower,
    MaterialDiffuse,
    MaterialAmbient,
    MaterialSpecular,
    MaterialShininess,
}

impl LightingUniform {
    pub const ALL: [Self; 11] = [
        Self::Model,
        Self::View,
        Self::Projection,
        Self::CameraPosition,
        Self::LightPosition,
        Self::LightColor,
        Self::LightPower,
        Self::MaterialDiffuse,
        Self::MaterialAmbient,
        Self::MaterialSpecular,
        Self::MaterialShininess,
    ];

    /// GLSL member name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Model => "Model",
            Self::View => "View",
            Self::Projection => "Projection",
            Self::CameraPosition => "cameraPosition",
            Self::LightPosition => "lightPosition",
            Self::LightColor => "lightColor",
            Self::LightPower => "lightPower",
            Self::MaterialDiffuse => "materialDiffuse",
            Self::MaterialAmbient => "materialAmbient",
            Self::MaterialSpecular => "materialSpecular",
            Self::MaterialShininess => "materialShininess",
        }
    }

    pub fn kind(self) -> UniformKind {
        match self {
            Self::Model | Self::View | Self::Projection => UniformKind::Mat4,
            Self::LightPower | Self::MaterialShininess => UniformKind::F32,
            _ => UniformKind::Vec3,
        }
    }

    /// Names to request from the shader builder.
    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().map(Self::name)
    }
}

/// Lighting uniform slots of one program.
///
/// A uniform the program does not declare, or declares with another type, has
/// no slot and its pushes are skipped.
#[derive(Debug, Clone, Default)]
pub struct LightingSlots {
    slots: [Option<UniformSlot>; 11],
}

impl LightingSlots {
    pub fn resolve(program: &ShaderProgram) -> Self {
        let mut slots = [None; 11];
        for (i, uniform) in LightingUniform::ALL.into_iter().enumerate() {
            slots[i] = program
                .uniform(uniform.name())
                .filter(|slot| slot.kind == uniform.kind());
        }
        let this = Self { slots };
        log::debug!(
            "program `{}`: {}/{} lighting uniforms resolved",
            program.label(),
            this.resolved_count(),
            LightingUniform::ALL.len()
        );
        this
    }

    pub fn get(&self, uniform: LightingUniform) -> Option<UniformSlot> {
        self.slots[uniform as usize]
    }

    pub fn resolved_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Writes one frame of lighting values into `sink`.
    pub fn push<S: UniformSink>(&self, frame: &LightingFrame, sink: &mut S) {
        use LightingUniform::*;

        for (uniform, value) in [
            (Model, &frame.model),
            (View, &frame.view),
            (Projection, &frame.projection),
        ] {
            if let Some(slot) = self.get(uniform) {
                sink.write_mat4(slot, value);
            }
        }
        self.vec3(sink, LightPosition, frame.light_position);
        self.vec3(sink, LightColor, frame.light_color);
        self.float(sink, LightPower, frame.light_power);
        self.vec3(sink, CameraPosition, frame.camera_position);
        self.vec3(sink, MaterialDiffuse, frame.material.diffuse);
        self.vec3(sink, MaterialAmbient, frame.material.ambient);
        self.vec3(sink, MaterialSpecular, frame.material.specular);
        self.float(sink, MaterialShininess, frame.material.shininess);
    }

    fn vec3<S: UniformSink>(&self, sink: &mut S, uniform: LightingUniform, value: Vec3) {
        if let Some(slot) = self.get(uniform) {
            sink.write_vec3(slot, value);
        }
    }

    fn float<S: UniformSink>(&self, sink: &mut S, uniform: LightingUniform, value: f32) {
        if let Some(slot) = self.get(uniform) {
            sink.write_f32(slot, value);
        }
    }
}

/// Perspective camera looking at a fixed target.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view, radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Right-handed projection with a 0..1 depth range.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// Circular light path in the X-Z plane, centered on the Y axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightOrbit {
    pub radius: f32,
    pub height: f32,
    /// Radians per frame.
    pub angular_speed: f32,
}

impl LightOrbit {
    /// Orbit angle at `frame`, in `[0, 2π)`.
    ///
    /// Computed in `f64` and wrapped so late frames keep full `f32` precision.
    pub fn angle_at(&self, frame: u64) -> f32 {
        (frame as f64 * f64::from(self.angular_speed)).rem_euclid(TAU) as f32
    }

    pub fn position_at(&self, frame: u64) -> Vec3 {
        let (sin, cos) = self.angle_at(frame).sin_cos();
        Vec3::new(self.radius * cos, self.height, self.radius * sin)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub color: Vec3,
    /// Numerator of the `1 / d²` falloff.
    pub power: f32,
    pub orbit: LightOrbit,
}

/// Reflectance coefficients.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

/// Everything the lighting protocol pushes, before per-frame evaluation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightingScene {
    pub model: Mat4,
    pub camera: Camera,
    pub light: Light,
    pub material: Material,
}

impl LightingScene {
    /// The lit cube scene.
    pub fn reference() -> Self {
        Self {
            model: Mat4::IDENTITY,
            camera: Camera {
                position: Vec3::new(4.0, 3.0, -3.0),
                target: Vec3::ZERO,
                up: Vec3::Y,
                fov_y: 45f32.to_radians(),
                aspect: 4.0 / 3.0,
                near: 0.1,
                far: 100.0,
            },
            light: Light {
                color: Vec3::ONE,
                power: 50.0,
                orbit: LightOrbit {
                    radius: 5.0,
                    height: 3.0,
                    angular_speed: 0.01,
                },
            },
            material: Material {
                ambient: Vec3::splat(0.1),
                diffuse: Vec3::splat(0.5),
                specular: Vec3::splat(0.5),
                shininess: 32.0,
            },
        }
    }

    pub fn frame(&self, frame_index: u64) -> LightingFrame {
        LightingFrame {
            model: self.model,
            view: self.camera.view(),
            projection: self.camera.projection(),
            camera_position: self.camera.position,
            light_position: self.light.orbit.position_at(frame_index),
            light_color: self.light.color,
            light_power: self.light.power,
            material: self.material,
        }
    }
}

/// Uniform values of one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightingFrame {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub light_position: Vec3,
    pub light_color: Vec3,
    pub light_power: f32,
    pub material: Material,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::UniformStorage;
    use crate::shader::{sources, ShaderProgramBuilder};

    #[derive(Default)]
    struct Recorder {
        writes: Vec<(u32, &'static str)>,
    }

    impl UniformSink for Recorder {
        fn write_mat4(&mut self, slot: UniformSlot, _: &Mat4) {
            self.writes.push((slot.offset, "mat4"));
        }
        fn write_vec3(&mut self, slot: UniformSlot, _: Vec3) {
            self.writes.push((slot.offset, "vec3"));
        }
        fn write_f32(&mut self, slot: UniformSlot, _: f32) {
            self.writes.push((slot.offset, "f32"));
        }
    }

    fn phong() -> ShaderProgram {
        ShaderProgramBuilder::new("phong", sources::phong())
            .uniforms(LightingUniform::names())
            .diagnostics(true)
            .build()
            .unwrap()
    }

    #[test]
    fn orbit_stays_on_circle() {
        let orbit = LightingScene::reference().light.orbit;
        for t in [0, 1, 157, 314, 628, 10_000, 1u64 << 40] {
            let p = orbit.position_at(t);
            assert!((p.x * p.x + p.z * p.z - 25.0).abs() < 1e-4, "t={t}: {p}");
            assert_eq!(p.y, 3.0);
        }
    }

    #[test]
    fn orbit_starts_on_positive_x() {
        let p = LightingScene::reference().light.orbit.position_at(0);
        assert!((p - Vec3::new(5.0, 3.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn orbit_angle_wraps() {
        let orbit = LightOrbit { radius: 1.0, height: 0.0, angular_speed: 1.0 };
        assert!(orbit.angle_at(7) < TAU as f32);
        assert!((orbit.angle_at(7) - (7.0 - TAU) as f32).abs() < 1e-6);
    }

    #[test]
    fn phong_resolves_every_slot() {
        let slots = LightingSlots::resolve(&phong());
        assert_eq!(slots.resolved_count(), 11);
    }

    #[test]
    fn flat_program_resolves_nothing() {
        let program = ShaderProgramBuilder::new("flat", sources::flat_color())
            .uniforms(LightingUniform::names())
            .build()
            .unwrap();
        let slots = LightingSlots::resolve(&program);
        assert_eq!(slots.resolved_count(), 0);

        let mut recorder = Recorder::default();
        slots.push(&LightingScene::reference().frame(0), &mut recorder);
        assert!(recorder.writes.is_empty());
    }

    #[test]
    fn push_order_and_kinds() {
        let slots = LightingSlots::resolve(&phong());
        let mut recorder = Recorder::default();
        slots.push(&LightingScene::reference().frame(3), &mut recorder);

        let kinds: Vec<_> = recorder.writes.iter().map(|(_, k)| *k).collect();
        assert_eq!(
            kinds,
            ["mat4", "mat4", "mat4", "vec3", "vec3", "f32", "vec3", "vec3", "vec3", "vec3", "f32"]
        );
    }

    #[test]
    fn pushed_values_read_back() {
        let program = phong();
        let slots = LightingSlots::resolve(&program);
        let mut storage = UniformStorage::new(program.uniform_blocks());
        let scene = LightingScene::reference();
        let frame = scene.frame(42);
        slots.push(&frame, &mut storage);

        let get = |u| slots.get(u).unwrap();
        assert_eq!(storage.read_mat4(get(LightingUniform::Model)), Some(Mat4::IDENTITY));
        assert_eq!(storage.read_mat4(get(LightingUniform::View)), Some(frame.view));
        assert_eq!(storage.read_mat4(get(LightingUniform::Projection)), Some(frame.projection));
        assert_eq!(
            storage.read_vec3(get(LightingUniform::LightPosition)),
            Some(scene.light.orbit.position_at(42))
        );
        assert_eq!(
            storage.read_vec3(get(LightingUniform::CameraPosition)),
            Some(Vec3::new(4.0, 3.0, -3.0))
        );
        assert_eq!(storage.read_f32(get(LightingUniform::LightPower)), Some(50.0));
        assert_eq!(storage.read_f32(get(LightingUniform::MaterialShininess)), Some(32.0));
        assert_eq!(
            storage.read_vec3(get(LightingUniform::MaterialAmbient)),
            Some(Vec3::splat(0.1))
        );
    }

    #[test]
    fn view_maps_target_in_front_of_camera() {
        let camera = LightingScene::reference().camera;
        let p = camera.view().transform_point3(camera.target);
        assert!(p.z < 0.0);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);

        let clip = camera.projection() * p.extend(1.0);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }
}
