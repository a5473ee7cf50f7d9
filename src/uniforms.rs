//! Camera and light uniforms for the lit programs.
//!
//! Uniform locations are looked up once, right after a program links, and
//! stored per light field. The frame loop only ever touches locations.

use crate::light::{ChannelScale, DirectionalLight, LightSet, PointLight, SpotLight};
use crate::renderer::gl;
use crate::shader::{self, Program};

/// Must match `NR_POINT_LIGHTS` in the lit fragment shaders.
pub const MAX_POINT_LIGHTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightField {
    Position,
    Direction,
    Ambient,
    Diffuse,
    Specular,
    Constant,
    Linear,
    Quadratic,
    CutOff,
    OuterCutOff,
}

impl LightField {
    pub const COUNT: usize = 10;

    pub const DIRECTIONAL: [LightField; 4] = [
        LightField::Direction,
        LightField::Ambient,
        LightField::Diffuse,
        LightField::Specular,
    ];

    pub const SPOT: [LightField; 7] = [
        LightField::Position,
        LightField::Direction,
        LightField::CutOff,
        LightField::OuterCutOff,
        LightField::Ambient,
        LightField::Diffuse,
        LightField::Specular,
    ];

    pub const POINT: [LightField; 7] = [
        LightField::Position,
        LightField::Ambient,
        LightField::Diffuse,
        LightField::Specular,
        LightField::Constant,
        LightField::Linear,
        LightField::Quadratic,
    ];

    pub fn glsl_name(self) -> &'static str {
        match self {
            LightField::Position => "position",
            LightField::Direction => "direction",
            LightField::Ambient => "ambient",
            LightField::Diffuse => "diffuse",
            LightField::Specular => "specular",
            LightField::Constant => "constant",
            LightField::Linear => "linear",
            LightField::Quadratic => "quadratic",
            LightField::CutOff => "cut_off",
            LightField::OuterCutOff => "outer_cut_off",
        }
    }
}

/// `"<prefix>.<field>"`, e.g. `pointlights[2].quadratic`.
pub fn uniform_name(prefix: &str, field: LightField) -> String {
    format!("{prefix}.{}", field.glsl_name())
}

pub fn point_light_prefix(index: usize) -> String {
    format!("pointlights[{index}]")
}

/// Locations of one light struct, indexed by `LightField`. Fields the struct
/// does not have stay at -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightLocations([gl::types::GLint; LightField::COUNT]);

impl LightLocations {
    pub fn resolve_with(
        prefix: &str,
        fields: &[LightField],
        mut lookup: impl FnMut(&str) -> gl::types::GLint,
    ) -> Self {
        let mut locations = [-1; LightField::COUNT];
        for &field in fields {
            locations[field as usize] = lookup(&uniform_name(prefix, field));
        }
        Self(locations)
    }

    pub fn get(&self, field: LightField) -> gl::types::GLint {
        self.0[field as usize]
    }
}

/// Everything the frame writes to a lit program.
#[derive(Debug, Clone)]
pub struct ProgramUniforms {
    pub projection: gl::types::GLint,
    pub view: gl::types::GLint,
    pub model: gl::types::GLint,
    pub view_pos: gl::types::GLint,
    pub shininess: gl::types::GLint,
    pub blinn: gl::types::GLint,
    pub point_count: gl::types::GLint,
    pub directional: LightLocations,
    pub spotlight: LightLocations,
    pub point_lights: Vec<LightLocations>,
}

impl ProgramUniforms {
    pub fn resolve(gl: &gl::Gl, program: &Program) -> Self {
        Self::resolve_with(|name| program.location(gl, name))
    }

    pub fn resolve_with(mut lookup: impl FnMut(&str) -> gl::types::GLint) -> Self {
        Self {
            projection: lookup("projection"),
            view: lookup("view"),
            model: lookup("model"),
            view_pos: lookup("viewPos"),
            shininess: lookup("material.shininess"),
            blinn: lookup("blinn"),
            point_count: lookup("pointlight_count"),
            directional: LightLocations::resolve_with(
                "directional",
                &LightField::DIRECTIONAL,
                &mut lookup,
            ),
            spotlight: LightLocations::resolve_with("spotlight", &LightField::SPOT, &mut lookup),
            point_lights: (0..MAX_POINT_LIGHTS)
                .map(|i| {
                    LightLocations::resolve_with(
                        &point_light_prefix(i),
                        &LightField::POINT,
                        &mut lookup,
                    )
                })
                .collect(),
        }
    }
}

/// Per-frame camera state shared by every lit program.
#[derive(Debug, Clone, Copy)]
pub struct FrameUniforms {
    pub projection: glm::Mat4,
    pub view: glm::Mat4,
    pub view_pos: glm::Vec3,
    pub blinn: bool,
}

/// Destination of uniform writes. The renderer writes straight to GL; tests
/// record what would have been uploaded.
pub trait UniformSink {
    fn mat4(&mut self, location: gl::types::GLint, value: &glm::Mat4);
    fn vec3(&mut self, location: gl::types::GLint, value: glm::Vec3);
    fn float(&mut self, location: gl::types::GLint, value: f32);
    fn int(&mut self, location: gl::types::GLint, value: i32);
}

/// Writes to whichever program is currently bound.
pub struct GlSink<'a>(pub &'a gl::Gl);

impl UniformSink for GlSink<'_> {
    fn mat4(&mut self, location: gl::types::GLint, value: &glm::Mat4) {
        shader::set_mat4(self.0, location, value);
    }

    fn vec3(&mut self, location: gl::types::GLint, value: glm::Vec3) {
        shader::set_vec3(self.0, location, value);
    }

    fn float(&mut self, location: gl::types::GLint, value: f32) {
        shader::set_float(self.0, location, value);
    }

    fn int(&mut self, location: gl::types::GLint, value: i32) {
        shader::set_int(self.0, location, value);
    }
}

/// Uploads camera, directional, spot and (optionally) point lights to the
/// bound program. Missing locations are -1 and silently ignored by GL.
pub fn bind_camera_and_lights(
    sink: &mut impl UniformSink,
    uniforms: &ProgramUniforms,
    frame: &FrameUniforms,
    lights: &LightSet,
    with_point_lights: bool,
) {
    sink.mat4(uniforms.projection, &frame.projection);
    sink.mat4(uniforms.view, &frame.view);
    sink.vec3(uniforms.view_pos, frame.view_pos);
    sink.int(uniforms.blinn, frame.blinn as i32);

    set_directional(sink, &uniforms.directional, &lights.directional);
    set_spotlight(sink, &uniforms.spotlight, &lights.spotlight);

    let bound = if with_point_lights {
        let count = lights.point_lights.len().min(MAX_POINT_LIGHTS);
        for (locations, light) in uniforms.point_lights.iter().zip(&lights.point_lights) {
            set_point_light(sink, locations, light, lights.tuning.point);
        }
        count
    } else {
        0
    };
    sink.int(uniforms.point_count, bound as i32);

    let shininess = if bound > 0 {
        lights.tuning.point_shininess
    } else {
        lights.tuning.base_shininess
    };
    sink.float(uniforms.shininess, shininess);
}

fn set_directional(sink: &mut impl UniformSink, at: &LightLocations, light: &DirectionalLight) {
    sink.vec3(at.get(LightField::Direction), light.direction);
    sink.vec3(at.get(LightField::Ambient), light.ambient);
    sink.vec3(at.get(LightField::Diffuse), light.diffuse);
    sink.vec3(at.get(LightField::Specular), light.specular);
}

fn set_spotlight(sink: &mut impl UniformSink, at: &LightLocations, light: &SpotLight) {
    sink.vec3(at.get(LightField::Position), light.position);
    sink.vec3(at.get(LightField::Direction), light.direction);
    sink.float(at.get(LightField::CutOff), light.cut_off);
    sink.float(at.get(LightField::OuterCutOff), light.outer_cut_off);
    sink.vec3(at.get(LightField::Ambient), light.ambient);
    sink.vec3(at.get(LightField::Diffuse), light.diffuse);
    sink.vec3(at.get(LightField::Specular), light.specular);
}

fn set_point_light(
    sink: &mut impl UniformSink,
    at: &LightLocations,
    light: &PointLight,
    scale: ChannelScale,
) {
    sink.vec3(at.get(LightField::Position), light.position);
    sink.vec3(at.get(LightField::Ambient), light.ambient * scale.ambient);
    sink.vec3(at.get(LightField::Diffuse), light.diffuse * scale.diffuse);
    sink.vec3(at.get(LightField::Specular), light.specular * scale.specular);
    sink.float(at.get(LightField::Constant), light.constant);
    sink.float(at.get(LightField::Linear), light.linear);
    sink.float(at.get(LightField::Quadratic), light.quadratic);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::camera::Camera;
    use crate::light::SceneVariant;
    use crate::scene::{car_positions, street_objects};
    use crate::settings::Settings;

    #[derive(Debug, Clone, PartialEq)]
    enum Value {
        Mat4,
        Vec3(glm::Vec3),
        Float(f32),
        Int(i32),
    }

    /// Resolves every uniform to a unique location and keeps the last write
    /// per name.
    struct Recorder {
        names: HashMap<gl::types::GLint, String>,
        writes: HashMap<String, Value>,
    }

    impl Recorder {
        fn with_uniforms() -> (Self, ProgramUniforms) {
            let mut names = HashMap::new();
            let uniforms = ProgramUniforms::resolve_with(|name| {
                let location = names.len() as gl::types::GLint;
                names.insert(location, name.to_owned());
                location
            });
            let recorder = Self {
                names,
                writes: HashMap::new(),
            };
            (recorder, uniforms)
        }

        fn record(&mut self, location: gl::types::GLint, value: Value) {
            let name = self.names[&location].clone();
            self.writes.insert(name, value);
        }

        fn vec3(&self, name: &str) -> glm::Vec3 {
            match self.writes.get(name) {
                Some(Value::Vec3(v)) => *v,
                other => panic!("{name} holds {other:?}"),
            }
        }

        fn float(&self, name: &str) -> f32 {
            match self.writes.get(name) {
                Some(Value::Float(v)) => *v,
                other => panic!("{name} holds {other:?}"),
            }
        }

        fn int(&self, name: &str) -> i32 {
            match self.writes.get(name) {
                Some(Value::Int(v)) => *v,
                other => panic!("{name} holds {other:?}"),
            }
        }

        fn point_writes(&self) -> usize {
            self.writes
                .keys()
                .filter(|name| name.starts_with("pointlights["))
                .count()
        }
    }

    impl UniformSink for Recorder {
        fn mat4(&mut self, location: gl::types::GLint, _value: &glm::Mat4) {
            self.record(location, Value::Mat4);
        }

        fn vec3(&mut self, location: gl::types::GLint, value: glm::Vec3) {
            self.record(location, Value::Vec3(value));
        }

        fn float(&mut self, location: gl::types::GLint, value: f32) {
            self.record(location, Value::Float(value));
        }

        fn int(&mut self, location: gl::types::GLint, value: i32) {
            self.record(location, Value::Int(value));
        }
    }

    fn frame(camera: &Camera, blinn: bool) -> FrameUniforms {
        FrameUniforms {
            projection: camera.projection_matrix(),
            view: camera.view_matrix(),
            view_pos: camera.position,
            blinn,
        }
    }

    fn street_lights(variant: SceneVariant) -> (Camera, LightSet) {
        let camera = Camera::new(&Settings::default());
        let lights = LightSet::new(variant, &camera, &car_positions(&street_objects()));
        (camera, lights)
    }

    fn close(a: glm::Vec3, b: glm::Vec3) -> bool {
        glm::length(a - b) < 1e-5
    }

    #[test]
    fn names_join_prefix_and_field() {
        assert_eq!(
            uniform_name("spotlight", LightField::OuterCutOff),
            "spotlight.outer_cut_off"
        );
        assert_eq!(
            uniform_name(&point_light_prefix(2), LightField::Quadratic),
            "pointlights[2].quadratic"
        );
    }

    #[test]
    fn unused_fields_stay_unresolved() {
        let sun = LightLocations::resolve_with("directional", &LightField::DIRECTIONAL, |_| 7);
        assert_eq!(sun.get(LightField::Direction), 7);
        assert_eq!(sun.get(LightField::Specular), 7);
        assert_eq!(sun.get(LightField::Position), -1);
        assert_eq!(sun.get(LightField::CutOff), -1);
    }

    #[test]
    fn every_field_is_looked_up_once_at_resolve_time() {
        let mut seen: HashMap<String, gl::types::GLint> = HashMap::new();
        let uniforms = ProgramUniforms::resolve_with(|name| {
            let next = seen.len() as gl::types::GLint;
            *seen.entry(name.to_owned()).or_insert(next)
        });

        // 7 scalars, 4 directional, 7 spot, 7 per point light.
        assert_eq!(seen.len(), 7 + 4 + 7 + 7 * MAX_POINT_LIGHTS);
        assert_eq!(uniforms.point_lights.len(), MAX_POINT_LIGHTS);
        assert_eq!(
            uniforms.spotlight.get(LightField::CutOff),
            seen["spotlight.cut_off"]
        );
        assert_eq!(
            uniforms.point_lights[3].get(LightField::Linear),
            seen["pointlights[3].linear"]
        );
        assert_eq!(uniforms.shininess, seen["material.shininess"]);
    }

    #[test]
    fn lamppost_light_is_scaled_and_sharpens_highlights() {
        let (camera, lights) = street_lights(SceneVariant::Lamppost);
        let (mut sink, uniforms) = Recorder::with_uniforms();

        bind_camera_and_lights(&mut sink, &uniforms, &frame(&camera, true), &lights, true);

        let glow = glm::vec3(5.5, 3.7, 1.0);
        assert!(close(sink.vec3("pointlights[0].ambient"), glow * 0.3));
        assert!(close(sink.vec3("pointlights[0].diffuse"), glow * 2.0));
        assert!(close(sink.vec3("pointlights[0].specular"), glow * 0.5));
        assert_eq!(sink.vec3("pointlights[0].position"), glm::vec3(-15.0, -0.6, 3.83));
        assert_eq!(sink.float("pointlights[0].quadratic"), 0.032);
        assert_eq!(sink.int("pointlight_count"), 1);
        assert_eq!(sink.float("material.shininess"), 32.0);
        assert_eq!(sink.int("blinn"), 1);
        assert_eq!(sink.vec3("viewPos"), camera.position);
        assert!(!sink.writes.contains_key("pointlights[1].position"));
    }

    #[test]
    fn directional_and_spot_lights_go_up_unscaled() {
        let (camera, lights) = street_lights(SceneVariant::Lamppost);
        let (mut sink, uniforms) = Recorder::with_uniforms();

        bind_camera_and_lights(&mut sink, &uniforms, &frame(&camera, false), &lights, true);

        assert_eq!(sink.vec3("directional.ambient"), lights.directional.ambient);
        assert_eq!(sink.vec3("directional.direction"), glm::vec3(5.0, -3.0, -5.0));
        assert_eq!(sink.vec3("spotlight.position"), camera.position);
        assert_eq!(sink.vec3("spotlight.direction"), camera.front);
        assert_eq!(sink.vec3("spotlight.specular"), lights.spotlight.specular);
        assert_eq!(sink.float("spotlight.cut_off"), lights.spotlight.cut_off);
        assert_eq!(sink.float("spotlight.outer_cut_off"), lights.spotlight.outer_cut_off);
        assert_eq!(sink.int("blinn"), 0);
        assert_eq!(sink.writes.get("projection"), Some(&Value::Mat4));
        assert_eq!(sink.writes.get("view"), Some(&Value::Mat4));
    }

    #[test]
    fn withheld_point_lights_leave_base_shininess() {
        let (camera, lights) = street_lights(SceneVariant::Lamppost);
        let (mut sink, uniforms) = Recorder::with_uniforms();

        bind_camera_and_lights(&mut sink, &uniforms, &frame(&camera, false), &lights, false);

        assert_eq!(sink.int("pointlight_count"), 0);
        assert_eq!(sink.float("material.shininess"), 16.0);
        assert_eq!(sink.point_writes(), 0);
    }

    #[test]
    fn headlights_bind_one_dim_light_per_car() {
        let (camera, lights) = street_lights(SceneVariant::Headlights);
        let (mut sink, uniforms) = Recorder::with_uniforms();

        bind_camera_and_lights(&mut sink, &uniforms, &frame(&camera, false), &lights, true);

        let beam = glm::vec3(1.0, 0.894, 0.627);
        assert_eq!(sink.int("pointlight_count"), 3);
        for i in 0..3 {
            let prefix = point_light_prefix(i);
            assert!(close(sink.vec3(&format!("{prefix}.ambient")), beam * 0.1));
            assert!(close(sink.vec3(&format!("{prefix}.diffuse")), beam));
        }
        assert!(close(
            sink.vec3("pointlights[1].position"),
            glm::vec3(7.0, -1.19, -2.5)
        ));
        assert_eq!(sink.float("material.shininess"), 32.0);
    }

    #[test]
    fn point_light_count_is_clamped_to_shader_array() {
        let (camera, mut lights) = street_lights(SceneVariant::Lamppost);
        let extra = lights.point_lights[0];
        lights.point_lights = vec![extra; MAX_POINT_LIGHTS + 3];
        let (mut sink, uniforms) = Recorder::with_uniforms();

        bind_camera_and_lights(&mut sink, &uniforms, &frame(&camera, false), &lights, true);

        assert_eq!(sink.int("pointlight_count"), MAX_POINT_LIGHTS as i32);
        assert_eq!(sink.point_writes(), 7 * MAX_POINT_LIGHTS);
    }

    #[test]
    fn rear_cars_are_not_point_lit() {
        let objects = street_objects();
        let lit = |name: &str| objects.iter().find(|o| o.name == name).map(|o| o.point_lit);
        assert_eq!(lit("mercedes"), Some(false));
        assert_eq!(lit("porsche"), Some(false));
        assert_eq!(lit("nissan"), Some(true));
        assert_eq!(lit("village"), Some(true));
    }
}
