use crate::camera::{Camera, Movement};
use crate::input::{FrameClock, InputState};
use crate::light::{LightSet, SceneVariant, LAMP_POSITION};
use crate::settings::Settings;
use crate::transform::Transform;

/// One hardcoded draw: which mesh, which program, where, and whether the
/// point lights reach it.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: &'static str,
    pub model: &'static str,
    pub vertex_shader: &'static str,
    pub fragment_shader: &'static str,
    pub transform: Transform,
    pub point_lit: bool,
}

const LIT_VS: &str = "shaders/model_loading.vs";
const LIT_FS: &str = "shaders/model_loading.fs";
const CAR_FS: &str = "shaders/car.fs";

pub fn street_objects() -> Vec<SceneObject> {
    let [lx, ly, lz] = LAMP_POSITION;
    let up = glm::vec3(0.0, 1.0, 0.0);
    vec![
        SceneObject {
            name: "village",
            model: "objects/village/volgar_street.gltf",
            vertex_shader: LIT_VS,
            fragment_shader: LIT_FS,
            transform: Transform::at(glm::vec3(0.0, -4.0, 0.0), 1.0),
            point_lit: true,
        },
        SceneObject {
            name: "lamp",
            model: "objects/cube/cube.gltf",
            vertex_shader: LIT_VS,
            fragment_shader: LIT_FS,
            transform: Transform::at(glm::vec3(lx, ly, lz), 0.1),
            point_lit: true,
        },
        SceneObject {
            name: "lamppost",
            model: "objects/lamppost/wooden_lantern.gltf",
            vertex_shader: LIT_VS,
            fragment_shader: LIT_FS,
            transform: Transform::at(glm::vec3(-15.0, -4.0, 6.0), 0.47),
            point_lit: true,
        },
        SceneObject {
            name: "nissan",
            model: "objects/nissan/nissan.gltf",
            vertex_shader: LIT_VS,
            fragment_shader: CAR_FS,
            transform: Transform::at(glm::vec3(-20.0, -2.75, 2.5), 3.0),
            point_lit: true,
        },
        SceneObject {
            name: "mercedes",
            model: "objects/mercedes/mercedes.gltf",
            vertex_shader: LIT_VS,
            fragment_shader: CAR_FS,
            transform: Transform::at(glm::vec3(7.0, -2.69, -2.5), 3.0).rotated(180.0, up),
            point_lit: false,
        },
        SceneObject {
            name: "porsche",
            model: "objects/porsche/porsche.gltf",
            vertex_shader: LIT_VS,
            fragment_shader: CAR_FS,
            transform: Transform::at(glm::vec3(-7.0, -2.69, -2.5), 3.0),
            point_lit: false,
        },
    ]
}

const CARS: [&str; 3] = ["nissan", "mercedes", "porsche"];

pub fn car_positions(objects: &[SceneObject]) -> Vec<glm::Vec3> {
    objects
        .iter()
        .filter(|o| CARS.contains(&o.name))
        .map(|o| o.transform.translation)
        .collect()
}

/// Mutable viewer state: camera, input context, clock and lights.
pub struct Scene {
    pub camera: Camera,
    pub input: InputState,
    pub clock: FrameClock,
    pub lights: LightSet,
    pub objects: Vec<SceneObject>,
}

impl Scene {
    pub fn init(settings: &Settings) -> Self {
        let camera = Camera::new(settings);
        let objects = street_objects();
        let lights = LightSet::new(SceneVariant::Lamppost, &camera, &car_positions(&objects));
        Self {
            camera,
            input: InputState::new(),
            clock: FrameClock::new(),
            lights,
            objects,
        }
    }

    /// Integrates held keys over `delta_time` and re-aims the spotlight.
    pub fn update(&mut self, delta_time: f32) {
        let held: Vec<Movement> = self.input.held_movements().collect();
        for movement in held {
            self.camera.process_keyboard(movement, delta_time);
        }
        self.lights.track(&self.camera);
    }

    /// Turns the view by a raw pointer motion.
    pub fn look(&mut self, dx: f64, dy: f64) {
        let (x_offset, y_offset) = self.input.mouse_motion(dx, dy);
        self.camera.process_mouse_movement(x_offset, y_offset, true);
    }

    pub fn cycle_variant(&mut self) -> SceneVariant {
        let next = self.lights.variant.next();
        self.lights = LightSet::new(next, &self.camera, &car_positions(&self.objects));
        next
    }
}
