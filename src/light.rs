use crate::camera::Camera;

/// Parallel light, e.g. the sun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: glm::Vec3,
    pub ambient: glm::Vec3,
    pub diffuse: glm::Vec3,
    pub specular: glm::Vec3,
}

/// Positional light with `1 / (constant + linear * d + quadratic * d^2)` falloff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: glm::Vec3,
    pub ambient: glm::Vec3,
    pub diffuse: glm::Vec3,
    pub specular: glm::Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

/// Cone light bound to the viewer. `cut_off >= outer_cut_off` (both cosines).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: glm::Vec3,
    pub direction: glm::Vec3,
    pub cut_off: f32,
    pub outer_cut_off: f32,
    pub ambient: glm::Vec3,
    pub diffuse: glm::Vec3,
    pub specular: glm::Vec3,
}

impl DirectionalLight {
    /// Light travelling from `from` towards `to`.
    pub fn between(from: glm::Vec3, to: glm::Vec3) -> Self {
        Self {
            direction: to - from,
            ambient: glm::vec3(0.09, 0.09, 0.09),
            diffuse: glm::vec3(0.4, 0.4, 0.4),
            specular: glm::vec3(0.5, 0.5, 0.5),
        }
    }
}

impl PointLight {
    pub fn new(
        position: glm::Vec3,
        ambient: glm::Vec3,
        diffuse: glm::Vec3,
        specular: glm::Vec3,
        constant: f32,
        linear: f32,
        quadratic: f32,
    ) -> Self {
        Self {
            position,
            ambient,
            diffuse,
            specular,
            constant,
            linear,
            quadratic,
        }
    }
}

impl SpotLight {
    /// Flashlight with the given inner/outer cone half-angles in degrees.
    pub fn flashlight(camera: &Camera, inner_degrees: f32, outer_degrees: f32) -> Self {
        let warm = glm::vec3(1.0, 0.894, 0.627);
        Self {
            position: camera.position,
            direction: camera.front,
            cut_off: inner_degrees.to_radians().cos(),
            outer_cut_off: outer_degrees.to_radians().cos(),
            ambient: glm::vec3(0.2, 0.2, 0.2),
            diffuse: warm,
            specular: warm,
        }
    }

    pub fn track(&mut self, camera: &Camera) {
        self.position = camera.position;
        self.direction = camera.front;
    }
}

/// Multipliers applied to a light's colour channels at upload time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelScale {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
}

/// Per-variant brightness data. These are hand-tuned numbers, not a formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightTuning {
    pub point: ChannelScale,
    /// Shininess for programs that also receive point lights.
    pub point_shininess: f32,
    pub base_shininess: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneVariant {
    /// One warm light hanging in the lamppost.
    Lamppost,
    /// One light per car.
    Headlights,
}

impl SceneVariant {
    pub fn next(self) -> Self {
        match self {
            SceneVariant::Lamppost => SceneVariant::Headlights,
            SceneVariant::Headlights => SceneVariant::Lamppost,
        }
    }

    pub fn tuning(self) -> LightTuning {
        match self {
            SceneVariant::Lamppost => LightTuning {
                point: ChannelScale {
                    ambient: 0.3,
                    diffuse: 2.0,
                    specular: 0.5,
                },
                point_shininess: 32.0,
                base_shininess: 16.0,
            },
            SceneVariant::Headlights => LightTuning {
                point: ChannelScale {
                    ambient: 0.1,
                    diffuse: 1.0,
                    specular: 1.0,
                },
                point_shininess: 32.0,
                base_shininess: 16.0,
            },
        }
    }
}

pub const SPOT_INNER_DEGREES: f32 = 13.0;
pub const SPOT_OUTER_DEGREES: f32 = 16.5;
pub const LAMP_POSITION: [f32; 3] = [-15.0, -0.6, 3.83];

/// Every light the frame binds to the lit programs.
#[derive(Debug, Clone)]
pub struct LightSet {
    pub directional: DirectionalLight,
    pub spotlight: SpotLight,
    pub point_lights: Vec<PointLight>,
    pub tuning: LightTuning,
    pub variant: SceneVariant,
}

impl LightSet {
    pub fn new(variant: SceneVariant, camera: &Camera, car_positions: &[glm::Vec3]) -> Self {
        let directional = DirectionalLight::between(
            glm::vec3(-50.0, 20.0, 20.0),
            glm::vec3(-45.0, 17.0, 15.0),
        );
        let spotlight = SpotLight::flashlight(camera, SPOT_INNER_DEGREES, SPOT_OUTER_DEGREES);

        let point_lights = match variant {
            SceneVariant::Lamppost => {
                let glow = glm::vec3(5.5, 3.7, 1.0);
                let [x, y, z] = LAMP_POSITION;
                vec![PointLight::new(
                    glm::vec3(x, y, z),
                    glow,
                    glow,
                    glow,
                    1.0,
                    0.09,
                    0.032,
                )]
            }
            SceneVariant::Headlights => car_positions
                .iter()
                .map(|car| {
                    let beam = glm::vec3(1.0, 0.894, 0.627);
                    PointLight::new(
                        *car + glm::vec3(0.0, 1.5, 0.0),
                        beam,
                        beam,
                        beam,
                        1.0,
                        0.09,
                        0.032,
                    )
                })
                .collect(),
        };

        Self {
            directional,
            spotlight,
            point_lights,
            tuning: variant.tuning(),
            variant,
        }
    }

    pub fn track(&mut self, camera: &Camera) {
        self.spotlight.track(camera);
    }
}
