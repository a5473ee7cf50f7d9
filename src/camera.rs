use crate::settings::Settings;

const YAW: f32 = -90.0;
const PITCH: f32 = 0.0;
const PITCH_LIMIT: f32 = 89.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person viewer. Angles are kept in degrees, the basis vectors are
/// recomputed whenever yaw or pitch change.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: glm::Vec3,
    pub front: glm::Vec3,
    pub up: glm::Vec3,
    pub right: glm::Vec3,
    world_up: glm::Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    movement_speed: f32,
    mouse_sensitivity: f32,
    min_zoom: f32,
    max_zoom: f32,
    near: f32,
    far: f32,
    aspect: f32,
}

impl Camera {
    pub fn new(settings: &Settings) -> Self {
        let mut camera = Self {
            position: settings.camera_start,
            front: glm::vec3(0.0, 0.0, -1.0),
            up: glm::vec3(0.0, 1.0, 0.0),
            right: glm::vec3(1.0, 0.0, 0.0),
            world_up: glm::vec3(0.0, 1.0, 0.0),
            yaw: YAW,
            pitch: PITCH,
            zoom: settings.zoom,
            movement_speed: settings.movement_speed,
            mouse_sensitivity: settings.mouse_sensitivity,
            min_zoom: settings.min_zoom,
            max_zoom: settings.max_zoom,
            near: settings.near,
            far: settings.far,
            aspect: settings.aspect(),
        };
        camera.update_vectors();
        camera
    }

    pub fn set_aspect(&mut self, w: f32, h: f32) {
        if w == 0.0 || h == 0.0 {
            self.aspect = 1.0;
        } else {
            self.aspect = w / h;
        }
    }

    pub fn view_matrix(&self) -> glm::Mat4 {
        glm::ext::look_at(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self) -> glm::Mat4 {
        glm::ext::perspective(self.zoom.to_radians(), self.aspect, self.near, self.far)
    }

    /// Moves along the local axes by `speed * delta_time`.
    pub fn process_keyboard(&mut self, direction: Movement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        self.position = match direction {
            Movement::Forward => self.position + self.front * velocity,
            Movement::Backward => self.position - self.front * velocity,
            Movement::Left => self.position - self.right * velocity,
            Movement::Right => self.position + self.right * velocity,
        };
    }

    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(self.min_zoom, self.max_zoom);
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let front = glm::vec3(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        self.front = glm::normalize(front);
        self.right = glm::normalize(glm::cross(self.front, self.world_up));
        self.up = glm::normalize(glm::cross(self.right, self.front));
    }
}
