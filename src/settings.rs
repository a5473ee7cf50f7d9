use std::path::{Path, PathBuf};

/// Start-up constants for the window, the viewer and the projection.
#[derive(Debug, Clone)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub title: &'static str,
    /// Every shader, model and skybox face is resolved against this directory.
    pub resource_dir: PathBuf,
    pub camera_start: glm::Vec3,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub near: f32,
    pub far: f32,
    pub clear_color: [f32; 4],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 1100,
            height: 850,
            title: "Street Scene (press Escape to exit)",
            resource_dir: PathBuf::from("resources"),
            camera_start: glm::vec3(-34.0, 2.0, -9.0),
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            zoom: 45.0,
            min_zoom: 1.0,
            max_zoom: 45.0,
            near: 0.1,
            far: 100.0,
            clear_color: [0.1, 0.1, 0.1, 1.0],
        }
    }
}

impl Settings {
    pub fn resource(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.resource_dir.join(relative)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
