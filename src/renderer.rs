use std::ffi::{CStr, CString};

use glutin::prelude::GlDisplay;

use crate::model::{Model, DIFFUSE_UNIT, SPECULAR_UNIT};
use crate::scene::{Scene, SceneObject};
use crate::settings::Settings;
use crate::shader::{self, Program};
use crate::skybox::Skybox;
use crate::uniforms::{bind_camera_and_lights, FrameUniforms, GlSink, ProgramUniforms};

pub mod gl {
    #![allow(clippy::all)]
    include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));
}

/// A scene object whose program and mesh both loaded.
struct DrawItem {
    name: &'static str,
    program: Program,
    uniforms: ProgramUniforms,
    model: Model,
    model_matrix: glm::Mat4,
    point_lit: bool,
}

pub struct Renderer {
    items: Vec<DrawItem>,
    skybox: Option<Skybox>,
    clear_color: [f32; 4],
    gl: gl::Gl,
}

impl Renderer {
    pub fn new<D: GlDisplay>(gl_display: &D, settings: &Settings, objects: &[SceneObject]) -> Self {
        tracing::info!("Creating OpenGL stuff...");
        let gl = gl::Gl::load_with(|symbol| {
            let symbol = CString::new(symbol).unwrap();
            gl_display.get_proc_address(symbol.as_c_str()).cast()
        });

        if let Some(renderer) = get_gl_string(&gl, gl::RENDERER) {
            tracing::info!("Running on {}", renderer.to_string_lossy());
        }
        if let Some(version) = get_gl_string(&gl, gl::VERSION) {
            tracing::info!("OpenGL Version {}", version.to_string_lossy());
        }
        if let Some(shaders_version) = get_gl_string(&gl, gl::SHADING_LANGUAGE_VERSION) {
            tracing::info!("Shaders version on {}", shaders_version.to_string_lossy());
        }

        unsafe {
            gl.Enable(gl::DEPTH_TEST);
            gl.Enable(gl::CULL_FACE);
            gl.CullFace(gl::BACK);
        }

        let skybox = match Skybox::new(&gl, settings) {
            Ok(skybox) => Some(skybox),
            Err(err) => {
                tracing::warn!("Skybox disabled: {err}");
                None
            }
        };

        let items = objects
            .iter()
            .filter_map(|object| match load_item(&gl, settings, object) {
                Ok(item) => Some(item),
                Err(err) => {
                    tracing::warn!("Skipping {}: {err}", object.name);
                    None
                }
            })
            .collect::<Vec<_>>();

        tracing::info!("{} of {} objects ready", items.len(), objects.len());

        Self {
            items,
            skybox,
            clear_color: settings.clear_color,
            gl,
        }
    }

    pub fn draw(&self, scene: &Scene) {
        let [red, green, blue, alpha] = self.clear_color;
        unsafe {
            self.gl.ClearColor(red, green, blue, alpha);
            self.gl.Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        }

        let frame = FrameUniforms {
            projection: scene.camera.projection_matrix(),
            view: scene.camera.view_matrix(),
            view_pos: scene.camera.position,
            blinn: scene.input.blinn,
        };

        let mut sink = GlSink(&self.gl);
        for item in &self.items {
            item.program.use_program(&self.gl);
            bind_camera_and_lights(&mut sink, &item.uniforms, &frame, &scene.lights, item.point_lit);
            item.model.draw(&self.gl, item.uniforms.model, &item.model_matrix);
        }

        if let Some(skybox) = &self.skybox {
            skybox.draw(&self.gl, &frame.view, &frame.projection);
        }
    }

    pub fn resize(&self, width: i32, height: i32) {
        unsafe {
            self.gl.Viewport(0, 0, width, height);
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        for item in &self.items {
            tracing::debug!("Releasing {}", item.name);
            item.program.delete(&self.gl);
            item.model.delete(&self.gl);
        }
        if let Some(skybox) = &self.skybox {
            skybox.delete(&self.gl);
        }
    }
}

fn load_item(
    gl: &gl::Gl,
    settings: &Settings,
    object: &SceneObject,
) -> Result<DrawItem, crate::error::AssetError> {
    let program = Program::from_files(
        gl,
        &settings.resource(object.vertex_shader),
        &settings.resource(object.fragment_shader),
    )?;

    let model = match Model::load(gl, &settings.resource(object.model)) {
        Ok(model) => model,
        Err(err) => {
            program.delete(gl);
            return Err(err);
        }
    };

    program.use_program(gl);
    shader::set_int(
        gl,
        program.location(gl, "material.texture_diffuse1"),
        DIFFUSE_UNIT as i32,
    );
    shader::set_int(
        gl,
        program.location(gl, "material.texture_specular1"),
        SPECULAR_UNIT as i32,
    );
    let uniforms = ProgramUniforms::resolve(gl, &program);

    Ok(DrawItem {
        name: object.name,
        program,
        uniforms,
        model,
        model_matrix: object.transform.model_matrix(),
        point_lit: object.point_lit,
    })
}

fn get_gl_string(gl: &gl::Gl, variant: gl::types::GLenum) -> Option<&'static CStr> {
    unsafe {
        let s = gl.GetString(variant);
        (!s.is_null()).then(|| CStr::from_ptr(s.cast()))
    }
}
