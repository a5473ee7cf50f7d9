use std::path::PathBuf;

use crate::error::AssetError;
use crate::renderer::gl;
use crate::settings::Settings;
use crate::shader::{self, Program};
use crate::texture;
use crate::transform::strip_translation;

/// Face files in `+X, -X, +Y, -Y, +Z, -Z` order.
pub const FACES: [&str; 6] = [
    "textures/skybox/right.tga",
    "textures/skybox/left.tga",
    "textures/skybox/top.jpg",
    "textures/skybox/bottom.jpg",
    "textures/skybox/front.tga",
    "textures/skybox/back.tga",
];

pub struct Skybox {
    program: Program,
    view: gl::types::GLint,
    projection: gl::types::GLint,
    vao: gl::types::GLuint,
    vbo: gl::types::GLuint,
    cubemap: gl::types::GLuint,
}

impl Skybox {
    pub fn new(gl: &gl::Gl, settings: &Settings) -> Result<Self, AssetError> {
        let program = Program::from_files(
            gl,
            &settings.resource("shaders/skybox.vs"),
            &settings.resource("shaders/skybox.fs"),
        )?;
        program.use_program(gl);
        shader::set_int(gl, program.location(gl, "skybox"), 0);
        let view = program.location(gl, "view");
        let projection = program.location(gl, "projection");

        let faces: [PathBuf; 6] = FACES.map(|face| settings.resource(face));
        let cubemap = texture::load_cubemap(gl, &faces);

        unsafe {
            let mut vao = 0;
            gl.GenVertexArrays(1, &mut vao);
            let mut vbo = 0;
            gl.GenBuffers(1, &mut vbo);

            gl.BindVertexArray(vao);
            gl.BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl.BufferData(
                gl::ARRAY_BUFFER,
                std::mem::size_of_val(&SKYBOX_VERTICES) as gl::types::GLsizeiptr,
                SKYBOX_VERTICES.as_ptr().cast(),
                gl::STATIC_DRAW,
            );
            gl.EnableVertexAttribArray(0);
            gl.VertexAttribPointer(
                0,
                3,
                gl::FLOAT,
                gl::FALSE,
                (3 * std::mem::size_of::<f32>()) as gl::types::GLsizei,
                std::ptr::null(),
            );
            gl.BindVertexArray(0);

            Ok(Self {
                program,
                view,
                projection,
                vao,
                vbo,
                cubemap,
            })
        }
    }

    /// Drawn last. The cube sits at maximum depth, so the test is relaxed to
    /// `LEQUAL` for this pass and the view keeps its rotation only. The cube is
    /// seen from inside, so culling is off while it draws.
    pub fn draw(&self, gl: &gl::Gl, view: &glm::Mat4, projection: &glm::Mat4) {
        unsafe {
            gl.DepthFunc(gl::LEQUAL);
            gl.Disable(gl::CULL_FACE);
        }

        self.program.use_program(gl);
        shader::set_mat4(gl, self.view, &strip_translation(view));
        shader::set_mat4(gl, self.projection, projection);

        unsafe {
            gl.BindVertexArray(self.vao);
            gl.ActiveTexture(gl::TEXTURE0);
            gl.BindTexture(gl::TEXTURE_CUBE_MAP, self.cubemap);
            gl.DrawArrays(gl::TRIANGLES, 0, 36);
            gl.BindVertexArray(0);
            gl.Enable(gl::CULL_FACE);
            gl.DepthFunc(gl::LESS);
        }
    }

    pub fn delete(&self, gl: &gl::Gl) {
        self.program.delete(gl);
        unsafe {
            gl.DeleteVertexArrays(1, &self.vao);
            gl.DeleteBuffers(1, &self.vbo);
            gl.DeleteTextures(1, &self.cubemap);
        }
    }
}

#[rustfmt::skip]
static SKYBOX_VERTICES: [f32; 108] = [
    -1.0,  1.0, -1.0,
    -1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,
     1.0,  1.0, -1.0,
    -1.0,  1.0, -1.0,

    -1.0, -1.0,  1.0,
    -1.0, -1.0, -1.0,
    -1.0,  1.0, -1.0,
    -1.0,  1.0, -1.0,
    -1.0,  1.0,  1.0,
    -1.0, -1.0,  1.0,

     1.0, -1.0, -1.0,
     1.0, -1.0,  1.0,
     1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,
     1.0,  1.0, -1.0,
     1.0, -1.0, -1.0,

    -1.0, -1.0,  1.0,
    -1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,
     1.0, -1.0,  1.0,
    -1.0, -1.0,  1.0,

    -1.0,  1.0, -1.0,
     1.0,  1.0, -1.0,
     1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,
    -1.0,  1.0,  1.0,
    -1.0,  1.0, -1.0,

    -1.0, -1.0, -1.0,
    -1.0, -1.0,  1.0,
     1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,
    -1.0, -1.0,  1.0,
     1.0, -1.0,  1.0,
];
