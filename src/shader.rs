use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::ptr::null_mut;

use crate::error::AssetError;
use crate::renderer::gl;

/// A linked vertex + fragment program.
#[derive(Debug)]
pub struct Program {
    pub id: gl::types::GLuint,
}

impl Program {
    pub fn from_files(gl: &gl::Gl, vertex: &Path, fragment: &Path) -> Result<Self, AssetError> {
        let vertex_source = read_source(vertex)?;
        let fragment_source = read_source(fragment)?;

        unsafe {
            let vertex_shader = compile(gl, gl::VERTEX_SHADER, &vertex_source, vertex)?;
            let fragment_shader =
                match compile(gl, gl::FRAGMENT_SHADER, &fragment_source, fragment) {
                    Ok(shader) => shader,
                    Err(err) => {
                        gl.DeleteShader(vertex_shader);
                        return Err(err);
                    }
                };

            let program = gl.CreateProgram();
            gl.AttachShader(program, vertex_shader);
            gl.AttachShader(program, fragment_shader);
            gl.LinkProgram(program);

            gl.DeleteShader(vertex_shader);
            gl.DeleteShader(fragment_shader);

            let mut success = 1;
            gl.GetProgramiv(program, gl::LINK_STATUS, &mut success);
            if success == 0 {
                let mut len = 0;
                gl.GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
                let mut buffer = vec![0u8; len.max(1) as usize];
                gl.GetProgramInfoLog(program, len, null_mut(), buffer.as_mut_ptr().cast());
                gl.DeleteProgram(program);
                return Err(AssetError::Link {
                    log: log_to_string(buffer),
                });
            }

            tracing::debug!(
                "Linked program {program} from {} + {}",
                vertex.display(),
                fragment.display()
            );

            Ok(Self { id: program })
        }
    }

    pub fn use_program(&self, gl: &gl::Gl) {
        unsafe { gl.UseProgram(self.id) }
    }

    /// -1 when the program has no active uniform of that name; setters ignore it.
    pub fn location(&self, gl: &gl::Gl, name: &str) -> gl::types::GLint {
        let Ok(name) = CString::new(name) else {
            return -1;
        };
        unsafe { gl.GetUniformLocation(self.id, name.as_ptr()) }
    }

    pub fn delete(&self, gl: &gl::Gl) {
        unsafe { gl.DeleteProgram(self.id) }
    }
}

// Uniform setters act on the currently bound program.

pub fn set_int(gl: &gl::Gl, location: gl::types::GLint, value: i32) {
    unsafe { gl.Uniform1i(location, value) }
}

pub fn set_float(gl: &gl::Gl, location: gl::types::GLint, value: f32) {
    unsafe { gl.Uniform1f(location, value) }
}

pub fn set_vec3(gl: &gl::Gl, location: gl::types::GLint, value: glm::Vec3) {
    unsafe { gl.Uniform3f(location, value.x, value.y, value.z) }
}

pub fn set_mat4(gl: &gl::Gl, location: gl::types::GLint, value: &glm::Mat4) {
    unsafe {
        gl.UniformMatrix4fv(
            location,
            1,
            gl::FALSE,
            (value as *const glm::Mat4).cast::<f32>(),
        )
    }
}

fn read_source(path: &Path) -> Result<CString, AssetError> {
    let source = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    CString::new(source).map_err(|_| AssetError::Compile {
        path: path.to_path_buf(),
        log: "interior NUL byte in shader source".to_owned(),
    })
}

unsafe fn compile(
    gl: &gl::Gl,
    kind: gl::types::GLenum,
    source: &CString,
    path: &Path,
) -> Result<gl::types::GLuint, AssetError> {
    let shader = gl.CreateShader(kind);
    gl.ShaderSource(shader, 1, [source.as_ptr()].as_ptr(), std::ptr::null());
    gl.CompileShader(shader);

    let mut success = 1;
    gl.GetShaderiv(shader, gl::COMPILE_STATUS, &mut success);

    if success == 0 {
        let mut len = 0;
        gl.GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);

        let mut buffer = vec![0u8; len.max(1) as usize];
        gl.GetShaderInfoLog(shader, len, null_mut(), buffer.as_mut_ptr().cast());
        gl.DeleteShader(shader);

        return Err(AssetError::Compile {
            path: PathBuf::from(path),
            log: log_to_string(buffer),
        });
    }

    Ok(shader)
}

fn log_to_string(mut buffer: Vec<u8>) -> String {
    if let Some(nul) = buffer.iter().position(|&b| b == 0) {
        buffer.truncate(nul);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
