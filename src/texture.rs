use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::AssetError;
use crate::renderer::gl;

/// Tightly packed 8-bit pixels ready for `glTexImage2D`.
pub struct Pixels<'a> {
    pub width: u32,
    pub height: u32,
    pub format: gl::types::GLenum,
    pub data: &'a [u8],
}

fn decode(path: &Path) -> Result<DynamicImage, AssetError> {
    image::open(path).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })
}

/// Repeating, mipmapped 2D texture.
pub fn upload_2d(gl: &gl::Gl, pixels: &Pixels) -> gl::types::GLuint {
    unsafe {
        let mut texture = 0;
        gl.GenTextures(1, &mut texture);
        gl.BindTexture(gl::TEXTURE_2D, texture);
        gl.PixelStorei(gl::UNPACK_ALIGNMENT, 1);
        gl.TexImage2D(
            gl::TEXTURE_2D,
            0,
            pixels.format as gl::types::GLint,
            pixels.width as gl::types::GLsizei,
            pixels.height as gl::types::GLsizei,
            0,
            pixels.format,
            gl::UNSIGNED_BYTE,
            pixels.data.as_ptr().cast(),
        );
        gl.GenerateMipmap(gl::TEXTURE_2D);

        gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::REPEAT as i32);
        gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::REPEAT as i32);
        gl.TexParameteri(
            gl::TEXTURE_2D,
            gl::TEXTURE_MIN_FILTER,
            gl::LINEAR_MIPMAP_LINEAR as i32,
        );
        gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
        texture
    }
}

/// Builds a cubemap from faces ordered +X, -X, +Y, -Y, +Z, -Z.
///
/// A face that fails to load is logged and left empty; the texture is still
/// returned.
pub fn load_cubemap(gl: &gl::Gl, faces: &[PathBuf; 6]) -> gl::types::GLuint {
    unsafe {
        let mut texture = 0;
        gl.GenTextures(1, &mut texture);
        gl.BindTexture(gl::TEXTURE_CUBE_MAP, texture);
        gl.PixelStorei(gl::UNPACK_ALIGNMENT, 1);

        for (i, face) in faces.iter().enumerate() {
            let image = match decode(face) {
                Ok(image) => image.to_rgb8(),
                Err(err) => {
                    tracing::warn!("Cubemap face failed to load: {err}");
                    continue;
                }
            };
            gl.TexImage2D(
                gl::TEXTURE_CUBE_MAP_POSITIVE_X + i as gl::types::GLenum,
                0,
                gl::RGB as gl::types::GLint,
                image.width() as gl::types::GLsizei,
                image.height() as gl::types::GLsizei,
                0,
                gl::RGB,
                gl::UNSIGNED_BYTE,
                image.as_raw().as_ptr().cast(),
            );
        }

        gl.TexParameteri(gl::TEXTURE_CUBE_MAP, gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32);
        gl.TexParameteri(gl::TEXTURE_CUBE_MAP, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
        gl.TexParameteri(gl::TEXTURE_CUBE_MAP, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
        gl.TexParameteri(gl::TEXTURE_CUBE_MAP, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
        gl.TexParameteri(gl::TEXTURE_CUBE_MAP, gl::TEXTURE_WRAP_R, gl::CLAMP_TO_EDGE as i32);
        texture
    }
}
