use std::path::PathBuf;

/// Failure to bring a shader, texture or model from disk onto the GPU.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to load model {path}: {source}")]
    Gltf {
        path: PathBuf,
        source: gltf::Error,
    },

    #[error("failed to compile {path}:\n{log}")]
    Compile { path: PathBuf, log: String },

    #[error("failed to link program:\n{log}")]
    Link { log: String },

    #[error("model {path} has no mesh with vertex positions")]
    EmptyModel { path: PathBuf },

    #[error("unsupported pixel format {0}")]
    UnsupportedPixelFormat(String),
}
