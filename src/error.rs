//! Error type shared by every part of the renderer.

use std::path::PathBuf;

use crate::abs::ShaderType;

/// Everything that can go wrong while setting up or drawing the scene.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderType, log: String },
    #[error("shader program failed to link: {0}")]
    Link(String),
    #[error("texture data is {actual} bytes, a {width}x{height} RGBA image needs {expected}")]
    InvalidTexture {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("OpenGL error: {0}")]
    Gl(String),
    #[error("uniform `{0}` is not active in the shader program")]
    UnknownUniform(String),
    #[error("vertex attribute `{0}` is not active in the shader program")]
    UnknownAttribute(String),
    #[error("window system error: {0}")]
    Window(String),
    #[error("invalid settings file {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_names_stage() {
        let err = Error::Compile {
            stage: ShaderType::Fragment,
            log: "0:3: syntax error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "fragment shader failed to compile: 0:3: syntax error"
        );
    }

    #[test]
    fn test_io_error_names_path() {
        let err = Error::Io {
            path: PathBuf::from("textures/missing.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("textures/missing.png"));
    }
}
