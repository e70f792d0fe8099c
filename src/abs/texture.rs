//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which is a CPU representation of a GPU texture.

use std::{path::Path, sync::Arc};

use glow::HasContext;
use image::{DynamicImage, GenericImageView};

use crate::error::{Error, Result};

/// Represents a texture stored on the GPU side.
///
/// Pixels are always uploaded as RGBA8 with linear filtering, repeat wrapping
/// on both axes and a generated mipmap chain.
pub struct Texture {
    gl: Arc<glow::Context>,
    id: glow::Texture,
    width: u32,
    height: u32,
}

impl Texture {
    /// Loads the image at `path` and uploads it, leaving it bound on `unit`.
    ///
    /// The image is flipped vertically so its first row ends up at `v = 0`.
    pub fn from_path(gl: &Arc<glow::Context>, path: impl AsRef<Path>, unit: u32) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = image::load_from_memory(&bytes).map_err(|source| Error::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let texture = Self::upload(gl, &image.flipv(), unit)?;
        log::info!(
            "loaded texture {} ({}x{}) on unit {unit}",
            path.display(),
            texture.width(),
            texture.height()
        );
        Ok(texture)
    }

    fn upload(gl: &Arc<glow::Context>, image: &DynamicImage, unit: u32) -> Result<Self> {
        let (width, height) = image.dimensions();
        let data = image.to_rgba8().into_raw();
        Self::new_from_data(gl, width, height, &data, unit)
    }

    /// Creates a new texture from the given raw RGBA data, leaving it bound on `unit`.
    ///
    /// `data` must hold exactly `width * height * 4` bytes.
    pub fn new_from_data(
        gl: &Arc<glow::Context>,
        width: u32,
        height: u32,
        data: &[u8],
        unit: u32,
    ) -> Result<Self> {
        check_rgba_len(width, height, data.len())?;
        unsafe {
            let texture = gl.create_texture().map_err(Error::Gl)?;
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(data)),
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.generate_mipmap(glow::TEXTURE_2D);

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
                width,
                height,
            })
        }
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
        }
    }
}

/// Checks that `len` bytes is exactly one RGBA8 image of `width` x `height`.
fn check_rgba_len(width: u32, height: u32, len: usize) -> Result<()> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4));
    match expected {
        Some(expected) if expected == len => Ok(()),
        expected => Err(Error::InvalidTexture {
            width,
            height,
            expected: expected.unwrap_or(usize::MAX),
            actual: len,
        }),
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_len_matches() {
        assert!(check_rgba_len(2, 3, 24).is_ok());
        assert!(check_rgba_len(0, 0, 0).is_ok());
    }

    #[test]
    fn test_short_rgba_data_is_rejected() {
        match check_rgba_len(128, 128, 128 * 128 * 3) {
            Err(Error::InvalidTexture {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 128 * 128 * 4);
                assert_eq!(actual, 128 * 128 * 3);
            }
            other => panic!("expected InvalidTexture, got {other:?}"),
        }
    }

    #[test]
    fn test_long_rgba_data_is_rejected() {
        assert!(matches!(
            check_rgba_len(1, 1, 5),
            Err(Error::InvalidTexture { .. })
        ));
    }
}
