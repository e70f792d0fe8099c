//! Runtime settings.
//!
//! Every field has a default, so a settings file only needs the values it
//! overrides. The file is looked up at the path in `EON_SETTINGS`, then at
//! `settings.json` in the working directory; without either the defaults are used.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const SETTINGS_ENV: &str = "EON_SETTINGS";
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    /// Directory the asset paths below are relative to.
    pub asset_root: PathBuf,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    /// Sampled as `texture0` and `texture1`.
    pub textures: [PathBuf; 2],
    pub clear_color: [f32; 4],
    pub degrees_per_second: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "EON Native".to_string(),
            width: 800,
            height: 600,
            fullscreen: false,
            asset_root: PathBuf::from("."),
            vertex_shader: PathBuf::from("shaders/shader.vert"),
            fragment_shader: PathBuf::from("shaders/shader.frag"),
            textures: [
                PathBuf::from("textures/wall.png"),
                PathBuf::from("textures/awesomeface.png"),
            ],
            clear_color: [0.2, 0.3, 0.3, 1.0],
            degrees_per_second: 4.0,
        }
    }
}

impl Settings {
    /// Loads the settings file if there is one.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(SETTINGS_ENV) {
            Some(path) => PathBuf::from(path),
            None => {
                let path = PathBuf::from(DEFAULT_SETTINGS_FILE);
                if !path.exists() {
                    log::info!("no {DEFAULT_SETTINGS_FILE} found, using default settings");
                    return Ok(Self::default());
                }
                path
            }
        };
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&contents).map_err(|source| Error::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        log::info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidSettings(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.degrees_per_second.is_finite() {
            return Err(Error::InvalidSettings(
                "degrees_per_second must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolves an asset path against [`Settings::asset_root`].
    pub fn asset_path(&self, path: &Path) -> PathBuf {
        self.asset_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.degrees_per_second, 4.0);
    }

    #[test]
    fn test_partial_override() {
        let settings: Settings =
            serde_json::from_str(r#"{ "title": "Cube", "width": 1024, "asset_root": "assets" }"#)
                .unwrap();
        assert_eq!(settings.title, "Cube");
        assert_eq!(settings.width, 1024);
        assert_eq!(settings.height, 600);
        assert_eq!(
            settings.asset_path(&settings.vertex_shader),
            Path::new("assets/shaders/shader.vert")
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(serde_json::from_str::<Settings>(r#"{ "vsync": true }"#).is_err());
    }

    #[test]
    fn test_zero_size_is_invalid() {
        let settings = Settings {
            height: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Settings::from_path(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
