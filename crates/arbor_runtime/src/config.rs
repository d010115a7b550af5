//! Root configuration
//!
//! A [`RootConfig`] can be built in code or read from TOML:
//!
//! ```toml
//! width = 1280
//! height = 720
//! pixel_ratio = 2.0
//!
//! [camera]
//! fov = 50
//! position = { x = 0, y = 2, z = 10 }
//! ```

use crate::error::Result;
use arbor_scene::{Camera, Vec3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Viewport size in device pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height, or 1 for a degenerate viewport
    pub fn aspect(&self) -> f32 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Default camera parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default = "default_camera_position")]
    pub position: Vec3,
}

fn default_fov() -> f32 {
    75.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

fn default_camera_position() -> Vec3 {
    Vec3::new(0.0, 0.0, 5.0)
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            position: default_camera_position(),
        }
    }
}

/// Render session configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    /// Initial viewport width
    #[serde(default = "default_width")]
    pub width: f32,
    /// Initial viewport height
    #[serde(default = "default_height")]
    pub height: f32,
    /// Device pixel ratio handed to the renderer
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f32,
}

fn default_width() -> f32 {
    800.0
}

fn default_height() -> f32 {
    600.0
}

fn default_pixel_ratio() -> f32 {
    1.0
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            width: default_width(),
            height: default_height(),
            pixel_ratio: default_pixel_ratio(),
        }
    }
}

impl RootConfig {
    /// Parse a configuration from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_fov(mut self, fov: f32) -> Self {
        self.camera.fov = fov;
        self
    }

    pub fn with_camera_position(mut self, position: Vec3) -> Self {
        self.camera.position = position;
        self
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Build the default camera for this configuration
    pub fn camera(&self) -> Camera {
        Camera::new(
            self.camera.fov,
            self.size().aspect(),
            self.camera.near,
            self.camera.far,
        )
        .with_position(self.camera.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;

    #[test]
    fn test_defaults() {
        let config = RootConfig::default();
        let camera = config.camera();
        assert_eq!(camera.fov, 75.0);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 5.0));
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_toml() {
        let config = RootConfig::from_toml_str(
            r#"
            width = 1280
            height = 720

            [camera]
            fov = 50
            position = { x = 0, y = 2, z = 10 }
            "#,
        )
        .unwrap();
        assert_eq!(config.size(), Size::new(1280.0, 720.0));
        assert_eq!(config.camera.fov, 50.0);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.camera.position, Vec3::new(0.0, 2.0, 10.0));
        assert_eq!(config.pixel_ratio, 1.0);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(RootConfig::from_toml_str("").unwrap(), RootConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = RootConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, RuntimeError::Config(_)));
    }

    #[test]
    fn test_degenerate_aspect() {
        assert_eq!(Size::new(0.0, 100.0).aspect(), 1.0);
        assert!(Size::new(0.0, 100.0).is_empty());
    }
}
