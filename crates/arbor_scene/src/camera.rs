//! Perspective camera used for drawing and picking

use crate::math::{Ray, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective camera
///
/// The view direction is `target - position`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
    /// Zoom factor (1.0 = normal)
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(75.0, 1.0, 0.1, 1000.0).with_position(Vec3::new(0.0, 0.0, 5.0))
    }
}

impl Camera {
    /// Create a camera at the origin looking down -Z
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::UP,
            fov,
            aspect,
            near,
            far,
            zoom: 1.0,
        }
    }

    /// Move the camera, keeping its view direction
    pub fn with_position(mut self, position: Vec3) -> Self {
        let direction = self.target - self.position;
        self.position = position;
        self.target = position + direction;
        self
    }

    /// Point the camera at a world position
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Effective vertical field of view in radians (accounting for zoom)
    pub fn effective_fov(&self) -> f32 {
        let half = (self.fov.to_radians() / 2.0).tan() / self.zoom;
        2.0 * half.atan()
    }

    /// Height and width of the visible plane at `distance` from the camera
    pub fn visible_extent(&self, distance: f32) -> (f32, f32) {
        let height = 2.0 * (self.effective_fov() / 2.0).tan() * distance;
        (height * self.aspect, height)
    }

    /// Ray from the camera through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let forward = self.forward();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward);

        let half_height = (self.effective_fov() / 2.0).tan();
        let half_width = half_height * self.aspect;

        let direction =
            forward + right * (ndc.x * half_width) + up * (ndc.y * half_height);
        Ray::new(self.position, direction)
    }
}
