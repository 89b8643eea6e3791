//! Orbital camera.
//!
//! The camera orbits a target point. Its eye position is derived from
//! spherical coordinates (degrees):
//!
//! ```text
//! eye = target + distance * (cos(pitch) cos(yaw), sin(pitch), cos(pitch) sin(yaw))
//! ```
//!
//! The renderer reads [`CameraController`] each frame to build its view
//! matrix; picking uses [`CameraController::picking_ray`] to turn a pointer
//! position into a world-space [`Ray`].

use crate::math::{Mat4, Ray, Vec2, Vec3};

/// Orbital camera state. Lives on the camera singleton entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraController {
    pub target: Vec3,
    pub distance: f32,
    /// Elevation in degrees, kept within ±89.
    pub pitch: f32,
    /// Azimuth in degrees.
    pub yaw: f32,
    /// Degrees of orbit per pixel of pointer motion.
    pub rotation_speed: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 20.0,
            pitch: 30.0,
            yaw: 45.0,
            rotation_speed: 0.5,
        }
    }
}

impl CameraController {
    /// World-space eye position.
    pub fn position(&self) -> Vec3 {
        let pitch = self.pitch.to_radians();
        let yaw = self.yaw.to_radians();
        self.target
            + self.distance
                * Vec3::new(pitch.cos() * yaw.cos(), pitch.sin(), pitch.cos() * yaw.sin())
    }

    /// Right-handed view matrix looking from the eye at the target, +Y up.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Perspective projection for the given vertical field of view.
    pub fn projection_matrix(fov_y_degrees: f32, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect_ratio, 0.1, 1000.0)
    }

    /// Unit vectors (forward, right, up) of the camera basis.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target - self.position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        (forward, right, up)
    }

    /// Build a picking ray through a pointer position.
    ///
    /// `screen` is normalized: (0, 0) is the top-left corner of the viewport,
    /// (1, 1) the bottom-right.
    pub fn picking_ray(&self, screen: Vec2, fov_y_degrees: f32, aspect_ratio: f32) -> Ray {
        let ndc_x = screen.x * 2.0 - 1.0;
        let ndc_y = 1.0 - screen.y * 2.0;
        let half_height = (fov_y_degrees.to_radians() * 0.5).tan();
        let (forward, right, up) = self.basis();
        let direction =
            forward + right * (ndc_x * half_height * aspect_ratio) + up * (ndc_y * half_height);
        Ray::new(self.position(), direction)
    }

    /// Move the target in the view plane. `delta` is in pointer pixels.
    pub fn pan(&mut self, delta: Vec2, speed: f32) {
        let (_, right, up) = self.basis();
        self.target += right * (-delta.x * speed);
        self.target += up * (delta.y * speed);
    }

    /// Orbit around the target. `delta` is in pointer pixels.
    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw += delta.x * self.rotation_speed;
        self.pitch = (self.pitch - delta.y * self.rotation_speed).clamp(-89.0, 89.0);
    }

    /// Move toward (positive `wheel`) or away from the target.
    pub fn zoom(&mut self, wheel: f32, step: f32, min: f32, max: f32) {
        self.distance = (self.distance - wheel * step).clamp(min, max);
    }
}
