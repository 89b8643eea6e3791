//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. [`Ray`] and [`ray_sphere`] back the picking
//! subsystem; [`Color`] tints text labels.

use serde::{Deserialize, Serialize};

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// An RGBA color with components in 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const RED: Self = Self::rgb(0.9, 0.16, 0.22);
    pub const GREEN: Self = Self::rgb(0.0, 0.89, 0.19);
    pub const BLUE: Self = Self::rgb(0.0, 0.47, 0.95);
    pub const YELLOW: Self = Self::rgb(0.99, 0.98, 0.0);
    pub const GRAY: Self = Self::rgb(0.51, 0.51, 0.51);
    pub const PURPLE: Self = Self::rgb(0.78, 0.48, 1.0);

    /// Create a color from RGB (alpha = 1).
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGBA.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A half-line in world space. `direction` is kept normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray, normalizing the direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Intersect a ray with a sphere.
///
/// Returns the smallest strictly positive distance along the ray, or `None`
/// when the sphere is missed or lies entirely behind the origin. A ray that
/// starts inside the sphere reports the exit point.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    if radius <= 0.0 || ray.direction == Vec3::ZERO {
        return None;
    }
    let oc = ray.origin - center;
    // direction is unit length, so the quadratic's `a` term is 1.
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let near = -b - sqrt_d;
    if near > 0.0 {
        return Some(near);
    }
    let far = -b + sqrt_d;
    (far > 0.0).then_some(far)
}

/// Largest axis scale encoded in a matrix. Used to scale bounding radii.
pub fn max_axis_scale(matrix: &Mat4) -> f32 {
    let x = matrix.x_axis.truncate().length();
    let y = matrix.y_axis.truncate().length();
    let z = matrix.z_axis.truncate().length();
    x.max(y).max(z)
}
