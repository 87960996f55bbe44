//! Camera for ray generation.

use crate::random::unit_f32;
use lumen_math::{Ray, Vec3};
use rand::RngCore;

/// Eye position of the benchmark view.
pub const EYE: Vec3 = Vec3::new(-22.0, 5.0, 25.0);

/// Point the benchmark view looks at.
pub const LOOK_AT: Vec3 = Vec3::new(-3.0, 4.0, 0.0);

/// Pinhole camera with a fixed basis.
///
/// `left` is pre-scaled by `1 / image_width` so pixel offsets can be used
/// directly; `up` inherits that scale through the cross product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    position: Vec3,
    goal: Vec3,
    left: Vec3,
    up: Vec3,
}

impl Camera {
    /// Camera for the benchmark view at the given resolution.
    pub fn new(image_width: u32, image_height: u32) -> Self {
        Self::looking_at(EYE, LOOK_AT, image_width, image_height)
    }

    /// Camera at `position` looking toward `target`.
    pub fn looking_at(position: Vec3, target: Vec3, image_width: u32, image_height: u32) -> Self {
        let goal = (target - position).normalize();
        let left = Vec3::new(goal.z, 0.0, -goal.x).normalize() * (1.0 / image_width as f32);
        let up = goal.cross(left);

        Self {
            image_width,
            image_height,
            position,
            goal,
            left,
            up,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn goal(&self) -> Vec3 {
        self.goal
    }

    pub fn left(&self) -> Vec3 {
        self.left
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Generate a jittered ray through pixel (x, y).
    ///
    /// Pixels are measured from the image center with integer halving, so
    /// (width / 2, height / 2) looks straight down `goal`. Indices below the
    /// center wrap around in 32 bits, as the benchmark always has. Draws the
    /// horizontal jitter before the vertical one.
    pub fn get_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let dx = pixel_offset(x, self.image_width) + unit_f32(rng);
        let dy = pixel_offset(y, self.image_height) + unit_f32(rng);

        let direction = (self.goal + self.left * dx + self.up * dy).normalize();
        Ray::new(self.position, direction)
    }
}

/// Offset of a pixel index from the image center, in wrapping `u32`.
#[inline]
fn pixel_offset(index: u32, extent: u32) -> f32 {
    index.wrapping_sub(extent / 2) as f32
}
