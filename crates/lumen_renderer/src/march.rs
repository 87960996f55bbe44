//! Sphere tracing through a distance field.
//!
//! A march advances along the ray by the distance the field reports, which
//! never overshoots the nearest surface. It stops on a surface, gives up
//! after a fixed number of steps, or escapes past the travel limit.

use crate::{DistanceField, Material};
use lumen_math::{Ray, Vec3};

/// Distance below which a sample counts as a surface hit.
pub const HIT_THRESHOLD: f32 = 0.01;

/// Travel distance after which a ray is considered escaped.
pub const MAX_TRAVEL: f32 = 100.0;

/// Steps without a hit after which the march stops in place.
pub const MAX_MISSED_STEPS: u32 = 99;

/// Offset used for the forward-difference normal estimate.
pub const NORMAL_EPSILON: f32 = 0.01;

/// Surface reached by a march.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Material of the final sample.
    pub material: Material,
    /// Point where the march stopped.
    pub position: Vec3,
    /// Estimated unit normal at `position`.
    pub normal: Vec3,
}

/// Outcome of marching one ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarchResult {
    /// A sample came within [`HIT_THRESHOLD`] of a surface.
    Hit(SurfaceHit),
    /// The step budget ran out; the march is treated as a hit where it stopped.
    Exhausted(SurfaceHit),
    /// The ray travelled past [`MAX_TRAVEL`].
    Miss,
}

impl MarchResult {
    /// The surface for either kind of hit.
    pub fn surface(&self) -> Option<&SurfaceHit> {
        match self {
            MarchResult::Hit(hit) | MarchResult::Exhausted(hit) => Some(hit),
            MarchResult::Miss => None,
        }
    }

    /// Material used by the tracer; `Material::None` for a miss.
    pub fn material(&self) -> Material {
        self.surface().map_or(Material::None, |hit| hit.material)
    }
}

/// March `ray` through `field`.
pub fn march(field: &dyn DistanceField, ray: &Ray) -> MarchResult {
    let mut missed = 0u32;
    let mut travelled = 0.0_f32;

    while travelled < MAX_TRAVEL {
        let position = ray.at(travelled);
        let sample = field.sample(position);

        if sample.distance < HIT_THRESHOLD {
            return MarchResult::Hit(surface_hit(
                field,
                position,
                sample.distance,
                sample.material,
            ));
        }

        missed += 1;
        if missed > MAX_MISSED_STEPS {
            return MarchResult::Exhausted(surface_hit(
                field,
                position,
                sample.distance,
                sample.material,
            ));
        }

        travelled += sample.distance;
    }

    MarchResult::Miss
}

fn surface_hit(
    field: &dyn DistanceField,
    position: Vec3,
    distance: f32,
    material: Material,
) -> SurfaceHit {
    SurfaceHit {
        material,
        position,
        normal: estimate_normal(field, position, distance),
    }
}

/// Forward-difference gradient of the field at `position`, normalized.
///
/// `distance` is the field value already known at `position`. A zero
/// gradient produces a non-finite normal.
pub fn estimate_normal(field: &dyn DistanceField, position: Vec3, distance: f32) -> Vec3 {
    Vec3::new(
        field.distance(position + Vec3::new(NORMAL_EPSILON, 0.0, 0.0)) - distance,
        field.distance(position + Vec3::new(0.0, NORMAL_EPSILON, 0.0)) - distance,
        field.distance(position + Vec3::new(0.0, 0.0, NORMAL_EPSILON)) - distance,
    )
    .normalize()
}
