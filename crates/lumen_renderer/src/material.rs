//! Surface classification and the scattering rules attached to it.

use crate::random::unit_f32;
use lumen_math::Vec3;
use rand::RngCore;

/// Color type alias (RGB, unbounded before tone mapping)
pub type Color = Vec3;

/// Fraction of energy kept after a letter or wall bounce.
pub const BOUNCE_ATTENUATION: f32 = 0.2;

/// Light picked up when a path reaches the sun directly.
pub const SUN_EMISSION: Color = Color::new(50.0, 80.0, 100.0);

/// Light picked up by a wall point whose shadow ray reaches the sun.
pub const SUN_DIRECT: Color = Color::new(500.0, 400.0, 100.0);

/// Azimuth range for diffuse sampling, truncated from 2*pi.
#[allow(clippy::approx_constant)]
const AZIMUTH_SCALE: f32 = 6.283185;

/// Material tag returned by the scene distance field.
///
/// `None` means the ray escaped without touching geometry; the other
/// variants classify the surface a march stopped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Material {
    #[default]
    None,
    /// Extruded glyphs, treated as a mirror.
    Letter,
    /// Room shell and ceiling beams, treated as a diffuse surface.
    Wall,
    /// Emissive plane above the ceiling.
    Sun,
}

impl Material {
    /// True for the emissive surface that ends a path.
    pub fn is_emissive(self) -> bool {
        matches!(self, Material::Sun)
    }
}

/// Mirror bounce used for letters.
///
/// Scales the sum of direction and normal by `-2 * dot(normal, direction)`.
/// This is not the textbook reflection; renders depend on it exactly.
#[inline]
pub fn mirror_direction(direction: Vec3, normal: Vec3) -> Vec3 {
    (direction + normal) * (normal.dot(direction) * -2.0)
}

/// Cosine-weighted direction on the hemisphere around `normal`.
///
/// Builds the tangent frame without a cross product, from the sign of
/// `normal.z`. Consumes exactly two draws: azimuth, then elevation.
pub fn cosine_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let p = AZIMUTH_SCALE * unit_f32(rng);
    let c = unit_f32(rng);
    let s = (1.0 - c).sqrt();
    let g = if normal.z < 0.0 { -1.0 } else { 1.0 };
    let u = -1.0 / (g + normal.z);
    let v = normal.x * normal.y * u;

    let tangent = Vec3::new(v, g + normal.y * normal.y * u, -normal.y);
    let bitangent = Vec3::new(1.0 + g * normal.x * normal.x * u, g * v, -g * normal.x);

    tangent * (p.cos() * s) + bitangent * (p.sin() * s) + normal * c.sqrt()
}
