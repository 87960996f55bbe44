//! Path tracing and image accumulation.
//!
//! Implements a fixed-budget Monte Carlo path tracer with:
//! - Mirror bounces off letters
//! - Cosine-weighted diffuse bounces off walls, with a shadow ray to the sun
//! - Emission when a path reaches the sun
//!
//! The image is accumulated with countdown loops over rows, columns and
//! samples, and folded into the channel sum of the last pixel.

use crate::material::{cosine_hemisphere, mirror_direction};
use crate::march::march;
use crate::{
    Camera, Color, DistanceField, LetterRoom, MarsagliaRng, Material, BOUNCE_ATTENUATION,
    SUN_DIRECT, SUN_EMISSION,
};
use lumen_math::{Ray, Vec3};
use rand::RngCore;
use serde::Serialize;
use thiserror::Error;

/// Bounces traced per camera sample.
pub const MAX_BOUNCES: u32 = 3;

/// Offset applied to a bounce origin along the new direction.
pub const BOUNCE_OFFSET: f32 = 0.1;

/// Constant added to the per-sample weight before tone mapping.
pub const EXPOSURE_BIAS: f32 = 14.0 / 241.0;

/// Errors from render configuration.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("image width must be at least 1 pixel")]
    ZeroWidth,

    #[error("image height must be at least 1 pixel")]
    ZeroHeight,

    #[error("samples per pixel must be at least 1")]
    ZeroSamples,
}

/// Render configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Camera samples accumulated per pixel
    pub samples_per_pixel: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 90,
            height: 60,
            samples_per_pixel: 4,
        }
    }
}

impl RenderConfig {
    /// Create a validated configuration.
    pub fn new(width: u32, height: u32, samples_per_pixel: u32) -> Result<Self, ConfigError> {
        let config = Self {
            width,
            height,
            samples_per_pixel,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every dimension is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        Ok(())
    }

    /// Weight applied to a pixel's summed samples: `1/samples + 14/241`.
    ///
    /// Not a plain average. Zero samples gives an infinite weight.
    pub fn sample_weight(&self) -> f32 {
        (1.0 / self.samples_per_pixel as f32) + EXPOSURE_BIAS
    }
}

/// Direction toward the sun used for shadow rays.
#[inline]
pub fn light_direction() -> Vec3 {
    Vec3::new(0.6, 0.6, 1.0).normalize()
}

/// Whether a path keeps bouncing after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounce {
    Continue,
    Terminated,
}

/// State threaded through the bounce loop of one camera sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathState {
    /// Ray for the next march.
    pub ray: Ray,
    /// Light gathered so far.
    pub color: Color,
    /// Energy kept after the bounces so far.
    pub attenuation: Color,
    light: Vec3,
}

impl PathState {
    /// Fresh state for a camera ray.
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            color: Color::ONE,
            attenuation: Color::ONE,
            light: light_direction(),
        }
    }

    /// March the current ray and apply the surface rule it lands on.
    pub fn bounce(&mut self, field: &dyn DistanceField, rng: &mut dyn RngCore) -> Bounce {
        let result = march(field, &self.ray);
        let Some(hit) = result.surface().copied() else {
            return Bounce::Continue;
        };

        match hit.material {
            Material::None => Bounce::Continue,

            Material::Letter => {
                let direction = mirror_direction(self.ray.direction, hit.normal);
                self.ray = Ray::new(hit.position + direction * BOUNCE_OFFSET, direction);
                self.attenuation *= BOUNCE_ATTENUATION;
                Bounce::Continue
            }

            Material::Wall => {
                let incidence = hit.normal.dot(self.light);
                let direction = cosine_hemisphere(hit.normal, rng);
                self.ray = Ray::new(hit.position + direction * BOUNCE_OFFSET, direction);
                self.attenuation *= BOUNCE_ATTENUATION;

                if incidence > 0.0 {
                    let shadow = Ray::new(hit.position + hit.normal * BOUNCE_OFFSET, self.light);
                    if march(field, &shadow).material().is_emissive() {
                        self.color += (self.color + self.attenuation) * SUN_DIRECT * incidence;
                    }
                }
                Bounce::Continue
            }

            Material::Sun => {
                self.color += (self.color + self.attenuation) * SUN_EMISSION;
                Bounce::Terminated
            }
        }
    }
}

/// Compute the color carried back by a camera ray.
pub fn trace(field: &dyn DistanceField, ray: Ray, rng: &mut dyn RngCore) -> Color {
    let mut state = PathState::new(ray);

    for _ in 0..MAX_BOUNCES {
        if state.bounce(field, rng) == Bounce::Terminated {
            break;
        }
    }

    state.color
}

/// Scale summed samples and compress them into [0, 255].
#[inline]
pub fn tone_map(sum: Color, weight: f32) -> Color {
    let color = sum * weight;
    color / (color + 1.0) * 255.0
}

/// Render a single pixel: add its samples onto `carry`, then tone map.
///
/// `x` and `y` are the accumulator's countdown indices, starting at 1.
/// `carry` is the previous tone-mapped pixel; the accumulator is never
/// cleared between pixels, so each pixel inherits its predecessor.
pub fn render_pixel(
    camera: &Camera,
    field: &dyn DistanceField,
    x: u32,
    y: u32,
    config: &RenderConfig,
    carry: Color,
    rng: &mut dyn RngCore,
) -> Color {
    let mut sum = carry;

    for _ in 0..config.samples_per_pixel {
        let ray = camera.get_ray(x, y, rng);
        sum += trace(field, ray, rng);
    }

    tone_map(sum, config.sample_weight())
}

/// Walk every pixel in countdown order, handing each result to `sink`.
///
/// Rows run from `height` down to 1, columns from `width` down to 1.
/// Each pixel starts from the previous one's tone-mapped color. Returns
/// the last pixel produced, or black for an empty image.
fn accumulate(
    field: &dyn DistanceField,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
    mut sink: impl FnMut(u32, u32, Color),
) -> Color {
    let camera = Camera::new(config.width, config.height);
    let mut last = Color::ZERO;

    log::debug!(
        "Rendering {}x{} @ {} spp",
        config.width,
        config.height,
        config.samples_per_pixel
    );

    for y in (1..=config.height).rev() {
        log::trace!("Scanline {}", y);
        for x in (1..=config.width).rev() {
            last = render_pixel(&camera, field, x, y, config, last, rng);
            sink(x, y, last);
        }
    }

    log::debug!("Render finished, last pixel {:?}", last);
    last
}

/// Render `field` with `rng` and return the channel sum of the last pixel.
///
/// The generator is used as given; callers wanting the fixed-seed stream
/// pass a freshly seeded [`MarsagliaRng`].
pub fn render_with(
    field: &dyn DistanceField,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> f32 {
    let last = accumulate(field, config, rng, |_, _, _| {});
    last.x + last.y + last.z
}

/// Render the benchmark scene and return the channel sum of the last pixel.
///
/// Reseeds the generator on every call, so equal arguments always give
/// bit-identical results. Zero samples yields NaN.
pub fn render(width: u32, height: u32, samples_per_pixel: u32) -> f32 {
    let config = RenderConfig {
        width,
        height,
        samples_per_pixel,
    };
    let mut rng = MarsagliaRng::seeded();
    render_with(&LetterRoom::new(), &config, &mut rng)
}

/// Tone-mapped image kept in memory.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width as usize) * (height as usize)],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }
}

/// Render the benchmark scene and keep every pixel.
///
/// Uses the same draw order as [`render`]; pixel (x, y) holds the
/// accumulator's countdown pixel (x + 1, y + 1), so `get(0, 0)` is the
/// last pixel rendered.
pub fn render_image(config: &RenderConfig) -> ImageBuffer {
    let mut image = ImageBuffer::new(config.width, config.height);
    let mut rng = MarsagliaRng::seeded();

    accumulate(&LetterRoom::new(), config, &mut rng, |x, y, color| {
        image.set(x - 1, y - 1, color)
    });

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sample;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Wall slab between y = -1 and y = 1 with no sun.
    struct Corridor;

    impl DistanceField for Corridor {
        fn sample(&self, position: Vec3) -> Sample {
            Sample::new(1.0 - position.y.abs(), Material::Wall)
        }
    }

    /// Mirror floor at y = 0, open above.
    struct MirrorFloor;

    impl DistanceField for MirrorFloor {
        fn sample(&self, position: Vec3) -> Sample {
            Sample::new(position.y, Material::Letter)
        }
    }

    /// Emissive ceiling at y = 5.
    struct Skylight;

    impl DistanceField for Skylight {
        fn sample(&self, position: Vec3) -> Sample {
            Sample::new(5.0 - position.y, Material::Sun)
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(RenderConfig::new(90, 60, 4).is_ok());
        assert_eq!(RenderConfig::new(0, 60, 4), Err(ConfigError::ZeroWidth));
        assert_eq!(RenderConfig::new(90, 0, 4), Err(ConfigError::ZeroHeight));
        assert_eq!(RenderConfig::new(90, 60, 0), Err(ConfigError::ZeroSamples));
        assert_eq!(RenderConfig::default(), RenderConfig::new(90, 60, 4).unwrap());
    }

    #[test]
    fn test_sample_weight_keeps_bias() {
        let config = RenderConfig::new(1, 1, 4).unwrap();
        assert_eq!(config.sample_weight(), 0.25 + 14.0 / 241.0);
    }

    #[test]
    fn test_tone_map_bounds() {
        assert_eq!(tone_map(Color::ZERO, 1.0), Color::ZERO);
        assert_eq!(tone_map(Color::ONE, 1.0), Color::splat(127.5));

        let bright = tone_map(Color::splat(1e6), 1.0);
        assert!(bright.max_element() < 255.0);
    }

    #[test]
    fn test_sun_terminates_path() {
        let mut state = PathState::new(Ray::new(Vec3::ZERO, Vec3::Y));
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(state.bounce(&Skylight, &mut rng), Bounce::Terminated);
        assert_eq!(state.color, Color::ONE + Color::splat(2.0) * SUN_EMISSION);
        assert_eq!(state.attenuation, Color::ONE);

        let color = trace(&Skylight, Ray::new(Vec3::ZERO, Vec3::Y), &mut rng);
        assert_eq!(color, Color::new(101.0, 161.0, 201.0));
    }

    #[test]
    fn test_letter_bounce_mirrors_and_attenuates() {
        let incoming = Vec3::new(1.0, -1.0, 0.0).normalize();
        let mut state = PathState::new(Ray::new(Vec3::new(0.0, 5.0, 0.0), incoming));
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(state.bounce(&MirrorFloor, &mut rng), Bounce::Continue);
        assert_eq!(state.attenuation, Color::splat(BOUNCE_ATTENUATION));
        assert_eq!(state.color, Color::ONE);
        assert!(state.ray.direction.y > 0.0);
        assert!(state.ray.origin.y > 0.0);

        // Next march escapes upward, which changes nothing
        let before = state;
        assert_eq!(state.bounce(&MirrorFloor, &mut rng), Bounce::Continue);
        assert_eq!(state, before);
    }

    #[test]
    fn test_attenuation_scales_each_bounce() {
        let direction = Vec3::new(0.3, 1.0, 0.2).normalize();
        let mut state = PathState::new(Ray::new(Vec3::ZERO, direction));
        let mut rng = MarsagliaRng::seeded();

        let mut expected = Color::ONE;
        for _ in 0..MAX_BOUNCES {
            let previous = state.attenuation;
            assert_eq!(state.bounce(&Corridor, &mut rng), Bounce::Continue);

            expected *= BOUNCE_ATTENUATION;
            assert_eq!(state.attenuation, previous * BOUNCE_ATTENUATION);
            assert!(state.attenuation.cmple(previous).all());
            assert!(state.attenuation.cmpge(Color::ZERO).all());
        }

        assert_eq!(state.attenuation, expected);
        assert!((state.attenuation.x - 0.2_f32.powi(3)).abs() < 1e-6);
        // No sun in the corridor, so nothing was gathered
        assert_eq!(state.color, Color::ONE);
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = render(12, 8, 2);
        let b = render(12, 8, 2);

        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_render_minimal_matches_golden() {
        let value = render(1, 1, 1);
        assert!(value.is_finite());
        assert!((value - 393.2964).abs() < 1e-2, "value {}", value);
    }

    #[test]
    fn test_render_benchmark_size_matches_golden() {
        let value = render(90, 60, 4);
        assert!(value.is_finite());
        assert!((value - 755.4149).abs() < 1e-2, "value {}", value);
    }

    #[test]
    fn test_pixel_sum_starts_from_carry() {
        // Every camera ray starts on the skylight, so each sample is constant
        let camera = Camera::new(4, 4);
        let config = RenderConfig::new(4, 4, 1).unwrap();
        let sample = Color::new(101.0, 161.0, 201.0);
        let carry = Color::splat(10.0);

        let mut rng = MarsagliaRng::seeded();
        let fresh = render_pixel(&camera, &Skylight, 1, 1, &config, Color::ZERO, &mut rng);
        assert_eq!(fresh, tone_map(sample, config.sample_weight()));

        let mut rng = MarsagliaRng::seeded();
        let carried = render_pixel(&camera, &Skylight, 1, 1, &config, carry, &mut rng);
        assert_eq!(carried, tone_map(carry + sample, config.sample_weight()));
        assert!(carried.cmpgt(fresh).all());
    }

    #[test]
    fn test_empty_image_is_black() {
        assert_eq!(render(0, 4, 1), 0.0);
        assert_eq!(render(4, 0, 1), 0.0);
    }

    #[test]
    fn test_image_matches_scalar() {
        let config = RenderConfig::new(6, 4, 2).unwrap();
        let image = render_image(&config);

        assert_eq!(image.pixels.len(), 24);
        let last = image.get(0, 0);
        let scalar = render(6, 4, 2);
        assert_eq!((last.x + last.y + last.z).to_bits(), scalar.to_bits());

        for pixel in &image.pixels {
            assert!(pixel.is_finite());
            assert!(pixel.min_element() >= 0.0 && pixel.max_element() <= 255.0);
        }
    }

    #[test]
    fn test_render_with_consumes_given_rng() {
        let config = RenderConfig::new(2, 2, 1).unwrap();
        let mut rng = MarsagliaRng::seeded();
        let value = render_with(&LetterRoom::new(), &config, &mut rng);

        assert_eq!(value.to_bits(), render(2, 2, 1).to_bits());
        assert_ne!(rng, MarsagliaRng::seeded());
    }
}
