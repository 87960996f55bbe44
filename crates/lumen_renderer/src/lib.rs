//! Lumen Renderer - SDF Ray-Marching Path Tracer
//!
//! A Monte Carlo path tracer over a hand-built signed distance field:
//! extruded glyphs in a room lit through ceiling beams.
//!
//! Control flow, outermost first: image accumulator, path tracer (per
//! sample), ray marcher (per bounce), distance field (per step). A single
//! owned random generator feeds camera jitter and diffuse sampling.

mod random;
mod material;
mod scene;
mod march;
mod camera;
mod renderer;

pub use random::{unit_f32, MarsagliaRng, SEED_W, SEED_Z};
pub use material::{
    cosine_hemisphere, mirror_direction, Color, Material, BOUNCE_ATTENUATION, SUN_DIRECT,
    SUN_EMISSION,
};
pub use scene::{box_test, DistanceField, LetterRoom, Sample};
pub use march::{
    estimate_normal, march, MarchResult, SurfaceHit, HIT_THRESHOLD, MAX_MISSED_STEPS, MAX_TRAVEL,
    NORMAL_EPSILON,
};
pub use camera::{Camera, EYE, LOOK_AT};
pub use renderer::{
    light_direction, render, render_image, render_pixel, render_with, tone_map, trace, Bounce,
    ConfigError, ImageBuffer, PathState, RenderConfig, BOUNCE_OFFSET, EXPOSURE_BIAS, MAX_BOUNCES,
};

/// Re-export Vec3 and the ray type from lumen_math
pub use lumen_math::{Ray, Vec3};
