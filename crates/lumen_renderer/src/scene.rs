//! Scene distance field.
//!
//! The scene is a single implicit function: extruded glyphs and two curves
//! in front of a room with a beamed ceiling, lit by an emissive plane above
//! the beams. Every query returns the distance to the nearest surface and
//! the material of that surface.

use crate::Material;
use lumen_math::Vec3;

/// Result of a distance-field query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Signed distance to the nearest surface (negative inside).
    pub distance: f32,
    /// Material of the surface the distance refers to.
    pub material: Material,
}

impl Sample {
    pub fn new(distance: f32, material: Material) -> Self {
        Self { distance, material }
    }
}

/// Trait for implicit scenes that can be sphere-traced.
pub trait DistanceField {
    /// Distance from `position` to the nearest surface and its material.
    fn sample(&self, position: Vec3) -> Sample;

    /// Distance only, for callers that ignore the material.
    #[inline]
    fn distance(&self, position: Vec3) -> f32 {
        self.sample(position).distance
    }
}

/// Glyph strokes, four bytes per segment: begin x, begin y, end x, end y.
///
/// Each byte decodes to `(byte - 79) * 0.5` scene units.
const GLYPH_STROKES: &[u8; 60] = b"5O5_5W9W5_9_AOEOCOC_A_E_IOQ_I_QOUOY_Y_]OWW[WaOa_aWeWa_e_cWiO";

/// Anchors of the two curves flanking the glyphs.
const CURVE_ANCHORS: [Vec3; 2] = [Vec3::new(-11.0, 6.0, 0.0), Vec3::new(11.0, 6.0, 0.0)];

/// Height of the emissive plane.
const SUN_HEIGHT: f32 = 19.9;

/// Period of the ceiling beam repetition along x.
const BEAM_PERIOD: f32 = 8.0;

/// Axis-aligned box distance: negative inside, positive outside.
///
/// Takes the minimum of the six signed plane distances and negates it.
/// Outside the box this is not a true Euclidean distance, only a bound.
#[inline]
pub fn box_test(position: Vec3, lower: Vec3, upper: Vec3) -> f32 {
    let lower = position - lower;
    let upper = upper - position;
    -lower
        .x
        .min(upper.x)
        .min(lower.y.min(upper.y))
        .min(lower.z.min(upper.z))
}

/// Squared planar distance from `point` to the segment `begin..end`.
#[inline]
fn segment_distance_squared(point: Vec3, begin: Vec3, end: Vec3) -> f32 {
    let edge = end - begin;
    let t = (-((begin - point).dot(edge) / edge.length_squared()).min(0.0)).min(1.0);
    let offset = point - (begin + edge * t);
    offset.length_squared()
}

/// Distance from `point` to one of the side curves.
#[inline]
fn curve_distance(point: Vec3, anchor: Vec3) -> f32 {
    let mut offset = point - anchor;
    if offset.x > 0.0 {
        (offset.length() - 2.0).abs()
    } else {
        offset.y += if offset.y > 0.0 { -2.0 } else { 2.0 };
        offset.length()
    }
}

#[inline]
fn decode_stroke_point(x: u8, y: u8) -> Vec3 {
    Vec3::new(f32::from(x) - 79.0, f32::from(y) - 79.0, 0.0) * 0.5
}

/// The fixed benchmark scene: glyphs in a room lit through ceiling beams.
#[derive(Debug, Clone, Copy, Default)]
pub struct LetterRoom;

impl LetterRoom {
    pub fn new() -> Self {
        Self
    }

    /// Rounded extrusion of the glyphs and curves along z.
    pub fn letters(&self, position: Vec3) -> f32 {
        let flat = Vec3::new(position.x, position.y, 0.0);

        let mut distance = 1e9_f32;
        for stroke in GLYPH_STROKES.chunks_exact(4) {
            let begin = decode_stroke_point(stroke[0], stroke[1]);
            let end = decode_stroke_point(stroke[2], stroke[3]);
            distance = distance.min(segment_distance_squared(flat, begin, end));
        }
        distance = distance.sqrt();

        for anchor in CURVE_ANCHORS.iter().rev() {
            distance = distance.min(curve_distance(flat, *anchor));
        }

        (distance.powf(8.0) + position.z.powf(8.0)).powf(0.125) - 0.5
    }

    /// Room shell with the repeating ceiling beams.
    ///
    /// Positive in the open interior, negative inside the walls.
    pub fn room(&self, position: Vec3) -> f32 {
        let shell = -box_test(
            position,
            Vec3::new(-30.0, -0.5, -30.0),
            Vec3::new(30.0, 18.0, 30.0),
        )
        .min(box_test(
            position,
            Vec3::new(-25.0, 17.5, -25.0),
            Vec3::new(25.0, 20.0, 25.0),
        ));

        let repeated = Vec3::new(position.x.abs() % BEAM_PERIOD, position.y, position.z);
        let beams = box_test(
            repeated,
            Vec3::new(1.5, 18.5, -25.0),
            Vec3::new(6.5, 20.0, 25.0),
        );

        shell.min(beams)
    }

    /// Emissive plane, positive below it.
    #[inline]
    pub fn sun(&self, position: Vec3) -> f32 {
        SUN_HEIGHT - position.y
    }
}

impl DistanceField for LetterRoom {
    fn sample(&self, position: Vec3) -> Sample {
        let mut best = Sample::new(self.letters(position), Material::Letter);

        let room = self.room(position);
        if room < best.distance {
            best = Sample::new(room, Material::Wall);
        }

        let sun = self.sun(position);
        if sun < best.distance {
            best = Sample::new(sun, Material::Sun);
        }

        best
    }
}
