#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn geometry mapping an index within a batch to a ground position.
//!
//! Every pattern is a pure function of its [`PatternContext`] and the random
//! source handed in by the caller, so a seeded source reproduces the same
//! layout.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, TAU};

use arena_horde_core::PatternKind;
use glam::DVec2;
use rand::Rng;

/// Spacing between neighbouring grid cells before the radius multiplier.
const GRID_SPACING: f64 = 3.0;

/// Spacing between neighbouring line slots before the radius multiplier.
const LINE_SPACING: f64 = 2.0;

/// Width of the arc used by the directional pattern.
const DIRECTIONAL_SPREAD: f64 = FRAC_PI_3;

/// Cardinal headings cycled by the directional pattern, indexed by `wave % 4`.
const CARDINAL_HEADINGS: [f64; 4] = [0.0, FRAC_PI_2, 2.0 * FRAC_PI_2, 3.0 * FRAC_PI_2];

/// Inputs shared by every pattern for one spawned entity.
#[derive(Clone, Copy, Debug)]
pub struct PatternContext<'a> {
    /// Position the batch is arranged around, usually the player.
    pub origin: DVec2,
    /// Index of the entity within its batch.
    pub index: usize,
    /// Number of entities in the batch.
    pub total: usize,
    /// Current one-based wave index.
    pub wave: u32,
    /// Minimum distance between origin and spawn position.
    pub base_distance: f64,
    /// Random extra distance added on top of `base_distance`.
    pub distance_variance: f64,
    /// Value of the `spawn-radius` modifier.
    pub radius_multiplier: f64,
    /// Caller-supplied points used by [`PatternKind::Fixed`].
    pub spawn_points: &'a [DVec2],
}

/// Computes the spawn position for `context` using `pattern`.
pub fn position<R>(pattern: PatternKind, context: &PatternContext<'_>, rng: &mut R) -> DVec2
where
    R: Rng + ?Sized,
{
    match pattern {
        PatternKind::Circle => circle(context, rng),
        PatternKind::Grid => grid(context),
        PatternKind::Directional => directional(context, rng),
        PatternKind::Line => line(context),
        PatternKind::Fixed => fixed(context, rng),
    }
}

/// Uniform angle, distance in `[base, base + variance] * radius_multiplier`.
pub fn circle<R>(context: &PatternContext<'_>, rng: &mut R) -> DVec2
where
    R: Rng + ?Sized,
{
    let angle = rng.gen::<f64>() * TAU;
    let distance = random_distance(context, rng);
    context.origin + DVec2::from_angle(angle) * distance
}

/// Square grid `ceil(sqrt(total))` cells wide, shifted diagonally by the base
/// distance.
#[must_use]
pub fn grid(context: &PatternContext<'_>) -> DVec2 {
    let width = grid_width(context.total);
    let row = context.index / width;
    let column = context.index % width;
    let spacing = GRID_SPACING * context.radius_multiplier;
    let half = width as f64 / 2.0;

    let offset = DVec2::new(
        (column as f64 - half) * spacing,
        (row as f64 - half) * spacing,
    );
    context.origin + offset + DVec2::splat(context.base_distance)
}

/// Arc of 60 degrees around the cardinal heading selected by `wave % 4`.
pub fn directional<R>(context: &PatternContext<'_>, rng: &mut R) -> DVec2
where
    R: Rng + ?Sized,
{
    let heading = CARDINAL_HEADINGS[(context.wave % 4) as usize];
    let angle = heading + (rng.gen::<f64>() - 0.5) * DIRECTIONAL_SPREAD;
    let distance = random_distance(context, rng);
    context.origin + DVec2::from_angle(angle) * distance
}

/// Line across the heading `wave * 45` degrees, centred on slot `total / 2`.
#[must_use]
pub fn line(context: &PatternContext<'_>) -> DVec2 {
    let angle = (f64::from(context.wave) * FRAC_PI_4) % TAU;
    let direction = DVec2::from_angle(angle);
    let across = DVec2::from_angle(angle + FRAC_PI_2);
    let spacing = LINE_SPACING * context.radius_multiplier;
    let offset = (context.index as f64 - context.total as f64 / 2.0) * spacing;

    context.origin + direction * context.base_distance + across * offset
}

/// Round-robin over the fixed spawn points; circle when none are configured.
pub fn fixed<R>(context: &PatternContext<'_>, rng: &mut R) -> DVec2
where
    R: Rng + ?Sized,
{
    if context.spawn_points.is_empty() {
        return circle(context, rng);
    }
    context.spawn_points[context.index % context.spawn_points.len()]
}

fn random_distance<R>(context: &PatternContext<'_>, rng: &mut R) -> f64
where
    R: Rng + ?Sized,
{
    (context.base_distance + rng.gen::<f64>() * context.distance_variance)
        * context.radius_multiplier
}

fn grid_width(total: usize) -> usize {
    let mut width = 1;
    while width * width < total {
        width += 1;
    }
    width
}
