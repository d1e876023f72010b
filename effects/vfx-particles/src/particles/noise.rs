//! Random directional perturbation

use glam::Vec3;

use crate::providers::RandomSource;

/// Angle range (degrees) each axis of a noise direction is drawn from
pub const NOISE_ANGLE_RANGE: (f32, f32) = (-180.0, 180.0);

/// Draw a fixed per-particle noise direction
///
/// Three independent angles are sampled and converted through `sin`, giving
/// components in [-1, 1] without favouring any axis.
pub fn random_direction(rng: &mut dyn RandomSource) -> Vec3 {
    let (lo, hi) = NOISE_ANGLE_RANGE;
    Vec3::new(
        rng.uniform(lo, hi).to_radians().sin(),
        rng.uniform(lo, hi).to_radians().sin(),
        rng.uniform(lo, hi).to_radians().sin(),
    )
}

/// Velocity offset for one step
///
/// The particle's fixed `direction` is scaled by `strength`, the step length,
/// and a fresh uniform [0, 1] jitter. The result is added to the velocity,
/// never substituted for it.
pub fn perturb(direction: Vec3, strength: f32, dt: f32, rng: &mut dyn RandomSource) -> Vec3 {
    direction * rng.uniform(0.0, 1.0) * dt * strength
}
