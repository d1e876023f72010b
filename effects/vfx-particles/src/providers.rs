//! Read-only accessors the simulation consumes from its collaborators
//!
//! The core never looks up entities, cameras, wind or random numbers on its
//! own; everything arrives through these traits.

use glam::{Mat4, Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// World up axis
pub const UP: Vec3 = Vec3::Y;
/// World right axis
pub const RIGHT: Vec3 = Vec3::X;
/// World forward axis
pub const FORWARD: Vec3 = Vec3::NEG_Z;

/// Transform of the entity a particle system is attached to
pub trait TransformProvider {
    /// World-space position
    fn position(&self) -> Vec3;
    /// World-space forward direction
    fn front(&self) -> Vec3;
    /// Local-to-world matrix
    fn world_matrix(&self) -> Mat4;
    /// World-space orientation
    fn rotation(&self) -> Quat;
}

/// Camera state used to orient billboards
pub trait CameraProvider {
    /// Viewing direction
    fn front(&self) -> Vec3;
    /// Camera up vector
    fn up(&self) -> Vec3;
}

/// Global environment values shared by every system
pub trait Environment {
    /// Current wind velocity in world space
    fn wind_velocity(&self) -> Vec3;
}

/// Uniform random number source
///
/// Every stochastic decision in the simulation goes through this trait, so a
/// seeded source replays a simulation exactly.
pub trait RandomSource {
    /// Sample uniformly from `[lo, hi)`; returns `lo` when the range is empty
    fn uniform(&mut self, lo: f32, hi: f32) -> f32;
}

/// Plain position/rotation/scale transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl EmitterTransform {
    /// Transform at `translation` with no rotation or scaling
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    /// Builder-style rotation setter
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

impl Default for EmitterTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl TransformProvider for EmitterTransform {
    fn position(&self) -> Vec3 {
        self.translation
    }

    fn front(&self) -> Vec3 {
        self.rotation * FORWARD
    }

    fn world_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }
}

/// Camera described by its basis vectors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub front: Vec3,
    pub up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            front: FORWARD,
            up: UP,
        }
    }
}

impl CameraProvider for Camera {
    fn front(&self) -> Vec3 {
        self.front
    }

    fn up(&self) -> Vec3 {
        self.up
    }
}

/// Environment with a fixed wind velocity
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StillAir {
    pub wind: Vec3,
}

impl Environment for StillAir {
    fn wind_velocity(&self) -> Vec3 {
        self.wind
    }
}

/// Seedable random source backed by [`StdRng`]
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Create a source that replays the same sequence for the same seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::new(42)
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        lo + (hi - lo) * self.rng.random::<f32>()
    }
}
