//! Individual particle representation

use glam::{Vec3, Vec4};

/// A single live particle, owned by its instance's pool
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Spawn position in emitter space (shape sample plus offset)
    pub origin_position: Vec3,
    /// Spawn velocity in world space
    pub origin_velocity: Vec3,
    /// World-space position
    pub position: Vec3,
    /// Velocity for the current step
    pub velocity: Vec3,
    /// Fixed noise direction drawn at spawn
    pub random_direction: Vec3,
    /// Accumulated yaw/pitch/roll in radians
    pub rotation: Vec3,
    /// Current color (RGBA, 0.0-1.0)
    pub color: Vec4,
    /// Current size from the size curve
    pub size: f32,
    /// Per-particle billboard scale
    pub scale: f32,
    /// Current atlas frame
    pub frame: u32,
    /// Random atlas offset drawn at spawn
    pub init_frame: u32,
    /// Age in seconds
    pub lifetime_elapsed: f32,
    /// Lifespan in seconds; zero or negative never expires by age
    pub max_lifetime: f32,
    /// Position is recomputed from the emitter transform every step
    pub inherits_transform: bool,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            origin_position: Vec3::ZERO,
            origin_velocity: Vec3::ZERO,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            random_direction: Vec3::ZERO,
            rotation: Vec3::ZERO,
            color: Vec4::ONE,
            size: 1.0,
            scale: 1.0,
            frame: 0,
            init_frame: 0,
            lifetime_elapsed: 0.0,
            max_lifetime: 0.0,
            inherits_transform: false,
        }
    }
}

impl Particle {
    /// Whether the particle has reached the end of its life
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.max_lifetime > 0.0 && self.lifetime_elapsed >= self.max_lifetime
    }

    /// Age as a fraction of lifespan (0.0 to 1.0)
    ///
    /// Particles without a positive lifespan report 1.0.
    #[inline]
    pub fn life_ratio(&self) -> f32 {
        if self.max_lifetime > 0.0 {
            (self.lifetime_elapsed / self.max_lifetime).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}
