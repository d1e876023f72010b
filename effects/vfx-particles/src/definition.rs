//! Immutable particle effect definitions
//!
//! A [`ParticleDefinition`] is produced by an external loader, validated once,
//! and then shared read-only by every instance of the effect. Each block has
//! an inert default so partial definitions stay meaningful.

use glam::{Vec2, Vec3, Vec4};

use crate::error::{ParticleError, Result};
use crate::particles::Shape;
use crate::track::Track;

/// Complete description of one particle effect
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ParticleDefinition {
    pub system: SystemBlock,
    pub shape: Shape,
    pub velocity: VelocityBlock,
    pub noise: NoiseBlock,
    pub color: ColorBlock,
    pub size: SizeBlock,
    pub emission: EmissionBlock,
    pub renderer: RendererBlock,
}

/// Lifetime, speed, and spawn settings shared by every particle
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SystemBlock {
    /// Pool capacity
    pub max_particles: usize,
    /// Base particle lifetime in seconds (0 = never expires by age)
    pub duration: f32,
    /// Seconds after launch before anything is simulated
    pub start_delay: f32,
    /// Keep emitting over time instead of a single initial burst
    pub looping: bool,
    /// Multiplier applied to the step length
    pub simulation_speed: f32,
    /// Multiplier on the world gravity vector
    pub gravity_scale: f32,
    /// Multiplier on each particle's spawn velocity
    pub start_speed: f32,
    /// Multiplier on the size curve
    pub start_size: f32,
    /// Initial yaw/pitch/roll in radians
    pub start_rotation: Vec3,
    /// Amount of random jitter around `start_rotation`
    pub random_rotation: f32,
    /// Local offset added to every spawn position
    pub offset: Vec3,
}

impl Default for SystemBlock {
    fn default() -> Self {
        Self {
            max_particles: 100,
            duration: 1.0,
            start_delay: 0.0,
            looping: false,
            simulation_speed: 1.0,
            gravity_scale: 0.0,
            start_speed: 1.0,
            start_size: 1.0,
            start_rotation: Vec3::ZERO,
            random_rotation: 0.0,
            offset: Vec3::ZERO,
        }
    }
}

/// Space the velocity curve and constant velocity are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SimulationSpace {
    /// Rotated by the emitter's orientation
    #[default]
    Local,
    /// Used as-is
    World,
}

/// Velocity shaping over a particle's life
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct VelocityBlock {
    pub space: SimulationSpace,
    /// Velocity added to every spawn direction
    pub constant_velocity: Vec3,
    /// Multiplier on the velocity curve
    pub acceleration: f32,
    /// Multiplier on the environment wind
    pub wind_factor: f32,
    /// Particles follow the emitter after spawning
    pub inherit_velocity: bool,
    /// Velocity modulation over life
    pub velocity: Track<Vec3>,
    /// Rotation rate (radians per second) over life
    pub rotation: Track<Vec3>,
}

impl Default for VelocityBlock {
    fn default() -> Self {
        Self {
            space: SimulationSpace::Local,
            constant_velocity: Vec3::ZERO,
            acceleration: 0.0,
            wind_factor: 0.0,
            inherit_velocity: false,
            velocity: Track::constant(Vec3::ZERO),
            rotation: Track::constant(Vec3::ZERO),
        }
    }
}

/// Random velocity perturbation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct NoiseBlock {
    /// 0 disables noise
    pub strength: f32,
}

/// Color over life
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ColorBlock {
    pub colors: Track<Vec4>,
    /// Alpha multiplier
    pub opacity: f32,
}

impl Default for ColorBlock {
    fn default() -> Self {
        Self {
            colors: Track::constant(Vec4::ONE),
            opacity: 1.0,
        }
    }
}

/// Size over life
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SizeBlock {
    pub sizes: Track<f32>,
    /// Base billboard scale
    pub scale: f32,
    /// Random +/- range around `scale`
    pub scale_variation: f32,
}

impl Default for SizeBlock {
    fn default() -> Self {
        Self {
            sizes: Track::constant(1.0),
            scale: 1.0,
            scale_variation: 0.0,
        }
    }
}

/// Scheduled emission event template
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Burst {
    /// Seconds after launch the burst becomes active
    pub time: f32,
    /// Particles per repetition
    pub count: u32,
    /// Seconds between repetitions
    pub interval: f32,
    /// Number of repetitions
    pub cycles: u32,
}

impl Default for Burst {
    fn default() -> Self {
        Self {
            time: 0.0,
            count: 1,
            interval: 0.0,
            cycles: 1,
        }
    }
}

/// Emission scheduling
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EmissionBlock {
    /// Initial burst size for one-shot systems; enables timed emission for looping ones
    pub rate_time: u32,
    /// Seconds between timed emissions (0 = `1 / rate_time`)
    pub time_ratio: f32,
    /// Particles emitted each time the emitter has travelled far enough
    pub rate_distance: u32,
    /// Random +/- range applied to each particle's lifetime
    pub variation: f32,
    pub bursts: Vec<Burst>,
}

impl EmissionBlock {
    /// Period of rate-over-time emission, if timed emission is enabled
    pub fn period(&self) -> Option<f32> {
        if self.rate_time == 0 {
            None
        } else if self.time_ratio > 0.0 {
            Some(self.time_ratio)
        } else {
            Some(1.0 / self.rate_time as f32)
        }
    }
}

/// Billboard orientation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum OrientationMode {
    /// Face the camera
    #[default]
    Default,
    /// Lie flat, facing up
    Horizontal,
    /// Face the camera around the vertical axis only
    Vertical,
    /// Align with the particle's velocity
    Stretched,
}

/// Render settings handed through to the external renderer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RendererBlock {
    pub texture: String,
    pub technique: String,
    /// Atlas columns (x) and rows (y)
    pub frame_size: Vec2,
    pub num_frames: u32,
    pub initial_frame: u32,
    /// Frames per second of life
    pub frame_speed: f32,
    pub softness: f32,
    pub mode: OrientationMode,
    /// Length multiplier for stretched billboards
    pub stretch_length: f32,
}

impl Default for RendererBlock {
    fn default() -> Self {
        Self {
            texture: String::new(),
            technique: String::new(),
            frame_size: Vec2::ONE,
            num_frames: 1,
            initial_frame: 0,
            frame_speed: 0.0,
            softness: 0.0,
            mode: OrientationMode::Default,
            stretch_length: 1.0,
        }
    }
}

fn finite(field: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParticleError::invalid(field, "value is not finite"))
    }
}

fn non_negative(field: &str, value: f32) -> Result<()> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ParticleError::invalid(field, format!("{value} is negative")));
    }
    Ok(())
}

fn finite_vec(field: &str, value: Vec3) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParticleError::invalid(field, "vector is not finite"))
    }
}

impl ParticleDefinition {
    /// Check every block for values the simulation cannot run with
    ///
    /// Loaders call this before handing a definition to the simulation; the
    /// runtime itself assumes a validated definition.
    pub fn validate(&self) -> Result<()> {
        let system = &self.system;
        if system.max_particles == 0 {
            return Err(ParticleError::invalid(
                "system.max_particles",
                "must be at least 1",
            ));
        }
        finite("system.duration", system.duration)?;
        non_negative("system.start_delay", system.start_delay)?;
        non_negative("system.simulation_speed", system.simulation_speed)?;
        finite("system.gravity_scale", system.gravity_scale)?;
        finite("system.start_speed", system.start_speed)?;
        finite("system.start_size", system.start_size)?;
        finite_vec("system.start_rotation", system.start_rotation)?;
        finite("system.random_rotation", system.random_rotation)?;
        finite_vec("system.offset", system.offset)?;

        if !self.shape.parameters_valid() {
            return Err(ParticleError::invalid(
                "shape",
                format!("{:?} has negative or non-finite parameters", self.shape),
            ));
        }

        let velocity = &self.velocity;
        finite_vec("velocity.constant_velocity", velocity.constant_velocity)?;
        finite("velocity.acceleration", velocity.acceleration)?;
        finite("velocity.wind_factor", velocity.wind_factor)?;
        velocity.velocity.validate("velocity.velocity")?;
        velocity.rotation.validate("velocity.rotation")?;

        non_negative("noise.strength", self.noise.strength)?;

        self.color.colors.validate("color.colors")?;
        finite("color.opacity", self.color.opacity)?;

        self.size.sizes.validate("size.sizes")?;
        finite("size.scale", self.size.scale)?;
        non_negative("size.scale_variation", self.size.scale_variation)?;

        let emission = &self.emission;
        non_negative("emission.time_ratio", emission.time_ratio)?;
        non_negative("emission.variation", emission.variation)?;
        for (index, burst) in emission.bursts.iter().enumerate() {
            non_negative(&format!("emission.bursts[{index}].time"), burst.time)?;
            non_negative(&format!("emission.bursts[{index}].interval"), burst.interval)?;
        }

        let renderer = &self.renderer;
        if !renderer.frame_size.is_finite() || renderer.frame_size.min_element() < 1.0 {
            return Err(ParticleError::invalid(
                "renderer.frame_size",
                "atlas must have at least one column and one row",
            ));
        }
        if renderer.num_frames == 0 {
            return Err(ParticleError::invalid(
                "renderer.num_frames",
                "must be at least 1",
            ));
        }
        non_negative("renderer.frame_speed", renderer.frame_speed)?;
        finite("renderer.softness", renderer.softness)?;
        finite("renderer.stretch_length", renderer.stretch_length)?;

        Ok(())
    }
}
