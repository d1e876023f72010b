//! Engine-wide simulation settings

use glam::Vec3;

/// Values shared by every particle system a manager runs
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SimulationSettings {
    /// World gravity, scaled per definition by `gravity_scale`
    pub gravity: Vec3,
    /// Distance the emitter must travel before rate-over-distance emission fires
    pub rate_min_distance: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.8, 0.0),
            rate_min_distance: 1.0,
        }
    }
}
