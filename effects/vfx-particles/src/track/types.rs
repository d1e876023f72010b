//! Keyframe track types

use glam::{Vec3, Vec4};

use crate::error::{ParticleError, Result};

/// Values that can be blended between two keyframes
pub trait Lerp: Copy {
    /// Linear blend from `self` (t = 0) to `other` (t = 1)
    fn lerp(self, other: Self, t: f32) -> Self;

    /// Whether every component is finite
    fn is_finite(self) -> bool;
}

impl Lerp for f32 {
    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }
}

impl Lerp for Vec3 {
    fn lerp(self, other: Self, t: f32) -> Self {
        Vec3::lerp(self, other, t)
    }

    fn is_finite(self) -> bool {
        Vec3::is_finite(self)
    }
}

impl Lerp for Vec4 {
    fn lerp(self, other: Self, t: f32) -> Self {
        Vec4::lerp(self, other, t)
    }

    fn is_finite(self) -> bool {
        Vec4::is_finite(self)
    }
}

/// How values between two keyframes are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Interpolation {
    /// Hold the earlier keyframe until the next one is reached
    Step,
    /// Blend linearly between the bracketing keyframes
    #[default]
    Linear,
}

/// A single keyframe on a life-ratio track
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe<T> {
    /// Life ratio in [0, 1]
    pub time: f32,
    /// Value at this point of the particle's life
    pub value: T,
}

/// Keyframed function from life ratio to a value
///
/// Keys are kept sorted by time. Tracks are immutable once part of a
/// definition and are shared by every instance of it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track<T> {
    /// Interpolation between keys
    #[cfg_attr(feature = "serde", serde(default))]
    pub interpolation: Interpolation,
    /// Keyframes sorted by time
    pub keys: Vec<Keyframe<T>>,
}

impl<T: Lerp> Track<T> {
    /// A track that returns `value` for every life ratio
    pub fn constant(value: T) -> Self {
        Self {
            interpolation: Interpolation::Linear,
            keys: vec![Keyframe { time: 0.0, value }],
        }
    }

    /// Linear track through the given `(time, value)` keys
    pub fn linear(keys: impl IntoIterator<Item = (f32, T)>) -> Self {
        Self::with_interpolation(Interpolation::Linear, keys)
    }

    /// Step track through the given `(time, value)` keys
    pub fn step(keys: impl IntoIterator<Item = (f32, T)>) -> Self {
        Self::with_interpolation(Interpolation::Step, keys)
    }

    fn with_interpolation(
        interpolation: Interpolation,
        keys: impl IntoIterator<Item = (f32, T)>,
    ) -> Self {
        let mut keys: Vec<Keyframe<T>> = keys
            .into_iter()
            .map(|(time, value)| Keyframe { time, value })
            .collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            interpolation,
            keys,
        }
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the track has no keyframes
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Check that the track can be evaluated
    ///
    /// `field` names the track in the returned error.
    pub fn validate(&self, field: &str) -> Result<()> {
        if self.keys.is_empty() {
            return Err(ParticleError::invalid(field, "track has no keyframes"));
        }

        let mut previous = f32::NEG_INFINITY;
        for (index, key) in self.keys.iter().enumerate() {
            if !(0.0..=1.0).contains(&key.time) {
                return Err(ParticleError::invalid(
                    field,
                    format!("key {index} time {} is outside [0, 1]", key.time),
                ));
            }
            if key.time < previous {
                return Err(ParticleError::invalid(
                    field,
                    format!("key {index} is out of order"),
                ));
            }
            if !key.value.is_finite() {
                return Err(ParticleError::invalid(
                    field,
                    format!("key {index} value is not finite"),
                ));
            }
            previous = key.time;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_sorted_on_construction() {
        let track = Track::linear([(1.0, 3.0), (0.0, 1.0), (0.5, 2.0)]);
        let times: Vec<f32> = track.keys.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_validate_rejects_empty() {
        let track: Track<f32> = Track::linear([]);
        assert!(matches!(
            track.validate("size.sizes"),
            Err(ParticleError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_time() {
        let track = Track::linear([(0.0, 1.0), (1.5, 2.0)]);
        assert!(track.validate("size.sizes").is_err());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let track = Track::constant(Vec3::new(f32::NAN, 0.0, 0.0));
        assert!(track.validate("velocity.rotation").is_err());
    }

    #[test]
    fn test_validate_accepts_constant() {
        assert!(Track::constant(Vec4::ONE).validate("color.colors").is_ok());
    }
}
