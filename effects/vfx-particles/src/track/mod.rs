//! Life-ratio tracks
//!
//! Tracks map a particle's normalized age to a scalar, vector, or color. They
//! drive color, size, velocity modulation, and rotation rate.
//!
//! # Example
//!
//! ```rust
//! use glam::Vec4;
//! use vfx_particles::track::Track;
//!
//! let fade = Track::linear([(0.0, Vec4::ONE), (1.0, Vec4::new(1.0, 1.0, 1.0, 0.0))]);
//! assert_eq!(fade.evaluate(0.5).w, 0.5);
//! ```

mod interpolation;
mod types;

pub use interpolation::find_key_index;
pub use types::{Interpolation, Keyframe, Lerp, Track};
