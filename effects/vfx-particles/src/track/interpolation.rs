//! Keyframe lookup and evaluation for life-ratio tracks

use super::types::{Interpolation, Keyframe, Lerp, Track};

/// Find the index of the keyframe at or before the given time
///
/// Returns None if the track has no keyframes.
/// For interpolation, this returns the index of the earlier keyframe
/// in the bracketing pair (so we can interpolate between `[index]` and `[index+1]`).
pub fn find_key_index<T>(keys: &[Keyframe<T>], time: f32) -> Option<usize> {
    if keys.is_empty() {
        return None;
    }

    let last_index = keys.len() - 1;
    if last_index == 0 || time >= keys[last_index].time {
        return Some(last_index);
    }

    // Largest index where keys[index].time <= time
    let mut low = 0;
    let mut high = last_index;

    while low < high {
        let mid = (low + high).div_ceil(2);
        if keys[mid].time <= time {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Some(low)
}

impl<T: Lerp + Default> Track<T> {
    /// Evaluate the track at a life ratio
    ///
    /// `t` is clamped to [0, 1] first. Ratios before the first key return the
    /// first value, ratios after the last key return the last value, and an
    /// empty track returns `T::default()`.
    pub fn evaluate(&self, t: f32) -> T {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let Some(index) = find_key_index(&self.keys, t) else {
            return T::default();
        };

        let first = &self.keys[index];
        if t <= first.time || index + 1 >= self.keys.len() {
            return first.value;
        }

        let second = &self.keys[index + 1];
        match self.interpolation {
            Interpolation::Step => first.value,
            Interpolation::Linear => {
                let span = second.time - first.time;
                let local = if span > 0.0 {
                    (t - first.time) / span
                } else {
                    0.0
                };
                first.value.lerp(second.value, local.clamp(0.0, 1.0))
            }
        }
    }
}
