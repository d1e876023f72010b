//! Emission scheduling
//!
//! Decides how many particles an instance spawns each step. Three rules run
//! independently and their counts are summed:
//!
//! - rate over time (looping systems only)
//! - rate over distance travelled by the emitter
//! - timed bursts with repeat counts
//!
//! Burst progress lives here, per instance. The definition's burst list is
//! only a template copied on every (re)launch.

use glam::Vec3;

use crate::definition::{Burst, EmissionBlock};

/// Slack allowed when comparing an accumulator against its threshold
///
/// Fixed-step schedules (ten steps of 0.1s against a 1.0s period) land a few
/// ulps short of the boundary; this lets them fire on the intended step.
pub const SCHEDULE_EPSILON: f32 = 1e-5;

#[inline]
fn reached(accumulator: f32, threshold: f32) -> bool {
    accumulator + SCHEDULE_EPSILON >= threshold
}

/// Per-instance progress of one burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstState {
    /// Seconds after launch the burst becomes active
    pub time: f32,
    /// Particles per repetition
    pub count: u32,
    /// Seconds between repetitions
    pub interval: f32,
    /// Repetitions left
    pub cycles: u32,
    /// Seconds accumulated towards the next repetition
    pub elapsed: f32,
}

impl From<&Burst> for BurstState {
    fn from(burst: &Burst) -> Self {
        Self {
            time: burst.time,
            count: burst.count,
            interval: burst.interval,
            cycles: burst.cycles,
            elapsed: 0.0,
        }
    }
}

/// Emission state carried by one running instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmissionScheduler {
    accumulated_emission_time: f32,
    accumulated_distance: f32,
    last_known_position: Vec3,
    bursts: Vec<BurstState>,
}

impl EmissionScheduler {
    /// Scheduler with fresh copies of the definition's bursts
    pub fn new(emission: &EmissionBlock, position: Vec3) -> Self {
        let mut scheduler = Self::default();
        scheduler.reset(emission, position);
        scheduler
    }

    /// Clear accumulators and recopy the burst templates
    pub fn reset(&mut self, emission: &EmissionBlock, position: Vec3) {
        self.accumulated_emission_time = 0.0;
        self.accumulated_distance = 0.0;
        self.last_known_position = position;
        self.bursts.clear();
        self.bursts
            .extend(emission.bursts.iter().map(BurstState::from));
    }

    /// Particles spawned immediately at launch
    ///
    /// One-shot systems emit `rate_time` particles once; looping systems
    /// rely on timed emission instead.
    pub fn launch_count(emission: &EmissionBlock, looping: bool) -> u32 {
        if looping { 0 } else { emission.rate_time }
    }

    /// Advance every rule by `dt` seconds and return the number of particles requested
    ///
    /// `deploy_time` is the instance's time since launch, `position` the
    /// emitter's current world position.
    pub fn step(
        &mut self,
        emission: &EmissionBlock,
        looping: bool,
        dt: f32,
        deploy_time: f32,
        position: Vec3,
        min_distance: f32,
    ) -> u32 {
        let mut requested = 0u32;

        if looping && let Some(period) = emission.period() {
            self.accumulated_emission_time += dt;
            if reached(self.accumulated_emission_time, period) {
                self.accumulated_emission_time = 0.0;
                requested += 1;
            }
        }

        if emission.rate_distance > 0 {
            self.accumulated_distance += position.distance(self.last_known_position);
            if self.accumulated_distance > min_distance {
                self.accumulated_distance = 0.0;
                requested = requested.saturating_add(emission.rate_distance);
            }
        }
        self.last_known_position = position;

        requested.saturating_add(self.step_bursts(dt, deploy_time))
    }

    fn step_bursts(&mut self, dt: f32, deploy_time: f32) -> u32 {
        let mut requested = 0u32;
        self.bursts.retain_mut(|burst| {
            if deploy_time < burst.time {
                return true;
            }
            if burst.cycles < 1 {
                return false;
            }
            burst.elapsed += dt;
            if reached(burst.elapsed, burst.interval) {
                burst.elapsed = 0.0;
                burst.cycles -= 1;
                requested = requested.saturating_add(burst.count);
            }
            true
        });
        requested
    }

    /// Bursts still scheduled on this instance
    pub fn bursts(&self) -> &[BurstState] {
        &self.bursts
    }

    /// Distance travelled since the last rate-over-distance emission
    pub fn accumulated_distance(&self) -> f32 {
        self.accumulated_distance
    }

    /// Time accumulated towards the next timed emission
    pub fn accumulated_emission_time(&self) -> f32 {
        self.accumulated_emission_time
    }
}
