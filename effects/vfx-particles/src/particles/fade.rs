//! Global opacity ramp for ending an effect

/// Fade-out state of one running system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeController {
    duration: f32,
    elapsed: f32,
    ratio: f32,
}

impl Default for FadeController {
    fn default() -> Self {
        Self {
            duration: 0.0,
            elapsed: 0.0,
            ratio: 1.0,
        }
    }
}

impl FadeController {
    /// Start fading out over `duration` seconds
    pub fn fade_out(&mut self, duration: f32) {
        self.duration = duration;
        self.elapsed = 0.0;
    }

    /// Advance the fade by `dt` seconds
    ///
    /// The ratio is not clamped: it goes negative once the fade has run its
    /// course, which is what marks the system as finished.
    pub fn step(&mut self, dt: f32) {
        if self.duration != 0.0 {
            self.elapsed += dt;
            self.ratio = 1.0 - self.elapsed / self.duration;
        } else {
            self.ratio = 1.0;
        }
    }

    /// Current opacity multiplier
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Whether a fade-out has been requested
    pub fn is_fading(&self) -> bool {
        self.duration != 0.0
    }

    /// Whether the fade has reached zero
    pub fn is_finished(&self) -> bool {
        self.ratio <= 0.0
    }

    /// Cancel any fade and restore full opacity
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
