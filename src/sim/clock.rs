//! Frame delta sanitizing
//!
//! The render loop hands us raw wall-clock deltas. A backgrounded tab or a
//! debugger pause can produce a multi-second delta, and a clock going
//! backwards would reverse scrolling, so every delta passes through here.

/// Clamps incoming frame deltas and tracks simulated time
#[derive(Debug, Clone)]
pub struct FrameClock {
    max_dt: f32,
    /// Simulated seconds since the session started (sum of clamped deltas)
    elapsed: f32,
    frames: u64,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            max_dt,
            elapsed: 0.0,
            frames: 0,
        }
    }

    /// Clamp `raw_dt` into `[0, max_dt]` without advancing the clock
    pub fn sanitize(&self, raw_dt: f32) -> f32 {
        if !raw_dt.is_finite() || raw_dt <= 0.0 {
            return 0.0;
        }
        if raw_dt > self.max_dt {
            log::trace!("Clamped frame dt {:.3}s to {:.3}s", raw_dt, self.max_dt);
        }
        raw_dt.min(self.max_dt)
    }

    /// Sanitize and consume one frame delta, returning the dt to integrate
    pub fn advance(&mut self, raw_dt: f32) -> f32 {
        let dt = self.sanitize(raw_dt);
        self.elapsed += dt;
        self.frames += 1;
        dt
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.frames = 0;
    }
}
