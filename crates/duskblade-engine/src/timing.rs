//! Fixed-timestep accumulation.
//!
//! Host frames arrive at whatever rate the host runs; gameplay always ticks
//! at the fixed rate. The accumulator converts one into the other.

/// Fixed-timestep accumulator.
#[derive(Debug, Clone)]
pub struct FixedStep {
    /// Fixed timestep delta
    fixed_dt: f32,
    /// Time not yet consumed by a tick
    accumulator: f32,
    /// Maximum frame delta accepted (prevents spiral of death)
    max_frame_dt: f32,
    /// Maximum ticks per frame
    max_ticks: u32,
    /// Ticks run so far
    total_ticks: u64,
}

impl FixedStep {
    /// Create an accumulator ticking `tick_rate` times per second.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        Self {
            fixed_dt: 1.0 / tick_rate.max(1) as f32,
            accumulator: 0.0,
            max_frame_dt: 0.25,
            max_ticks: 10,
            total_ticks: 0,
        }
    }

    /// Fixed timestep in seconds.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Ticks run so far.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Accumulate one frame of time.
    /// Returns the number of fixed ticks that should run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, self.max_frame_dt);
        let mut count = 0;

        // Tolerate float drift so a frame equal to the step always ticks
        let threshold = self.fixed_dt - self.fixed_dt * 1e-4;
        while self.accumulator >= threshold && count < self.max_ticks {
            self.accumulator = (self.accumulator - self.fixed_dt).max(0.0);
            count += 1;
        }

        // Still behind after the cap: drop the backlog
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        self.total_ticks += u64::from(count);
        count
    }

    /// Fraction of a tick left in the accumulator, for interpolation.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.fixed_dt).clamp(0.0, 1.0)
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_rates_tick_once_per_frame() {
        let mut step = FixedStep::new(60);
        for _ in 0..600 {
            assert_eq!(step.accumulate(1.0 / 60.0), 1);
        }
        assert_eq!(step.total_ticks(), 600);
    }

    #[test]
    fn test_slow_frames_tick_multiple_times() {
        let mut step = FixedStep::new(120);
        let ticks: u32 = (0..30).map(|_| step.accumulate(1.0 / 30.0)).sum();
        assert_eq!(ticks, 120);
    }

    #[test]
    fn test_huge_frame_is_capped() {
        let mut step = FixedStep::new(60);
        assert_eq!(step.accumulate(5.0), 10);
        assert!(step.alpha() < 1.0);
    }

    #[test]
    fn test_partial_frame_accumulates() {
        let mut step = FixedStep::new(10);
        assert_eq!(step.accumulate(0.05), 0);
        assert!((step.alpha() - 0.5).abs() < 1e-4);
        assert_eq!(step.accumulate(0.05), 1);
    }
}
