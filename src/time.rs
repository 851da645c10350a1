//! Fixed-timestep simulation clock using an accumulator.
//!
//! `draw_web()` fires at roughly 60fps with a variable delta. `GameTime`
//! turns those frame timestamps into whole simulation ticks (one per second
//! for the tower) and keeps the leftover fraction so the renderer can
//! interpolate moving things such as the elevator car between ticks.

pub struct GameTime {
    /// Milliseconds per tick (1000ms = one simulated second).
    ms_per_tick: f64,
    /// Largest frame delta accepted; longer gaps are dropped.
    max_frame_ms: f64,
    /// Milliseconds accumulated but not yet consumed as ticks.
    accumulator: f64,
    /// Total ticks produced since creation.
    pub total_ticks: u64,
    /// Timestamp of the previous frame, None before the first frame.
    last_timestamp: Option<f64>,
}

impl GameTime {
    /// `ticks_per_sec` is the simulation rate, `max_frame_ms` caps how much
    /// wall time a single (possibly backgrounded) frame may contribute.
    pub fn new(ticks_per_sec: u32, max_frame_ms: f64) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec.max(1) as f64,
            max_frame_ms: max_frame_ms.max(0.0),
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed the current frame timestamp (`performance.now()`).
    /// Returns the number of whole ticks to simulate this frame.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, self.max_frame_ms),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }

    /// Fraction of the next tick already elapsed, in `[0, 1)`.
    pub fn alpha(&self) -> f64 {
        (self.accumulator / self.ms_per_tick).clamp(0.0, 1.0)
    }
}
