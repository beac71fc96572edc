//! Single source of truth for animation time.
//!
//! [`TimeAuthority`] turns raw per-frame deltas supplied by the host into a
//! pause-aware, scale-aware elapsed clock:
//!
//! ```text
//! delta   = min(raw_delta, max_delta) * time_scale   (0 while paused)
//! elapsed = elapsed + delta
//! ```
//!
//! Capping the raw delta keeps a stalled frame (e.g. a backgrounded window)
//! from advancing animations by more than `max_delta * time_scale` at once.

use rune_motion_config::TimeConfig;

/// Raw delta cap used by the engine, in seconds.
pub const DEFAULT_MAX_DELTA: f64 = 0.1;

/// Elapsed/delta clock fed by the host render loop.
#[derive(Debug, Clone)]
pub struct TimeAuthority {
    elapsed: f64,
    delta: f64,
    time_scale: f64,
    max_delta: f64,
    paused: bool,
    frame: u64,
}

impl Default for TimeAuthority {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DELTA)
    }
}

impl TimeAuthority {
    /// Create a clock with the given raw delta cap.
    pub fn new(max_delta: f64) -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            max_delta: max_delta.max(0.0),
            paused: false,
            frame: 0,
        }
    }

    /// Create a clock that never caps raw deltas.
    pub fn uncapped() -> Self {
        Self::new(f64::INFINITY)
    }

    /// Create a clock from configuration.
    pub fn from_config(config: &TimeConfig) -> Self {
        let mut time = Self::new(config.max_delta);
        time.set_time_scale(config.time_scale);
        time
    }

    /// Advance the clock by one frame.
    ///
    /// Negative or NaN raw deltas are treated as zero.
    pub fn update(&mut self, raw_delta: f64) {
        self.frame += 1;

        if self.paused {
            self.delta = 0.0;
            return;
        }

        let raw = if raw_delta.is_nan() { 0.0 } else { raw_delta.max(0.0) };
        let capped = raw.min(self.max_delta);
        self.delta = capped * self.time_scale;
        self.elapsed += self.delta;

        tracing::trace!(raw, capped, delta = self.delta, elapsed = self.elapsed, "time update");
    }

    /// Stop time from advancing. Subsequent updates report a zero delta.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume advancing time.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Set the time scale (clamped to be non-negative).
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = if scale.is_nan() { 0.0 } else { scale.max(0.0) };
    }

    /// Set the raw delta cap in seconds (clamped to be non-negative).
    pub fn set_max_delta(&mut self, seconds: f64) {
        self.max_delta = if seconds.is_nan() { 0.0 } else { seconds.max(0.0) };
    }

    /// Zero elapsed and delta. Scale, cap and pause state are preserved.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.delta = 0.0;
        self.frame = 0;
    }

    /// Total scaled time since creation or the last reset, in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Scaled delta of the most recent update, in seconds.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn max_delta(&self) -> f64 {
        self.max_delta
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Number of updates since creation or the last reset.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
