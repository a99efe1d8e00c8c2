// Player configuration

use std::time::Duration;

/// Default progress polling interval
pub const DEFAULT_PERIODIC_TIME_INTERVAL: Duration = Duration::from_millis(500);

/// Buffered-ahead threshold above which a waiting player resumes immediately
pub const DEFAULT_MIN_BUFFERED_MS: f64 = 8000.0;

/// Tolerance window used for seeks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeekTolerance {
    /// Let the engine land on the nearest convenient frame (responsive)
    #[default]
    Infinite,
    /// Land exactly on the requested time (frame accurate)
    Exact,
}

impl SeekTolerance {
    pub fn as_seconds(self) -> f64 {
        match self {
            SeekTolerance::Infinite => f64::INFINITY,
            SeekTolerance::Exact => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// How often the progress observer polls the current time
    pub periodic_time_interval: Duration,
    /// Minimum buffered-ahead milliseconds before forcing playback to resume
    pub min_buffered_ms: f64,
    pub seek_tolerance: SeekTolerance,
}

impl PlayerConfig {
    pub fn with_periodic_time_interval(mut self, interval: Duration) -> Self {
        self.periodic_time_interval = interval;
        self
    }

    pub fn with_min_buffered_ms(mut self, min_buffered_ms: f64) -> Self {
        self.min_buffered_ms = min_buffered_ms;
        self
    }

    pub fn with_seek_tolerance(mut self, tolerance: SeekTolerance) -> Self {
        self.seek_tolerance = tolerance;
        self
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            periodic_time_interval: DEFAULT_PERIODIC_TIME_INTERVAL,
            min_buffered_ms: DEFAULT_MIN_BUFFERED_MS,
            seek_tolerance: SeekTolerance::default(),
        }
    }
}
