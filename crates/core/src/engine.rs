// Underlying media engine trait and the raw signals it reports

use crate::error::PlayerError;
use crate::signal::SignalSender;
use crate::state::Size;

/// Readiness reported by the engine for its current item or for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Unknown,
    ReadyToPlay,
    Failed,
}

/// Native time-control status, on engines that expose one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineTimeControl {
    Paused,
    WaitingToPlayAtSpecifiedRate,
    Playing,
    /// A raw value this layer does not know about
    Unknown(i32),
}

/// Why a native engine is waiting to play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitingReason {
    ToMinimizeStalls,
    EvaluatingBufferingRate,
    NoItemToPlay,
}

/// Loaded time range, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub duration: f64,
}

impl TimeRange {
    pub fn new(start: f64, duration: f64) -> Self {
        Self { start, duration }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Identifies one issued seek so its completion can be matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeekToken(pub u64);

/// Seek handed to the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekRequest {
    pub token: SeekToken,
    /// Target position in seconds, already clamped
    pub time: f64,
    /// Allowed distance before the target, in seconds (may be infinite)
    pub tolerance_before: f64,
    /// Allowed distance after the target, in seconds (may be infinite)
    pub tolerance_after: f64,
}

/// Raw engine notifications.
///
/// Status-type signals only say that something changed; the controller reads
/// the current values back from the engine when it reconciles.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineSignal {
    ItemStatusChanged,
    EngineStatusChanged,
    TimeControlChanged,
    LikelyToKeepUpChanged,
    BufferEmptyChanged,
    BufferFullChanged,
    LoadedTimeRangesChanged,
    PresentationSizeChanged(Size),
    /// Asynchronous asset metadata load finished
    DurationLoaded(f64),
    PlayedToEnd,
    FailedToPlayToEnd(String),
    AccessLogEntry(String),
    SeekCompleted { token: SeekToken, finished: bool },
    /// The host view became ready to display frames
    ReadyForDisplay,
}

/// Platform media engine wrapped by the playback controller.
///
/// Every call is non-blocking. Anything asynchronous (seek completion,
/// duration load, buffering changes) is reported later through the
/// [`SignalSender`] handed over in [`MediaEngine::attach`], from any thread.
///
/// After `play`, `pause` or `play_immediately` return, `time_control_status`
/// must already reflect the request.
pub trait MediaEngine: Send {
    /// Receive the sender used to report raw signals
    fn attach(&mut self, signals: SignalSender);

    /// Readiness of the current item
    fn item_status(&self) -> ReadyState;

    /// Readiness of the engine itself
    fn engine_status(&self) -> ReadyState;

    /// Whether the engine reports a native time-control status.
    /// Probed once when the controller is built.
    fn supports_time_control(&self) -> bool;

    /// Native time-control status; only consulted when supported
    fn time_control_status(&self) -> EngineTimeControl {
        EngineTimeControl::Paused
    }

    fn reason_for_waiting_to_play(&self) -> Option<WaitingReason> {
        None
    }

    fn is_playback_likely_to_keep_up(&self) -> bool;

    fn is_playback_buffer_empty(&self) -> bool;

    fn is_playback_buffer_full(&self) -> bool;

    /// Loaded time ranges, ordered by start time
    fn loaded_time_ranges(&self) -> Vec<TimeRange>;

    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    fn presentation_size(&self) -> Option<Size>;

    fn play(&mut self);

    fn pause(&mut self);

    /// Resume at `rate` without waiting to minimize stalls
    fn play_immediately(&mut self, rate: f32);

    fn cancel_pending_seeks(&mut self);

    /// Issue a seek; completion arrives as [`EngineSignal::SeekCompleted`]
    fn seek(&mut self, request: SeekRequest);

    /// Start loading the asset duration; arrives as [`EngineSignal::DurationLoaded`]
    fn load_duration(&mut self);

    fn volume(&self) -> f32;

    fn set_volume(&mut self, volume: f32);

    fn is_muted(&self) -> bool;

    fn set_muted(&mut self, muted: bool);

    /// Error attached to the current item, if any
    fn item_error(&self) -> Option<PlayerError> {
        None
    }

    /// Error attached to the engine, if any
    fn engine_error(&self) -> Option<PlayerError> {
        None
    }
}
