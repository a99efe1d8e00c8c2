// Playback status reconciliation
//
// Merges the engine's raw, unordered signals and the explicit play/pause/seek
// calls into one consistent (AssetStatus, TimeControlStatus) pair.

use sjplayer_core::{
    AssetStatus, EngineSignal, MediaEngine, PlayerConfig, PlayerError, PlayerEvent, ReadyState,
    SeekRequest, SeekToken, SeekingInfo, Size, TimeControlStatus, TimeRange,
};

/// Seeks never land on the exact end, which would immediately end playback
const SEEK_END_CLAMP_FACTOR: f64 = 0.98;

/// Ranges closer than this are treated as contiguous
const RANGE_CONTIGUITY_EPSILON: f64 = 0.001;

/// Single-call continuation for a seek, resolved with the engine's finished flag
pub type SeekCompletion = Box<dyn FnOnce(bool) + Send + 'static>;

/// How the time-control status is derived, chosen once from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeControlStrategy {
    /// The engine reports its own time-control status
    Native,
    /// Derived from asset readiness and buffering flags
    BufferingFallback,
}

/// Output produced while the controller is borrowed, delivered afterwards
pub(crate) enum Dispatch {
    Event(PlayerEvent),
    Completion(SeekCompletion, bool),
}

enum SeekContinuation {
    Caller(SeekCompletion),
    Replay,
}

struct PendingSeek {
    token: SeekToken,
    continuation: SeekContinuation,
}

pub struct PlaybackController {
    engine: Box<dyn MediaEngine>,
    config: PlayerConfig,
    strategy: TimeControlStrategy,
    asset_status: AssetStatus,
    time_control_status: TimeControlStatus,
    duration: Option<f64>,
    playable_duration: Option<f64>,
    presentation_size: Option<Size>,
    is_played: bool,
    is_replayed: bool,
    is_playback_finished: bool,
    last_error: Option<PlayerError>,
    seeking_info: SeekingInfo,
    pending_seek: Option<PendingSeek>,
    next_seek_token: u64,
    outbox: Vec<Dispatch>,
}

impl PlaybackController {
    pub fn new(engine: Box<dyn MediaEngine>, config: PlayerConfig) -> Self {
        let strategy = if engine.supports_time_control() {
            TimeControlStrategy::Native
        } else {
            TimeControlStrategy::BufferingFallback
        };
        log::info!("PlaybackController::new ({:?})", strategy);

        Self {
            engine,
            config,
            strategy,
            asset_status: AssetStatus::Unknown,
            time_control_status: TimeControlStatus::Paused,
            duration: None,
            playable_duration: None,
            presentation_size: None,
            is_played: false,
            is_replayed: false,
            is_playback_finished: false,
            last_error: None,
            seeking_info: SeekingInfo::default(),
            pending_seek: None,
            next_seek_token: 1,
            outbox: Vec::new(),
        }
    }

    /// Start evaluating the attached item
    pub fn prepare(&mut self) {
        if self.asset_status == AssetStatus::Unknown {
            self.set_asset_status(AssetStatus::Preparing);
        }
        self.engine.load_duration();
        self.reconcile();
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn strategy(&self) -> TimeControlStrategy {
        self.strategy
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn asset_status(&self) -> AssetStatus {
        self.asset_status
    }

    pub fn time_control_status(&self) -> TimeControlStatus {
        self.time_control_status
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn playable_duration(&self) -> Option<f64> {
        self.playable_duration
    }

    pub fn presentation_size(&self) -> Option<Size> {
        self.presentation_size.or_else(|| self.engine.presentation_size())
    }

    pub fn is_played(&self) -> bool {
        self.is_played
    }

    pub fn is_replayed(&self) -> bool {
        self.is_replayed
    }

    pub fn is_playback_finished(&self) -> bool {
        self.is_playback_finished
    }

    pub fn seeking_info(&self) -> SeekingInfo {
        self.seeking_info
    }

    /// Once finished, the engine position may be stale, so report the duration
    pub fn current_time(&self) -> f64 {
        if self.is_playback_finished {
            self.duration.unwrap_or(0.0)
        } else {
            self.engine.current_time()
        }
    }

    /// Recorded failure first, then the item's, then the engine's
    pub fn error(&self) -> Option<PlayerError> {
        self.last_error
            .clone()
            .or_else(|| self.engine.item_error())
            .or_else(|| self.engine.engine_error())
    }

    pub fn volume(&self) -> f32 {
        self.engine.volume()
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.engine.set_volume(volume.clamp(0.0, 1.0));
    }

    pub fn is_muted(&self) -> bool {
        self.engine.is_muted()
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.engine.set_muted(muted);
    }

    pub(crate) fn take_outbox(&mut self) -> Vec<Dispatch> {
        std::mem::take(&mut self.outbox)
    }

    // ------------------------------------------------------------------
    // Explicit operations
    // ------------------------------------------------------------------

    pub fn play(&mut self) {
        if self.asset_status == AssetStatus::Failed {
            log::debug!("play ignored, asset failed");
            return;
        }
        if self.is_playback_finished {
            self.replay();
            return;
        }
        self.resume();
    }

    pub fn pause(&mut self) {
        self.set_time_control_status(TimeControlStatus::Paused);
        self.engine.pause();
    }

    pub fn replay(&mut self) {
        if self.asset_status == AssetStatus::Failed {
            log::debug!("replay ignored, asset failed");
            return;
        }
        log::info!("replay");
        self.is_replayed = true;
        if self.time_control_status == TimeControlStatus::Paused {
            self.set_time_control_status(TimeControlStatus::WaitingToPlay);
        }
        self.seek_with(0.0, SeekContinuation::Replay);
    }

    /// Seek to `time` seconds; `completion` runs exactly once.
    pub fn seek_to<F>(&mut self, time: f64, completion: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.seek_with(time, SeekContinuation::Caller(Box::new(completion)));
    }

    /// Clamp a requested position into `[0, 0.98 * duration]`
    pub fn clamp_seek_time(&self, time: f64) -> f64 {
        if time.is_nan() || time < 0.0 {
            return 0.0;
        }
        match self.duration {
            Some(duration) if time > duration => duration * SEEK_END_CLAMP_FACTOR,
            _ => time,
        }
    }

    // ------------------------------------------------------------------
    // Raw signals
    // ------------------------------------------------------------------

    pub fn handle_signal(&mut self, signal: EngineSignal) {
        log::debug!("engine signal: {:?}", signal);
        match signal {
            EngineSignal::ItemStatusChanged
            | EngineSignal::EngineStatusChanged
            | EngineSignal::TimeControlChanged
            | EngineSignal::LikelyToKeepUpChanged
            | EngineSignal::BufferEmptyChanged
            | EngineSignal::BufferFullChanged => self.reconcile(),
            EngineSignal::LoadedTimeRangesChanged => self.loaded_time_ranges_did_change(),
            EngineSignal::PresentationSizeChanged(size) => {
                self.presentation_size = Some(size);
                self.emit(PlayerEvent::PresentationSizeChanged { size });
            }
            EngineSignal::DurationLoaded(duration) => self.duration_did_load(duration),
            EngineSignal::PlayedToEnd => self.did_play_to_end(),
            EngineSignal::FailedToPlayToEnd(message) => {
                log::warn!("Failed to play to end: {}", message);
                self.last_error = Some(PlayerError::PlaybackEnd(message));
            }
            EngineSignal::AccessLogEntry(entry) => log::debug!("access log: {}", entry),
            EngineSignal::SeekCompleted { token, finished } => {
                self.did_end_seeking(token, finished)
            }
            EngineSignal::ReadyForDisplay => self.emit(PlayerEvent::ReadyForDisplay),
        }
    }

    /// Re-derive asset and time-control status from the engine's current values
    pub fn reconcile(&mut self) {
        let item = self.engine.item_status();
        let engine = self.engine.engine_status();
        let asset_status = self.asset_status.reconciled(item, engine);
        self.set_asset_status(asset_status);

        if asset_status == AssetStatus::Failed {
            // Terminal: nothing below may bring playback back
            self.set_time_control_status(TimeControlStatus::Paused);
            return;
        }

        match self.strategy {
            TimeControlStrategy::Native => {
                let status = TimeControlStatus::from(self.engine.time_control_status());
                if let Some(reason) = self.engine.reason_for_waiting_to_play() {
                    log::debug!("engine waiting to play: {:?}", reason);
                }
                self.set_time_control_status(status);
            }
            TimeControlStrategy::BufferingFallback => {
                if self.time_control_status == TimeControlStatus::Paused {
                    self.engine.pause();
                    return;
                }
                let can_play = asset_status == AssetStatus::ReadyToPlay
                    && (self.engine.is_playback_buffer_full()
                        || self.engine.is_playback_likely_to_keep_up());
                let status = if can_play {
                    TimeControlStatus::Playing
                } else {
                    TimeControlStatus::WaitingToPlay
                };
                if self.set_time_control_status(status) && status == TimeControlStatus::Playing {
                    self.engine.play();
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn resume(&mut self) {
        self.is_played = true;
        if self.time_control_status == TimeControlStatus::Paused {
            self.set_time_control_status(TimeControlStatus::WaitingToPlay);
        }
        self.engine.play();
        self.reconcile();
    }

    fn play_immediately(&mut self) {
        match self.strategy {
            TimeControlStrategy::Native => {
                self.engine.play_immediately(1.0);
                self.reconcile();
            }
            TimeControlStrategy::BufferingFallback => self.resume(),
        }
    }

    fn seek_with(&mut self, time: f64, continuation: SeekContinuation) {
        let target = self.clamp_seek_time(time);

        if self.engine.item_status() != ReadyState::ReadyToPlay {
            log::warn!("{} (target {:.3}s)", PlayerError::SeekRejected, target);
            self.resolve_seek(continuation, false);
            return;
        }

        self.cancel_pending_seek();

        let token = SeekToken(self.next_seek_token);
        self.next_seek_token += 1;
        self.seeking_info = SeekingInfo {
            is_seeking: true,
            target_time: target,
        };
        self.is_playback_finished = false;
        self.emit(PlayerEvent::WillSeek { time: target });

        let tolerance = self.config.seek_tolerance.as_seconds();
        self.pending_seek = Some(PendingSeek {
            token,
            continuation,
        });
        self.engine.seek(SeekRequest {
            token,
            time: target,
            tolerance_before: tolerance,
            tolerance_after: tolerance,
        });
    }

    /// Resolve the superseded continuation before the engine drops its seek
    fn cancel_pending_seek(&mut self) {
        if let Some(pending) = self.pending_seek.take() {
            log::debug!("cancelling seek {:?}", pending.token);
            self.resolve_seek(pending.continuation, false);
        }
        self.engine.cancel_pending_seeks();
    }

    fn did_end_seeking(&mut self, token: SeekToken, finished: bool) {
        let pending = match self.pending_seek.take() {
            Some(pending) if pending.token == token => pending,
            other => {
                self.pending_seek = other;
                log::debug!("ignoring completion of stale seek {:?}", token);
                return;
            }
        };
        self.seeking_info = SeekingInfo::default();
        self.resolve_seek(pending.continuation, finished);
    }

    fn resolve_seek(&mut self, continuation: SeekContinuation, finished: bool) {
        match continuation {
            SeekContinuation::Caller(completion) => {
                self.outbox.push(Dispatch::Completion(completion, finished));
            }
            SeekContinuation::Replay => {
                if self.asset_status == AssetStatus::Failed {
                    log::debug!("replay abandoned, asset failed");
                    return;
                }
                // Best effort: restart even if the seek did not land
                self.emit(PlayerEvent::ReplayStarted);
                self.is_playback_finished = false;
                self.resume();
            }
        }
    }

    fn did_play_to_end(&mut self) {
        if self.is_playback_finished {
            return;
        }
        log::info!("playback finished");
        self.is_playback_finished = true;
        self.pause();
        self.emit(PlayerEvent::PlaybackFinished);
    }

    fn duration_did_load(&mut self, duration: f64) {
        if !duration.is_finite() || duration < 0.0 {
            log::warn!("Ignoring unusable duration {}", duration);
            return;
        }
        if self.duration == Some(duration) {
            return;
        }
        log::debug!("duration = {}", duration);
        self.duration = Some(duration);
        self.emit(PlayerEvent::DurationChanged { duration });
    }

    fn loaded_time_ranges_did_change(&mut self) {
        let ranges = self.engine.loaded_time_ranges();
        let Some(playable) = contiguous_end(&ranges) else {
            return;
        };

        if self.playable_duration != Some(playable) {
            self.playable_duration = Some(playable);
            self.emit(PlayerEvent::PlayableDurationChanged { duration: playable });
        }

        if self.time_control_status == TimeControlStatus::WaitingToPlay
            && !self.engine.is_playback_buffer_empty()
        {
            let buffered_ms = (playable - self.engine.current_time()) * 1000.0;
            if buffered_ms > self.config.min_buffered_ms {
                log::debug!("buffered {:.0}ms ahead, resuming immediately", buffered_ms);
                self.play_immediately();
            } else {
                log::debug!(
                    "buffering... {:.0}ms / {:.0}ms",
                    buffered_ms,
                    self.config.min_buffered_ms
                );
            }
        }
    }

    fn set_asset_status(&mut self, status: AssetStatus) -> bool {
        if self.asset_status == status {
            return false;
        }
        log::debug!("asset status {:?} -> {:?}", self.asset_status, status);
        self.asset_status = status;
        self.emit(PlayerEvent::AssetStatusChanged { status });
        true
    }

    fn set_time_control_status(&mut self, status: TimeControlStatus) -> bool {
        if self.time_control_status == status {
            return false;
        }
        log::debug!("time control {:?} -> {:?}", self.time_control_status, status);
        self.time_control_status = status;
        self.emit(PlayerEvent::TimeControlStatusChanged { status });
        true
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.outbox.push(Dispatch::Event(event));
    }
}

/// End of the loaded region that starts with the first range
fn contiguous_end(ranges: &[TimeRange]) -> Option<f64> {
    let mut iter = ranges.iter();
    let mut end = iter.next()?.end();
    for range in iter {
        if range.start > end + RANGE_CONTIGUITY_EPSILON {
            break;
        }
        end = end.max(range.end());
    }
    Some(end)
}
