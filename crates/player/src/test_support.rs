// Recording engine double shared by the unit tests

use parking_lot::Mutex;
use sjplayer_core::{
    EngineSignal, EngineTimeControl, MediaEngine, PlayerError, ReadyState, SeekRequest,
    SignalSender, Size, TimeRange,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Play,
    Pause,
    PlayImmediately,
    CancelPendingSeeks,
    Seek(f64),
    LoadDuration,
}

struct MockState {
    native_time_control: bool,
    item_status: ReadyState,
    engine_status: ReadyState,
    time_control: EngineTimeControl,
    likely_to_keep_up: bool,
    buffer_empty: bool,
    buffer_full: bool,
    loaded_ranges: Vec<TimeRange>,
    current_time: f64,
    presentation_size: Option<Size>,
    volume: f32,
    muted: bool,
    item_error: Option<PlayerError>,
    calls: Vec<EngineCall>,
    seeks: Vec<SeekRequest>,
    signals: Option<SignalSender>,
}

/// Engine double; clones share state so tests keep a handle after the
/// controller takes ownership.
#[derive(Clone)]
pub struct MockEngine {
    state: Arc<Mutex<MockState>>,
}

impl MockEngine {
    fn with_time_control(native_time_control: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                native_time_control,
                item_status: ReadyState::Unknown,
                engine_status: ReadyState::Unknown,
                time_control: EngineTimeControl::Paused,
                likely_to_keep_up: false,
                buffer_empty: false,
                buffer_full: false,
                loaded_ranges: Vec::new(),
                current_time: 0.0,
                presentation_size: None,
                volume: 1.0,
                muted: false,
                item_error: None,
                calls: Vec::new(),
                seeks: Vec::new(),
                signals: None,
            })),
        }
    }

    /// Engine exposing a native time-control status
    pub fn native() -> Self {
        Self::with_time_control(true)
    }

    /// Engine without time-control status; buffering flags drive playback
    pub fn fallback() -> Self {
        Self::with_time_control(false)
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn seeks(&self) -> Vec<SeekRequest> {
        self.state.lock().seeks.clone()
    }

    pub fn set_item_status(&self, status: ReadyState) {
        self.state.lock().item_status = status;
    }

    pub fn set_engine_status(&self, status: ReadyState) {
        self.state.lock().engine_status = status;
    }

    pub fn set_time_control(&self, status: EngineTimeControl) {
        self.state.lock().time_control = status;
    }

    pub fn set_likely_to_keep_up(&self, value: bool) {
        self.state.lock().likely_to_keep_up = value;
    }

    pub fn set_buffer_empty(&self, value: bool) {
        self.state.lock().buffer_empty = value;
    }

    pub fn set_buffer_full(&self, value: bool) {
        self.state.lock().buffer_full = value;
    }

    pub fn set_loaded_ranges(&self, ranges: Vec<TimeRange>) {
        self.state.lock().loaded_ranges = ranges;
    }

    pub fn set_current_time(&self, time: f64) {
        self.state.lock().current_time = time;
    }

    pub fn set_item_error(&self, error: Option<PlayerError>) {
        self.state.lock().item_error = error;
    }

    /// Post a signal the way a real engine thread would
    pub fn emit(&self, signal: EngineSignal) {
        let signals = self.state.lock().signals.clone();
        if let Some(signals) = signals {
            signals.send(signal);
        }
    }

    /// Mark item and engine ready and report both
    pub fn become_ready(&self) {
        self.set_item_status(ReadyState::ReadyToPlay);
        self.set_engine_status(ReadyState::ReadyToPlay);
        self.emit(EngineSignal::ItemStatusChanged);
        self.emit(EngineSignal::EngineStatusChanged);
    }
}

impl MediaEngine for MockEngine {
    fn attach(&mut self, signals: SignalSender) {
        self.state.lock().signals = Some(signals);
    }

    fn item_status(&self) -> ReadyState {
        self.state.lock().item_status
    }

    fn engine_status(&self) -> ReadyState {
        self.state.lock().engine_status
    }

    fn supports_time_control(&self) -> bool {
        self.state.lock().native_time_control
    }

    fn time_control_status(&self) -> EngineTimeControl {
        self.state.lock().time_control
    }

    fn is_playback_likely_to_keep_up(&self) -> bool {
        self.state.lock().likely_to_keep_up
    }

    fn is_playback_buffer_empty(&self) -> bool {
        self.state.lock().buffer_empty
    }

    fn is_playback_buffer_full(&self) -> bool {
        self.state.lock().buffer_full
    }

    fn loaded_time_ranges(&self) -> Vec<TimeRange> {
        self.state.lock().loaded_ranges.clone()
    }

    fn current_time(&self) -> f64 {
        self.state.lock().current_time
    }

    fn presentation_size(&self) -> Option<Size> {
        self.state.lock().presentation_size
    }

    fn play(&mut self) {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::Play);
        if state.time_control == EngineTimeControl::Paused {
            state.time_control = EngineTimeControl::WaitingToPlayAtSpecifiedRate;
        }
    }

    fn pause(&mut self) {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::Pause);
        state.time_control = EngineTimeControl::Paused;
    }

    fn play_immediately(&mut self, _rate: f32) {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::PlayImmediately);
        state.time_control = EngineTimeControl::Playing;
    }

    fn cancel_pending_seeks(&mut self) {
        self.state.lock().calls.push(EngineCall::CancelPendingSeeks);
    }

    fn seek(&mut self, request: SeekRequest) {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::Seek(request.time));
        state.seeks.push(request);
    }

    fn load_duration(&mut self) {
        self.state.lock().calls.push(EngineCall::LoadDuration);
    }

    fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().volume = volume;
    }

    fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.state.lock().muted = muted;
    }

    fn item_error(&self) -> Option<PlayerError> {
        self.state.lock().item_error.clone()
    }
}
