// Periodic progress observer
// Polls the player's current time only while playback is active and drops
// ticks that would repeat the last reported value.

use crate::player::{MediaPlayer, PlayerShared};
use parking_lot::Mutex;
use sjplayer_core::{PlayerCallback, PlayerEvent, SubscriptionId, TimeControlStatus};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Shortest polling period accepted
const MIN_INTERVAL: Duration = Duration::from_millis(1);

struct ObserverState {
    timer: Option<JoinHandle<()>>,
    last_emitted_time: Option<f64>,
}

struct ObserverInner {
    player: Weak<PlayerShared>,
    interval: Duration,
    sink: Arc<dyn PlayerCallback>,
    runtime: Handle,
    state: Mutex<ObserverState>,
}

impl ObserverInner {
    fn resume_or_pause(self: &Arc<Self>, status: TimeControlStatus) {
        if status == TimeControlStatus::Paused {
            self.invalidate();
            return;
        }

        let mut state = self.state.lock();
        if state.timer.as_ref().is_some_and(|timer| !timer.is_finished()) {
            return;
        }
        log::debug!("progress polling every {:?}", self.interval);
        state.timer = Some(self.runtime.spawn(poll(Arc::downgrade(self), self.interval)));
    }

    fn invalidate(&self) {
        if let Some(timer) = self.state.lock().timer.take() {
            log::debug!("progress polling stopped");
            timer.abort();
        }
    }

    /// One tick. Returns false once the player is gone.
    fn refresh(&self) -> bool {
        let Some(player) = self.player.upgrade() else {
            log::debug!("player gone, progress observer is inert");
            return false;
        };
        let (status, current_time) = player.read(|c| (c.time_control_status(), c.current_time()));
        drop(player);

        if status == TimeControlStatus::Paused {
            return true;
        }
        {
            let mut state = self.state.lock();
            if state.last_emitted_time == Some(current_time) {
                return true;
            }
            state.last_emitted_time = Some(current_time);
        }
        self.sink.on_event(PlayerEvent::CurrentTimeChanged { time: current_time });
        true
    }

    fn is_running(&self) -> bool {
        self.state
            .lock()
            .timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for ObserverInner {
    fn drop(&mut self) {
        if let Some(timer) = self.state.get_mut().timer.take() {
            timer.abort();
        }
    }
}

async fn poll(observer: Weak<ObserverInner>, period: Duration) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(observer) = observer.upgrade() else {
            break;
        };
        if !observer.refresh() {
            break;
        }
    }
}

/// Follows the player's status events on behalf of one observer
struct StatusListener {
    observer: Weak<ObserverInner>,
}

impl PlayerCallback for StatusListener {
    fn on_event(&self, event: PlayerEvent) {
        let Some(observer) = self.observer.upgrade() else {
            return;
        };
        match event {
            PlayerEvent::TimeControlStatusChanged { status } => observer.resume_or_pause(status),
            // Not rate limited: passed straight through
            PlayerEvent::DurationChanged { .. } | PlayerEvent::PlayableDurationChanged { .. } => {
                observer.sink.on_event(event)
            }
            _ => {}
        }
    }
}

/// Emits `CurrentTimeChanged` at most once per interval while the player is
/// not paused, plus pass-through duration and playable-duration updates.
///
/// Holds only a weak reference to the player. The interval is fixed; build a
/// new observer to change it.
pub struct ProgressObserver {
    inner: Arc<ObserverInner>,
    subscription: SubscriptionId,
}

impl ProgressObserver {
    /// Observe `player`, reporting to `sink` every `interval`
    pub fn new(player: &MediaPlayer, interval: Duration, sink: Arc<dyn PlayerCallback>) -> Self {
        Self::attach(player.shared(), player.runtime().clone(), interval, sink)
    }

    pub(crate) fn attach(
        player: &Arc<PlayerShared>,
        runtime: Handle,
        interval: Duration,
        sink: Arc<dyn PlayerCallback>,
    ) -> Self {
        let inner = Arc::new(ObserverInner {
            player: Arc::downgrade(player),
            interval: interval.max(MIN_INTERVAL),
            sink,
            runtime,
            state: Mutex::new(ObserverState {
                timer: None,
                last_emitted_time: None,
            }),
        });
        let subscription = player.callbacks.add_callback(Arc::new(StatusListener {
            observer: Arc::downgrade(&inner),
        }));

        inner.resume_or_pause(player.read(|c| c.time_control_status()));
        Self {
            inner,
            subscription,
        }
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    pub fn last_emitted_time(&self) -> Option<f64> {
        self.inner.state.lock().last_emitted_time
    }

    /// Stop polling without notifying anyone
    pub fn invalidate(&self) {
        self.inner.invalidate();
    }

    /// Stop polling and report zero for every value
    pub fn stop(&self) {
        self.inner.invalidate();
        self.inner.state.lock().last_emitted_time = Some(0.0);
        let sink = &self.inner.sink;
        sink.on_event(PlayerEvent::PlayableDurationChanged { duration: 0.0 });
        sink.on_event(PlayerEvent::CurrentTimeChanged { time: 0.0 });
        sink.on_event(PlayerEvent::DurationChanged { duration: 0.0 });
    }
}

impl Drop for ProgressObserver {
    fn drop(&mut self) {
        self.inner.invalidate();
        if let Some(player) = self.inner.player.upgrade() {
            player.callbacks.remove_callback(self.subscription);
        }
    }
}
