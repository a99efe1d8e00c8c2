// Player events and the delegate fan-out
// Events are delivered synchronously on the player's main context

use crate::state::{AssetStatus, Size, TimeControlStatus};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Player event types
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Asset status changed
    AssetStatusChanged { status: AssetStatus },

    /// Time-control status changed
    TimeControlStatusChanged { status: TimeControlStatus },

    /// Video presentation size changed
    PresentationSizeChanged { size: Size },

    /// Playback reached the end of the item
    PlaybackFinished,

    /// A replay seek completed and playback is restarting
    ReplayStarted,

    /// Asset duration became known
    DurationChanged { duration: f64 },

    /// End of the buffered region moved
    PlayableDurationChanged { duration: f64 },

    /// The view can render frames
    ReadyForDisplay,

    /// Periodic progress update
    CurrentTimeChanged { time: f64 },

    /// A seek is about to be issued to the engine
    WillSeek { time: f64 },
}

/// Player delegate.
/// Implementations should be lightweight; they run on the main context and
/// may call back into the player.
pub trait PlayerCallback: Send + Sync {
    fn on_event(&self, event: PlayerEvent);
}

impl<F> PlayerCallback for F
where
    F: Fn(PlayerEvent) + Send + Sync,
{
    fn on_event(&self, event: PlayerEvent) {
        self(event)
    }
}

/// Handle returned by [`CallbackManager::add_callback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback manager for handling multiple delegates
pub struct CallbackManager {
    callbacks: Mutex<Vec<(SubscriptionId, Arc<dyn PlayerCallback>)>>,
    next_id: AtomicU64,
}

impl CallbackManager {
    pub fn new() -> Self {
        Self {
            callbacks: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn add_callback(&self, callback: Arc<dyn PlayerCallback>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks.lock().push((id, callback));
        id
    }

    /// Returns false if the subscription was already gone
    pub fn remove_callback(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.callbacks.lock();
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    pub fn dispatch_event(&self, event: PlayerEvent) {
        // Snapshot so delegates can subscribe or unsubscribe while handling
        let callbacks: Vec<Arc<dyn PlayerCallback>> = self
            .callbacks
            .lock()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();

        for callback in callbacks {
            callback.on_event(event.clone());
        }
    }
}

impl Default for CallbackManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Delegate that records every event it receives
#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
pub struct EventRecorder {
    events: Mutex<Vec<PlayerEvent>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PlayerEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&PlayerEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|event| predicate(event)).count()
    }

    /// Values of every `CurrentTimeChanged` event, in order
    pub fn current_times(&self) -> Vec<f64> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                PlayerEvent::CurrentTimeChanged { time } => Some(*time),
                _ => None,
            })
            .collect()
    }

    /// Every `TimeControlStatusChanged` status, in order
    pub fn time_control_changes(&self) -> Vec<TimeControlStatus> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                PlayerEvent::TimeControlStatusChanged { status } => Some(*status),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl PlayerCallback for EventRecorder {
    fn on_event(&self, event: PlayerEvent) {
        self.events.lock().push(event);
    }
}
