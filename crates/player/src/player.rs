// Media player facade
//
// Owns the controller on the main context. Engine threads only hold a
// `SignalSender`; the signal pump hops every raw signal onto the main context
// before the controller sees it. Events and seek continuations are collected
// while the controller is locked and delivered after it is released, so
// delegates may call straight back into the player.

use crate::controller::{Dispatch, PlaybackController};
use crate::progress::ProgressObserver;
use crate::view::PlayerView;
use parking_lot::Mutex;
use sjplayer_core::{
    AssetStatus, CallbackManager, MediaEngine, PlayerCallback, PlayerConfig, PlayerError,
    PlayerEvent, Result, SeekingInfo, SignalReceiver, SignalSender, Size, SubscriptionId,
    TimeControlStatus,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// State shared between the facade, the signal pump and progress observers
pub(crate) struct PlayerShared {
    controller: Mutex<PlaybackController>,
    pub(crate) callbacks: CallbackManager,
    queue: Mutex<VecDeque<Dispatch>>,
    delivering: AtomicBool,
}

impl PlayerShared {
    fn new(controller: PlaybackController) -> Self {
        Self {
            controller: Mutex::new(controller),
            callbacks: CallbackManager::new(),
            queue: Mutex::new(VecDeque::new()),
            delivering: AtomicBool::new(false),
        }
    }

    /// Mutate the controller, then deliver whatever it produced
    pub(crate) fn with_controller<R>(&self, f: impl FnOnce(&mut PlaybackController) -> R) -> R {
        let result = {
            let mut controller = self.controller.lock();
            let result = f(&mut controller);
            // Enqueue before unlocking so delivery order matches state order
            self.queue.lock().extend(controller.take_outbox());
            result
        };
        self.deliver();
        result
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&PlaybackController) -> R) -> R {
        let controller = self.controller.lock();
        f(&controller)
    }

    pub(crate) fn publish(&self, event: PlayerEvent) {
        {
            let _controller = self.controller.lock();
            self.queue.lock().push_back(Dispatch::Event(event));
        }
        self.deliver();
    }

    /// Drain the queue in production order. A nested call returns at once;
    /// the outermost call keeps draining.
    fn deliver(&self) {
        loop {
            if self.delivering.swap(true, Ordering::AcqRel) {
                return;
            }
            loop {
                let next = self.queue.lock().pop_front();
                match next {
                    Some(Dispatch::Event(event)) => self.callbacks.dispatch_event(event),
                    Some(Dispatch::Completion(completion, finished)) => completion(finished),
                    None => break,
                }
            }
            self.delivering.store(false, Ordering::Release);

            if self.queue.lock().is_empty() {
                return;
            }
        }
    }
}

/// Forwards the built-in observer's progress ticks to the player's delegates
struct ForwardCurrentTime {
    player: Weak<PlayerShared>,
}

impl PlayerCallback for ForwardCurrentTime {
    fn on_event(&self, event: PlayerEvent) {
        if let PlayerEvent::CurrentTimeChanged { .. } = event {
            if let Some(player) = self.player.upgrade() {
                player.publish(event);
            }
        }
    }
}

async fn pump_signals(player: Weak<PlayerShared>, mut receiver: SignalReceiver) {
    while let Some(signal) = receiver.recv().await {
        let Some(shared) = player.upgrade() else {
            break;
        };
        shared.with_controller(|controller| controller.handle_signal(signal));
    }
    log::debug!("signal pump stopped");
}

/// Player bound to one item for its whole life
pub struct MediaPlayer {
    shared: Arc<PlayerShared>,
    signals: SignalSender,
    view: PlayerView,
    runtime: Handle,
    pump: JoinHandle<()>,
    observer: Mutex<Option<ProgressObserver>>,
}

impl MediaPlayer {
    /// Wrap `engine` and start evaluating its item.
    ///
    /// Must be called from within a Tokio runtime; that runtime hosts the
    /// player's main context.
    pub fn new<E>(engine: E, config: PlayerConfig) -> Result<Self>
    where
        E: MediaEngine + 'static,
    {
        crate::init_logging();
        let runtime = Handle::try_current().map_err(|_| PlayerError::NoRuntime)?;
        log::info!("MediaPlayer::new");

        let (signals, receiver) = SignalSender::channel();
        let mut engine: Box<dyn MediaEngine> = Box::new(engine);
        engine.attach(signals.clone());

        let interval = config.periodic_time_interval;
        let shared = Arc::new(PlayerShared::new(PlaybackController::new(engine, config)));
        let pump = runtime.spawn(pump_signals(Arc::downgrade(&shared), receiver));

        let player = Self {
            view: PlayerView::new(signals.clone()),
            shared,
            signals,
            runtime,
            pump,
            observer: Mutex::new(None),
        };
        player.install_observer(interval);
        player.shared.with_controller(|controller| controller.prepare());
        Ok(player)
    }

    fn install_observer(&self, interval: Duration) {
        let forward = Arc::new(ForwardCurrentTime {
            player: Arc::downgrade(&self.shared),
        });
        let observer =
            ProgressObserver::attach(&self.shared, self.runtime.clone(), interval, forward);
        // Replacing drops the previous observer, which tears it down
        *self.observer.lock() = Some(observer);
    }

    pub(crate) fn shared(&self) -> &Arc<PlayerShared> {
        &self.shared
    }

    pub(crate) fn runtime(&self) -> &Handle {
        &self.runtime
    }

    // ------------------------------------------------------------------
    // Delegates
    // ------------------------------------------------------------------

    pub fn add_callback(&self, callback: Arc<dyn PlayerCallback>) -> SubscriptionId {
        self.shared.callbacks.add_callback(callback)
    }

    pub fn remove_callback(&self, id: SubscriptionId) -> bool {
        self.shared.callbacks.remove_callback(id)
    }

    /// Sender engines and hosts use to post raw signals
    pub fn signal_sender(&self) -> SignalSender {
        self.signals.clone()
    }

    pub fn view(&self) -> &PlayerView {
        &self.view
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    pub fn play(&self) {
        log::info!("play called");
        self.shared.with_controller(|controller| controller.play());
    }

    pub fn pause(&self) {
        log::info!("pause called");
        self.shared.with_controller(|controller| controller.pause());
    }

    pub fn replay(&self) {
        log::info!("replay called");
        self.shared.with_controller(|controller| controller.replay());
    }

    /// Seek to `time` seconds; `completion` runs exactly once on the main context
    pub fn seek_to<F>(&self, time: f64, completion: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        log::info!("seek called -> {:.3}s", time);
        self.shared
            .with_controller(|controller| controller.seek_to(time, completion));
    }

    /// Future form of [`MediaPlayer::seek_to`]
    pub async fn seek(&self, time: f64) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.seek_to(time, move |finished| {
            let _ = tx.send(finished);
        });
        rx.await.map_err(|_| PlayerError::ContextClosed)
    }

    pub fn periodic_time_interval(&self) -> Duration {
        self.observer
            .lock()
            .as_ref()
            .map(|observer| observer.interval())
            .unwrap_or_else(|| self.shared.read(|c| c.config().periodic_time_interval))
    }

    /// Rebuild the progress observer with a new polling interval
    pub fn set_periodic_time_interval(&self, interval: Duration) {
        log::info!("periodic time interval -> {:?}", interval);
        drop(self.observer.lock().take());
        self.install_observer(interval);
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    pub fn asset_status(&self) -> AssetStatus {
        self.shared.read(|c| c.asset_status())
    }

    pub fn time_control_status(&self) -> TimeControlStatus {
        self.shared.read(|c| c.time_control_status())
    }

    pub fn current_time(&self) -> f64 {
        self.shared.read(|c| c.current_time())
    }

    pub fn duration(&self) -> Option<f64> {
        self.shared.read(|c| c.duration())
    }

    pub fn playable_duration(&self) -> Option<f64> {
        self.shared.read(|c| c.playable_duration())
    }

    pub fn presentation_size(&self) -> Option<Size> {
        self.shared.read(|c| c.presentation_size())
    }

    pub fn is_played(&self) -> bool {
        self.shared.read(|c| c.is_played())
    }

    pub fn is_replayed(&self) -> bool {
        self.shared.read(|c| c.is_replayed())
    }

    pub fn is_playback_finished(&self) -> bool {
        self.shared.read(|c| c.is_playback_finished())
    }

    pub fn seeking_info(&self) -> SeekingInfo {
        self.shared.read(|c| c.seeking_info())
    }

    pub fn error(&self) -> Option<PlayerError> {
        self.shared.read(|c| c.error())
    }

    pub fn volume(&self) -> f32 {
        self.shared.read(|c| c.volume())
    }

    pub fn set_volume(&self, volume: f32) {
        self.shared.with_controller(|c| c.set_volume(volume));
    }

    pub fn is_muted(&self) -> bool {
        self.shared.read(|c| c.is_muted())
    }

    pub fn set_muted(&self, muted: bool) {
        self.shared.with_controller(|c| c.set_muted(muted));
    }
}

impl Drop for MediaPlayer {
    fn drop(&mut self) {
        log::info!("MediaPlayer dropped");
        self.observer.lock().take();
        self.pump.abort();
    }
}
