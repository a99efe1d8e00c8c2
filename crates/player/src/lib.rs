// Playback reconciliation layer over a platform media engine

pub mod controller;
pub mod player;
pub mod progress;
pub mod view;

#[cfg(test)]
mod test_support;

use once_cell::sync::Lazy;

// Re-exports
pub use controller::{PlaybackController, SeekCompletion, TimeControlStrategy};
pub use player::MediaPlayer;
pub use progress::ProgressObserver;
pub use sjplayer_core::{
    AssetStatus, EngineSignal, EngineTimeControl, MediaEngine, PlayerCallback, PlayerConfig,
    PlayerError, PlayerEvent, ReadyState, Result, SeekRequest, SeekTolerance, SeekToken,
    SeekingInfo, SignalSender, Size, SubscriptionId, TimeControlStatus, TimeRange, WaitingReason,
};
pub use view::{PlayerView, VideoGravity};

static LOGGER: Lazy<()> = Lazy::new(|| {
    // Info by default, RUST_LOG overrides; a host logger already set wins
    let _ = env_logger::builder()
        .is_test(cfg!(test))
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
});

/// Install the default logger once
pub fn init_logging() {
    Lazy::force(&LOGGER);
}
