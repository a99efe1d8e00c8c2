// Core types and traits for the SJ media player

pub mod callback;
pub mod config;
pub mod engine;
pub mod error;
pub mod signal;
pub mod state;

// Re-export commonly used types
pub use callback::{CallbackManager, PlayerCallback, PlayerEvent, SubscriptionId};
pub use config::{PlayerConfig, SeekTolerance};
pub use engine::{
    EngineSignal, EngineTimeControl, MediaEngine, ReadyState, SeekRequest, SeekToken, TimeRange,
    WaitingReason,
};
pub use error::{PlayerError, Result};
pub use signal::{SignalReceiver, SignalSender};
pub use state::{AssetStatus, SeekingInfo, Size, TimeControlStatus};

#[cfg(any(test, feature = "test-utils"))]
pub use callback::EventRecorder;
