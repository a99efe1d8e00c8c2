// Error types for the playback layer
//
// Playback failures are never raised across the player boundary; they are
// recorded as state and exposed through `MediaPlayer::error`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlayerError {
    /// The item or the engine reported a failed state
    #[error("Engine failure: {0}")]
    EngineFailure(String),

    /// A seek was requested before the item was ready to play
    #[error("Seek rejected: item is not ready to play")]
    SeekRejected,

    /// Playback stopped before reaching the end of the item
    #[error("Playback ended with error: {0}")]
    PlaybackEnd(String),

    /// The player was dropped before the operation completed
    #[error("Player context closed")]
    ContextClosed,

    /// No Tokio runtime is available to host the player's main context
    #[error("No runtime available for the main context")]
    NoRuntime,
}

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;
