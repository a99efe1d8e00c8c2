// Playback state types shared by the controller and its observers

use crate::engine::{EngineTimeControl, ReadyState};

/// Readiness of the attached asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStatus {
    /// Nothing evaluated yet
    Unknown,
    /// Item attached, waiting for the engine to evaluate it
    Preparing,
    /// Item and engine are both ready
    ReadyToPlay,
    /// Item or engine failed; terminal for this controller
    Failed,
}

impl AssetStatus {
    /// Merge the item and engine readiness into the next asset status.
    ///
    /// Failure wins, both-ready promotes, anything else keeps the current
    /// value, so a ready asset never drops back to `Preparing`/`Unknown`.
    pub fn reconciled(self, item: ReadyState, engine: ReadyState) -> AssetStatus {
        match (item, engine) {
            (ReadyState::Failed, _) | (_, ReadyState::Failed) => AssetStatus::Failed,
            (ReadyState::ReadyToPlay, ReadyState::ReadyToPlay) => AssetStatus::ReadyToPlay,
            _ => self,
        }
    }
}

/// Playback intent as seen by consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeControlStatus {
    /// Paused, or nothing requested yet
    Paused,
    /// Play requested; buffering or evaluating whether playback can start
    WaitingToPlay,
    /// Play requested and the engine is rendering
    Playing,
}

impl From<EngineTimeControl> for TimeControlStatus {
    fn from(status: EngineTimeControl) -> Self {
        match status {
            EngineTimeControl::Paused => TimeControlStatus::Paused,
            EngineTimeControl::WaitingToPlayAtSpecifiedRate => TimeControlStatus::WaitingToPlay,
            EngineTimeControl::Playing => TimeControlStatus::Playing,
            EngineTimeControl::Unknown(raw) => {
                log::warn!("Unknown engine time-control status {}, treating as paused", raw);
                TimeControlStatus::Paused
            }
        }
    }
}

/// In-flight seek bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeekingInfo {
    pub is_seeking: bool,
    pub target_time: f64,
}

/// Presentation size of the video track
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ReadyState; 3] = [ReadyState::Unknown, ReadyState::ReadyToPlay, ReadyState::Failed];

    #[test]
    fn test_ready_asset_never_regresses() {
        for item in ALL {
            for engine in ALL {
                let next = AssetStatus::ReadyToPlay.reconciled(item, engine);
                assert!(
                    matches!(next, AssetStatus::ReadyToPlay | AssetStatus::Failed),
                    "{:?}/{:?} regressed to {:?}",
                    item,
                    engine,
                    next
                );
            }
        }
    }

    #[test]
    fn test_failure_wins_over_readiness() {
        assert_eq!(
            AssetStatus::Preparing.reconciled(ReadyState::ReadyToPlay, ReadyState::Failed),
            AssetStatus::Failed
        );
        assert_eq!(
            AssetStatus::ReadyToPlay.reconciled(ReadyState::Failed, ReadyState::ReadyToPlay),
            AssetStatus::Failed
        );
    }

    #[test]
    fn test_partial_readiness_keeps_current() {
        assert_eq!(
            AssetStatus::Preparing.reconciled(ReadyState::ReadyToPlay, ReadyState::Unknown),
            AssetStatus::Preparing
        );
        assert_eq!(
            AssetStatus::Unknown.reconciled(ReadyState::ReadyToPlay, ReadyState::ReadyToPlay),
            AssetStatus::ReadyToPlay
        );
    }

    #[test]
    fn test_native_status_mapping() {
        assert_eq!(TimeControlStatus::from(EngineTimeControl::Paused), TimeControlStatus::Paused);
        assert_eq!(
            TimeControlStatus::from(EngineTimeControl::WaitingToPlayAtSpecifiedRate),
            TimeControlStatus::WaitingToPlay
        );
        assert_eq!(TimeControlStatus::from(EngineTimeControl::Playing), TimeControlStatus::Playing);
        assert_eq!(
            TimeControlStatus::from(EngineTimeControl::Unknown(7)),
            TimeControlStatus::Paused
        );
    }
}
