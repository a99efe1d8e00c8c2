// Host view surface bound to the engine

use parking_lot::Mutex;
use sjplayer_core::{EngineSignal, SignalSender};
use std::sync::atomic::{AtomicBool, Ordering};

/// How video is scaled inside the view bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoGravity {
    /// Stretch to fill
    Resize,
    /// Fit, preserving aspect ratio
    #[default]
    ResizeAspect,
    /// Fill, preserving aspect ratio and cropping
    ResizeAspectFill,
}

/// Renderable surface the host binds to its native layer.
///
/// The host reports readiness from whatever thread its layer notifies on;
/// the transition is forwarded to the player as a raw signal.
pub struct PlayerView {
    ready_for_display: AtomicBool,
    video_gravity: Mutex<VideoGravity>,
    signals: SignalSender,
}

impl PlayerView {
    pub fn new(signals: SignalSender) -> Self {
        Self {
            ready_for_display: AtomicBool::new(false),
            video_gravity: Mutex::new(VideoGravity::default()),
            signals,
        }
    }

    pub fn is_ready_for_display(&self) -> bool {
        self.ready_for_display.load(Ordering::Acquire)
    }

    /// Called by the host when its layer's readiness changes
    pub fn set_ready_for_display(&self, ready: bool) {
        let was_ready = self.ready_for_display.swap(ready, Ordering::AcqRel);
        if ready && !was_ready {
            self.signals.send(EngineSignal::ReadyForDisplay);
        }
    }

    pub fn video_gravity(&self) -> VideoGravity {
        *self.video_gravity.lock()
    }

    pub fn set_video_gravity(&self, gravity: VideoGravity) {
        *self.video_gravity.lock() = gravity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transitions_to_ready_are_signalled() {
        let (signals, mut receiver) = SignalSender::channel();
        let view = PlayerView::new(signals);

        view.set_ready_for_display(true);
        view.set_ready_for_display(true);
        view.set_ready_for_display(false);
        view.set_ready_for_display(true);

        assert_eq!(receiver.try_recv(), Some(EngineSignal::ReadyForDisplay));
        assert_eq!(receiver.try_recv(), Some(EngineSignal::ReadyForDisplay));
        assert_eq!(receiver.try_recv(), None);
    }

    #[test]
    fn test_gravity_defaults_to_aspect_fit() {
        let (signals, _receiver) = SignalSender::channel();
        let view = PlayerView::new(signals);
        assert_eq!(view.video_gravity(), VideoGravity::ResizeAspect);

        view.set_video_gravity(VideoGravity::ResizeAspectFill);
        assert_eq!(view.video_gravity(), VideoGravity::ResizeAspectFill);
    }
}
