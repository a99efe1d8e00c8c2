// Hand-off of raw engine signals onto the player's main context

use crate::engine::EngineSignal;
use tokio::sync::mpsc;

/// Cloneable, thread-safe sender for raw engine signals.
///
/// Engine threads never touch player state. They post here and the player's
/// signal pump applies each signal on the main context, in arrival order.
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: mpsc::UnboundedSender<EngineSignal>,
}

/// Receiving end drained by the player's signal pump
#[derive(Debug)]
pub struct SignalReceiver {
    rx: mpsc::UnboundedReceiver<EngineSignal>,
}

impl SignalSender {
    pub fn channel() -> (SignalSender, SignalReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SignalSender { tx }, SignalReceiver { rx })
    }

    /// Post a signal. Signals sent after the player is gone are dropped.
    pub fn send(&self, signal: EngineSignal) {
        if let Err(err) = self.tx.send(signal) {
            log::debug!("Dropping engine signal, player is gone: {:?}", err.0);
        }
    }
}

impl SignalReceiver {
    pub async fn recv(&mut self) -> Option<EngineSignal> {
        self.rx.recv().await
    }

    /// Non-blocking variant, used when draining synchronously
    pub fn try_recv(&mut self) -> Option<EngineSignal> {
        self.rx.try_recv().ok()
    }
}
