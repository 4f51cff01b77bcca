use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 16;

/// Create a connectivity signal pair with the given initial state.
///
/// The platform's network observer feeds the [`ConnectivitySignal`]; the
/// sync side holds the [`ConnectivityMonitor`]. Duplicate notifications or
/// missed edges on the signal side only cause an extra or delayed drain,
/// never state corruption, so the feeding contract is deliberately loose.
pub fn channel(initially_connected: bool) -> (ConnectivitySignal, ConnectivityMonitor) {
    let (sender, receiver) = broadcast::channel(CHANNEL_CAPACITY);
    let connected = Arc::new(AtomicBool::new(initially_connected));
    (
        ConnectivitySignal {
            sender,
            connected: Arc::clone(&connected),
        },
        ConnectivityMonitor {
            receiver,
            connected,
            last_seen: initially_connected,
        },
    )
}

/// Write half: fed by the platform's network observer
pub struct ConnectivitySignal {
    sender: broadcast::Sender<bool>,
    connected: Arc<AtomicBool>,
}

impl ConnectivitySignal {
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
        // send only fails with no receivers left, which just means the
        // monitor side has shut down
        let _ = self.sender.send(connected);
    }
}

/// Read half: waits for disconnected-to-connected transitions
pub struct ConnectivityMonitor {
    receiver: broadcast::Receiver<bool>,
    connected: Arc<AtomicBool>,
    last_seen: bool,
}

impl ConnectivityMonitor {
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Wait until the signal transitions from disconnected to connected.
    ///
    /// Repeated "connected" notifications without an intervening disconnect
    /// do not count as a new edge. A lagged receiver resynchronizes from the
    /// current state (worst case: one delayed drain). Returns `None` once
    /// the signal side has been dropped.
    pub async fn wait_for_reconnect(&mut self) -> Option<()> {
        loop {
            let connected = match self.receiver.recv().await {
                Ok(connected) => connected,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Connectivity monitor lagged {} notifications", skipped);
                    self.connected.load(Ordering::Relaxed)
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            };

            let was_connected = self.last_seen;
            self.last_seen = connected;

            if connected && !was_connected {
                debug!("Connectivity regained");
                return Some(());
            }
        }
    }
}
