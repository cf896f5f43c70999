//! Shutdown coordination.
//!
//! `main` owns one [`Shutdown`] and fires it from the signal task. The relay
//! server holds a [`ShutdownSignal`] and stops accepting when it resolves,
//! then drains the hop chains already in flight.

use tokio::sync::broadcast;

/// Owner side: fires the stop event.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

/// Listener side handed to a relay server.
///
/// Resolves once, either when the owning [`Shutdown`] fires or when it is
/// dropped, so a relay never outlives the handle that started it.
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Stop every subscribed relay. A no-op when none are running.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Wait for the stop event.
    pub async fn recv(mut self) {
        // Ok(()) on trigger, Err(Closed) once the owner is gone; both mean stop.
        let _ = self.rx.recv().await;
    }
}
