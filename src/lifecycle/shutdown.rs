//! Shutdown coordination for the gateway.

use tokio::sync::broadcast;

use crate::lifecycle::signals;

/// Coordinator for graceful shutdown.
///
/// Servers subscribe and stop when either the coordinator is triggered or
/// the process receives a termination signal.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves on the first of a broadcast trigger or an OS termination signal.
///
/// A closed channel is not treated as a trigger.
pub async fn wait_for_shutdown(mut rx: broadcast::Receiver<()>) {
    let triggered = async {
        loop {
            match rx.recv().await {
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => return,
                Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
            }
        }
    };

    tokio::select! {
        _ = triggered => tracing::info!("Shutdown triggered"),
        _ = signals::terminate() => tracing::info!("Shutdown signal received"),
    }
}
