//! # Notifier: bridges the bus to the subscriber set.
//!
//! One listener task per facade. It receives every [`Event`] published on the [`Bus`] and
//! hands it to the [`SubscriberSet`] (fire-and-forget, never blocks publishers).
//!
//! ```text
//! Controller/Facade ── publish ──► Bus ──► listener ──► SubscriberSet::emit_arc
//!                                             ▲
//!                                   stop ─────┘  (drain buffered events, then shut workers down)
//! ```
//!
//! Lagging behind the bus skips the oldest events for all subscribers; the gap is logged.

use std::sync::Arc;

use tokio::sync::{broadcast::error::RecvError, broadcast::error::TryRecvError, oneshot};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::events::{Bus, Event};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Owns the listener task feeding the subscribers.
pub(crate) struct Notifier {
    stop: Option<oneshot::Sender<()>>,
    listener: Option<JoinHandle<()>>,
    subscribers: usize,
}

impl Notifier {
    /// Spawns the listener when there is at least one subscriber.
    ///
    /// Must be called inside a tokio runtime unless `subs` is empty.
    pub(crate) fn start(bus: &Bus, subs: Vec<Arc<dyn Subscribe>>) -> Self {
        if subs.is_empty() {
            return Self {
                stop: None,
                listener: None,
                subscribers: 0,
            };
        }

        let rx = bus.subscribe();
        let set = SubscriberSet::new(subs, bus.clone());
        let subscribers = set.len();
        let (stop_tx, stop_rx) = oneshot::channel();
        let listener = tokio::spawn(listen(rx, set, stop_rx));

        Self {
            stop: Some(stop_tx),
            listener: Some(listener),
            subscribers,
        }
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers
    }

    /// Delivers everything already published, then stops the subscriber workers.
    pub(crate) async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(listener) = self.listener.take() {
            let _ = listener.await;
        }
    }
}

async fn listen(
    mut rx: tokio::sync::broadcast::Receiver<Event>,
    set: SubscriberSet,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            recv = rx.recv() => match recv {
                Ok(ev) => set.emit_arc(Arc::new(ev)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notifier lagged behind the event bus");
                }
                Err(RecvError::Closed) => break,
            },
            // Also taken when the owner is dropped without shutdown.
            _ = &mut stop => {
                loop {
                    match rx.try_recv() {
                        Ok(ev) => set.emit_arc(Arc::new(ev)),
                        Err(TryRecvError::Lagged(_)) => continue,
                        Err(_) => break,
                    }
                }
                break;
            }
        }
    }
    set.shutdown().await;
}
