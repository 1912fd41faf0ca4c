//! Debounced autosave
//!
//! Each mutation re-arms a single timer. When the timer fires, the snapshot
//! captured at scheduling time is written to the store. Outcomes come back as
//! [`AutosaveEvent`]s on a channel, so a save that completes after the session
//! is gone touches nothing but the channel.

use crate::scene::SceneSnapshot;
use crate::store::DesignStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Result of one autosave attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AutosaveEvent {
    Saved { design_id: String, at: DateTime<Utc> },
    Failed { design_id: String, message: String },
}

struct PendingSave {
    cancel: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct AutosaveScheduler<S: DesignStore> {
    store: Arc<S>,
    design_id: String,
    delay: Duration,
    pending: Option<PendingSave>,
    events_tx: mpsc::UnboundedSender<AutosaveEvent>,
    events_rx: mpsc::UnboundedReceiver<AutosaveEvent>,
}

impl<S: DesignStore> AutosaveScheduler<S> {
    pub fn new(store: Arc<S>, design_id: impl Into<String>, delay: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            store,
            design_id: design_id.into(),
            delay,
            pending: None,
            events_tx,
            events_rx,
        }
    }

    /// Re-arm the timer with a new snapshot. Returns false, leaving nothing
    /// armed, when called outside a tokio runtime.
    pub fn schedule(&mut self, snapshot: SceneSnapshot) -> bool {
        self.cancel();

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                log::warn!("Autosave for {} not armed: {}", self.design_id, e);
                return false;
            }
        };

        let (cancel, cancelled) = oneshot::channel::<()>();
        let store = Arc::clone(&self.store);
        let design_id = self.design_id.clone();
        let events = self.events_tx.clone();
        let delay = self.delay;

        let handle = runtime.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancelled => return,
            }

            // From here on the save runs to completion even if cancelled
            let event = match store.save_snapshot(&design_id, &snapshot).await {
                Ok(()) => {
                    log::info!("Autosaved design {}", design_id);
                    AutosaveEvent::Saved {
                        design_id,
                        at: Utc::now(),
                    }
                }
                Err(e) => {
                    log::error!("Autosave of design {} failed: {}", design_id, e);
                    AutosaveEvent::Failed {
                        design_id,
                        message: e.to_string(),
                    }
                }
            };
            let _ = events.send(event);
        });

        log::debug!(
            "Autosave for {} armed ({} ms)",
            self.design_id,
            self.delay.as_millis()
        );
        self.pending = Some(PendingSave { cancel, handle });
        true
    }

    /// Disarm the pending timer, if any. A save already in flight finishes.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            let _ = pending.cancel.send(());
        }
    }

    /// True while a timer is armed or its save is still running
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// Collect every outcome reported since the last call
    pub fn drain_events(&mut self) -> Vec<AutosaveEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn design_id(&self) -> &str {
        &self.design_id
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<S: DesignStore> Drop for AutosaveScheduler<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}
