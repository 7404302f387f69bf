use chrono::Utc;
use graph::{Highlight, HighlightState, MergeOutcome, MergeRequest};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    highlight: Highlight,
}

/// Drives [`Highlight`] with a scheduled expiry.
///
/// Starting or clearing a highlight aborts the pending expiry task, so at most
/// one highlight is ever live. Every change is published on a watch channel.
/// `start` must be called from inside a tokio runtime.
#[derive(Debug)]
pub struct HighlightTimer {
    slot: Arc<Mutex<Slot>>,
    changes: watch::Sender<Option<HighlightState>>,
    pending: Option<JoinHandle<()>>,
}

impl HighlightTimer {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            slot: Arc::default(),
            changes,
            pending: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<HighlightState>> {
        self.changes.subscribe()
    }

    /// The live highlight, if any
    pub fn current(&self) -> Option<HighlightState> {
        lock(&self.slot).highlight.state().cloned()
    }

    /// Highlight a finished merge for `ttl`; a conflicted merge just clears
    pub fn start(
        &mut self,
        request: &MergeRequest,
        outcome: &MergeOutcome,
        ttl: chrono::Duration,
    ) -> Option<HighlightState> {
        self.cancel_pending();

        let (generation, state) = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            let state = slot.highlight.apply_merge(request, outcome, Utc::now(), ttl).cloned();
            (slot.generation, state)
        };
        self.changes.send_replace(state.clone());

        if state.is_some() {
            let slot = Arc::clone(&self.slot);
            let changes = self.changes.clone();
            let wait = ttl.to_std().unwrap_or_default();
            self.pending = Some(tokio::spawn(async move {
                tokio::time::sleep(wait).await;
                let mut slot = lock(&slot);
                if slot.generation == generation {
                    slot.highlight.clear();
                    changes.send_replace(None);
                    debug!("merge highlight expired");
                }
            }));
        }

        state
    }

    /// Drop the live highlight now, as a graph refresh does
    pub fn clear(&mut self) {
        self.cancel_pending();
        let mut slot = lock(&self.slot);
        slot.generation += 1;
        if !slot.highlight.is_idle() {
            slot.highlight.clear();
            self.changes.send_replace(None);
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Default for HighlightTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HighlightTimer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
