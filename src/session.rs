//! Latest-request-wins state holders for interactive front ends.
//!
//! A [`RequestSlot`] owns at most one in-flight request. Submitting a new
//! request aborts the previous task and bumps a generation counter, and a
//! finishing task only writes its result when its generation is still the
//! current one, so a slow superseded request can never overwrite a newer
//! handle's result.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading { label: String },
    Loaded(T),
    Failed { label: String, reason: String },
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading { .. })
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

struct SlotInner<T> {
    generation: u64,
    state: ViewState<T>,
    task: Option<JoinHandle<()>>,
}

pub struct RequestSlot<T> {
    inner: Arc<Mutex<SlotInner<T>>>,
}

impl<T> Clone for RequestSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for RequestSlot<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SlotInner {
                generation: 0,
                state: ViewState::Idle,
                task: None,
            })),
        }
    }
}

impl<T: Clone + Send + 'static> RequestSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the state half-written,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, SlotInner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start `request`, superseding whatever was in flight.
    /// Must be called from within a Tokio runtime.
    pub fn submit<F>(&self, label: impl Into<String>, request: F) -> u64
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let label = label.into();
        let mut inner = self.lock();

        inner.generation += 1;
        let ticket = inner.generation;
        if let Some(previous) = inner.task.take() {
            debug!("Superseding in-flight request with {} (generation {})", label, ticket);
            previous.abort();
        }
        inner.state = ViewState::Loading { label: label.clone() };

        let slot = Arc::clone(&self.inner);
        inner.task = Some(tokio::spawn(async move {
            let outcome = request.await;

            let mut inner = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if inner.generation != ticket {
                debug!("Discarding stale result for {} (generation {})", label, ticket);
                return;
            }
            inner.state = match outcome {
                Ok(value) => ViewState::Loaded(value),
                Err(e) => ViewState::Failed {
                    label,
                    reason: e.to_string(),
                },
            };
            inner.task = None;
        }));

        ticket
    }

    /// Abort the in-flight request, if any, and return to `Idle`.
    pub fn cancel(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        inner.state = ViewState::Idle;
    }

    /// Replace a loaded value in place, e.g. after re-pricing.
    pub fn update_loaded(&self, f: impl FnOnce(&mut T)) {
        if let ViewState::Loaded(value) = &mut self.lock().state {
            f(value);
        }
    }

    pub fn state(&self) -> ViewState<T> {
        self.lock().state.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }
}
