//! Per-engine event bus.
//!
//! Listeners are registered with [`EventBus::subscribe`] and stay registered
//! for as long as the returned [`Subscription`] is alive. Publishing delivers
//! the event to every listener, in registration order, before returning, so a
//! listener failure is reported to the engine operation that fired the event.

use crate::event::{EngineEvent, EventKind};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// Receiver of engine events.
#[async_trait]
pub trait EventListener: Send + Sync {
    /// Name used when reporting failures.
    fn name(&self) -> &str {
        "listener"
    }

    /// Handle one event.
    async fn on_event(&self, event: &EngineEvent) -> anyhow::Result<()>;
}

/// Errors raised while publishing an event.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("listener '{listener}' failed to handle {kind}: {source}")]
    ListenerFailed {
        listener: String,
        kind: EventKind,
        #[source]
        source: anyhow::Error,
    },
}

struct Registration {
    id: u64,
    listener: Arc<dyn EventListener>,
}

#[derive(Default)]
struct BusInner {
    listeners: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
}

impl BusInner {
    fn remove(&self, id: u64) {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        listeners.retain(|r| r.id != id);
    }
}

/// Event bus owned by one engine instance.
///
/// Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Delivery stops when the subscription is dropped.
    pub fn subscribe(&self, listener: Arc<dyn EventListener>) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let name = listener.name().to_string();

        self.inner
            .listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Registration { id, listener });

        tracing::debug!(subscription = id, listener = %name, "Listener registered");

        Subscription {
            bus: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver an event to all registered listeners.
    ///
    /// The listeners are those registered when the call starts. A listener
    /// subscribed or released while this publish is in progress is not
    /// affected until the next publish, so a released listener may still
    /// receive the event already being delivered.
    ///
    /// Stops at, and returns, the first listener failure.
    pub async fn publish(&self, event: &EngineEvent) -> Result<(), DispatchError> {
        // Snapshot so listeners can (un)subscribe while being called.
        let listeners: Vec<Arc<dyn EventListener>> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|r| Arc::clone(&r.listener))
            .collect();

        for listener in listeners {
            listener
                .on_event(event)
                .await
                .map_err(|source| DispatchError::ListenerFailed {
                    listener: listener.name().to_string(),
                    kind: event.kind(),
                    source,
                })?;
        }

        Ok(())
    }

    /// Number of active subscriptions.
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

/// Handle for a registered listener.
///
/// Once released, the listener receives no event from any publish that
/// starts afterwards. A publish already in progress delivers from its own
/// snapshot and may still reach it.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    bus: Weak<BusInner>,
    id: u64,
}

impl Subscription {
    /// Identifier of this registration, unique within its bus.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unregister now. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            inner.remove(self.id);
            tracing::debug!(subscription = self.id, "Listener unregistered");
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
