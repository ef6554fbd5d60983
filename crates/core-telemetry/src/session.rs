//! Worker subscription bookkeeping for one host session
//!
//! A [`BridgeSession`] is created when the host starts and disposed when it
//! shuts down. It owns the per-worker callback sets, listens on a worker's
//! outbound channel only while that worker has subscribers, and traces every
//! forwarded worker message as a `push.out` event.

use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracebridge_core_redact::Payload;

use crate::emitter::Emitter;
use crate::error::{Result, TelemetryError};

/// Callback invoked with each message a worker sends to the view
pub type WorkerCallback = Box<dyn FnMut(&Payload) -> std::result::Result<(), String> + Send>;

/// Handle returned by [`BridgeSession::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Channel a worker uses to push messages to the view
pub fn worker_channel(worker_id: &str) -> String {
    format!("worker:{worker_id}:for-view")
}

pub struct BridgeSession {
    emitter: Emitter,
    /// Present only while the worker has at least one subscriber
    workers: HashMap<String, BTreeMap<SubscriptionId, WorkerCallback>>,
    next_id: u64,
    disposed: bool,
}

impl std::fmt::Debug for BridgeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeSession")
            .field("session_id", &self.emitter.session_id())
            .field("workers", &self.workers.keys().collect::<Vec<_>>())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl BridgeSession {
    /// Start a session and record its `session-start` lifecycle event
    pub fn start(emitter: Emitter) -> Self {
        emitter.lifecycle(
            "session-start",
            &Payload::map().with_entry("sessionId", emitter.session_id()),
        );
        tracing::debug!(session = emitter.session_id(), "bridge session started");

        Self {
            emitter,
            workers: HashMap::new(),
            next_id: 0,
            disposed: false,
        }
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Register a callback for a worker's messages
    ///
    /// The first subscriber for a worker starts listening on its channel.
    pub fn subscribe(&mut self, worker_id: &str, callback: WorkerCallback) -> Result<SubscriptionId> {
        if self.disposed {
            return Err(TelemetryError::session_disposed(self.emitter.session_id()));
        }

        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let callbacks = self.workers.entry(worker_id.to_string()).or_insert_with(|| {
            tracing::debug!(channel = %worker_channel(worker_id), "listening for worker messages");
            BTreeMap::new()
        });
        callbacks.insert(id, callback);

        Ok(id)
    }

    /// Remove a subscription; returns false if it was not registered
    ///
    /// Removing a worker's last subscriber stops listening on its channel.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(worker_id) = self
            .workers
            .iter()
            .find(|(_, callbacks)| callbacks.contains_key(&id))
            .map(|(worker_id, _)| worker_id.clone())
        else {
            return false;
        };

        if let Some(callbacks) = self.workers.get_mut(&worker_id) {
            callbacks.remove(&id);
            if callbacks.is_empty() {
                self.workers.remove(&worker_id);
                tracing::debug!(channel = %worker_channel(&worker_id), "stopped listening for worker messages");
            }
        }
        true
    }

    pub fn is_listening(&self, worker_id: &str) -> bool {
        self.workers.contains_key(worker_id)
    }

    pub fn subscriber_count(&self, worker_id: &str) -> usize {
        self.workers.get(worker_id).map_or(0, BTreeMap::len)
    }

    /// Forward a worker message to every subscriber
    ///
    /// Records one `push.out` event per forwarded message. A failing or
    /// panicking callback is logged and skipped; the remaining callbacks
    /// still run. Returns the number of callbacks that succeeded.
    pub fn dispatch_worker_message(&mut self, worker_id: &str, message: &Payload) -> usize {
        let Some(callbacks) = self.workers.get_mut(worker_id) else {
            return 0;
        };

        let channel = worker_channel(worker_id);
        self.emitter.push_out(&channel, std::slice::from_ref(message));

        let mut delivered = 0;
        for (id, callback) in callbacks.iter_mut() {
            match catch_unwind(AssertUnwindSafe(|| callback(message))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(reason)) => {
                    tracing::warn!(worker = worker_id, subscription = id.0, %reason, "worker callback failed")
                }
                Err(_) => {
                    tracing::warn!(worker = worker_id, subscription = id.0, "worker callback panicked")
                }
            }
        }
        delivered
    }

    /// Drop every subscription and record the `session-dispose` event
    ///
    /// Idempotent; also runs on drop.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        let workers = self.workers.len() as u64;
        self.workers.clear();
        self.emitter.lifecycle(
            "session-dispose",
            &Payload::map()
                .with_entry("sessionId", self.emitter.session_id())
                .with_entry("workers", workers),
        );
        tracing::debug!(session = self.emitter.session_id(), "bridge session disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for BridgeSession {
    fn drop(&mut self) {
        self.dispose();
    }
}
