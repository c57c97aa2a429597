//! In-memory correlation of outbound approval prompts to inbound button
//! events.
//!
//! Every login attempt opens one entry keyed by an unguessable token. The
//! HTTP handler waits on the entry; the Discord interaction path delivers
//! into it. An entry leaves the table on exactly one of: first delivery,
//! deadline expiry, explicit abandonment, or the waiting future being
//! dropped. The table therefore cannot grow without bound even when no
//! human ever answers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::errors::DkError;

/// The answer a user gives by pressing one of the two prompt buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny,
}

/// What a waiter observes for its token. `Unknown` means the token was
/// never opened or its entry is already gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Allowed,
    Denied,
    TimedOut,
    Unknown,
}

/// Single-use delivery slot. The receiver is taken by the first waiter;
/// a still-present receiver marks the slot as not yet awaited.
struct Slot {
    sender: oneshot::Sender<Verdict>,
    receiver: Option<oneshot::Receiver<Verdict>>,
}

/// Shared table of pending authorizations.
///
/// Cloning is cheap; all clones observe the same table. Lock scope is kept
/// to map lookups only - never across an await or a network call.
#[derive(Clone, Default)]
pub struct PendingAuthorizations {
    inner: Arc<Mutex<HashMap<Uuid, Slot>>>,
}

impl PendingAuthorizations {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Slot>> {
        // A poisoned map only means another thread panicked mid-mutation of
        // an unrelated entry; the per-token state is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate a fresh token with an empty delivery slot.
    pub fn open(&self) -> Uuid {
        let (sender, receiver) = oneshot::channel();
        let token = Uuid::new_v4();
        self.lock().insert(
            token,
            Slot {
                sender,
                receiver: Some(receiver),
            },
        );
        tracing::debug!(%token, "opened authorization slot");
        token
    }

    /// Wait until the slot is filled or `within` elapses.
    ///
    /// Returns `WaitOutcome::Unknown` immediately for a token that is not
    /// in the table (never opened, already consumed, or abandoned). A
    /// second wait on a still-pending token is a programming error and
    /// fails with `DkError::Conflict`.
    ///
    /// The entry is evicted on every exit path, including this future
    /// being dropped before it resolves (e.g. the HTTP client went away),
    /// so a late delivery can never be observed.
    pub async fn wait(&self, token: Uuid, within: Duration) -> Result<WaitOutcome, DkError> {
        let receiver = match self.lock().get_mut(&token) {
            None => return Ok(WaitOutcome::Unknown),
            Some(slot) => match slot.receiver.take() {
                None => {
                    return Err(DkError::Conflict(format!(
                        "authorization {token} already has a waiter"
                    )))
                }
                Some(receiver) => receiver,
            },
        };

        let _evict = EvictOnDrop {
            registry: self,
            token,
        };

        let outcome = match tokio::time::timeout(within, receiver).await {
            Ok(Ok(Verdict::Allow)) => WaitOutcome::Allowed,
            Ok(Ok(Verdict::Deny)) => WaitOutcome::Denied,
            // Sender dropped without a verdict: the entry was abandoned.
            Ok(Err(_)) => WaitOutcome::Unknown,
            Err(_) => WaitOutcome::TimedOut,
        };

        Ok(outcome)
    }

    /// Fill the slot for `token` and wake its waiter.
    ///
    /// Returns false when there is nothing to deliver into - unknown
    /// token, already delivered, timed out, or abandoned. Duplicate
    /// deliveries (e.g. a re-sent platform event) land here.
    pub fn deliver(&self, token: Uuid, verdict: Verdict) -> bool {
        let slot = self.lock().remove(&token);
        match slot {
            Some(slot) => {
                let delivered = slot.sender.send(verdict).is_ok();
                tracing::debug!(%token, ?verdict, delivered, "delivered authorization verdict");
                delivered
            }
            None => {
                tracing::debug!(%token, ?verdict, "verdict for unknown or consumed token");
                false
            }
        }
    }

    /// Drop the entry for `token` without an outcome.
    ///
    /// Used when the prompt could not be sent after the slot was opened.
    pub fn abandon(&self, token: Uuid) -> bool {
        let removed = self.lock().remove(&token).is_some();
        if removed {
            tracing::debug!(%token, "abandoned authorization slot");
        }
        removed
    }

    /// Number of currently open entries.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }
}

/// Removes the registry entry when the wait ends, however it ends.
struct EvictOnDrop<'a> {
    registry: &'a PendingAuthorizations,
    token: Uuid,
}

impl Drop for EvictOnDrop<'_> {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.token);
    }
}
