//! Single-assignment delivery of a probe outcome.
//!
//! A probe can finish in three ways (response, transport error, timeout)
//! and the signals for them race each other. Each signal tries to fill the
//! same `OutcomeSlot`; only the first one is delivered, later ones are
//! dropped.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;

use super::types::CheckOutcome;

/// One-shot outcome slot shared by the competing completion signals
#[derive(Debug)]
pub struct OutcomeSlot<T> {
    sender: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> OutcomeSlot<T> {
    /// Create a slot and the receiver its single value is delivered to
    pub fn channel() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (Self { sender: Mutex::new(Some(tx)) }, rx)
    }

    /// Deliver `value` unless something already was.
    ///
    /// Returns `true` only for the call that claimed the slot.
    pub fn deliver(&self, value: T) -> bool {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner).take();
        match sender {
            Some(sender) => {
                // A dropped receiver means nobody is waiting anymore
                let _ = sender.send(value);
                true
            }
            None => false,
        }
    }
}

/// Race `request` against a `budget` timer and return whichever finishes first.
///
/// Both sides run as their own tasks and report through one `OutcomeSlot`;
/// the losing side is aborted once an outcome has been received.
pub async fn first_outcome<F>(request: F, budget: Duration) -> CheckOutcome
where
    F: Future<Output = CheckOutcome> + Send + 'static,
{
    let (slot, outcome_rx) = OutcomeSlot::channel();
    let slot = Arc::new(slot);

    let request_task = {
        let slot = Arc::clone(&slot);
        tokio::spawn(async move {
            let outcome = request.await;
            slot.deliver(outcome);
        })
    };

    let timer_task = {
        let slot = Arc::clone(&slot);
        tokio::spawn(async move {
            tokio::time::sleep(budget).await;
            slot.deliver(CheckOutcome::Timeout);
        })
    };

    drop(slot);

    let outcome = outcome_rx.await.unwrap_or_else(|_| CheckOutcome::TransportError {
        detail: "probe ended without reporting an outcome".to_string(),
    });

    request_task.abort();
    timer_task.abort();

    outcome
}
