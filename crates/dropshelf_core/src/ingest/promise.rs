//! One-shot channel implementation of the promised-file contract.
//!
//! # Responsibility
//! - Bridge external delivery mechanisms to `PromisedFile` through a
//!   register-then-complete channel.
//!
//! # Invariants
//! - The callback fires exactly once per promise, including when the ticket
//!   is dropped without completing (reported as a failure, never silence).

use super::payload::{DeliveryCallback, DeliveryResult, PromiseError, PromisedFile};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

/// Completion handle held by the delivering side.
///
/// Consuming methods enforce single delivery at the type level.
pub struct DeliveryTicket {
    tx: mpsc::Sender<DeliveryResult>,
}

impl DeliveryTicket {
    /// Completes the promise with the materialized file path.
    pub fn fulfill(self, path: PathBuf) {
        let _ = self.tx.send(Ok(path));
    }

    /// Completes the promise with a failure.
    pub fn fail(self, reason: impl Into<String>) {
        let _ = self.tx.send(Err(PromiseError::new(reason)));
    }
}

/// Promise half backed by the one-shot channel.
pub struct ChannelPromise {
    rx: mpsc::Receiver<DeliveryResult>,
}

impl PromisedFile for ChannelPromise {
    fn register(self: Box<Self>, on_delivery: DeliveryCallback) {
        thread::spawn(move || {
            let result = self.rx.recv().unwrap_or_else(|_| {
                Err(PromiseError::new(
                    "delivery channel closed before completion",
                ))
            });
            on_delivery(result);
        });
    }
}

/// Creates a connected ticket/promise pair.
pub fn promised_file() -> (DeliveryTicket, ChannelPromise) {
    let (tx, rx) = mpsc::channel();
    (DeliveryTicket { tx }, ChannelPromise { rx })
}
