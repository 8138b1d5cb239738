//! Change notification boundary (mechanics only).
//!
//! The notifier carries one fact: "something changed for this store,
//! recompute". Delivery is at-least-once with no ordering guarantee, which is
//! acceptable because recompute is idempotent — a duplicate signal just
//! re-derives the same projection from the same snapshot.

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use shelflife_core::StoreId;

/// "Something changed, re-pull everything" — intentionally payload-free
/// beyond the store scope; there is no incremental update to describe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSignal {
    pub store_id: StoreId,
}

/// A subscription to change signals.
///
/// Designed for single-threaded consumption; the worker loop polls with
/// `recv_timeout` so it can interleave shutdown checks.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Broadcast pub/sub for change signals.
///
/// Each subscriber gets a copy of every published signal. At-least-once is
/// the contract; subscribers must tolerate duplicates.
pub trait ChangeNotifier: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn notify(&self, signal: ChangeSignal) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<ChangeSignal>;
}

impl<N> ChangeNotifier for Arc<N>
where
    N: ChangeNotifier + ?Sized,
{
    type Error = N::Error;

    fn notify(&self, signal: ChangeSignal) -> Result<(), Self::Error> {
        (**self).notify(signal)
    }

    fn subscribe(&self) -> Subscription<ChangeSignal> {
        (**self).subscribe()
    }
}

#[derive(Debug)]
pub enum InMemoryNotifierError {
    /// Publish failed due to internal lock poisoning.
    Poisoned,
}

/// In-memory change notifier for tests/dev.
///
/// - No IO / no async
/// - Best-effort fan-out
/// - At-least-once acceptable (recompute is idempotent)
#[derive(Debug, Default)]
pub struct InMemoryChangeNotifier {
    subscribers: Mutex<Vec<mpsc::Sender<ChangeSignal>>>,
}

impl InMemoryChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChangeNotifier for InMemoryChangeNotifier {
    type Error = InMemoryNotifierError;

    fn notify(&self, signal: ChangeSignal) -> Result<(), Self::Error> {
        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| InMemoryNotifierError::Poisoned)?;

        // Drop any dead subscribers while publishing.
        subs.retain(|tx| tx.send(signal).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription<ChangeSignal> {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned, we still return a subscription;
        // it just won't receive messages until the process restarts.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}
