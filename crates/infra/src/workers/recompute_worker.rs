use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::warn;

use shelflife_core::{Clock, StoreId};

use crate::catalog::ProductCatalog;
use crate::notifier::{ChangeNotifier, Subscription};
use crate::recompute::RecomputeService;
use crate::transaction_store::TransactionStore;

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Notifier-driven recompute loop.
///
/// - Subscribes to the change notifier
/// - Runs a full recompute per signal (idempotent, so at-least-once delivery
///   and duplicate signals are harmless)
/// - Supports graceful shutdown
/// - Optional pinning to a single store (signals for other stores are ignored)
#[derive(Debug)]
pub struct RecomputeWorker;

impl RecomputeWorker {
    /// Spawn a worker thread that recomputes on every change signal.
    ///
    /// `store_id`: when provided, signals for other stores are ignored.
    pub fn spawn<N, S, C, K>(
        name: &'static str,
        notifier: N,
        service: Arc<RecomputeService<S, C, K>>,
        store_id: Option<StoreId>,
    ) -> WorkerHandle
    where
        N: ChangeNotifier,
        S: TransactionStore + 'static,
        C: ProductCatalog + 'static,
        K: Clock + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let sub = notifier.subscribe();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(name, sub, shutdown_rx, store_id, service))
            .expect("failed to spawn recompute worker thread");

        WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }
}

fn worker_loop<S, C, K>(
    name: &'static str,
    sub: Subscription<crate::notifier::ChangeSignal>,
    shutdown_rx: mpsc::Receiver<()>,
    pinned: Option<StoreId>,
    service: Arc<RecomputeService<S, C, K>>,
) where
    S: TransactionStore,
    C: ProductCatalog,
    K: Clock,
{
    let tick = Duration::from_millis(250);

    loop {
        // Shutdown check (non-blocking)
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        match sub.recv_timeout(tick) {
            Ok(signal) => {
                if let Some(p) = pinned {
                    if signal.store_id != p {
                        continue;
                    }
                }

                if let Err(err) = service.recompute(signal.store_id) {
                    warn!(worker = name, store_id = %signal.store_id, error = ?err, "recompute failed");
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}
