//! # Notification Dispatcher
//!
//! A bounded queue in front of a [`SupplierNotifier`], drained by one
//! background worker.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Dispatcher Lifecycle                                 │
//! │                                                                         │
//! │  NotificationDispatcher (cloneable handle)                             │
//! │    dispatch(alert) ── try_send ──► queue (capacity N)                  │
//! │                                     │  full / closed → warn!, dropped  │
//! │                                     ▼                                   │
//! │  NotificationWorker::run                                               │
//! │    loop select!                                                        │
//! │      alert    → notifier.notify() → Err → warn!                        │
//! │      shutdown → close queue, deliver what is left, stop                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{LowStockAlert, SupplierNotifier};

/// Background task that delivers queued alerts.
pub struct NotificationWorker {
    notifier: Arc<dyn SupplierNotifier>,
    alert_rx: mpsc::Receiver<LowStockAlert>,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for queueing alerts and stopping the worker.
#[derive(Clone)]
pub struct NotificationDispatcher {
    alert_tx: mpsc::Sender<LowStockAlert>,
    shutdown_tx: mpsc::Sender<()>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl NotificationWorker {
    /// Creates a worker and its handle. The caller spawns [`run`](Self::run).
    pub fn new(
        notifier: Arc<dyn SupplierNotifier>,
        capacity: usize,
    ) -> (Self, NotificationDispatcher) {
        let (alert_tx, alert_rx) = mpsc::channel(capacity.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker = NotificationWorker {
            notifier,
            alert_rx,
            shutdown_rx,
        };

        let handle = NotificationDispatcher {
            alert_tx,
            shutdown_tx,
            worker: Arc::new(Mutex::new(None)),
        };

        (worker, handle)
    }

    pub async fn run(mut self) {
        info!(notifier = self.notifier.name(), "Notification worker starting");

        loop {
            tokio::select! {
                alert = self.alert_rx.recv() => match alert {
                    Some(alert) => self.deliver(&alert).await,
                    None => break,
                },

                _ = self.shutdown_rx.recv() => {
                    info!("Notification worker shutting down");
                    self.alert_rx.close();
                    while let Some(alert) = self.alert_rx.recv().await {
                        self.deliver(&alert).await;
                    }
                    break;
                }
            }
        }

        info!("Notification worker stopped");
    }

    async fn deliver(&self, alert: &LowStockAlert) {
        match self.notifier.notify(alert).await {
            Ok(()) => debug!(
                product_id = %alert.product_id,
                to = %alert.supplier_email,
                "Low stock alert sent"
            ),
            Err(e) => warn!(
                ?e,
                notifier = self.notifier.name(),
                product_id = %alert.product_id,
                to = %alert.supplier_email,
                "Low stock alert delivery failed"
            ),
        }
    }
}

impl NotificationDispatcher {
    /// Creates a worker for `notifier` and spawns it on the current runtime.
    pub fn spawn(notifier: Arc<dyn SupplierNotifier>, capacity: usize) -> Self {
        let (worker, mut handle) = NotificationWorker::new(notifier, capacity);
        let join = tokio::spawn(worker.run());
        handle.worker = Arc::new(Mutex::new(Some(join)));
        handle
    }

    /// Queues an alert without waiting. Returns `false` if it was dropped.
    pub fn dispatch(&self, alert: LowStockAlert) -> bool {
        match self.alert_tx.try_send(alert) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(alert)) => {
                warn!(product_id = %alert.product_id, "Notification queue full, alert dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(alert)) => {
                warn!(product_id = %alert.product_id, "Notification worker stopped, alert dropped");
                false
            }
        }
    }

    /// Stops accepting alerts, delivers the ones already queued, and waits
    /// for the worker to exit when this handle spawned it.
    pub async fn shutdown(&self) {
        if self.shutdown_tx.send(()).await.is_err() {
            debug!("Notification worker already stopped");
        }

        if let Some(join) = self.worker.lock().await.take() {
            if let Err(e) = join.await {
                warn!(?e, "Notification worker ended abnormally");
            }
        }
    }
}
