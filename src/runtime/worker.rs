//! Worker spawn loop and handles.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::message::{Delivery, Envelope};
use crate::stage::{Stage, StageContext};
use crate::types::WorkerId;

/// Sending half of a worker's queue.
///
/// A mailbox accepts [`Delivery`] items: envelopes or the in-band terminate
/// marker. It is the unit of wiring between stages; build layers hand a
/// worker's mailbox to every upstream that should feed it.
pub struct Mailbox<T>(flume::Sender<Delivery<T>>);

impl<T> Mailbox<T> {
    /// Create an unbounded mailbox and its receiving end.
    ///
    /// [`spawn`] creates its own channel; this constructor exists for build
    /// layers and tests that need to observe deliveries directly.
    #[must_use]
    pub fn channel() -> (Self, flume::Receiver<Delivery<T>>) {
        let (tx, rx) = flume::unbounded();
        (Self(tx), rx)
    }

    /// Enqueue one delivery. On a disconnected queue the delivery is handed
    /// back so the caller can re-route it.
    pub fn deliver(&self, delivery: Delivery<T>) -> Result<(), Delivery<T>> {
        self.0.send(delivery).map_err(|err| err.into_inner())
    }

    /// Number of deliveries currently queued.
    #[must_use]
    pub fn queue_depth(&self) -> usize {
        self.0.len()
    }
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Lifecycle state observable through [`WorkerHandle::watch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerStatus {
    Running,
    Terminated,
}

/// A delivery rejected because the worker's queue has disconnected.
///
/// Gives the envelope back so callers (the load-balancing pool, notably)
/// can re-route it to another worker.
#[derive(Debug)]
pub struct SendRejected<I>(Envelope<I>);

impl<I> SendRejected<I> {
    #[must_use]
    pub fn into_envelope(self) -> Envelope<I> {
        self.0
    }
}

/// Handle to one live worker: its mailbox plus lifecycle controls.
pub struct WorkerHandle<I> {
    id: WorkerId,
    mailbox: Mailbox<I>,
    status: watch::Receiver<WorkerStatus>,
    join: JoinHandle<()>,
}

impl<I: Send + 'static> WorkerHandle<I> {
    #[must_use]
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// A cloneable sending end for wiring this worker downstream of others.
    #[must_use]
    pub fn mailbox(&self) -> Mailbox<I> {
        self.mailbox.clone()
    }

    /// Enqueue one envelope for this worker. Per-destination FIFO; the
    /// worker processes envelopes in arrival order.
    pub fn send(&self, envelope: Envelope<I>) -> Result<(), SendRejected<I>> {
        self.mailbox
            .deliver(Delivery::Message(envelope))
            .map_err(|rejected| match rejected {
                Delivery::Message(envelope) => SendRejected(envelope),
                Delivery::Terminate => unreachable!("terminate not sent here"),
            })
    }

    /// Ask the worker to stop once it has drained everything already queued.
    ///
    /// The marker travels in-band, so a `send` followed by `terminate` still
    /// delivers the message. Safe to call on an already-stopped worker.
    pub fn terminate(&self) {
        let _ = self.mailbox.deliver(Delivery::Terminate);
    }

    /// Subscribe to this worker's lifecycle. The receiver flips to
    /// [`WorkerStatus::Terminated`] when the worker loop exits for any
    /// reason, including a panic inside the stage.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<WorkerStatus> {
        self.status.clone()
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        matches!(*self.status.borrow(), WorkerStatus::Terminated)
    }

    /// Deliveries currently waiting in this worker's queue.
    #[must_use]
    pub fn queue_depth(&self) -> usize {
        self.mailbox.queue_depth()
    }

    /// Wait for the worker task to finish.
    pub async fn join(self) {
        let _ = self.join.await;
    }
}

struct StatusGuard(watch::Sender<WorkerStatus>);

impl Drop for StatusGuard {
    fn drop(&mut self) {
        let _ = self.0.send(WorkerStatus::Terminated);
    }
}

/// Create and start one worker realizing `stage`.
///
/// The worker owns its stage instance and processes its mailbox strictly
/// sequentially. It stops when it receives [`Delivery::Terminate`] or when
/// every mailbox clone has been dropped. A failing `ingest` is reported via
/// the context's fault path and does not stop the worker.
pub fn spawn<S: Stage>(mut stage: S, ctx: StageContext<S::Output>) -> WorkerHandle<S::Input> {
    let (mailbox, receiver) = Mailbox::channel();
    let (status_tx, status_rx) = watch::channel(WorkerStatus::Running);
    let id = WorkerId::new();

    let join = tokio::spawn(async move {
        let _guard = StatusGuard(status_tx);
        while let Ok(delivery) = receiver.recv_async().await {
            match delivery {
                Delivery::Message(envelope) => {
                    if let Err(error) = stage.ingest(envelope.payload, &ctx).await {
                        ctx.report_fault(id, &error);
                    }
                }
                Delivery::Terminate => break,
            }
        }
        // Disconnect the queue before the status guard flips to Terminated.
        drop(receiver);
        tracing::debug!(worker = %id, "worker loop finished");
    });

    WorkerHandle {
        id,
        mailbox,
        status: status_rx,
        join,
    }
}
