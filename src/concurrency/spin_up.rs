//! One ephemeral worker per message.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::message::Envelope;
use crate::runtime::{spawn, WorkerHandle};
use crate::stage::{Stage, StageContext, WrapperKind};

use super::errors::IngestError;

/// Marker for the ephemeral-worker strategy; what
/// [`TypeTag::wrapper`](crate::types::TypeTag::wrapper) records in a
/// schematic.
pub struct SpinUp;

impl WrapperKind for SpinUp {}

/// Spawns a fresh worker for every message and retires it immediately after.
///
/// Each ingest creates a new stage instance from the factory, delivers the
/// single message, and terminates the worker in-band, so the worker
/// processes exactly that message and then stops. Concurrency scales with
/// inflow and no worker ever handles two messages, at the cost of one
/// stage construction per message.
pub struct SpinUpWrapper<S: Stage> {
    factory: Mutex<Box<dyn FnMut() -> S + Send>>,
    ctx: StageContext<S::Output>,
    spawned: AtomicU64,
}

impl<S: Stage> SpinUpWrapper<S> {
    pub fn new(factory: impl FnMut() -> S + Send + 'static, ctx: StageContext<S::Output>) -> Self {
        Self {
            factory: Mutex::new(Box::new(factory)),
            ctx,
            spawned: AtomicU64::new(0),
        }
    }

    /// Spawn a worker for this one envelope and schedule its retirement.
    ///
    /// The terminate marker is queued right behind the message, so the
    /// worker drains the message first and then stops on its own. The
    /// returned handle lets callers await completion; dropping it detaches
    /// the worker, which still finishes and stops.
    pub fn ingest(
        &self,
        envelope: Envelope<S::Input>,
    ) -> Result<WorkerHandle<S::Input>, IngestError> {
        let stage = {
            let mut factory = self.factory.lock();
            (*factory)()
        };
        let worker = spawn(stage, self.ctx.clone());
        worker
            .send(envelope)
            .map_err(|_| IngestError::WorkerUnavailable)?;
        worker.terminate();
        self.spawned.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(worker = %worker.id(), "spun up single-message worker");
        Ok(worker)
    }

    /// How many workers this wrapper has spun up so far.
    #[must_use]
    pub fn spawned(&self) -> u64 {
        self.spawned.load(Ordering::Relaxed)
    }
}
