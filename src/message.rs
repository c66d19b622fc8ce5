//! Message envelopes and delivery primitives.
//!
//! Everything that moves between workers is wrapped in an [`Envelope`]
//! carrying the [`StageId`] of the descriptor that produced it, so outputs
//! route correctly downstream no matter how many pool members or ephemeral
//! workers a stage was fanned out across.
//!
//! [`Delivery`] is the unit a worker mailbox actually receives: either a
//! message envelope or an in-band terminate marker. Because termination
//! travels through the same FIFO queue as messages, a worker that is told to
//! terminate *after* a message still processes that message first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{StageId, WorkerId};

/// A payload plus the identity of the descriptor that emitted it.
///
/// # Examples
///
/// ```
/// use pipewright::message::Envelope;
/// use pipewright::types::StageId;
///
/// let origin = StageId::new();
/// let env = Envelope::new(origin, "hello".to_string());
/// assert_eq!(env.origin, origin);
/// assert_eq!(env.payload, "hello");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope<T> {
    /// Identity of the descriptor (not the worker) the payload came from.
    pub origin: StageId,
    /// The message itself.
    pub payload: T,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn new(origin: StageId, payload: T) -> Self {
        Self { origin, payload }
    }

    /// Wrap a payload injected from outside the pipeline, minting a fresh
    /// origin id for it.
    #[must_use]
    pub fn external(payload: T) -> Self {
        Self {
            origin: StageId::new(),
            payload,
        }
    }
}

/// What a worker mailbox receives: a message, or the terminate marker.
///
/// Terminate is delivered in-band so that per-worker FIFO ordering
/// guarantees every message enqueued before it is processed first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery<T> {
    Message(Envelope<T>),
    Terminate,
}

impl<T> Delivery<T> {
    /// Returns the envelope if this delivery carries one.
    pub fn into_message(self) -> Option<Envelope<T>> {
        match self {
            Delivery::Message(envelope) => Some(envelope),
            Delivery::Terminate => None,
        }
    }

    #[must_use]
    pub fn is_terminate(&self) -> bool {
        matches!(self, Delivery::Terminate)
    }
}

/// A runtime processing failure inside a stage's transform logic.
///
/// Fault reports are the input type of every
/// [`ExceptionHandler`](crate::stage::ExceptionHandler) stage. The worker
/// loop produces one whenever `ingest` returns an error and forwards it to
/// the fault mailbox wired at spawn time; the failing worker itself keeps
/// running.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaultReport {
    /// The stage descriptor whose transform failed.
    pub stage: StageId,
    /// The specific worker instance that was processing the message.
    pub worker: WorkerId,
    pub when: DateTime<Utc>,
    pub message: String,
    #[serde(default)]
    pub details: serde_json::Value,
}

impl FaultReport {
    pub fn new(stage: StageId, worker: WorkerId, message: impl Into<String>) -> Self {
        Self {
            stage,
            worker,
            when: Utc::now(),
            message: message.into(),
            details: serde_json::Value::Null,
        }
    }

    /// Attach structured context to this report.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}
