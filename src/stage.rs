//! Stage contract and capability traits.
//!
//! This module provides the core abstractions for processing units:
//! the [`Stage`] trait (declared input/output types plus the async `ingest`
//! entry point), the [`ExceptionHandler`] and [`WrapperKind`] capability
//! traits, and the [`StageContext`] a worker hands each stage so its
//! `send` exit point reaches the downstream workers wired at build time.
//!
//! # Design principles
//!
//! - **Typed edges**: a stage declares its input and output types; the
//!   schematic validates adjacent stages against those declarations before
//!   anything runs.
//! - **Sequential per worker**: `ingest` takes `&mut self`, so a stage may
//!   keep state across messages; the worker loop guarantees one message at
//!   a time per instance.
//! - **Fire-and-forget output**: `StageContext::send` forwards downstream
//!   and never waits for the receivers.
//!
//! # Examples
//!
//! ```rust
//! use pipewright::stage::{Stage, StageContext, StageError};
//! use async_trait::async_trait;
//!
//! struct WordCount;
//!
//! #[async_trait]
//! impl Stage for WordCount {
//!     type Input = String;
//!     type Output = usize;
//!
//!     async fn ingest(
//!         &mut self,
//!         input: String,
//!         ctx: &StageContext<usize>,
//!     ) -> Result<(), StageError> {
//!         ctx.send(input.split_whitespace().count());
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::message::{Delivery, Envelope, FaultReport};
use crate::runtime::Mailbox;
use crate::types::{StageId, WorkerId};

/// A single processing unit with declared input and output types.
///
/// Implementations transform each inbound payload and forward results via
/// [`StageContext::send`]. A stage that produces nothing for a given input
/// simply does not call `send`; one that fans out calls it repeatedly.
///
/// Returning `Err` reports a per-message fault: the worker forwards a
/// [`FaultReport`] to the fault mailbox wired at spawn time (if any) and
/// continues with the next message.
#[async_trait]
pub trait Stage: Send + 'static {
    /// The type of payload this stage receives.
    type Input: Send + 'static;
    /// The type of payload this stage emits.
    type Output: Clone + Send + 'static;

    /// Process one inbound payload.
    async fn ingest(
        &mut self,
        input: Self::Input,
        ctx: &StageContext<Self::Output>,
    ) -> Result<(), StageError>;
}

/// Capability marker for concurrency wrapper strategies.
///
/// A schematic records *which* strategy decorates a stage, not a live
/// wrapper; the marker types
/// [`LoadBalancing`](crate::concurrency::LoadBalancing) and
/// [`SpinUp`](crate::concurrency::SpinUp) implement this trait and are what
/// [`TypeTag::wrapper`](crate::types::TypeTag::wrapper) accepts.
pub trait WrapperKind: 'static {}

/// Capability marker for error-handling stages.
///
/// An exception handler is an ordinary stage whose input type is
/// [`FaultReport`]; attaching one to a schematic node makes it discoverable
/// by the build layer, which wires fault dispatch.
pub trait ExceptionHandler: Stage<Input = FaultReport> {}

/// The set of downstream mailboxes a stage's output fans out to.
///
/// Wired once at build time and shared by every worker realizing the same
/// logical stage, so routing a message through a pool member or an ephemeral
/// worker changes nothing about where its output goes.
pub struct Downstream<O> {
    targets: Vec<Mailbox<O>>,
}

impl<O> Downstream<O> {
    /// A stage with nothing wired after it (a leaf of the pipeline).
    #[must_use]
    pub fn none() -> Self {
        Self {
            targets: Vec::new(),
        }
    }

    #[must_use]
    pub fn to(targets: Vec<Mailbox<O>>) -> Self {
        Self { targets }
    }

    pub fn push(&mut self, target: Mailbox<O>) {
        self.targets.push(target);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl<O: Clone> Downstream<O> {
    /// Deliver one envelope to every target, returning how many accepted it.
    /// Disconnected targets are skipped.
    pub(crate) fn deliver_all(&self, envelope: Envelope<O>) -> usize {
        let mut delivered = 0;
        for target in &self.targets {
            match target.deliver(Delivery::Message(envelope.clone())) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::debug!(origin = %envelope.origin, "downstream target disconnected");
                }
            }
        }
        delivered
    }
}

impl<O> Clone for Downstream<O> {
    fn clone(&self) -> Self {
        Self {
            targets: self.targets.clone(),
        }
    }
}

impl<O> Default for Downstream<O> {
    fn default() -> Self {
        Self::none()
    }
}

/// Execution context handed to a stage by its worker.
///
/// Carries the stage's descriptor identity, its downstream wiring, and an
/// optional fault mailbox. Cloning a context is cheap (channel handles) and
/// is how one logical stage is shared across many workers.
pub struct StageContext<O> {
    stage: StageId,
    downstream: Downstream<O>,
    fault: Option<Mailbox<FaultReport>>,
}

impl<O: Clone + Send + 'static> StageContext<O> {
    #[must_use]
    pub fn new(stage: StageId) -> Self {
        Self {
            stage,
            downstream: Downstream::none(),
            fault: None,
        }
    }

    /// Set the downstream targets outputs fan out to.
    #[must_use]
    pub fn with_downstream(mut self, downstream: Downstream<O>) -> Self {
        self.downstream = downstream;
        self
    }

    /// Wire the mailbox that receives [`FaultReport`]s from failing ingests.
    #[must_use]
    pub fn with_fault(mut self, fault: Mailbox<FaultReport>) -> Self {
        self.fault = Some(fault);
        self
    }

    #[must_use]
    pub fn stage_id(&self) -> StageId {
        self.stage
    }

    #[must_use]
    pub fn downstream(&self) -> &Downstream<O> {
        &self.downstream
    }

    /// Forward an outbound payload to every downstream worker.
    ///
    /// Fire-and-forget: delivery is asynchronous and this never blocks on
    /// the receivers. The envelope's origin is this stage's id.
    pub fn send(&self, outbound: O) {
        let delivered = self
            .downstream
            .deliver_all(Envelope::new(self.stage, outbound));
        tracing::trace!(stage = %self.stage, delivered, "forwarded outbound payload");
    }

    pub(crate) fn report_fault(&self, worker: WorkerId, error: &StageError) {
        match &self.fault {
            Some(mailbox) => {
                let report = FaultReport::new(self.stage, worker, error.to_string());
                let envelope = Envelope::new(self.stage, report);
                if mailbox.deliver(Delivery::Message(envelope)).is_err() {
                    tracing::warn!(
                        stage = %self.stage,
                        worker = %worker,
                        %error,
                        "fault mailbox disconnected; dropping report"
                    );
                }
            }
            None => {
                tracing::warn!(
                    stage = %self.stage,
                    worker = %worker,
                    %error,
                    "stage error with no fault mailbox wired"
                );
            }
        }
    }
}

impl<O> Clone for StageContext<O> {
    fn clone(&self) -> Self {
        Self {
            stage: self.stage,
            downstream: self.downstream.clone(),
            fault: self.fault.clone(),
        }
    }
}

/// Errors a stage's transform logic can raise.
///
/// These are per-message faults, not fatal conditions: the worker reports
/// them and moves on, so sibling workers and later messages are unaffected.
#[derive(Debug, Error, Diagnostic)]
pub enum StageError {
    /// The inbound payload was missing something the transform requires.
    #[error("missing expected input: {what}")]
    #[diagnostic(
        code(pipewright::stage::missing_input),
        help("Check that the upstream stage produces the required data.")
    )]
    MissingInput { what: &'static str },

    /// The transform itself failed.
    #[error("transform failed: {0}")]
    #[diagnostic(code(pipewright::stage::transform))]
    Transform(String),

    /// JSON serialization/deserialization error inside the transform.
    #[error(transparent)]
    #[diagnostic(code(pipewright::stage::serde_json))]
    Serde(#[from] serde_json::Error),
}

impl StageError {
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_fans_out_to_every_target() {
        let (a_tx, a_rx) = Mailbox::channel();
        let (b_tx, b_rx) = Mailbox::channel();
        let ctx: StageContext<u32> = StageContext::new(StageId::new())
            .with_downstream(Downstream::to(vec![a_tx, b_tx]));

        ctx.send(7);

        for rx in [a_rx, b_rx] {
            let envelope = rx.recv_async().await.unwrap().into_message().unwrap();
            assert_eq!(envelope.payload, 7);
            assert_eq!(envelope.origin, ctx.stage_id());
        }
    }

    #[tokio::test]
    async fn send_skips_disconnected_targets() {
        let (dead_tx, dead_rx) = Mailbox::<u32>::channel();
        drop(dead_rx);
        let (live_tx, live_rx) = Mailbox::channel();
        let ctx: StageContext<u32> = StageContext::new(StageId::new())
            .with_downstream(Downstream::to(vec![dead_tx, live_tx]));

        ctx.send(3);

        let envelope = live_rx.recv_async().await.unwrap().into_message().unwrap();
        assert_eq!(envelope.payload, 3);
    }

    #[tokio::test]
    async fn report_fault_reaches_the_fault_mailbox() {
        let (fault_tx, fault_rx) = Mailbox::channel();
        let ctx: StageContext<u32> =
            StageContext::new(StageId::new()).with_fault(fault_tx);

        let worker = WorkerId::new();
        ctx.report_fault(worker, &StageError::transform("bad input"));

        let report = fault_rx
            .recv_async()
            .await
            .unwrap()
            .into_message()
            .unwrap()
            .payload;
        assert_eq!(report.stage, ctx.stage_id());
        assert_eq!(report.worker, worker);
        assert!(report.message.contains("bad input"));
    }
}
