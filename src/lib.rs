//! # Pipewright: Typed Pipeline Composition with Pluggable Concurrency
//!
//! Pipewright lets you describe a message-processing pipeline as a typed
//! tree of stages, validate every connection before anything runs, and
//! choose per stage how much concurrency realizes it.
//!
//! ## Core Concepts
//!
//! - **Stages**: Async units of work with declared input and output types
//! - **Schematic**: The validated tree description of a pipeline, built one
//!   checked edge at a time
//! - **Workers**: Tokio tasks realizing stages, fed through FIFO mailboxes
//! - **Wrappers**: Per-node concurrency strategies (a load-balanced pool or
//!   an ephemeral worker per message)
//! - **Exception handlers**: Stages that consume fault reports from failing
//!   ingests
//!
//! ## Quick Start
//!
//! ### Defining a stage
//!
//! ```
//! use pipewright::stage::{Stage, StageContext, StageError};
//! use async_trait::async_trait;
//!
//! struct Shout;
//!
//! #[async_trait]
//! impl Stage for Shout {
//!     type Input = String;
//!     type Output = String;
//!
//!     async fn ingest(
//!         &mut self,
//!         input: String,
//!         ctx: &StageContext<String>,
//!     ) -> Result<(), StageError> {
//!         ctx.send(input.to_uppercase());
//!         Ok(())
//!     }
//! }
//! ```
//!
//! ### Describing a pipeline
//!
//! A [`schematic::Schematic`] holds tagged stage types, not instances; the
//! tags carry enough type information to reject any edge whose output and
//! input types disagree:
//!
//! ```
//! use pipewright::schematic::{Decorated, Schematic};
//! use pipewright::stage::{Stage, StageContext, StageError};
//! use pipewright::types::TypeTag;
//! use async_trait::async_trait;
//!
//! # struct Shout;
//! # #[async_trait]
//! # impl Stage for Shout {
//! #     type Input = String;
//! #     type Output = String;
//! #     async fn ingest(
//! #         &mut self,
//! #         input: String,
//! #         ctx: &StageContext<String>,
//! #     ) -> Result<(), StageError> {
//! #         ctx.send(input.to_uppercase());
//! #         Ok(())
//! #     }
//! # }
//! struct Measure;
//!
//! #[async_trait]
//! impl Stage for Measure {
//!     type Input = String;
//!     type Output = usize;
//!     async fn ingest(
//!         &mut self,
//!         input: String,
//!         ctx: &StageContext<usize>,
//!     ) -> Result<(), StageError> {
//!         ctx.send(input.len());
//!         Ok(())
//!     }
//! }
//!
//! let mut schematic = Schematic::new(TypeTag::stage::<Shout>()).unwrap();
//! let root = schematic.root();
//! let measure = schematic.add_child(root, TypeTag::stage::<Measure>()).unwrap();
//! assert!(schematic.node(measure).type_tag().is::<Measure>());
//!
//! // Shout emits String, Measure emits usize: a Measure -> Shout edge is
//! // rejected before the tree changes.
//! assert!(schematic.add_child(measure, TypeTag::stage::<Shout>()).is_err());
//! ```
//!
//! ### Running stages on workers
//!
//! ```
//! use pipewright::runtime::{spawn, Mailbox};
//! use pipewright::message::Envelope;
//! use pipewright::stage::{Downstream, StageContext};
//! use pipewright::types::StageId;
//! # use pipewright::stage::{Stage, StageError};
//! # use async_trait::async_trait;
//! # struct Shout;
//! # #[async_trait]
//! # impl Stage for Shout {
//! #     type Input = String;
//! #     type Output = String;
//! #     async fn ingest(
//! #         &mut self,
//! #         input: String,
//! #         ctx: &StageContext<String>,
//! #     ) -> Result<(), StageError> {
//! #         ctx.send(input.to_uppercase());
//! #         Ok(())
//! #     }
//! # }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (sink, sink_rx) = Mailbox::channel();
//! let ctx = StageContext::new(StageId::new()).with_downstream(Downstream::to(vec![sink]));
//! let worker = spawn(Shout, ctx);
//!
//! worker.send(Envelope::external("hello".to_string())).unwrap();
//! let out = sink_rx.recv_async().await.unwrap().into_message().unwrap();
//! assert_eq!(out.payload, "HELLO");
//!
//! worker.terminate();
//! worker.join().await;
//! # }
//! ```
//!
//! ## Module Guide
//!
//! - [`types`] - Identities, capability tags, and stage signatures
//! - [`message`] - Envelopes, delivery markers, and fault reports
//! - [`stage`] - The [`stage::Stage`] trait and its execution context
//! - [`schematic`] - The validated pipeline tree
//! - [`runtime`] - Worker spawn loop, mailboxes, and lifecycle handles
//! - [`concurrency`] - Load-balancing and spin-up wrapper strategies
//! - [`telemetry`] - Opt-in tracing subscriber setup

pub mod concurrency;
pub mod message;
pub mod runtime;
pub mod schematic;
pub mod stage;
pub mod telemetry;
pub mod types;
