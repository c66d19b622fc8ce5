//! Schematic definition: the typed, verifiable tree description of a
//! pipeline.
//!
//! A [`Schematic`] describes *what* a pipeline is before anything runs:
//! which stages exist, how they feed each other, which concurrency wrapper
//! decorates each one, and which exception handler catches its faults.
//! Every edge is validated as it is inserted, so an inconsistent pipeline
//! description can never be assembled, let alone built.
//!
//! # Core concepts
//!
//! - **Stage nodes**: processing units arranged in a rooted tree (an arena
//!   with index edges, permitting diamonds but never cycles)
//! - **Wrappers**: decoration chains choosing a concurrency strategy per
//!   node; see [`crate::concurrency`]
//! - **Exception handlers**: error-handling stages attached per node
//! - **Global defaults**: a wrapper and/or handler applied to all current
//!   and future nodes
//! - **[`Decorated`]**: the capability surface (id, type tag, wrapper slot)
//!   shared by all three descriptor kinds
//!
//! # Quick start
//!
//! ```
//! use pipewright::concurrency::LoadBalancing;
//! use pipewright::schematic::{Decorated, Schematic};
//! use pipewright::stage::{Stage, StageContext, StageError};
//! use pipewright::types::TypeTag;
//! use async_trait::async_trait;
//!
//! struct Parse;
//! #[async_trait]
//! impl Stage for Parse {
//!     type Input = String;
//!     type Output = u64;
//!     async fn ingest(
//!         &mut self,
//!         input: String,
//!         ctx: &StageContext<u64>,
//!     ) -> Result<(), StageError> {
//!         let value: u64 = input
//!             .trim()
//!             .parse()
//!             .map_err(|_| StageError::transform("not a number"))?;
//!         ctx.send(value);
//!         Ok(())
//!     }
//! }
//!
//! struct Square;
//! #[async_trait]
//! impl Stage for Square {
//!     type Input = u64;
//!     type Output = u64;
//!     async fn ingest(
//!         &mut self,
//!         input: u64,
//!         ctx: &StageContext<u64>,
//!     ) -> Result<(), StageError> {
//!         ctx.send(input * input);
//!         Ok(())
//!     }
//! }
//!
//! let mut schematic = Schematic::new(TypeTag::stage::<Parse>()).unwrap();
//! let root = schematic.root();
//! let square = schematic.add_child(root, TypeTag::stage::<Square>()).unwrap();
//!
//! // Run the parse stage as a load-balanced pool.
//! schematic
//!     .node_mut(root)
//!     .wrap(TypeTag::wrapper::<LoadBalancing>())
//!     .unwrap();
//!
//! assert!(schematic.node(root).has_wrapper());
//! assert!(!schematic.node(square).has_wrapper());
//! assert_eq!(schematic.all_nodes().len(), 2);
//! ```

mod errors;
mod iteration;
mod node;
mod tree;

pub use errors::SchematicError;
pub use node::{Decorated, HandlerNode, NodeId, StageNode, WrapperNode};
pub use tree::Schematic;
