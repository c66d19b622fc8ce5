//! Worker lifecycle substrate: spawn, send, terminate, watch.
//!
//! This is the minimal worker-handle contract the pipeline core requires
//! from its messaging layer, implemented with one tokio task and one flume
//! queue per worker. Each worker drains its mailbox strictly sequentially;
//! concurrency comes from running many workers, never from overlapping
//! messages inside one.
//!
//! The concurrency wrappers in [`crate::concurrency`] are built entirely on
//! this surface and assume nothing else about scheduling.

mod worker;

pub use worker::{spawn, Mailbox, SendRejected, WorkerHandle, WorkerStatus};
