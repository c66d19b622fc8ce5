//! Concurrency wrapper strategies: how a single logical stage becomes many
//! workers.
//!
//! A schematic node decorated with a wrapper tag does not change what the
//! stage computes, only how many workers realize it and how messages reach
//! them. Two strategies are provided:
//!
//! - [`LoadBalancing`] / [`LoadBalancingWrapper`]: a fixed pool spawned up
//!   front, each message routed to one member by a [`RoutingPolicy`]
//!   (default [`SmallestMailbox`])
//! - [`SpinUp`] / [`SpinUpWrapper`]: a fresh worker per message, retired as
//!   soon as that message is processed
//!
//! All workers of a wrapped stage share the stage's downstream wiring, so
//! neighbors cannot tell a pooled or ephemeral stage from a plain one.
//! Messages delivered to one worker stay FIFO; ordering across workers is
//! not promised by either strategy.

mod errors;
mod load_balancing;
mod routing;
mod spin_up;

pub use errors::IngestError;
pub use load_balancing::{LoadBalancing, LoadBalancingWrapper, PoolOptions, DEFAULT_POOL_SIZE};
pub use routing::{Random, RoundRobin, RouteeStats, RoutingPolicy, SmallestMailbox};
pub use spin_up::{SpinUp, SpinUpWrapper};
