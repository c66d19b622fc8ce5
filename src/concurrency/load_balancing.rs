//! Fixed pool of workers fed through a routing policy.

use futures_util::future::join_all;
use parking_lot::Mutex;

use crate::message::Envelope;
use crate::runtime::{spawn, WorkerHandle};
use crate::stage::{Stage, StageContext, WrapperKind};
use crate::types::WorkerId;

use super::errors::IngestError;
use super::routing::{RouteeStats, RoutingPolicy, SmallestMailbox};

/// Marker for the fixed-pool strategy; what
/// [`TypeTag::wrapper`](crate::types::TypeTag::wrapper) records in a
/// schematic.
pub struct LoadBalancing;

impl WrapperKind for LoadBalancing {}

/// How many workers a pool spawns unless told otherwise.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Tuning knobs for [`LoadBalancingWrapper::new`].
#[derive(Clone, Copy, Debug)]
pub struct PoolOptions {
    /// Number of workers spawned up front. The pool never grows.
    pub size: usize,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_POOL_SIZE,
        }
    }
}

struct PoolMember<I> {
    handle: WorkerHandle<I>,
    routed: u64,
}

struct PoolState<I> {
    members: Vec<PoolMember<I>>,
    policy: Box<dyn RoutingPolicy>,
}

/// A fixed pool of workers all realizing the same stage type, with inbound
/// messages routed to one member per message.
///
/// Every member is spawned up front from the caller's factory and shares
/// the stage's downstream wiring, so pooling is invisible to neighbors.
/// Members that terminate (panic, mailbox disconnect) are pruned on the
/// next ingest and never routed to again; the pool does not respawn them.
/// Once every member is gone, ingest fails with
/// [`IngestError::PoolExhausted`].
///
/// Routing defaults to [`SmallestMailbox`]; swap the policy with
/// [`with_policy`](Self::with_policy).
pub struct LoadBalancingWrapper<S: Stage> {
    state: Mutex<PoolState<S::Input>>,
}

impl<S: Stage> LoadBalancingWrapper<S> {
    /// Spawn a pool of `options.size` workers, one stage instance each.
    pub fn new(
        mut factory: impl FnMut() -> S,
        ctx: &StageContext<S::Output>,
        options: PoolOptions,
    ) -> Self {
        let members = (0..options.size.max(1))
            .map(|_| PoolMember {
                handle: spawn(factory(), ctx.clone()),
                routed: 0,
            })
            .collect();
        Self {
            state: Mutex::new(PoolState {
                members,
                policy: Box::new(SmallestMailbox),
            }),
        }
    }

    /// Replace the routing policy. Routed counts carry over.
    #[must_use]
    pub fn with_policy(self, policy: impl RoutingPolicy + 'static) -> Self {
        self.state.lock().policy = Box::new(policy);
        self
    }

    /// Route one envelope to a live member, returning which worker took it.
    ///
    /// Terminated members found along the way are pruned; a member whose
    /// queue rejects the send hands the envelope back and routing retries
    /// among the remaining members.
    pub fn ingest(&self, envelope: Envelope<S::Input>) -> Result<WorkerId, IngestError> {
        let mut state = self.state.lock();
        let mut envelope = envelope;
        loop {
            state.members.retain(|member| {
                if member.handle.is_terminated() {
                    tracing::warn!(worker = %member.handle.id(), "pool member terminated; pruning");
                    false
                } else {
                    true
                }
            });
            if state.members.is_empty() {
                return Err(IngestError::PoolExhausted);
            }

            let stats: Vec<RouteeStats> = state
                .members
                .iter()
                .map(|member| RouteeStats::of(&member.handle, member.routed))
                .collect();
            let Some(index) = state.policy.select(&stats).filter(|i| *i < stats.len()) else {
                return Err(IngestError::PoolExhausted);
            };

            let member = &mut state.members[index];
            match member.handle.send(envelope) {
                Ok(()) => {
                    member.routed += 1;
                    return Ok(member.handle.id());
                }
                Err(rejected) => {
                    // Queue disconnected between the liveness check and the
                    // send; drop the member and retry with the same message.
                    let gone = state.members.remove(index);
                    tracing::warn!(worker = %gone.handle.id(), "pool member queue disconnected; re-routing");
                    envelope = rejected.into_envelope();
                }
            }
        }
    }

    /// Members still accepting work.
    #[must_use]
    pub fn live_members(&self) -> usize {
        self.state
            .lock()
            .members
            .iter()
            .filter(|member| !member.handle.is_terminated())
            .count()
    }

    /// Ask every member to drain and stop, then wait for all of them.
    pub async fn shutdown(self) {
        let members = std::mem::take(&mut self.state.lock().members);
        for member in &members {
            member.handle.terminate();
        }
        join_all(members.into_iter().map(|member| member.handle.join())).await;
    }
}
