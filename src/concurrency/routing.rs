//! Pluggable routing policies for the load-balancing pool.

use crate::runtime::WorkerHandle;

/// What a policy sees about one live pool member when choosing a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteeStats {
    /// Deliveries currently queued in the member's mailbox.
    pub queue_depth: usize,
    /// Messages this pool has routed to the member so far.
    pub routed: u64,
}

impl RouteeStats {
    pub(super) fn of<I: Send + 'static>(handle: &WorkerHandle<I>, routed: u64) -> Self {
        Self {
            queue_depth: handle.queue_depth(),
            routed,
        }
    }
}

/// The rule a pool uses to pick which live member receives the next message.
///
/// `routees` only ever contains live members; returning `None` (or an
/// out-of-range index) makes the pool treat the message as unroutable.
pub trait RoutingPolicy: Send {
    fn select(&mut self, routees: &[RouteeStats]) -> Option<usize>;
}

/// Default policy: fewest pending messages.
///
/// Ties on queue depth are broken by fewest messages routed so far, then by
/// lowest index, so routing is deterministic and already-balanced traffic
/// stays balanced.
#[derive(Clone, Copy, Debug, Default)]
pub struct SmallestMailbox;

impl RoutingPolicy for SmallestMailbox {
    fn select(&mut self, routees: &[RouteeStats]) -> Option<usize> {
        routees
            .iter()
            .enumerate()
            .min_by_key(|(index, stats)| (stats.queue_depth, stats.routed, *index))
            .map(|(index, _)| index)
    }
}

/// Cycles through members in order, ignoring queue depth.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoundRobin {
    next: usize,
}

impl RoutingPolicy for RoundRobin {
    fn select(&mut self, routees: &[RouteeStats]) -> Option<usize> {
        if routees.is_empty() {
            return None;
        }
        let index = self.next % routees.len();
        self.next = self.next.wrapping_add(1);
        Some(index)
    }
}

/// Picks a member uniformly at random.
#[derive(Clone, Copy, Debug, Default)]
pub struct Random;

impl RoutingPolicy for Random {
    fn select(&mut self, routees: &[RouteeStats]) -> Option<usize> {
        use rand::Rng;
        if routees.is_empty() {
            return None;
        }
        Some(rand::rng().random_range(0..routees.len()))
    }
}
