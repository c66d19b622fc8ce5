//! Deterministic traversal over schematic nodes.

use rustc_hash::FxHashSet;

use super::node::{NodeId, StageNode};
use super::tree::Schematic;

impl Schematic {
    /// Every node in the schematic, in pre-order from the root.
    ///
    /// Children are visited left-to-right in insertion order, and a node
    /// reachable through several parents (a diamond) is emitted exactly
    /// once, on first encounter. The result is deterministic and repeatable
    /// for an unchanged tree: its length always equals
    /// [`node_count`](Self::node_count).
    #[must_use]
    pub fn all_nodes(&self) -> Vec<NodeId> {
        let mut ordered = Vec::with_capacity(self.node_count());
        let mut visited = FxHashSet::default();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            ordered.push(id);
            for &child in self.node(id).children().iter().rev() {
                stack.push(child);
            }
        }
        ordered
    }

    /// Iterate the nodes themselves in the same pre-order.
    pub fn stages(&self) -> impl Iterator<Item = &StageNode> + '_ {
        self.all_nodes().into_iter().map(move |id| self.node(id))
    }
}
