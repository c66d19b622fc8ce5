#[macro_use]
extern crate proptest;

mod common;
use common::*;

use proptest::prelude::prop;
use rustc_hash::FxHashSet;

use pipewright::schematic::Schematic;
use pipewright::types::TypeTag;

/// Parent choices for nodes 1..n: node i attaches under `parents[i-1] % i`,
/// which is always an existing node, so any vector encodes a valid tree.
fn tree_shape() -> impl proptest::strategy::Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..64, 0..24)
}

fn build(shape: &[usize]) -> Schematic {
    let mut schematic = Schematic::new(TypeTag::stage::<Echo>()).unwrap();
    let mut ids = vec![schematic.root()];
    for (i, parent) in shape.iter().enumerate() {
        let under = ids[parent % (i + 1)];
        ids.push(schematic.add_child(under, TypeTag::stage::<Echo>()).unwrap());
    }
    schematic
}

proptest! {
    #[test]
    fn prop_traversal_is_complete_and_repeatable(shape in tree_shape()) {
        let schematic = build(&shape);

        let first = schematic.all_nodes();
        let second = schematic.all_nodes();
        prop_assert_eq!(&first, &second);

        prop_assert_eq!(first.len(), schematic.node_count());
        prop_assert_eq!(first[0], schematic.root());

        let unique: FxHashSet<_> = first.iter().copied().collect();
        prop_assert_eq!(unique.len(), first.len());
    }

    #[test]
    fn prop_extra_links_never_change_node_count(
        shape in tree_shape(),
        links in prop::collection::vec((0usize..64, 0usize..64), 0..12),
    ) {
        let mut schematic = build(&shape);
        let ids = schematic.all_nodes();
        let before = schematic.node_count();

        for (a, b) in links {
            let parent = ids[a % ids.len()];
            let child = ids[b % ids.len()];
            // Either a new diamond edge or a rejected cycle; never a new node.
            let _ = schematic.link_child(parent, child);
        }

        prop_assert_eq!(schematic.node_count(), before);
        let ordered = schematic.all_nodes();
        prop_assert_eq!(ordered.len(), before);
        let unique: FxHashSet<_> = ordered.iter().copied().collect();
        prop_assert_eq!(unique.len(), before);
    }
}
