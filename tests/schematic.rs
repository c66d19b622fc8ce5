mod common;
use common::*;

use pipewright::concurrency::{LoadBalancing, SpinUp};
use pipewright::schematic::{Decorated, Schematic, SchematicError};
use pipewright::types::TypeTag;

#[test]
fn add_child_accepts_matching_edge() {
    let mut schematic = Schematic::new(TypeTag::stage::<Echo>()).unwrap();
    let root = schematic.root();

    // Echo emits String, Measure takes String.
    let measure = schematic
        .add_child(root, TypeTag::stage::<Measure>())
        .unwrap();

    assert_eq!(schematic.node_count(), 2);
    assert!(schematic.node(measure).type_tag().is::<Measure>());
    assert_eq!(schematic.node(measure).parents(), &[root]);
    assert_eq!(schematic.node(root).children(), &[measure]);
}

#[test]
fn add_child_rejects_mismatched_edge_without_mutating() {
    let mut schematic = Schematic::new(TypeTag::stage::<Echo>()).unwrap();
    let root = schematic.root();
    let measure = schematic
        .add_child(root, TypeTag::stage::<Measure>())
        .unwrap();

    // Measure emits usize, Echo takes String.
    let err = schematic
        .add_child(measure, TypeTag::stage::<Echo>())
        .unwrap_err();

    assert!(matches!(err, SchematicError::IncompatibleType { .. }));
    assert_eq!(schematic.node_count(), 2);
    assert!(!schematic.node(measure).has_children());
}

#[test]
fn root_rejects_non_stage_tag() {
    let err = Schematic::new(TypeTag::wrapper::<LoadBalancing>()).unwrap_err();
    assert!(matches!(err, SchematicError::IncompatibleType { .. }));
}

#[test]
fn global_wrapper_applies_retroactively_and_to_new_nodes() {
    let mut schematic = Schematic::new(TypeTag::stage::<Echo>()).unwrap();
    let root = schematic.root();
    let early = schematic.add_child(root, TypeTag::stage::<Echo>()).unwrap();

    schematic
        .set_global_wrapper(TypeTag::wrapper::<LoadBalancing>())
        .unwrap();

    let late = schematic.add_child(root, TypeTag::stage::<Echo>()).unwrap();

    for id in [root, early, late] {
        let chain = schematic.node(id).wrapper_chain();
        assert_eq!(chain.len(), 1);
        assert!(chain[0].is::<LoadBalancing>());
    }
}

#[test]
fn global_handler_applies_retroactively_and_to_new_nodes() {
    let mut schematic = Schematic::new(TypeTag::stage::<Echo>()).unwrap();
    let root = schematic.root();

    schematic
        .set_global_exception_handler(TypeTag::handler::<CollectFaults>())
        .unwrap();
    let child = schematic.add_child(root, TypeTag::stage::<Echo>()).unwrap();

    assert!(schematic.node(root).has_exception_handler());
    assert!(schematic.node(child).has_exception_handler());
}

#[test]
fn global_handler_rejects_plain_stage_tag() {
    let mut schematic = Schematic::new(TypeTag::stage::<Echo>()).unwrap();
    let err = schematic
        .set_global_exception_handler(TypeTag::stage::<Echo>())
        .unwrap_err();
    assert!(matches!(
        err,
        SchematicError::InvalidHandlerAssignment { .. }
    ));
}

#[test]
fn wrapper_chain_grows_inward_and_reports_outward() {
    let mut schematic = Schematic::new(TypeTag::stage::<Echo>()).unwrap();
    let root = schematic.root();
    assert!(schematic.node(root).wrapper_chain().is_empty());

    let outer = schematic
        .node_mut(root)
        .wrap(TypeTag::wrapper::<LoadBalancing>())
        .unwrap();
    outer.wrap(TypeTag::wrapper::<SpinUp>()).unwrap();

    let chain = schematic.node(root).wrapper_chain();
    assert_eq!(chain.len(), 2);
    assert!(chain[0].is::<LoadBalancing>());
    assert!(chain[1].is::<SpinUp>());
}

#[test]
fn rewrapping_replaces_the_existing_chain() {
    let mut schematic = Schematic::new(TypeTag::stage::<Echo>()).unwrap();
    let root = schematic.root();

    schematic
        .node_mut(root)
        .wrap(TypeTag::wrapper::<LoadBalancing>())
        .unwrap();
    schematic
        .node_mut(root)
        .wrap(TypeTag::wrapper::<SpinUp>())
        .unwrap();

    let chain = schematic.node(root).wrapper_chain();
    assert_eq!(chain.len(), 1);
    assert!(chain[0].is::<SpinUp>());
}

#[test]
fn wrap_rejects_stage_tag() {
    let mut schematic = Schematic::new(TypeTag::stage::<Echo>()).unwrap();
    let root = schematic.root();
    let err = schematic
        .node_mut(root)
        .wrap(TypeTag::stage::<Echo>())
        .unwrap_err();
    assert!(matches!(err, SchematicError::IncompatibleType { .. }));
    assert!(!schematic.node(root).has_wrapper());
}

#[test]
fn per_node_handler_replaces_and_validates() {
    let mut schematic = Schematic::new(TypeTag::stage::<Echo>()).unwrap();
    let root = schematic.root();

    schematic
        .node_mut(root)
        .set_exception_handler(TypeTag::handler::<CollectFaults>())
        .unwrap();
    assert!(schematic.node(root).has_exception_handler());

    let err = schematic
        .node_mut(root)
        .set_exception_handler(TypeTag::stage::<Measure>())
        .unwrap_err();
    assert!(matches!(
        err,
        SchematicError::InvalidHandlerAssignment { .. }
    ));
    // The failed assignment leaves the existing handler in place.
    assert!(schematic.node(root).has_exception_handler());
}

#[test]
fn link_child_rejects_cycles() {
    let mut schematic = Schematic::new(TypeTag::stage::<Echo>()).unwrap();
    let root = schematic.root();
    let a = schematic.add_child(root, TypeTag::stage::<Echo>()).unwrap();
    let b = schematic.add_child(a, TypeTag::stage::<Echo>()).unwrap();

    assert!(matches!(
        schematic.link_child(b, root),
        Err(SchematicError::CyclicLink)
    ));
    assert!(matches!(
        schematic.link_child(a, a),
        Err(SchematicError::CyclicLink)
    ));
    assert!(!schematic.node(b).has_children());
}

#[test]
fn link_child_builds_a_diamond() {
    let mut schematic = Schematic::new(TypeTag::stage::<Echo>()).unwrap();
    let root = schematic.root();
    let left = schematic.add_child(root, TypeTag::stage::<Echo>()).unwrap();
    let right = schematic.add_child(root, TypeTag::stage::<Echo>()).unwrap();
    let shared = schematic.add_child(left, TypeTag::stage::<Echo>()).unwrap();

    schematic.link_child(right, shared).unwrap();

    assert_eq!(schematic.node(shared).parents(), &[left, right]);
    assert_eq!(schematic.node_count(), 4);
    // Traversal still emits the shared node exactly once.
    assert_eq!(schematic.all_nodes().len(), 4);
}
