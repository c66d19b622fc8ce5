//! The schematic tree: an arena of stage nodes with validated edges.

use rustc_hash::FxHashSet;

use crate::types::TypeTag;

use super::errors::SchematicError;
use super::node::{Decorated, NodeId, StageNode};

/// A validated, buildable description of a pipeline.
///
/// A schematic owns every [`StageNode`] in an arena and tracks edges as
/// arena indices, so acyclicity is enforced mechanically rather than by
/// convention. It is created with one root stage and grown one edge at a
/// time; each insertion checks the capability of the new type and the
/// output/input compatibility of the edge before anything is mutated.
///
/// Construction is synchronous and single-threaded (`&mut self`
/// throughout); a schematic is fully assembled before being handed to a
/// build layer.
///
/// # Examples
///
/// ```
/// use pipewright::schematic::{Decorated, Schematic};
/// use pipewright::stage::{Stage, StageContext, StageError};
/// use pipewright::types::TypeTag;
/// use async_trait::async_trait;
///
/// struct Tokenize;
/// #[async_trait]
/// impl Stage for Tokenize {
///     type Input = String;
///     type Output = Vec<String>;
///     async fn ingest(
///         &mut self,
///         input: String,
///         ctx: &StageContext<Vec<String>>,
///     ) -> Result<(), StageError> {
///         ctx.send(input.split_whitespace().map(str::to_string).collect());
///         Ok(())
///     }
/// }
///
/// struct CountTokens;
/// #[async_trait]
/// impl Stage for CountTokens {
///     type Input = Vec<String>;
///     type Output = usize;
///     async fn ingest(
///         &mut self,
///         input: Vec<String>,
///         ctx: &StageContext<usize>,
///     ) -> Result<(), StageError> {
///         ctx.send(input.len());
///         Ok(())
///     }
/// }
///
/// let mut schematic = Schematic::new(TypeTag::stage::<Tokenize>()).unwrap();
/// let root = schematic.root();
/// let counter = schematic
///     .add_child(root, TypeTag::stage::<CountTokens>())
///     .unwrap();
/// assert_eq!(schematic.node_count(), 2);
/// assert!(schematic.node(counter).type_tag().is::<CountTokens>());
/// ```
#[derive(Debug)]
pub struct Schematic {
    nodes: Vec<StageNode>,
    root: NodeId,
    global_exception_handler: Option<TypeTag>,
    global_wrapper: Option<TypeTag>,
}

impl Schematic {
    /// Create a schematic whose root is a stage of the tagged type.
    ///
    /// Fails with `IncompatibleType` if the tag is not stage-capable.
    pub fn new(tag: TypeTag) -> Result<Self, SchematicError> {
        Self::ensure_stage(&tag)?;
        Ok(Self {
            nodes: vec![StageNode::new(tag)],
            root: NodeId(0),
            global_exception_handler: None,
            global_wrapper: None,
        })
    }

    /// The first stage of the pipeline.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Total number of stage nodes in the schematic.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Borrow a node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this schematic. Use [`get`](Self::get)
    /// for the checked form.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &StageNode {
        &self.nodes[id.0]
    }

    /// Mutably borrow a node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this schematic.
    pub fn node_mut(&mut self, id: NodeId) -> &mut StageNode {
        &mut self.nodes[id.0]
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&StageNode> {
        self.nodes.get(id.0)
    }

    /// Append a new child stage under `parent`.
    ///
    /// Checks that the tag is stage-capable and that the parent's declared
    /// output type equals the child's declared input type. On failure the
    /// schematic is left untouched; on success the new node inherits any
    /// global wrapper and exception-handler defaults and its id is
    /// returned.
    pub fn add_child(&mut self, parent: NodeId, tag: TypeTag) -> Result<NodeId, SchematicError> {
        Self::ensure_stage(&tag)?;
        self.check_edge(self.node(parent).type_tag(), &tag)?;

        let mut node = StageNode::new(tag);
        node.push_parent(parent);
        if let Some(handler) = self.global_exception_handler {
            node.set_exception_handler(handler)?;
        }
        if let Some(wrapper) = self.global_wrapper {
            node.wrap(wrapper)?;
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].push_child(id);
        Ok(id)
    }

    /// Link an existing node as an additional child of `parent`.
    ///
    /// This is how a node acquires multiple parents (fan-in). The edge is
    /// validated exactly like [`add_child`](Self::add_child), and linking a
    /// node under itself or under one of its own descendants fails with
    /// `CyclicLink`, leaving the tree unchanged.
    pub fn link_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SchematicError> {
        let parent_tag = *self.node(parent).type_tag();
        let child_tag = *self.node(child).type_tag();
        self.check_edge(&parent_tag, &child_tag)?;
        if self.is_ancestor(child, parent) {
            return Err(SchematicError::CyclicLink);
        }
        self.nodes[parent.0].push_child(child);
        self.nodes[child.0].push_parent(parent);
        Ok(())
    }

    /// Set the default exception handler and apply it to every node.
    ///
    /// Existing nodes get the handler immediately (overwriting any they
    /// had); nodes added later inherit it at creation time. Idempotent:
    /// re-setting overwrites, never duplicates.
    pub fn set_global_exception_handler(&mut self, tag: TypeTag) -> Result<(), SchematicError> {
        if !tag.is_handler() {
            return Err(SchematicError::InvalidHandlerAssignment { name: tag.name() });
        }
        self.global_exception_handler = Some(tag);
        for node in &mut self.nodes {
            node.set_exception_handler(tag)?;
        }
        Ok(())
    }

    /// Set the default wrapper and apply it to every node.
    ///
    /// Same application rule as
    /// [`set_global_exception_handler`](Self::set_global_exception_handler).
    pub fn set_global_wrapper(&mut self, tag: TypeTag) -> Result<(), SchematicError> {
        if !tag.is_wrapper() {
            return Err(SchematicError::not_a_wrapper(&tag));
        }
        self.global_wrapper = Some(tag);
        for node in &mut self.nodes {
            node.wrap(tag)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn global_exception_handler(&self) -> Option<&TypeTag> {
        self.global_exception_handler.as_ref()
    }

    #[must_use]
    pub fn global_wrapper(&self) -> Option<&TypeTag> {
        self.global_wrapper.as_ref()
    }

    fn ensure_stage(tag: &TypeTag) -> Result<(), SchematicError> {
        if !tag.is_stage() || tag.signature().is_none() {
            return Err(SchematicError::not_a_stage(tag));
        }
        Ok(())
    }

    fn check_edge(&self, parent: &TypeTag, child: &TypeTag) -> Result<(), SchematicError> {
        let (Some(parent_sig), Some(child_sig)) = (parent.signature(), child.signature()) else {
            return Err(SchematicError::signature_mismatch(parent, child));
        };
        if !parent_sig.feeds(child_sig) {
            return Err(SchematicError::signature_mismatch(parent, child));
        }
        Ok(())
    }

    /// Whether `candidate` is `of` itself or one of its ancestors.
    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut seen = FxHashSet::default();
        let mut frontier = vec![of];
        while let Some(id) = frontier.pop() {
            if id == candidate {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            frontier.extend_from_slice(self.node(id).parents());
        }
        false
    }
}
