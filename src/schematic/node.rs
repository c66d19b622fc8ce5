//! Descriptor nodes and the shared decoration surface.
//!
//! Three descriptor kinds live in a schematic: [`StageNode`] (a processing
//! unit, owning its tree edges), [`WrapperNode`] (one link of a decoration
//! chain), and [`HandlerNode`] (an error-handling unit). All three share the
//! [`Decorated`] capability surface: a type tag, a unique id, and an
//! optional single wrapper. That shared surface is what makes "wrap a
//! wrapper" and "wrap whatever kind of node" coherent.

use crate::types::{StageId, TypeTag};

use super::errors::SchematicError;

/// Index of a [`StageNode`] within the arena of the schematic that created
/// it. Ids from one schematic are meaningless in another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(super) usize);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// The shared capability surface of every descriptor kind.
///
/// Provides identity plus the single-wrapper decoration slot. `wrap`
/// *replaces* any wrapper already present; growing a multi-level decoration
/// chain goes through the wrapper's own `wrap`, which sets its inner
/// wrapper.
pub trait Decorated {
    /// The unique id of this descriptor within its schematic.
    fn unique_id(&self) -> StageId;

    /// The tagged type this descriptor stands for.
    fn type_tag(&self) -> &TypeTag;

    /// The immediate wrapper, if any.
    fn wrapper(&self) -> Option<&WrapperNode>;

    /// Mutable access to the wrapper slot.
    fn wrapper_slot(&mut self) -> &mut Option<Box<WrapperNode>>;

    /// Decorate this descriptor with a wrapper strategy.
    ///
    /// Replace semantics: a wrapper already present is discarded along with
    /// its chain. Fails with `IncompatibleType` if the tag is not
    /// wrapper-capable.
    fn wrap(&mut self, tag: TypeTag) -> Result<&mut WrapperNode, SchematicError> {
        if !tag.is_wrapper() {
            return Err(SchematicError::not_a_wrapper(&tag));
        }
        let boxed = self.wrapper_slot().insert(Box::new(WrapperNode::new(tag)));
        Ok(&mut **boxed)
    }

    /// Remove the wrapper (and its whole chain) from this descriptor.
    fn clear_wrapper(&mut self) {
        *self.wrapper_slot() = None;
    }

    fn has_wrapper(&self) -> bool {
        self.wrapper().is_some()
    }

    /// The decoration chain from the immediate wrapper outward.
    ///
    /// Finite by construction: chains grow only by boxing a fresh inner
    /// wrapper, so they cannot reference themselves. A descriptor with no
    /// wrapper yields an empty sequence.
    fn wrapper_chain(&self) -> Vec<TypeTag> {
        let mut chain = Vec::new();
        let mut current = self.wrapper();
        while let Some(wrapper) = current {
            chain.push(*wrapper.type_tag());
            current = wrapper.inner();
        }
        chain
    }
}

/// One link of a decoration chain attached to a stage, handler, or another
/// wrapper.
#[derive(Clone, Debug)]
pub struct WrapperNode {
    id: StageId,
    tag: TypeTag,
    inner: Option<Box<WrapperNode>>,
}

impl WrapperNode {
    pub(super) fn new(tag: TypeTag) -> Self {
        Self {
            id: StageId::new(),
            tag,
            inner: None,
        }
    }

    /// The next wrapper outward in the chain, if any.
    #[must_use]
    pub fn inner(&self) -> Option<&WrapperNode> {
        self.inner.as_deref()
    }

    #[must_use]
    pub fn inner_mut(&mut self) -> Option<&mut WrapperNode> {
        self.inner.as_deref_mut()
    }
}

impl Decorated for WrapperNode {
    fn unique_id(&self) -> StageId {
        self.id
    }

    fn type_tag(&self) -> &TypeTag {
        &self.tag
    }

    fn wrapper(&self) -> Option<&WrapperNode> {
        self.inner()
    }

    fn wrapper_slot(&mut self) -> &mut Option<Box<WrapperNode>> {
        &mut self.inner
    }
}

/// An error-handling descriptor attached to a stage node.
#[derive(Clone, Debug)]
pub struct HandlerNode {
    id: StageId,
    tag: TypeTag,
    wrapper: Option<Box<WrapperNode>>,
}

impl HandlerNode {
    pub(super) fn new(tag: TypeTag) -> Self {
        Self {
            id: StageId::new(),
            tag,
            wrapper: None,
        }
    }
}

impl Decorated for HandlerNode {
    fn unique_id(&self) -> StageId {
        self.id
    }

    fn type_tag(&self) -> &TypeTag {
        &self.tag
    }

    fn wrapper(&self) -> Option<&WrapperNode> {
        self.wrapper.as_deref()
    }

    fn wrapper_slot(&mut self) -> &mut Option<Box<WrapperNode>> {
        &mut self.wrapper
    }
}

/// One processing unit in the schematic tree.
///
/// Owns its child edges (as arena indices) and back-references its parents.
/// The root has no parents; every other node has at least one, and a node
/// reached through multiple parents (a diamond) still appears in the arena
/// exactly once.
#[derive(Clone, Debug)]
pub struct StageNode {
    id: StageId,
    tag: TypeTag,
    parents: Vec<NodeId>,
    children: Vec<NodeId>,
    wrapper: Option<Box<WrapperNode>>,
    handler: Option<HandlerNode>,
}

impl StageNode {
    pub(super) fn new(tag: TypeTag) -> Self {
        Self {
            id: StageId::new(),
            tag,
            parents: Vec::new(),
            children: Vec::new(),
            wrapper: None,
            handler: None,
        }
    }

    #[must_use]
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub(super) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(super) fn push_parent(&mut self, parent: NodeId) {
        self.parents.push(parent);
    }

    /// Attach an exception handler, replacing any existing one.
    ///
    /// Fails with `InvalidHandlerAssignment` if the tag lacks the handler
    /// capability; the node is left unchanged.
    pub fn set_exception_handler(
        &mut self,
        tag: TypeTag,
    ) -> Result<&mut HandlerNode, SchematicError> {
        if !tag.is_handler() {
            return Err(SchematicError::InvalidHandlerAssignment { name: tag.name() });
        }
        Ok(self.handler.insert(HandlerNode::new(tag)))
    }

    #[must_use]
    pub fn exception_handler(&self) -> Option<&HandlerNode> {
        self.handler.as_ref()
    }

    #[must_use]
    pub fn exception_handler_mut(&mut self) -> Option<&mut HandlerNode> {
        self.handler.as_mut()
    }

    pub fn clear_exception_handler(&mut self) {
        self.handler = None;
    }

    #[must_use]
    pub fn has_exception_handler(&self) -> bool {
        self.handler.is_some()
    }
}

impl Decorated for StageNode {
    fn unique_id(&self) -> StageId {
        self.id
    }

    fn type_tag(&self) -> &TypeTag {
        &self.tag
    }

    fn wrapper(&self) -> Option<&WrapperNode> {
        self.wrapper.as_deref()
    }

    fn wrapper_slot(&mut self) -> &mut Option<Box<WrapperNode>> {
        &mut self.wrapper
    }
}

impl StageNode {
    /// Mutable access to the immediate wrapper, for growing its chain.
    #[must_use]
    pub fn wrapper_mut(&mut self) -> Option<&mut WrapperNode> {
        self.wrapper.as_deref_mut()
    }
}
