//! Core identity and type-tag primitives for the pipewright pipeline model.
//!
//! This module defines the fundamental types used throughout the system for
//! identifying descriptors and for carrying runtime type information:
//!
//! - [`StageId`] / [`WorkerId`]: opaque unique identifiers for descriptors
//!   and live workers
//! - [`Signature`]: the declared input/output type pair of a stage
//! - [`CapabilitySet`] and [`TypeTag`]: runtime capability and identity tags
//!   used by the [`Schematic`](crate::schematic::Schematic) to validate edges
//!
//! # Capability checking
//!
//! A [`TypeTag`] can only be minted through generic constructors bounded by
//! the capability traits ([`Stage`], [`WrapperKind`],
//! [`ExceptionHandler`](crate::stage::ExceptionHandler)), so the compiler is
//! the primary capability check. The tag still carries its [`CapabilitySet`]
//! so the schematic can reject a tag handed to the wrong slot (a stage tag
//! used as an exception handler, say) at construction time.
//!
//! # Examples
//!
//! ```rust
//! use pipewright::types::TypeTag;
//! use pipewright::stage::{Stage, StageContext, StageError};
//! use async_trait::async_trait;
//!
//! struct Doubler;
//!
//! #[async_trait]
//! impl Stage for Doubler {
//!     type Input = u32;
//!     type Output = u64;
//!     async fn ingest(
//!         &mut self,
//!         input: u32,
//!         ctx: &StageContext<u64>,
//!     ) -> Result<(), StageError> {
//!         ctx.send(u64::from(input) * 2);
//!         Ok(())
//!     }
//! }
//!
//! let tag = TypeTag::stage::<Doubler>();
//! assert!(tag.is_stage());
//! assert!(!tag.is_wrapper());
//! let sig = tag.signature().unwrap();
//! assert!(sig.input_name().contains("u32"));
//! assert!(sig.output_name().contains("u64"));
//! ```

use std::any::TypeId;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stage::{ExceptionHandler, Stage, WrapperKind};

/// Opaque unique identifier for one descriptor in a schematic.
///
/// Every stage, wrapper, and exception-handler descriptor gets its own id at
/// creation time; ids are never reused within a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageId(Uuid);

impl StageId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque unique identifier for one live worker instance.
///
/// Distinct from [`StageId`]: a single stage descriptor may be realized as
/// many workers (a pool, or one worker per message), each with its own
/// `WorkerId`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerId(Uuid);

impl WorkerId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The declared input/output type pair of a stage implementation.
///
/// Captured from the `Stage::Input` / `Stage::Output` associated types, this
/// is what edge validation compares: a child may follow a parent iff the
/// parent's output type is exactly the child's input type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    input: TypeId,
    output: TypeId,
    input_name: &'static str,
    output_name: &'static str,
}

impl Signature {
    /// Capture the signature of a concrete stage type.
    #[must_use]
    pub fn of<S: Stage>() -> Self {
        Self {
            input: TypeId::of::<S::Input>(),
            output: TypeId::of::<S::Output>(),
            input_name: std::any::type_name::<S::Input>(),
            output_name: std::any::type_name::<S::Output>(),
        }
    }

    /// Returns `true` if a stage with this signature can feed one with `next`:
    /// our output type is exactly `next`'s input type.
    #[must_use]
    pub fn feeds(&self, next: &Signature) -> bool {
        self.output == next.input
    }

    #[must_use]
    pub fn input_name(&self) -> &'static str {
        self.input_name
    }

    #[must_use]
    pub fn output_name(&self) -> &'static str {
        self.output_name
    }
}

/// The capabilities a tagged type satisfies.
///
/// Mirrors the three descriptor roles: plain stage, concurrency wrapper, and
/// exception handler. A handler tag is also stage-capable (handlers process
/// fault messages the way any other stage processes its input).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    pub stage: bool,
    pub wrapper: bool,
    pub handler: bool,
}

/// Runtime identity for a descriptor's underlying Rust type.
///
/// A `TypeTag` is what the schematic construction APIs accept in place of a
/// concrete stage value. It bundles the `TypeId`, the human-readable type
/// name, the satisfied capabilities, and (for stage-capable types) the
/// declared [`Signature`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeTag {
    type_id: TypeId,
    name: &'static str,
    caps: CapabilitySet,
    signature: Option<Signature>,
}

impl TypeTag {
    /// Tag a type that implements the [`Stage`] capability.
    #[must_use]
    pub fn stage<S: Stage>() -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
            caps: CapabilitySet {
                stage: true,
                ..CapabilitySet::default()
            },
            signature: Some(Signature::of::<S>()),
        }
    }

    /// Tag a wrapper strategy marker (see [`WrapperKind`]).
    ///
    /// Wrapper tags carry no signature of their own: a wrapper adopts the
    /// signature of whichever stage it decorates at build time.
    #[must_use]
    pub fn wrapper<W: WrapperKind>() -> Self {
        Self {
            type_id: TypeId::of::<W>(),
            name: std::any::type_name::<W>(),
            caps: CapabilitySet {
                wrapper: true,
                ..CapabilitySet::default()
            },
            signature: None,
        }
    }

    /// Tag a type that implements the [`ExceptionHandler`] capability.
    ///
    /// Handler tags are also stage-capable; their input type is always
    /// [`FaultReport`](crate::message::FaultReport).
    #[must_use]
    pub fn handler<H: ExceptionHandler>() -> Self {
        Self {
            type_id: TypeId::of::<H>(),
            name: std::any::type_name::<H>(),
            caps: CapabilitySet {
                stage: true,
                handler: true,
                ..CapabilitySet::default()
            },
            signature: Some(Signature::of::<H>()),
        }
    }

    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn caps(&self) -> CapabilitySet {
        self.caps
    }

    #[must_use]
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    #[must_use]
    pub fn is_stage(&self) -> bool {
        self.caps.stage
    }

    #[must_use]
    pub fn is_wrapper(&self) -> bool {
        self.caps.wrapper
    }

    #[must_use]
    pub fn is_handler(&self) -> bool {
        self.caps.handler
    }

    /// Returns `true` if this tag identifies the concrete type `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::FaultReport;
    use crate::stage::{StageContext, StageError};
    use async_trait::async_trait;

    struct ToUpper;

    #[async_trait]
    impl Stage for ToUpper {
        type Input = String;
        type Output = String;
        async fn ingest(
            &mut self,
            input: String,
            ctx: &StageContext<String>,
        ) -> Result<(), StageError> {
            ctx.send(input.to_uppercase());
            Ok(())
        }
    }

    struct Count;

    #[async_trait]
    impl Stage for Count {
        type Input = String;
        type Output = usize;
        async fn ingest(
            &mut self,
            input: String,
            ctx: &StageContext<usize>,
        ) -> Result<(), StageError> {
            ctx.send(input.len());
            Ok(())
        }
    }

    struct SwallowFaults;

    #[async_trait]
    impl Stage for SwallowFaults {
        type Input = FaultReport;
        type Output = ();
        async fn ingest(
            &mut self,
            _input: FaultReport,
            _ctx: &StageContext<()>,
        ) -> Result<(), StageError> {
            Ok(())
        }
    }

    impl ExceptionHandler for SwallowFaults {}

    #[test]
    fn stage_ids_are_unique() {
        let a = StageId::new();
        let b = StageId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn signature_feeds_matches_on_exact_types() {
        let upper = Signature::of::<ToUpper>();
        let count = Signature::of::<Count>();
        assert!(upper.feeds(&count));
        assert!(!count.feeds(&upper));
        assert!(upper.feeds(&upper));
    }

    #[test]
    fn stage_tag_carries_signature_and_capability() {
        let tag = TypeTag::stage::<ToUpper>();
        assert!(tag.is_stage());
        assert!(!tag.is_wrapper());
        assert!(!tag.is_handler());
        assert!(tag.signature().is_some());
        assert!(tag.is::<ToUpper>());
        assert!(!tag.is::<Count>());
    }

    #[test]
    fn handler_tag_is_also_stage_capable() {
        let tag = TypeTag::handler::<SwallowFaults>();
        assert!(tag.is_handler());
        assert!(tag.is_stage());
        let sig = tag.signature().unwrap();
        assert!(sig.input_name().contains("FaultReport"));
    }
}
