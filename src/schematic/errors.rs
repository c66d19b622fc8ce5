//! Construction-time errors for schematic assembly.
//!
//! All of these are raised synchronously while the schematic is being built
//! and always leave the tree exactly as it was: edge insertion is
//! all-or-nothing.

use miette::Diagnostic;
use thiserror::Error;

use crate::types::TypeTag;

/// Errors raised while assembling a [`Schematic`](super::Schematic).
#[derive(Debug, Error, Diagnostic)]
pub enum SchematicError {
    /// A type failed a required capability or signature check: not a stage
    /// where a stage is required, not wrapper-capable where wrapping is
    /// required, or a parent-output/child-input mismatch.
    #[error("incompatible type: {detail}")]
    #[diagnostic(
        code(pipewright::schematic::incompatible_type),
        help(
            "Mint tags with TypeTag::stage / TypeTag::wrapper / TypeTag::handler so the \
             capability travels with the tag, and check the declared Input/Output types \
             of adjacent stages."
        )
    )]
    IncompatibleType { detail: String },

    /// A type lacking the exception-handler capability was assigned as an
    /// exception handler.
    #[error("`{name}` cannot be assigned as an exception handler")]
    #[diagnostic(
        code(pipewright::schematic::invalid_handler_assignment),
        help("Exception handlers must implement the ExceptionHandler trait and be tagged with TypeTag::handler.")
    )]
    InvalidHandlerAssignment { name: &'static str },

    /// Linking an existing node under one of its own descendants (or under
    /// itself) would create a cycle.
    #[error("linking this child would create a cycle in the schematic")]
    #[diagnostic(
        code(pipewright::schematic::cyclic_link),
        help("A node may gain extra parents, but never one of its own descendants.")
    )]
    CyclicLink,
}

impl SchematicError {
    pub(crate) fn not_a_stage(tag: &TypeTag) -> Self {
        Self::IncompatibleType {
            detail: format!("`{}` does not satisfy the stage capability", tag.name()),
        }
    }

    pub(crate) fn not_a_wrapper(tag: &TypeTag) -> Self {
        Self::IncompatibleType {
            detail: format!("`{}` does not satisfy the wrapper capability", tag.name()),
        }
    }

    pub(crate) fn signature_mismatch(parent: &TypeTag, child: &TypeTag) -> Self {
        let parent_output = parent
            .signature()
            .map_or("<none>", |sig| sig.output_name());
        let child_input = child.signature().map_or("<none>", |sig| sig.input_name());
        Self::IncompatibleType {
            detail: format!(
                "`{}` emits `{parent_output}` but `{}` ingests `{child_input}`",
                parent.name(),
                child.name()
            ),
        }
    }
}
