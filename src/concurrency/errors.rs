//! Errors raised while routing messages into wrapped stages.

use miette::Diagnostic;
use thiserror::Error;

/// Why a wrapper could not hand a message to a worker.
#[derive(Debug, Error, Diagnostic)]
pub enum IngestError {
    /// Every member of a load-balancing pool has terminated.
    #[error("no live workers remain in the pool")]
    #[diagnostic(
        code(pipewright::concurrency::pool_exhausted),
        help("Pool members are never respawned; rebuild the pipeline to recover.")
    )]
    PoolExhausted,

    /// A freshly spawned worker refused the message before processing it.
    #[error("worker rejected the message before processing it")]
    #[diagnostic(code(pipewright::concurrency::worker_unavailable))]
    WorkerUnavailable,
}
