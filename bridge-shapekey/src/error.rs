//! Error types for shape-key transfer.

use thiserror::Error;

/// Errors that can occur during shape-key transfer.
///
/// Only caller-side data corruption is fatal; per-key skips and degraded
/// matches are reported in [`TransferReport`](crate::TransferReport)
/// instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransferError {
    /// A shape key's delta count does not match its mesh's vertex count.
    #[error(
        "shape key '{key}' has {deltas} deltas but the source mesh has {vertex_count} vertices"
    )]
    DeltaCountMismatch {
        /// Name of the offending key.
        key: String,
        /// Number of deltas on the key.
        deltas: usize,
        /// Vertex count of the source mesh.
        vertex_count: usize,
    },
}

/// Result type for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;
