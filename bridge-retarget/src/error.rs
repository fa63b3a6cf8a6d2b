//! Error types for skeleton retargeting.

use thiserror::Error;

/// Errors that can occur during retargeting.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RetargetError {
    /// A vertex influence references a bone outside the mapping's source
    /// skeleton.
    #[error(
        "vertex {vertex} references bone {bone} but the mapping covers {bone_count} source bones"
    )]
    InvalidBoneIndex {
        /// Index of the offending vertex.
        vertex: usize,
        /// The out-of-range bone index.
        bone: u16,
        /// Number of source bones in the mapping.
        bone_count: usize,
    },
}

/// Result type for retargeting operations.
pub type RetargetResult<T> = Result<T, RetargetError>;
