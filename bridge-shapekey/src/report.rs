//! Transfer output and per-operation report.

use bridge_types::ShapeKey;

/// Why a requested key was not transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SkipReason {
    /// The requested name does not exist on the source mesh.
    NotFound,
    /// The key was excluded by the transfer selection.
    NotSelected,
    /// A key of the same name already exists on the target and overwriting
    /// is disabled.
    AlreadyExists,
}

/// Accounting for a completed transfer operation.
///
/// Skips are per key; `distance_exceeded` and `empty_source_surface` are
/// per operation, since the vertex mapping is computed once and shared by
/// every key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferReport {
    /// Number of keys produced.
    pub transferred: usize,
    /// Keys that were requested but not transferred, with the reason.
    pub skipped: Vec<(String, SkipReason)>,
    /// Names of target keys replaced because overwriting was enabled.
    pub overwritten: Vec<String>,
    /// Target vertices whose nearest source point lay at or beyond the
    /// distance threshold. These vertices received zero deltas in every key.
    pub distance_exceeded: usize,
    /// The source mesh had no usable surface; every key was produced with
    /// all-zero deltas.
    pub empty_source_surface: bool,
}

impl TransferReport {
    /// One-line human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "TransferReport: {} transferred, {} skipped, {} overwritten, \
             {} vertices beyond threshold",
            self.transferred,
            self.skipped.len(),
            self.overwritten.len(),
            self.distance_exceeded
        )
    }
}

/// Result of a shape-key transfer: the produced keys plus the report.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutput {
    /// Transferred keys, sized for the target mesh, in source declaration
    /// order.
    pub keys: Vec<ShapeKey>,
    /// Per-operation accounting.
    pub report: TransferReport,
}
