//! Vertex-weight remapping through a bone mapping.

use bridge_types::{VertexInfluences, MAX_INFLUENCES};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{RetargetError, RetargetResult};
use crate::mapping::BoneMapping;

/// Vertex count above which per-vertex work runs in parallel.
const PARALLEL_THRESHOLD: usize = 1000;

/// Accounting for a completed remap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapReport {
    /// Vertices that lost every influence. Their output set is empty.
    pub orphaned: Vec<usize>,
    /// Total influences dropped because their source bone had no target.
    pub dropped_influences: usize,
}

/// Result of a weight remap: per-vertex influences plus the report.
#[derive(Debug, Clone, PartialEq)]
pub struct RemapOutput {
    /// Remapped influences, one entry per input vertex, in input order.
    pub weights: Vec<VertexInfluences>,
    /// Per-operation accounting.
    pub report: RemapReport,
}

/// Remap per-vertex bone weights from the mapping's source skeleton onto
/// its target skeleton.
///
/// Each influence's bone is substituted through the mapping. Influences on
/// unmapped bones are dropped; influences that collapse onto the same
/// target bone are merged by summing. The merged set is sorted by
/// descending weight (ties by bone index), truncated to
/// [`MAX_INFLUENCES`], and renormalized to sum 1. A vertex whose entire
/// set drops is reported as orphaned rather than silently zeroed.
///
/// # Errors
///
/// Returns [`RetargetError::InvalidBoneIndex`] when an influence references
/// a bone outside the mapping's source skeleton.
///
/// # Example
///
/// ```
/// use bridge_retarget::{match_bones, remap_weights};
/// use bridge_types::{Bone, Skeleton, VertexInfluences};
/// use hashbrown::HashMap;
///
/// let source = Skeleton::from_bones(vec![Bone::new("Root", None)]);
/// let target = Skeleton::from_bones(vec![Bone::new("root", None)]);
/// let mapping = match_bones(&source, &target, &HashMap::new());
///
/// let mut vertex = VertexInfluences::new();
/// vertex.push(0, 1.0);
///
/// let output = remap_weights(&[vertex], &mapping)?;
/// assert_eq!(output.weights[0].influences[0].bone, 0);
/// # Ok::<(), bridge_retarget::RetargetError>(())
/// ```
pub fn remap_weights(
    weights: &[VertexInfluences],
    mapping: &BoneMapping,
) -> RetargetResult<RemapOutput> {
    // Validate up front so the per-vertex pass is infallible.
    for (vertex, influences) in weights.iter().enumerate() {
        for influence in influences.iter() {
            if usize::from(influence.bone) >= mapping.len() {
                return Err(RetargetError::InvalidBoneIndex {
                    vertex,
                    bone: influence.bone,
                    bone_count: mapping.len(),
                });
            }
        }
    }

    info!(vertices = weights.len(), bones = mapping.len(), "remapping weights");

    let remap_vertex = |influences: &VertexInfluences| -> (VertexInfluences, usize) {
        let mut merged = VertexInfluences::new();
        let mut dropped = 0usize;

        for influence in influences.iter() {
            let Some(target) = mapping.target_of(influence.bone) else {
                dropped += 1;
                continue;
            };
            match merged.influences.iter_mut().find(|m| m.bone == target) {
                Some(existing) => existing.weight += influence.weight,
                None => merged.push(target, influence.weight),
            }
        }

        merged.influences.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.bone.cmp(&b.bone))
        });
        merged.influences.truncate(MAX_INFLUENCES);

        if !merged.normalize() {
            merged.influences.clear();
        }
        (merged, dropped)
    };

    let results: Vec<(VertexInfluences, usize)> = if weights.len() > PARALLEL_THRESHOLD {
        weights.par_iter().map(remap_vertex).collect()
    } else {
        weights.iter().map(remap_vertex).collect()
    };

    let mut report = RemapReport::default();
    let mut remapped = Vec::with_capacity(results.len());
    for (vertex, (influences, dropped)) in results.into_iter().enumerate() {
        report.dropped_influences += dropped;
        if influences.is_empty() && !weights[vertex].is_empty() {
            debug!(vertex, "vertex lost all influences");
            report.orphaned.push(vertex);
        }
        remapped.push(influences);
    }

    Ok(RemapOutput {
        weights: remapped,
        report,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::mapping::{MapEntry, MatchGrade, MatchReason};
    use approx::assert_relative_eq;

    fn mapping_from_targets(targets: &[Option<u16>]) -> BoneMapping {
        BoneMapping {
            entries: targets
                .iter()
                .enumerate()
                .map(|(i, target)| {
                    #[allow(clippy::cast_possible_truncation)]
                    let source = i as u16;
                    MapEntry {
                        source,
                        target: *target,
                        confidence: if target.is_some() { 1.0 } else { 0.0 },
                        grade: if target.is_some() {
                            MatchGrade::High
                        } else {
                            MatchGrade::None
                        },
                        reason: if target.is_some() {
                            MatchReason::Exact
                        } else {
                            MatchReason::Unmatched
                        },
                    }
                })
                .collect(),
        }
    }

    fn vertex(pairs: &[(u16, f64)]) -> VertexInfluences {
        let mut influences = VertexInfluences::new();
        for &(bone, weight) in pairs {
            influences.push(bone, weight);
        }
        influences
    }

    #[test]
    fn substitutes_and_renormalizes() {
        let mapping = mapping_from_targets(&[Some(5), Some(7)]);
        let output =
            remap_weights(&[vertex(&[(0, 0.6), (1, 0.2)])], &mapping).unwrap();

        let result = &output.weights[0];
        assert_eq!(result.len(), 2);
        assert_eq!(result.influences[0].bone, 5);
        assert_relative_eq!(result.influences[0].weight, 0.75, epsilon = 1e-10);
        assert_eq!(result.influences[1].bone, 7);
        assert_relative_eq!(result.influences[1].weight, 0.25, epsilon = 1e-10);
        assert_relative_eq!(result.total_weight(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn colliding_targets_merge_by_summing() {
        // Bones 0 and 1 both land on target 3
        let mapping = mapping_from_targets(&[Some(3), Some(3), Some(4)]);
        let output =
            remap_weights(&[vertex(&[(0, 0.3), (1, 0.3), (2, 0.4)])], &mapping).unwrap();

        let result = &output.weights[0];
        assert_eq!(result.len(), 2);
        assert_eq!(result.influences[0].bone, 3);
        assert_relative_eq!(result.influences[0].weight, 0.6, epsilon = 1e-10);
        assert_relative_eq!(result.influences[1].weight, 0.4, epsilon = 1e-10);
    }

    #[test]
    fn unmapped_influences_drop_and_renormalize() {
        let mapping = mapping_from_targets(&[Some(0), None]);
        let output =
            remap_weights(&[vertex(&[(0, 0.5), (1, 0.5)])], &mapping).unwrap();

        let result = &output.weights[0];
        assert_eq!(result.len(), 1);
        assert_relative_eq!(result.influences[0].weight, 1.0, epsilon = 1e-10);
        assert_eq!(output.report.dropped_influences, 1);
        assert!(output.report.orphaned.is_empty());
    }

    #[test]
    fn fully_dropped_vertex_is_orphaned() {
        let mapping = mapping_from_targets(&[None, Some(0)]);
        let output = remap_weights(
            &[vertex(&[(0, 1.0)]), vertex(&[(1, 1.0)]), vertex(&[])],
            &mapping,
        )
        .unwrap();

        assert!(output.weights[0].is_empty());
        assert_eq!(output.report.orphaned, vec![0]);
        assert_eq!(output.report.dropped_influences, 1);
        // A vertex with no influences to begin with is not an orphan
        assert!(output.weights[2].is_empty());
    }

    #[test]
    fn truncates_to_influence_cap() {
        let mapping =
            mapping_from_targets(&[Some(0), Some(1), Some(2), Some(3), Some(4), Some(5)]);
        let output = remap_weights(
            &[vertex(&[
                (0, 0.05),
                (1, 0.3),
                (2, 0.25),
                (3, 0.2),
                (4, 0.15),
                (5, 0.05),
            ])],
            &mapping,
        )
        .unwrap();

        let result = &output.weights[0];
        assert_eq!(result.len(), MAX_INFLUENCES);
        // The two weakest influences (bones 0 and 5) were cut
        assert!(result.iter().all(|i| i.bone != 0 && i.bone != 5));
        assert_relative_eq!(result.total_weight(), 1.0, epsilon = 1e-5);
        // Sorted by descending weight
        for pair in result.influences.windows(2) {
            assert!(pair[0].weight >= pair[1].weight);
        }
    }

    #[test]
    fn invalid_bone_index_is_fatal() {
        let mapping = mapping_from_targets(&[Some(0)]);
        let result = remap_weights(&[vertex(&[(3, 1.0)])], &mapping);
        assert!(matches!(
            result,
            Err(RetargetError::InvalidBoneIndex {
                vertex: 0,
                bone: 3,
                bone_count: 1
            })
        ));
    }

    #[test]
    fn zero_weight_vertex_is_orphaned() {
        let mapping = mapping_from_targets(&[Some(0)]);
        let output = remap_weights(&[vertex(&[(0, 0.0)])], &mapping).unwrap();
        assert!(output.weights[0].is_empty());
        assert_eq!(output.report.orphaned, vec![0]);
    }

    #[test]
    fn repeated_remaps_are_deterministic() {
        let mapping = mapping_from_targets(&[Some(2), Some(2), Some(1), None]);
        let input = vec![
            vertex(&[(0, 0.4), (1, 0.4), (2, 0.1), (3, 0.1)]),
            vertex(&[(2, 1.0)]),
        ];

        let first = remap_weights(&input, &mapping).unwrap();
        for _ in 0..5 {
            assert_eq!(remap_weights(&input, &mapping).unwrap(), first);
        }
    }
}
