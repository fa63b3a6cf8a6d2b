//! Shape-key transfer between meshes of differing topology.

use bridge_spatial::TriangleBvh;
use bridge_types::{ShapeKey, TriangleMesh, Vector3};
use hashbrown::HashSet;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{TransferError, TransferResult};
use crate::params::TransferParams;
use crate::report::{SkipReason, TransferOutput, TransferReport};

/// Vertex count above which per-vertex work runs in parallel.
const PARALLEL_THRESHOLD: usize = 1000;

/// One target vertex's interpolation stencil over source vertices.
///
/// Weights already include the distance falloff, so applying a key is a
/// plain weighted sum.
#[derive(Debug, Clone, Copy)]
struct VertexSource {
    indices: [u32; 3],
    weights: [f64; 3],
}

/// The per-operation vertex mapping, computed once and shared by all keys.
struct VertexMapping {
    entries: Vec<Option<VertexSource>>,
    distance_exceeded: usize,
    empty_source_surface: bool,
}

/// Transfer shape keys from a source mesh onto a target mesh.
///
/// Builds one vertex mapping for the operation (identity when topology
/// matches and the fast path is enabled, closest-surface-point otherwise),
/// then produces one key per selected source key, interpolating deltas with
/// barycentric weights scaled by the distance falloff. Keys that cannot be
/// transferred are skipped with a reason in the report, never silently
/// dropped.
///
/// `target_keys` is consulted only for name conflicts; its delta contents
/// are never read.
///
/// # Errors
///
/// Returns [`TransferError::DeltaCountMismatch`] when any source key's
/// delta count disagrees with the source mesh's vertex count.
///
/// # Example
///
/// ```
/// use bridge_shapekey::{transfer_shape_keys, TransferParams};
/// use bridge_types::{ShapeKey, TriangleMesh, Vector3};
///
/// let source = TriangleMesh::from_raw(
///     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
///     &[0, 1, 2],
/// );
/// let keys = vec![ShapeKey::new("lift", vec![Vector3::new(0.0, 0.0, 1.0); 3])];
/// let target = TriangleMesh::from_parts(
///     vec![bridge_types::Point3::new(0.25, 0.25, 0.0)],
///     vec![],
/// );
///
/// let output = transfer_shape_keys(
///     &source,
///     &keys,
///     &target,
///     &[],
///     &TransferParams::new(),
/// )
/// .unwrap();
///
/// assert_eq!(output.report.transferred, 1);
/// assert!((output.keys[0].deltas[0].z - 1.0).abs() < 1e-10);
/// ```
pub fn transfer_shape_keys(
    source: &TriangleMesh,
    source_keys: &[ShapeKey],
    target: &TriangleMesh,
    target_keys: &[ShapeKey],
    params: &TransferParams,
) -> TransferResult<TransferOutput> {
    for key in source_keys {
        if key.deltas.len() != source.vertex_count() {
            return Err(TransferError::DeltaCountMismatch {
                key: key.name.clone(),
                deltas: key.deltas.len(),
                vertex_count: source.vertex_count(),
            });
        }
    }

    info!(
        source_keys = source_keys.len(),
        source_vertices = source.vertex_count(),
        target_vertices = target.vertex_count(),
        "transferring shape keys"
    );

    let mapping = build_vertex_mapping(source, target, params);

    let target_names: HashSet<&str> = target_keys.iter().map(|k| k.name.as_str()).collect();
    let mut keys = Vec::new();
    let mut skipped = Vec::new();
    let mut overwritten = Vec::new();

    for key in source_keys {
        if !params.is_selected(&key.name) {
            skipped.push((key.name.clone(), SkipReason::NotSelected));
            continue;
        }
        if target_names.contains(key.name.as_str()) {
            if params.overwrite_existing {
                overwritten.push(key.name.clone());
            } else {
                debug!(key = %key.name, "skipping, already exists on target");
                skipped.push((key.name.clone(), SkipReason::AlreadyExists));
                continue;
            }
        }
        keys.push(apply_key(key, &mapping));
    }

    // Requested names with no corresponding source key, reported in sorted
    // order since the selection set is unordered.
    if let Some(selection) = &params.selected_keys {
        let mut missing: Vec<&String> = selection
            .iter()
            .filter(|name| !source_keys.iter().any(|k| &k.name == *name))
            .collect();
        missing.sort();
        for name in missing {
            skipped.push((name.clone(), SkipReason::NotFound));
        }
    }

    let report = TransferReport {
        transferred: keys.len(),
        skipped,
        overwritten,
        distance_exceeded: mapping.distance_exceeded,
        empty_source_surface: mapping.empty_source_surface,
    };
    Ok(TransferOutput { keys, report })
}

fn build_vertex_mapping(
    source: &TriangleMesh,
    target: &TriangleMesh,
    params: &TransferParams,
) -> VertexMapping {
    if params.use_topology_fast_path && source.vertex_count() == target.vertex_count() {
        debug!("vertex counts match, using identity mapping");
        return build_topology_mapping(source, target, params);
    }
    debug!("using closest-surface-point mapping");
    build_closest_point_mapping(source, target, params)
}

fn build_topology_mapping(
    source: &TriangleMesh,
    target: &TriangleMesh,
    params: &TransferParams,
) -> VertexMapping {
    let map_vertex = |index: usize| -> (Option<VertexSource>, bool) {
        let distance = (source.positions[index] - target.positions[index]).norm();
        let weight = params.falloff_weight(distance);
        let exceeded = params.distance_threshold > 0.0 && distance >= params.distance_threshold;

        #[allow(clippy::cast_possible_truncation)]
        let i = index as u32;
        (
            Some(VertexSource {
                indices: [i, i, i],
                weights: [weight, 0.0, 0.0],
            }),
            exceeded,
        )
    };

    let results: Vec<(Option<VertexSource>, bool)> = if target.vertex_count() > PARALLEL_THRESHOLD
    {
        (0..target.vertex_count()).into_par_iter().map(map_vertex).collect()
    } else {
        (0..target.vertex_count()).map(map_vertex).collect()
    };

    collect_mapping(results)
}

fn build_closest_point_mapping(
    source: &TriangleMesh,
    target: &TriangleMesh,
    params: &TransferParams,
) -> VertexMapping {
    let bvh = TriangleBvh::build(source);
    if bvh.is_empty() {
        warn!("source mesh has no usable surface, all deltas will be zero");
        return VertexMapping {
            entries: vec![None; target.vertex_count()],
            distance_exceeded: 0,
            empty_source_surface: true,
        };
    }

    let map_vertex = |index: usize| -> (Option<VertexSource>, bool) {
        let Some(hit) = bvh.closest_point(&target.positions[index]) else {
            return (None, false);
        };
        let weight = params.falloff_weight(hit.distance);
        let exceeded =
            params.distance_threshold > 0.0 && hit.distance >= params.distance_threshold;

        let indices = source.triangles[hit.triangle as usize];
        (
            Some(VertexSource {
                indices,
                weights: [
                    hit.barycentric[0] * weight,
                    hit.barycentric[1] * weight,
                    hit.barycentric[2] * weight,
                ],
            }),
            exceeded,
        )
    };

    let results: Vec<(Option<VertexSource>, bool)> = if target.vertex_count() > PARALLEL_THRESHOLD
    {
        (0..target.vertex_count()).into_par_iter().map(map_vertex).collect()
    } else {
        (0..target.vertex_count()).map(map_vertex).collect()
    };

    collect_mapping(results)
}

fn collect_mapping(results: Vec<(Option<VertexSource>, bool)>) -> VertexMapping {
    let distance_exceeded = results.iter().filter(|(_, exceeded)| *exceeded).count();
    VertexMapping {
        entries: results.into_iter().map(|(entry, _)| entry).collect(),
        distance_exceeded,
        empty_source_surface: false,
    }
}

fn apply_key(key: &ShapeKey, mapping: &VertexMapping) -> ShapeKey {
    let interpolate = |entry: &Option<VertexSource>| -> Vector3<f64> {
        let Some(stencil) = entry else {
            return Vector3::zeros();
        };
        let mut delta = Vector3::zeros();
        for (index, weight) in stencil.indices.iter().zip(&stencil.weights) {
            if let Some(source_delta) = key.deltas.get(*index as usize) {
                delta += source_delta * *weight;
            }
        }
        delta
    };

    let deltas: Vec<Vector3<f64>> = if mapping.entries.len() > PARALLEL_THRESHOLD {
        mapping.entries.par_iter().map(interpolate).collect()
    } else {
        mapping.entries.iter().map(interpolate).collect()
    };

    ShapeKey::new(key.name.clone(), deltas)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bridge_types::Point3;

    fn unit_triangle() -> TriangleMesh {
        TriangleMesh::from_raw(
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            &[0, 1, 2],
        )
    }

    fn lift_key(vertex_count: usize) -> ShapeKey {
        ShapeKey::new("lift", vec![Vector3::new(0.0, 0.0, 1.0); vertex_count])
    }

    fn point_target(points: &[[f64; 3]]) -> TriangleMesh {
        TriangleMesh::from_parts(
            points.iter().map(|p| Point3::new(p[0], p[1], p[2])).collect(),
            vec![],
        )
    }

    #[test]
    fn uniform_delta_interpolates_exactly() {
        let source = unit_triangle();
        let target = point_target(&[[0.25, 0.25, 0.0]]);

        let output = transfer_shape_keys(
            &source,
            &[lift_key(3)],
            &target,
            &[],
            &TransferParams::new(),
        )
        .unwrap();

        assert_eq!(output.report.transferred, 1);
        assert_eq!(output.report.distance_exceeded, 0);
        let delta = output.keys[0].deltas[0];
        assert_relative_eq!(delta.x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(delta.y, 0.0, epsilon = 1e-10);
        assert_relative_eq!(delta.z, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn beyond_threshold_gets_zero_delta() {
        let source = unit_triangle();
        let target = point_target(&[[10.0, 10.0, 0.0]]);
        let params = TransferParams::new().with_distance_threshold(1.0);

        let output =
            transfer_shape_keys(&source, &[lift_key(3)], &target, &[], &params).unwrap();

        assert_eq!(output.report.distance_exceeded, 1);
        assert_relative_eq!(output.keys[0].deltas[0].norm(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn falloff_scales_delta_with_distance() {
        let source = unit_triangle();
        // 0.5 above the surface, threshold 1.0, linear falloff
        let target = point_target(&[[0.25, 0.25, 0.5]]);
        let params = TransferParams::new()
            .with_distance_threshold(1.0)
            .with_falloff(1.0);

        let output =
            transfer_shape_keys(&source, &[lift_key(3)], &target, &[], &params).unwrap();

        assert_eq!(output.report.distance_exceeded, 0);
        assert_relative_eq!(output.keys[0].deltas[0].z, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn fast_path_matches_general_path_on_identical_topology() {
        let source = unit_triangle();
        let target = source.clone();
        let key = ShapeKey::new(
            "bend",
            vec![
                Vector3::new(0.1, 0.0, 0.0),
                Vector3::new(0.0, 0.2, 0.0),
                Vector3::new(0.0, 0.0, 0.3),
            ],
        );

        let fast = transfer_shape_keys(
            &source,
            std::slice::from_ref(&key),
            &target,
            &[],
            &TransferParams::new(),
        )
        .unwrap();
        let general = transfer_shape_keys(
            &source,
            std::slice::from_ref(&key),
            &target,
            &[],
            &TransferParams::new().with_topology_fast_path(false),
        )
        .unwrap();

        for (a, b) in fast.keys[0].deltas.iter().zip(&general.keys[0].deltas) {
            assert_relative_eq!((a - b).norm(), 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn existing_key_skipped_unless_overwriting() {
        let source = unit_triangle();
        let target = point_target(&[[0.5, 0.25, 0.0]]);
        let existing = vec![ShapeKey::zeroed("lift", 1)];

        let output = transfer_shape_keys(
            &source,
            &[lift_key(3)],
            &target,
            &existing,
            &TransferParams::new(),
        )
        .unwrap();
        assert_eq!(output.report.transferred, 0);
        assert_eq!(
            output.report.skipped,
            vec![("lift".to_string(), SkipReason::AlreadyExists)]
        );

        let output = transfer_shape_keys(
            &source,
            &[lift_key(3)],
            &target,
            &existing,
            &TransferParams::new().with_overwrite_existing(true),
        )
        .unwrap();
        assert_eq!(output.report.transferred, 1);
        assert_eq!(output.report.overwritten, vec!["lift".to_string()]);
    }

    #[test]
    fn selective_transfer_reports_unselected_and_missing() {
        let source = unit_triangle();
        let target = point_target(&[[0.25, 0.25, 0.0]]);
        let keys = vec![
            ShapeKey::new("smile", vec![Vector3::zeros(); 3]),
            ShapeKey::new("blink", vec![Vector3::zeros(); 3]),
        ];
        let params = TransferParams::new()
            .with_selected_keys(["smile".to_string(), "ghost".to_string()]);

        let output = transfer_shape_keys(&source, &keys, &target, &[], &params).unwrap();

        assert_eq!(output.report.transferred, 1);
        assert_eq!(output.keys[0].name, "smile");
        assert!(output
            .report
            .skipped
            .contains(&("blink".to_string(), SkipReason::NotSelected)));
        assert!(output
            .report
            .skipped
            .contains(&("ghost".to_string(), SkipReason::NotFound)));
    }

    #[test]
    fn empty_source_surface_yields_zero_deltas() {
        // Vertices but no triangles: nothing to query against
        let source = TriangleMesh::from_parts(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            vec![],
        );
        let key = ShapeKey::new("k", vec![Vector3::new(1.0, 1.0, 1.0); 2]);
        let target = point_target(&[[0.0, 0.0, 0.0], [0.5, 0.5, 0.5], [1.0, 1.0, 1.0]]);

        let output =
            transfer_shape_keys(&source, &[key], &target, &[], &TransferParams::new()).unwrap();

        assert!(output.report.empty_source_surface);
        assert_eq!(output.report.transferred, 1);
        assert!(output.keys[0].deltas.iter().all(|d| d.norm() == 0.0));
    }

    #[test]
    fn empty_target_mesh_produces_empty_keys() {
        let source = unit_triangle();
        let output = transfer_shape_keys(
            &source,
            &[lift_key(3)],
            &TriangleMesh::new(),
            &[],
            &TransferParams::new(),
        )
        .unwrap();

        assert_eq!(output.report.transferred, 1);
        assert!(output.keys[0].deltas.is_empty());
    }

    #[test]
    fn delta_count_mismatch_is_fatal() {
        let source = unit_triangle();
        let bad = ShapeKey::new("bad", vec![Vector3::zeros(); 2]);
        let result = transfer_shape_keys(
            &source,
            &[bad],
            &point_target(&[[0.0, 0.0, 0.0]]),
            &[],
            &TransferParams::new(),
        );
        assert!(matches!(
            result,
            Err(TransferError::DeltaCountMismatch { deltas: 2, .. })
        ));
    }

    #[test]
    fn repeated_transfers_are_bit_identical() {
        let source = unit_triangle();
        let target = point_target(&[[0.3, 0.4, 0.7], [0.9, 0.1, -0.2], [2.0, 2.0, 2.0]]);
        let params = TransferParams::new()
            .with_distance_threshold(3.0)
            .with_falloff(1.5);

        let first =
            transfer_shape_keys(&source, &[lift_key(3)], &target, &[], &params).unwrap();
        for _ in 0..5 {
            let run =
                transfer_shape_keys(&source, &[lift_key(3)], &target, &[], &params).unwrap();
            assert_eq!(run, first);
        }
    }
}
