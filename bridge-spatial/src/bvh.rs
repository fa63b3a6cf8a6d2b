//! Bounding volume hierarchy over a triangle mesh for exact closest-point
//! queries.

use bridge_types::{Aabb, Point3, Triangle, TriangleMesh};
use smallvec::SmallVec;

use crate::closest::{closest_point_on_triangle, SurfacePoint};

/// Maximum triangles per leaf node.
const MAX_LEAF_SIZE: usize = 8;

/// Subtree size above which construction recurses on both halves in
/// parallel.
const PARALLEL_BUILD_THRESHOLD: usize = 4096;

/// Area threshold below which a triangle is treated as degenerate and
/// excluded from the index.
const DEGENERATE_AREA_EPSILON: f64 = 1e-12;

/// Distances closer than this are considered equal; the triangle with the
/// lowest original index wins such ties, keeping query results independent
/// of traversal order.
const TIE_EPSILON: f64 = 1e-12;

/// BVH node holding either leaf triangles or two children.
#[derive(Debug)]
enum BvhNode {
    Leaf {
        /// Indices into the BVH's internal triangle list.
        triangles: SmallVec<[u32; MAX_LEAF_SIZE]>,
    },
    Internal {
        bbox: Aabb,
        left: Box<Self>,
        right: Box<Self>,
    },
}

/// A static spatial index over a source mesh's triangles.
///
/// Built once per mesh with a median split on the longest axis. Degenerate
/// (near-zero-area) triangles are excluded at build time, so every query
/// result refers to a well-formed triangle with meaningful barycentric
/// coordinates. Queries return the exact global minimum, not an
/// approximation.
///
/// The index is read-only after construction and safe to query from
/// multiple threads.
#[derive(Debug)]
pub struct TriangleBvh {
    root: Option<BvhNode>,
    /// Non-degenerate triangles with concrete vertex positions, in original
    /// index order.
    triangles: Vec<(u32, Triangle)>,
}

impl TriangleBvh {
    /// Build a BVH over the mesh's triangles.
    ///
    /// Degenerate triangles are skipped; a mesh whose triangles are all
    /// degenerate yields an index that answers every query with `None`,
    /// the same as an empty mesh.
    #[must_use]
    pub fn build(mesh: &TriangleMesh) -> Self {
        let triangles: Vec<(u32, Triangle)> = (0..mesh.triangle_count())
            .filter_map(|i| {
                let tri = mesh.triangle(i)?;
                if tri.is_degenerate(DEGENERATE_AREA_EPSILON) {
                    return None;
                }
                u32::try_from(i).ok().map(|i| (i, tri))
            })
            .collect();

        if triangles.is_empty() {
            return Self {
                root: None,
                triangles,
            };
        }

        let bboxes: Vec<Aabb> = triangles
            .iter()
            .map(|(_, tri)| Aabb::from_triangle(&tri.v0, &tri.v1, &tri.v2))
            .collect();

        #[allow(clippy::cast_possible_truncation)]
        let indices: Vec<u32> = (0..triangles.len() as u32).collect();
        let root = Self::build_recursive(&bboxes, indices);

        Self {
            root: Some(root),
            triangles,
        }
    }

    fn build_recursive(bboxes: &[Aabb], indices: Vec<u32>) -> BvhNode {
        let mut bbox = Aabb::empty();
        for &i in &indices {
            bbox.expand(&bboxes[i as usize]);
        }

        if indices.len() <= MAX_LEAF_SIZE {
            return BvhNode::Leaf {
                triangles: indices.into_iter().collect(),
            };
        }

        let axis = bbox.longest_axis();
        let mut sorted = indices;
        sorted.sort_by(|&a, &b| {
            let ca = bboxes[a as usize].center()[axis];
            let cb = bboxes[b as usize].center()[axis];
            ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = sorted.len() / 2;
        let right_indices = sorted.split_off(mid);
        let left_indices = sorted;

        let (left, right) = if left_indices.len() >= PARALLEL_BUILD_THRESHOLD {
            rayon::join(
                || Self::build_recursive(bboxes, left_indices),
                || Self::build_recursive(bboxes, right_indices),
            )
        } else {
            (
                Self::build_recursive(bboxes, left_indices),
                Self::build_recursive(bboxes, right_indices),
            )
        };

        BvhNode::Internal {
            bbox,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of triangles in the index (degenerate triangles excluded).
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the index holds no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Find the closest point on the indexed surface to `point`.
    ///
    /// Returns `None` only when the index is empty. The search is exact:
    /// subtrees are pruned with a box-distance lower bound, so the returned
    /// triangle is the true global minimum. When two triangles are within
    /// [`TIE_EPSILON`] of each other the one with the lowest original index
    /// wins, making results deterministic for points on shared edges and
    /// vertices.
    #[must_use]
    pub fn closest_point(&self, point: &Point3<f64>) -> Option<SurfacePoint> {
        let root = self.root.as_ref()?;
        let mut best: Option<SurfacePoint> = None;
        self.search(root, point, &mut best);
        best
    }

    fn search(&self, node: &BvhNode, point: &Point3<f64>, best: &mut Option<SurfacePoint>) {
        match node {
            BvhNode::Leaf { triangles } => {
                for &i in triangles {
                    let (original, tri) = &self.triangles[i as usize];
                    let (position, barycentric) =
                        closest_point_on_triangle(point, &tri.v0, &tri.v1, &tri.v2);
                    let distance = (point - position).norm();

                    let wins = match best {
                        None => true,
                        Some(current) => {
                            distance < current.distance - TIE_EPSILON
                                || ((distance - current.distance).abs() <= TIE_EPSILON
                                    && *original < current.triangle)
                        }
                    };
                    if wins {
                        *best = Some(SurfacePoint {
                            triangle: *original,
                            barycentric,
                            position,
                            distance,
                        });
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                let order = [left.as_ref(), right.as_ref()];
                let dl = Self::node_distance_squared(order[0], point);
                let dr = Self::node_distance_squared(order[1], point);
                let visits = if dl <= dr {
                    [(order[0], dl), (order[1], dr)]
                } else {
                    [(order[1], dr), (order[0], dl)]
                };

                for (child, d2) in visits {
                    let bound = best.as_ref().map_or(f64::INFINITY, |b| {
                        let d = b.distance + TIE_EPSILON;
                        d * d
                    });
                    if d2 <= bound {
                        self.search(child, point, best);
                    }
                }
            }
        }
    }

    fn node_distance_squared(node: &BvhNode, point: &Point3<f64>) -> f64 {
        match node {
            // Leaves are cheap to scan; always visit them when reached.
            BvhNode::Leaf { .. } => 0.0,
            BvhNode::Internal { bbox, .. } => bbox.distance_squared_to(point),
        }
    }
}
