//! Indexed triangle mesh.

use crate::{Aabb, Triangle};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh.
///
/// Stores vertex positions and triangles separately, with triangles
/// referencing vertices by index. Source and target meshes in a transfer are
/// independent; their vertex counts and topology may differ.
///
/// The mesh is treated as immutable for the duration of a query session:
/// spatial indices built over it borrow it read-only.
///
/// # Example
///
/// ```
/// use bridge_types::{TriangleMesh, Point3};
///
/// let mut mesh = TriangleMesh::new();
/// mesh.positions.push(Point3::new(0.0, 0.0, 0.0));
/// mesh.positions.push(Point3::new(1.0, 0.0, 0.0));
/// mesh.positions.push(Point3::new(0.0, 1.0, 0.0));
/// mesh.triangles.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriangleMesh {
    /// Vertex positions.
    pub positions: Vec<Point3<f64>>,

    /// Triangles as indices into the position array, `[v0, v1, v2]` with
    /// counter-clockwise winding.
    pub triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Create a mesh from positions and triangle indices.
    #[inline]
    #[must_use]
    pub const fn from_parts(positions: Vec<Point3<f64>>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            triangles,
        }
    }

    /// Create a mesh from flat coordinate and index arrays.
    ///
    /// `positions` is `[x0, y0, z0, x1, y1, z1, ...]` and `indices` is
    /// `[a0, b0, c0, a1, b1, c1, ...]`. Returns an empty mesh if either
    /// array's length is not divisible by 3.
    ///
    /// # Example
    ///
    /// ```
    /// use bridge_types::TriangleMesh;
    ///
    /// let mesh = TriangleMesh::from_raw(
    ///     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    ///     &[0, 1, 2],
    /// );
    /// assert_eq!(mesh.triangle_count(), 1);
    /// ```
    #[must_use]
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> Self {
        if positions.len() % 3 != 0 || indices.len() % 3 != 0 {
            return Self::new();
        }

        let positions = positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();

        let triangles = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();

        Self {
            positions,
            triangles,
        }
    }

    /// Number of vertices in the mesh.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles in the mesh.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the mesh has no triangles.
    ///
    /// A mesh with vertices but no triangles is considered empty: it has no
    /// surface to query against.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Get the triangle at `index` with concrete vertex positions.
    ///
    /// Returns `None` if the index is out of range or the triangle
    /// references a vertex outside the position array.
    #[must_use]
    pub fn triangle(&self, index: usize) -> Option<Triangle> {
        let [i0, i1, i2] = *self.triangles.get(index)?;
        Some(Triangle::new(
            *self.positions.get(i0 as usize)?,
            *self.positions.get(i1 as usize)?,
            *self.positions.get(i2 as usize)?,
        ))
    }

    /// Iterate over all triangles with concrete vertex positions.
    ///
    /// Triangles referencing out-of-range vertices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangles.len()).filter_map(|i| self.triangle(i))
    }

    /// Compute the axis-aligned bounding box of all vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::empty();
        for p in &self.positions {
            bounds.expand_point(p);
        }
        bounds
    }
}
