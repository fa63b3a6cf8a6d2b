//! Shape key (morph target) data.

use crate::TriangleMesh;
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named set of per-vertex displacements applied additively over a mesh's
/// rest pose.
///
/// Deltas are aligned by index with the owning mesh's vertices: `deltas[i]`
/// displaces vertex `i`. A shape key is only valid for a mesh whose vertex
/// count equals `deltas.len()`; see [`ShapeKey::matches`].
///
/// # Example
///
/// ```
/// use bridge_types::ShapeKey;
/// use nalgebra::Vector3;
///
/// let key = ShapeKey::new("smile", vec![Vector3::new(0.0, 0.0, 1.0); 3]);
/// assert_eq!(key.name, "smile");
/// assert_eq!(key.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeKey {
    /// Key name, unique within its owning mesh.
    pub name: String,
    /// Per-vertex displacement from the rest position, one entry per vertex.
    pub deltas: Vec<Vector3<f64>>,
}

impl ShapeKey {
    /// Create a shape key from a name and per-vertex deltas.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, deltas: Vec<Vector3<f64>>) -> Self {
        Self {
            name: name.into(),
            deltas,
        }
    }

    /// Create a shape key of all-zero deltas for a mesh with `vertex_count`
    /// vertices.
    #[must_use]
    pub fn zeroed(name: impl Into<String>, vertex_count: usize) -> Self {
        Self {
            name: name.into(),
            deltas: vec![Vector3::zeros(); vertex_count],
        }
    }

    /// Number of per-vertex deltas.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// Whether the key has no deltas.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Whether this key's delta count matches the mesh's vertex count.
    #[inline]
    #[must_use]
    pub fn matches(&self, mesh: &TriangleMesh) -> bool {
        self.deltas.len() == mesh.vertex_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TriangleMesh;
    use nalgebra::Point3;

    #[test]
    fn zeroed_key() {
        let key = ShapeKey::zeroed("basis", 4);
        assert_eq!(key.len(), 4);
        assert!(key.deltas.iter().all(|d| d.norm() == 0.0));
    }

    #[test]
    fn matches_mesh_vertex_count() {
        let mut mesh = TriangleMesh::new();
        mesh.positions.push(Point3::origin());
        mesh.positions.push(Point3::new(1.0, 0.0, 0.0));

        let key = ShapeKey::zeroed("k", 2);
        assert!(key.matches(&mesh));

        let short = ShapeKey::zeroed("k", 1);
        assert!(!short.matches(&mesh));
    }
}
