//! Point-to-triangle projection with barycentric output.

use nalgebra::Point3;

/// Result of a closest-point-on-surface query.
///
/// Produced fresh per query; barycentric weights are non-negative and sum
/// to 1 within numerical tolerance, and can be used to interpolate any
/// per-vertex field defined on the source mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    /// Index of the winning triangle in the source mesh.
    pub triangle: u32,
    /// Barycentric coordinates of the surface point with respect to the
    /// winning triangle's vertices, in vertex order.
    pub barycentric: [f64; 3],
    /// The closest point on the surface.
    pub position: Point3<f64>,
    /// Euclidean distance from the query point to `position`.
    pub distance: f64,
}

/// Compute the closest point on a triangle to a query point, together with
/// its barycentric coordinates.
///
/// Region tests follow "Real-Time Collision Detection" (Ericson). The
/// projection is clamped into the triangle's domain, so all three cases are
/// handled: the point may project onto the face interior, onto an edge, or
/// onto a vertex. The barycentric coordinates are exact per region
/// (`[1, 0, 0]` at a vertex, `[1 - t, t, 0]` on an edge).
///
/// The caller must not pass a degenerate triangle; the BVH excludes them at
/// build time.
///
/// # Example
///
/// ```
/// use bridge_spatial::closest_point_on_triangle;
/// use nalgebra::Point3;
///
/// let (point, bary) = closest_point_on_triangle(
///     &Point3::new(0.25, 0.25, 5.0),
///     &Point3::new(0.0, 0.0, 0.0),
///     &Point3::new(1.0, 0.0, 0.0),
///     &Point3::new(0.0, 1.0, 0.0),
/// );
/// assert!((point.z - 0.0).abs() < 1e-10);
/// assert!((bary[0] + bary[1] + bary[2] - 1.0).abs() < 1e-10);
/// ```
#[must_use]
pub fn closest_point_on_triangle(
    point: &Point3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> (Point3<f64>, [f64; 3]) {
    let ab = v1 - v0;
    let ac = v2 - v0;
    let ap = point - v0;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);

    // Vertex region outside A
    if d1 <= 0.0 && d2 <= 0.0 {
        return (*v0, [1.0, 0.0, 0.0]);
    }

    let bp = point - v1;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);

    // Vertex region outside B
    if d3 >= 0.0 && d4 <= d3 {
        return (*v1, [0.0, 1.0, 0.0]);
    }

    // Edge region AB
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let t = d1 / (d1 - d3);
        return (v0 + ab * t, [1.0 - t, t, 0.0]);
    }

    let cp = point - v2;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);

    // Vertex region outside C
    if d6 >= 0.0 && d5 <= d6 {
        return (*v2, [0.0, 0.0, 1.0]);
    }

    // Edge region AC
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let t = d2 / (d2 - d6);
        return (v0 + ac * t, [1.0 - t, 0.0, t]);
    }

    // Edge region BC
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let t = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (v1 + (v2 - v1) * t, [0.0, 1.0 - t, t]);
    }

    // Face interior
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    (v0 + ab * v + ac * w, [1.0 - v - w, v, w])
}
