//! Axis-aligned bounding box.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
///
/// The empty box is inverted (`min > max`) so that expanding it with the
/// first point or box produces a valid result.
///
/// # Example
///
/// ```
/// use bridge_types::{Aabb, Point3};
///
/// let mut bounds = Aabb::empty();
/// bounds.expand_point(&Point3::new(1.0, 2.0, 3.0));
/// bounds.expand_point(&Point3::new(-1.0, 0.0, 0.0));
/// assert!((bounds.min.x - (-1.0)).abs() < 1e-10);
/// assert!((bounds.max.z - 3.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// Create an empty (inverted) bounding box.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// Create a bounding box from min and max corners.
    #[inline]
    #[must_use]
    pub const fn from_min_max(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Create a bounding box covering a triangle.
    #[must_use]
    pub fn from_triangle(v0: &Point3<f64>, v1: &Point3<f64>, v2: &Point3<f64>) -> Self {
        Self {
            min: Point3::new(
                v0.x.min(v1.x).min(v2.x),
                v0.y.min(v1.y).min(v2.y),
                v0.z.min(v1.z).min(v2.z),
            ),
            max: Point3::new(
                v0.x.max(v1.x).max(v2.x),
                v0.y.max(v1.y).max(v2.y),
                v0.z.max(v1.z).max(v2.z),
            ),
        }
    }

    /// Whether the box is empty (inverted).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include another.
    pub fn expand(&mut self, other: &Self) {
        self.min.x = self.min.x.min(other.min.x);
        self.min.y = self.min.y.min(other.min.y);
        self.min.z = self.min.z.min(other.min.z);
        self.max.x = self.max.x.max(other.max.x);
        self.max.y = self.max.y.max(other.max.y);
        self.max.z = self.max.z.max(other.max.z);
    }

    /// Expand this box to include a point.
    pub fn expand_point(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Get the center of the box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Get the index of the longest axis (0 = X, 1 = Y, 2 = Z).
    #[must_use]
    pub fn longest_axis(&self) -> usize {
        let dx = self.max.x - self.min.x;
        let dy = self.max.y - self.min.y;
        let dz = self.max.z - self.min.z;

        if dx >= dy && dx >= dz {
            0
        } else if dy >= dz {
            1
        } else {
            2
        }
    }

    /// Squared distance from a point to the box (zero if inside).
    ///
    /// Lower bound on the distance to any geometry enclosed by the box, used
    /// for pruning during nearest-point search.
    ///
    /// # Example
    ///
    /// ```
    /// use bridge_types::{Aabb, Point3};
    ///
    /// let bounds = Aabb::from_min_max(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 1.0, 1.0),
    /// );
    /// assert!((bounds.distance_squared_to(&Point3::new(2.0, 0.5, 0.5)) - 1.0).abs() < 1e-10);
    /// assert!(bounds.distance_squared_to(&Point3::new(0.5, 0.5, 0.5)) < 1e-10);
    /// ```
    #[must_use]
    pub fn distance_squared_to(&self, point: &Point3<f64>) -> f64 {
        let dx = (self.min.x - point.x).max(0.0).max(point.x - self.max.x);
        let dy = (self.min.y - point.y).max(0.0).max(point.y - self.max.y);
        let dz = (self.min.z - point.z).max(0.0).max(point.z - self.max.z);
        dz.mul_add(dz, dx.mul_add(dx, dy * dy))
    }
}
