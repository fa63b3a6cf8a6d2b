//! Per-vertex bone weight assignments.

use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of bone influences per vertex.
///
/// Game-engine skinning pipelines commonly cap influences at four; the
/// remapper truncates to this count after merging.
pub const MAX_INFLUENCES: usize = 4;

/// A single (bone, weight) pair deforming a vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoneInfluence {
    /// Index of the bone in its owning skeleton.
    pub bone: u16,
    /// Influence weight, non-negative.
    pub weight: f64,
}

impl BoneInfluence {
    /// Create a new influence.
    #[inline]
    #[must_use]
    pub const fn new(bone: u16, weight: f64) -> Self {
        Self { bone, weight }
    }
}

/// The bone influences acting on one vertex.
///
/// After any remapping step the invariant holds: weights are non-negative,
/// sum to 1.0 within tolerance, reference distinct bones, and there are at
/// most [`MAX_INFLUENCES`] entries. An empty set means the vertex has no
/// valid influence (reported as an orphan by the remapper).
///
/// # Example
///
/// ```
/// use bridge_types::VertexInfluences;
///
/// let mut influences = VertexInfluences::new();
/// influences.push(0, 3.0);
/// influences.push(2, 1.0);
/// assert!(influences.normalize());
/// assert!((influences.total_weight() - 1.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexInfluences {
    /// The (bone, weight) pairs, inline up to [`MAX_INFLUENCES`].
    pub influences: SmallVec<[BoneInfluence; MAX_INFLUENCES]>,
}

impl VertexInfluences {
    /// Create an empty influence set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an influence.
    #[inline]
    pub fn push(&mut self, bone: u16, weight: f64) {
        self.influences.push(BoneInfluence::new(bone, weight));
    }

    /// Number of influences.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.influences.len()
    }

    /// Whether the vertex has no influences.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.influences.is_empty()
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.influences.iter().map(|i| i.weight).sum()
    }

    /// Scale weights so they sum to 1.0.
    ///
    /// Returns `false` without modifying anything when the total weight is
    /// effectively zero (nothing meaningful to normalize).
    pub fn normalize(&mut self) -> bool {
        let total = self.total_weight();
        if total <= f64::EPSILON {
            return false;
        }
        for influence in &mut self.influences {
            influence.weight /= total;
        }
        true
    }

    /// Iterate over the influences.
    pub fn iter(&self) -> impl Iterator<Item = &BoneInfluence> {
        self.influences.iter()
    }
}

impl FromIterator<BoneInfluence> for VertexInfluences {
    fn from_iter<T: IntoIterator<Item = BoneInfluence>>(iter: T) -> Self {
        Self {
            influences: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalize_scales_to_unit_sum() {
        let mut influences = VertexInfluences::new();
        influences.push(0, 2.0);
        influences.push(1, 6.0);

        assert!(influences.normalize());
        assert_relative_eq!(influences.total_weight(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(influences.influences[0].weight, 0.25, epsilon = 1e-10);
    }

    #[test]
    fn normalize_empty_set_fails() {
        let mut influences = VertexInfluences::new();
        assert!(!influences.normalize());

        influences.push(3, 0.0);
        assert!(!influences.normalize());
    }

    #[test]
    fn collects_from_iterator() {
        let influences: VertexInfluences = [BoneInfluence::new(1, 0.5), BoneInfluence::new(2, 0.5)]
            .into_iter()
            .collect();
        assert_eq!(influences.len(), 2);
    }
}
