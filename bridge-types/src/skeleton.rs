//! Skeleton and bone hierarchy data.

use nalgebra::Isometry3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single bone in a skeleton.
///
/// Bone names are not guaranteed unique across skeletons; matching between
/// skeletons is done by fuzzy name comparison, not identity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bone {
    /// Bone name as authored in the host application.
    pub name: String,
    /// Index of the parent bone, or `None` for root bones.
    pub parent: Option<u16>,
    /// Rest-pose transform of the bone.
    pub rest_transform: Isometry3<f64>,
}

impl Bone {
    /// Create a bone with an identity rest transform.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, parent: Option<u16>) -> Self {
        Self {
            name: name.into(),
            parent,
            rest_transform: Isometry3::identity(),
        }
    }

    /// Create a bone with an explicit rest transform.
    #[inline]
    #[must_use]
    pub fn with_rest_transform(
        name: impl Into<String>,
        parent: Option<u16>,
        rest_transform: Isometry3<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            parent,
            rest_transform,
        }
    }
}

/// A bone hierarchy: an acyclic forest of bones in declaration order.
///
/// Multiple roots are allowed. Bones reference their parent by index;
/// declaration order is significant and is used as the deterministic
/// tie-break throughout matching.
///
/// # Example
///
/// ```
/// use bridge_types::{Bone, Skeleton};
///
/// let skeleton = Skeleton::from_bones(vec![
///     Bone::new("Root", None),
///     Bone::new("Spine", Some(0)),
///     Bone::new("Head", Some(1)),
/// ]);
/// assert_eq!(skeleton.len(), 3);
/// assert_eq!(skeleton.depth(2), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Skeleton {
    /// Bones in declaration order.
    pub bones: Vec<Bone>,
}

impl Skeleton {
    /// Create an empty skeleton.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { bones: Vec::new() }
    }

    /// Create a skeleton from a bone list.
    #[inline]
    #[must_use]
    pub const fn from_bones(bones: Vec<Bone>) -> Self {
        Self { bones }
    }

    /// Number of bones.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Whether the skeleton has no bones.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Get the bone at `index`.
    #[inline]
    #[must_use]
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// Find the index of the first bone with the given name.
    #[must_use]
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Depth of a bone from its root (roots have depth 0).
    ///
    /// Returns `None` for an out-of-range index or if the parent chain is
    /// malformed (cycle or dangling parent reference).
    #[must_use]
    pub fn depth(&self, index: usize) -> Option<usize> {
        let mut current = self.bones.get(index)?;
        let mut depth = 0;
        // A valid chain can be at most bones.len() long; anything longer is
        // a cycle.
        for _ in 0..self.bones.len() {
            match current.parent {
                None => return Some(depth),
                Some(p) => {
                    current = self.bones.get(p as usize)?;
                    depth += 1;
                }
            }
        }
        None
    }

    /// Ordinal of a bone among siblings sharing the same parent, in
    /// declaration order (first sibling is 0).
    #[must_use]
    pub fn sibling_ordinal(&self, index: usize) -> Option<usize> {
        let parent = self.bones.get(index)?.parent;
        Some(
            self.bones[..index]
                .iter()
                .filter(|b| b.parent == parent)
                .count(),
        )
    }

    /// Indices of all root bones.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent.is_none())
            .map(|(i, _)| i)
    }

    /// Indices of the direct children of the bone at `index`.
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(move |(_, b)| b.parent.map(usize::from) == Some(index))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn spine_chain() -> Skeleton {
        Skeleton::from_bones(vec![
            Bone::new("Root", None),
            Bone::new("Spine", Some(0)),
            Bone::new("Head", Some(1)),
            Bone::new("Arm_L", Some(1)),
            Bone::new("Arm_R", Some(1)),
        ])
    }

    #[test]
    fn depth_of_chain() {
        let skeleton = spine_chain();
        assert_eq!(skeleton.depth(0), Some(0));
        assert_eq!(skeleton.depth(1), Some(1));
        assert_eq!(skeleton.depth(2), Some(2));
        assert_eq!(skeleton.depth(9), None);
    }

    #[test]
    fn depth_detects_cycle() {
        let skeleton = Skeleton::from_bones(vec![
            Bone::new("a", Some(1)),
            Bone::new("b", Some(0)),
        ]);
        assert_eq!(skeleton.depth(0), None);
    }

    #[test]
    fn sibling_ordinals() {
        let skeleton = spine_chain();
        assert_eq!(skeleton.sibling_ordinal(2), Some(0)); // Head
        assert_eq!(skeleton.sibling_ordinal(3), Some(1)); // Arm_L
        assert_eq!(skeleton.sibling_ordinal(4), Some(2)); // Arm_R
    }

    #[test]
    fn roots_and_children() {
        let skeleton = spine_chain();
        assert_eq!(skeleton.roots().collect::<Vec<_>>(), vec![0]);
        assert_eq!(skeleton.children(1).collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn bone_index_first_match() {
        let skeleton = spine_chain();
        assert_eq!(skeleton.bone_index("Spine"), Some(1));
        assert_eq!(skeleton.bone_index("missing"), None);
    }
}
