//! Skeleton retargeting: fuzzy bone matching and vertex-weight remapping.
//!
//! Matching runs in passes (manual overrides, exact names, rig-affix
//! normalization, a canonical-alias table, then global fuzzy scoring) and
//! produces a [`BoneMapping`] with a confidence grade and reason per source
//! bone. The [`remap_weights`] operation then carries per-vertex bone
//! weights across that mapping, dropping unmapped influences, merging
//! collisions, and renormalizing.
//!
//! # Example
//!
//! ```
//! use bridge_retarget::{match_bones, MatchGrade};
//! use bridge_types::{Bone, Skeleton};
//! use hashbrown::HashMap;
//!
//! let source = Skeleton::from_bones(vec![
//!     Bone::new("Root", None),
//!     Bone::new("Spine", Some(0)),
//! ]);
//! let target = Skeleton::from_bones(vec![
//!     Bone::new("root", None),
//!     Bone::new("spine_01", Some(0)),
//! ]);
//!
//! let mapping = match_bones(&source, &target, &HashMap::new());
//! assert_eq!(mapping.target_of(1), Some(1));
//! assert_eq!(mapping.grade_counts().high, 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod mapping;
mod matcher;
mod remap;

pub use error::{RetargetError, RetargetResult};
pub use mapping::{BoneMapping, GradeCounts, MapEntry, MatchGrade, MatchReason};
pub use matcher::{match_bones, normalize_bone_name, Side, CONFIDENCE_CUTOFF};
pub use remap::{remap_weights, RemapOutput, RemapReport};
