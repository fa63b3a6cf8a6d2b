//! Core data model for the asset-bridge transfer engine.
//!
//! This crate provides the foundational types shared by the shape-key
//! transfer and skeleton retargeting crates:
//!
//! - [`TriangleMesh`] - An indexed triangle mesh (positions + faces)
//! - [`Triangle`] - A concrete triangle with vertex positions
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`ShapeKey`] - A named per-vertex displacement set (morph target)
//! - [`Skeleton`] / [`Bone`] - A bone hierarchy with rest-pose transforms
//! - [`VertexInfluences`] - Per-vertex bone weight assignments
//!
//! All entities are transient: they are constructed fresh for a single
//! transfer or retarget operation and handed back to the caller. Nothing in
//! this crate performs I/O or holds state across operations.
//!
//! # Units and coordinates
//!
//! The library is unit-agnostic; all coordinates are `f64` in a right-handed
//! coordinate system. Face winding is counter-clockwise when viewed from
//! outside.
//!
//! # Example
//!
//! ```
//! use bridge_types::{TriangleMesh, Point3};
//!
//! let mesh = TriangleMesh::from_raw(
//!     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
//!     &[0, 1, 2],
//! );
//! assert_eq!(mesh.vertex_count(), 3);
//! assert_eq!(mesh.triangle_count(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod mesh;
mod shape_key;
mod skeleton;
mod triangle;
mod weights;

pub use bounds::Aabb;
pub use mesh::TriangleMesh;
pub use shape_key::ShapeKey;
pub use skeleton::{Bone, Skeleton};
pub use triangle::Triangle;
pub use weights::{BoneInfluence, VertexInfluences, MAX_INFLUENCES};

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point3, Vector3};
