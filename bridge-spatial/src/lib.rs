//! Nearest-point-on-surface queries for the asset-bridge transfer engine.
//!
//! This crate builds a bounding-volume hierarchy over a source mesh's
//! triangles and answers exact closest-point queries against it, returning
//! the winning triangle, the clamped surface point, its barycentric
//! coordinates, and the Euclidean distance.
//!
//! The index is built once per source mesh, is read-only afterwards, and is
//! safe to query concurrently from multiple threads.
//!
//! # Example
//!
//! ```
//! use bridge_spatial::TriangleBvh;
//! use bridge_types::{Point3, TriangleMesh};
//!
//! let mesh = TriangleMesh::from_raw(
//!     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
//!     &[0, 1, 2],
//! );
//! let bvh = TriangleBvh::build(&mesh);
//!
//! let hit = bvh.closest_point(&Point3::new(0.25, 0.25, 1.0)).unwrap();
//! assert_eq!(hit.triangle, 0);
//! assert!((hit.distance - 1.0).abs() < 1e-10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bvh;
mod closest;

pub use bvh::TriangleBvh;
pub use closest::{closest_point_on_triangle, SurfacePoint};
