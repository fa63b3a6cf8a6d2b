//! Shape-key (morph target) transfer between meshes of differing topology.
//!
//! The engine maps every target vertex to the closest point on the source
//! surface (or by index when topology matches), then carries each selected
//! shape key across by barycentric interpolation of its per-vertex deltas,
//! optionally faded out with distance. All per-key skips and degraded
//! matches are accounted for in a [`TransferReport`]; only caller-side data
//! corruption is a hard error.
//!
//! # Example
//!
//! ```
//! use bridge_shapekey::{transfer_shape_keys, TransferParams};
//! use bridge_types::{Point3, ShapeKey, TriangleMesh, Vector3};
//!
//! let source = TriangleMesh::from_raw(
//!     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
//!     &[0, 1, 2],
//! );
//! let keys = vec![ShapeKey::new("lift", vec![Vector3::new(0.0, 0.0, 1.0); 3])];
//! let target = TriangleMesh::from_parts(vec![Point3::new(0.25, 0.25, 0.0)], vec![]);
//!
//! let output = transfer_shape_keys(&source, &keys, &target, &[], &TransferParams::new())?;
//! assert_eq!(output.report.transferred, 1);
//! # Ok::<(), bridge_shapekey::TransferError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod params;
mod report;
mod transfer;

pub use error::{TransferError, TransferResult};
pub use params::TransferParams;
pub use report::{SkipReason, TransferOutput, TransferReport};
pub use transfer::transfer_shape_keys;
