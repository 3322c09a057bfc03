//! Dense voxel occupancy model for the nanoforge build space
//!
//! This crate holds the geometric core shared by the trace executor and the
//! planners: integer-lattice coordinate helpers, canonical axis-aligned
//! regions, and the occupancy [`Matrix`] with its O(1) box-count structure
//! and model file I/O.

mod coord;
mod grid;
mod model;
mod region;

pub use coord::{check_subdeltas, deltas26, IVec3Ext, DELTAS6};
pub use grid::Matrix;
pub use model::ModelError;
pub use region::Region;

// Re-export glam for convenience
pub use glam;
