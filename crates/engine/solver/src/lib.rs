//! Baseline build planners
//!
//! The flood-fill solver derives a legal, complete single-bot build order
//! for a target model; [`reach_cell`] is the point-to-point movement planner
//! it routes with. Solvers are dispatched by name through an explicit
//! [`SolverRegistry`] value.

mod error;
mod flood;
mod registry;
mod route;

pub use error::SolverError;
pub use flood::flood_fill_solve;
pub use registry::{SolverFn, SolverRegistry};
pub use route::reach_cell;
