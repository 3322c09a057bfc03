//! Planner failures

use glam::IVec3;
use nanoforge_trace::StepError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("no solver registered under id {0:?}")]
    UnknownSolver(String),

    #[error("solver does not support reconstruction from a source model")]
    ReconstructionUnsupported,

    #[error("no route from {from} to {to}")]
    Unroutable { from: IVec3, to: IVec3 },

    #[error("target model has no cells on the ground layer")]
    NoGroundContact,

    #[error(transparent)]
    Step(#[from] StepError),
}
