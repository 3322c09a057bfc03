//! Plan-validity rejections
//!
//! These are the recoverable tier of failures: a planner asked for
//! something the current state forbids, nothing was applied, and the caller
//! is expected to branch or retry. Genuine contract breaks (halting a
//! multi-bot build, spending seeds a bot does not own) panic instead.

use glam::IVec3;
use thiserror::Error;

/// Rejection of a single command. The grid, energy, trace, and round cursor
/// are untouched.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("delta {d} is not a straight or planar move within budget")]
    IllegalMove { d: IVec3 },

    #[error("cell {cell} blocks the move path")]
    PathBlocked { cell: IVec3 },

    #[error("cell {cell} was already used this round")]
    CellVolatile { cell: IVec3 },

    #[error("cell {cell} is already filled")]
    AlreadyFilled { cell: IVec3 },

    #[error("cell {cell} is already empty")]
    AlreadyEmpty { cell: IVec3 },

    #[error("cell {cell} is outside the build space")]
    OutOfBounds { cell: IVec3 },

    #[error("target {to} is not adjacent to {from}")]
    NotAdjacent { from: IVec3, to: IVec3 },

    #[error("delta {d} is not a valid region extent")]
    BadFarDelta { d: IVec3 },

    #[error("spawn cell {cell} is occupied")]
    SpawnBlocked { cell: IVec3 },

    #[error("corner {corner} was already claimed for this group operation")]
    DuplicateCorner { corner: IVec3 },

    #[error("trace output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to merge independently planned per-bot buffers into rounds.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("bot {id} has {len} buffered commands, expected {expected}")]
    LengthMismatch { id: u8, len: usize, expected: usize },

    #[error(transparent)]
    Step(#[from] StepError),
}
