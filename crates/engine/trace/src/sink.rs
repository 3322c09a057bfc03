//! The shared trace-sink capability interface

use glam::IVec3;

use crate::{Command, StepError};

/// Capability interface over the closed pair of trace sinks.
///
/// [`Recorder`](crate::Recorder) buffers one bot's plan without validation;
/// [`Executor`](crate::Executor) validates and applies synchronized rounds.
/// Planners write through this trait so a plan can be rehearsed in memory
/// and later replayed against the authoritative executor unchanged.
pub trait TraceSink {
    fn halt(&mut self) -> Result<(), StepError>;
    fn wait(&mut self) -> Result<(), StepError>;
    fn flip(&mut self) -> Result<(), StepError>;

    /// Relocate from `from` to `to`; `reversed` traverses the second
    /// canonical axis segment first.
    fn move_to(&mut self, from: IVec3, to: IVec3, reversed: bool) -> Result<(), StepError>;

    fn fill(&mut self, from: IVec3, to: IVec3) -> Result<(), StepError>;
    fn void(&mut self, from: IVec3, to: IVec3) -> Result<(), StepError>;
    fn fusion_p(&mut self, from: IVec3, to: IVec3) -> Result<(), StepError>;
    fn fusion_s(&mut self, from: IVec3, to: IVec3) -> Result<(), StepError>;
    fn fission(&mut self, from: IVec3, to: IVec3, m: u8) -> Result<(), StepError>;
    fn g_fill(&mut self, from: IVec3, to: IVec3, far: IVec3) -> Result<(), StepError>;
    fn g_void(&mut self, from: IVec3, to: IVec3, far: IVec3) -> Result<(), StepError>;

    /// Submits `cmd` for the bot currently at `pos` and returns the bot's
    /// position afterwards.
    fn apply(&mut self, pos: IVec3, cmd: &Command) -> Result<IVec3, StepError> {
        match *cmd {
            Command::Halt => self.halt()?,
            Command::Wait => self.wait()?,
            Command::Flip => self.flip()?,
            Command::Move { d, reversed } => self.move_to(pos, pos + d, reversed)?,
            Command::Fill { d } => self.fill(pos, pos + d)?,
            Command::Void { d } => self.void(pos, pos + d)?,
            Command::FusionP { d } => self.fusion_p(pos, pos + d)?,
            Command::FusionS { d } => self.fusion_s(pos, pos + d)?,
            Command::Fission { d, m } => self.fission(pos, pos + d, m)?,
            Command::GFill { d, far } => self.g_fill(pos, pos + d, far)?,
            Command::GVoid { d, far } => self.g_void(pos, pos + d, far)?,
        }
        Ok(cmd.end_position(pos))
    }

    /// Validates `cmd` for the next acting bot without mutating anything.
    ///
    /// Only the executor tracks the state this needs; probing a recorder is
    /// a contract violation.
    fn probe(&self, cmd: &Command) -> Result<(), StepError>;

    /// Number of commands this sink has accepted.
    fn step_count(&self) -> usize;

    /// Discards the speculative tail beyond `len` accepted commands.
    /// Returns false when this sink cannot backtrack (committed state).
    fn truncate(&mut self, len: usize) -> bool;

    /// Number of filled cells in the sink's grid.
    fn filled_count(&self) -> usize;

    /// Occupancy of a single cell in the sink's grid.
    fn is_filled(&self, p: IVec3) -> bool;
}
