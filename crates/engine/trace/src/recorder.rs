//! In-memory per-bot plan buffer

use glam::IVec3;

use crate::{Command, StepError, TraceSink};

/// Flat buffer of one bot's planned commands.
///
/// Records without validating; legality is the executor's business once the
/// buffers are merged into rounds. Supports truncating a speculative tail so
/// planners can explore and back out.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    commands: Vec<Command>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn push(&mut self, cmd: Command) {
        self.commands.push(cmd);
    }

    /// Empties the buffer, handing the commands to the synchronizer.
    pub fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

impl TraceSink for Recorder {
    fn halt(&mut self) -> Result<(), StepError> {
        self.push(Command::Halt);
        Ok(())
    }

    fn wait(&mut self) -> Result<(), StepError> {
        self.push(Command::Wait);
        Ok(())
    }

    fn flip(&mut self) -> Result<(), StepError> {
        self.push(Command::Flip);
        Ok(())
    }

    fn move_to(&mut self, from: IVec3, to: IVec3, reversed: bool) -> Result<(), StepError> {
        self.push(Command::Move {
            d: to - from,
            reversed,
        });
        Ok(())
    }

    fn fill(&mut self, from: IVec3, to: IVec3) -> Result<(), StepError> {
        self.push(Command::Fill { d: to - from });
        Ok(())
    }

    fn void(&mut self, from: IVec3, to: IVec3) -> Result<(), StepError> {
        self.push(Command::Void { d: to - from });
        Ok(())
    }

    fn fusion_p(&mut self, from: IVec3, to: IVec3) -> Result<(), StepError> {
        self.push(Command::FusionP { d: to - from });
        Ok(())
    }

    fn fusion_s(&mut self, from: IVec3, to: IVec3) -> Result<(), StepError> {
        self.push(Command::FusionS { d: to - from });
        Ok(())
    }

    fn fission(&mut self, from: IVec3, to: IVec3, m: u8) -> Result<(), StepError> {
        self.push(Command::Fission { d: to - from, m });
        Ok(())
    }

    fn g_fill(&mut self, from: IVec3, to: IVec3, far: IVec3) -> Result<(), StepError> {
        self.push(Command::GFill { d: to - from, far });
        Ok(())
    }

    fn g_void(&mut self, from: IVec3, to: IVec3, far: IVec3) -> Result<(), StepError> {
        self.push(Command::GVoid { d: to - from, far });
        Ok(())
    }

    fn probe(&self, _cmd: &Command) -> Result<(), StepError> {
        panic!("recorder does not track grid state");
    }

    fn step_count(&self) -> usize {
        self.commands.len()
    }

    fn truncate(&mut self, len: usize) -> bool {
        if len > self.commands.len() {
            return false;
        }
        self.commands.truncate(len);
        true
    }

    fn filled_count(&self) -> usize {
        panic!("recorder does not track grid state");
    }

    fn is_filled(&self, _p: IVec3) -> bool {
        panic!("recorder does not track grid state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_without_validating() {
        let mut rec = Recorder::new();
        let p = IVec3::new(2, 0, 2);
        rec.move_to(IVec3::ZERO, p, false).unwrap();
        rec.fill(p, p + IVec3::NEG_Y).unwrap();
        assert_eq!(rec.len(), 2);
        assert_eq!(
            rec.commands()[1],
            Command::Fill {
                d: IVec3::new(0, -1, 0)
            }
        );
    }

    #[test]
    fn test_truncate_discards_speculative_tail() {
        let mut rec = Recorder::new();
        rec.wait().unwrap();
        let mark = rec.step_count();
        rec.flip().unwrap();
        rec.wait().unwrap();
        assert!(rec.truncate(mark));
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.commands(), &[Command::Wait]);
        // cannot truncate forward
        assert!(!rec.truncate(5));
    }
}
