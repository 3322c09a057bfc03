//! Merging per-bot plans into synchronized rounds
//!
//! Each bot plans independently into its recorder; the merge walks every
//! buffer in lock-step, submitting round i as the i-th command of each bot
//! ascending by id. Roster membership must stay constant across the merged
//! rounds; fission and fusion belong at a batch boundary, after which the
//! planner updates the roster and merges the next batch.

use tracing::debug;

use crate::{Command, Roster, StepError, SyncError, TraceSink};

/// Merges every bot's buffered plan into rounds and submits them through
/// `sink`. Bots whose buffer runs out early contribute Wait for the
/// remaining rounds. Buffers are drained; positions and step counters are
/// updated from the sink's answers.
///
/// A rejection stops the merge at the offending command; rounds already
/// submitted stand.
pub fn drain_rounds(sink: &mut dyn TraceSink, roster: &mut Roster) -> Result<(), StepError> {
    let rounds = roster.iter().map(|b| b.plan.len()).max().unwrap_or(0);
    merge(sink, roster, rounds)
}

/// Strict merge: every participating buffer must hold the same number of
/// commands. On a mismatch nothing is consumed and nothing is submitted.
pub fn drain_rounds_strict(sink: &mut dyn TraceSink, roster: &mut Roster) -> Result<(), SyncError> {
    let mut lengths = roster.iter().map(|b| (b.id, b.plan.len()));
    let Some((_, expected)) = lengths.next() else {
        return Ok(());
    };
    for (id, len) in lengths {
        if len != expected {
            return Err(SyncError::LengthMismatch { id, len, expected });
        }
    }
    merge(sink, roster, expected).map_err(SyncError::from)
}

fn merge(sink: &mut dyn TraceSink, roster: &mut Roster, rounds: usize) -> Result<(), StepError> {
    let plans: Vec<(u8, Vec<Command>)> = roster
        .iter_mut()
        .map(|b| (b.id, b.plan.take()))
        .collect();
    debug!(rounds, bots = plans.len(), "merging plans");
    for i in 0..rounds {
        for (id, plan) in &plans {
            let cmd = plan.get(i).copied().unwrap_or(Command::Wait);
            let bot = roster.get_mut(*id).expect("planned bot left the roster");
            bot.pos = sink.apply(bot.pos, &cmd)?;
            bot.step += 1;
        }
    }
    Ok(())
}
