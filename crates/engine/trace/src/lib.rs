//! Build-trace recording, validation, and execution
//!
//! One build is one ordered sequence of rounds; a round carries one command
//! per live bot, ascending by bot id. Two sinks consume commands behind the
//! shared [`TraceSink`] interface: [`Recorder`] buffers a single bot's plan
//! in memory, [`Executor`] authoritatively validates and applies whole
//! rounds, accounts energy, and emits the persisted wire trace.

mod bots;
mod command;
mod encode;
mod error;
mod executor;
mod recorder;
mod sink;
mod sync;

pub use bots::{highest_seed, lowest_seed, seed_range, Bot, Roster, MAX_BOTS};
pub use command::Command;
pub use error::{StepError, SyncError};
pub use executor::{Executor, MoveStats};
pub use recorder::Recorder;
pub use sink::TraceSink;
pub use sync::{drain_rounds, drain_rounds_strict};
