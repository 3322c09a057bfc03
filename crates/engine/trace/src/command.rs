//! The closed bot instruction set

use glam::IVec3;
use serde::{Deserialize, Serialize};

/// One bot instruction.
///
/// Single-cell instructions carry a near delta `d` from the acting bot to
/// the affected cell; group instructions additionally carry `far`, the
/// offset from the bot's region corner to the diagonally opposite one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Stop the build. Legal only for the last bot, home, with the model
    /// complete.
    Halt,
    /// Do nothing this round.
    Wait,
    /// Toggle the harmonics mode.
    Flip,
    /// Relocate by `d`, either one straight segment or two orthogonal ones.
    /// `reversed` traverses the second canonical segment first.
    Move { d: IVec3, reversed: bool },
    /// Primary half of a fusion; `d` points at the secondary bot.
    FusionP { d: IVec3 },
    /// Secondary half of a fusion; `d` points at the primary bot.
    FusionS { d: IVec3 },
    /// Fill the cell at `d`.
    Fill { d: IVec3 },
    /// Spawn a child at `d`, granting it `m` seeds beyond its own id.
    Fission { d: IVec3, m: u8 },
    /// Void the cell at `d`.
    Void { d: IVec3 },
    /// Group-fill the region spanned by `d` and `far`.
    GFill { d: IVec3, far: IVec3 },
    /// Group-void the region spanned by `d` and `far`.
    GVoid { d: IVec3, far: IVec3 },
}

impl Command {
    /// Position of the acting bot after this command resolves.
    pub fn end_position(&self, pos: IVec3) -> IVec3 {
        match self {
            Command::Move { d, .. } => pos + *d,
            _ => pos,
        }
    }

    /// Splits a move delta into its traversal-ordered axis segments.
    ///
    /// The canonical order is ascending coordinate priority (x, then y,
    /// then z); `reversed` swaps a two-segment pair. Returns `None` for a
    /// zero delta or one spanning all three axes.
    pub fn segments(d: IVec3, reversed: bool) -> Option<(IVec3, Option<IVec3>)> {
        let parts: Vec<IVec3> = [
            IVec3::new(d.x, 0, 0),
            IVec3::new(0, d.y, 0),
            IVec3::new(0, 0, d.z),
        ]
        .into_iter()
        .filter(|s| *s != IVec3::ZERO)
        .collect();
        match parts.as_slice() {
            [a] => Some((*a, None)),
            [a, b] if !reversed => Some((*a, Some(*b))),
            [a, b] => Some((*b, Some(*a))),
            _ => None,
        }
    }
}
