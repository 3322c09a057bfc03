//! The synchronized multi-bot build executor
//!
//! Commands stream in one per live bot, ascending by bot id; the executor
//! validates each against the grid as it stood when the round opened plus
//! the round's volatile cells, applies it, and on the round's last command
//! charges the global energy, installs the next roster, and appends the
//! round's wire records to the output.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use glam::IVec3;
use matrix::{IVec3Ext, Matrix, Region};
use tracing::debug;

use crate::bots::{lowest_seed, seed_range, MAX_BOTS};
use crate::encode::encode_command;
use crate::{Command, StepError, TraceSink};

/// Per-round energy per unit of build volume, by harmonics mode.
const ENERGY_HIGH: i64 = 30;
const ENERGY_LOW: i64 = 3;
/// Per-round energy per live bot.
const ENERGY_BOT: i64 = 20;
const ENERGY_FILL: i64 = 12;
const ENERGY_VOID: i64 = -12;
const ENERGY_FISSION: i64 = 24;
/// Charged once per fused pair, on the primary's half.
const ENERGY_FUSION: i64 = -24;
/// Group fill/void energy per region cell, by the cell's prior state.
const ENERGY_GROUP_FILL_EMPTY: i64 = 12;
const ENERGY_GROUP_FILL_FULL: i64 = 6;
const ENERGY_GROUP_VOID_FULL: i64 = -12;
const ENERGY_GROUP_VOID_EMPTY: i64 = 3;

/// Execution-side bot record: identity, position, distributable ids.
#[derive(Debug, Clone, Copy)]
struct BotState {
    id: u8,
    pos: IVec3,
    seeds: u64,
}

/// Participation tally of one group operation within a round.
#[derive(Debug)]
struct GroupTally {
    corners: Vec<IVec3>,
    voiding: bool,
}

/// Move-length counters, instrumentation only.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoveStats {
    /// Straight moves (single segment).
    pub long_moves: usize,
    /// Planar moves (two short segments).
    pub short_moves: usize,
}

/// Authoritative trace sink: owns the occupancy grid, the energy account,
/// and the persisted record stream.
pub struct Executor<W: Write> {
    out: W,
    grid: Matrix,
    target: Option<Matrix>,
    high_harmonics: bool,
    halted: bool,
    energy: i64,
    filled: usize,
    bots: Vec<BotState>,
    bots_next: Vec<BotState>,
    cur: usize,
    rounds: u64,
    volatile: HashSet<IVec3>,
    group_ops: HashMap<Region, GroupTally>,
    pending_fusion_p: Vec<(u8, u8)>,
    pending_fusion_s: Vec<(u8, u8)>,
    round_records: Vec<u8>,
    stats: MoveStats,
    total_steps: usize,
}

impl<W: Write> Executor<W> {
    /// Empty build space of the given resolution, with the root bot at the
    /// origin holding every other id.
    pub fn new(resolution: usize, out: W) -> Self {
        Self {
            out,
            grid: Matrix::new(resolution),
            target: None,
            high_harmonics: false,
            halted: false,
            energy: 0,
            filled: 0,
            bots: vec![BotState {
                id: 0,
                pos: IVec3::ZERO,
                seeds: seed_range(1, (MAX_BOTS - 1) as u8),
            }],
            bots_next: Vec::new(),
            cur: 0,
            rounds: 0,
            volatile: HashSet::new(),
            group_ops: HashMap::new(),
            pending_fusion_p: Vec::new(),
            pending_fusion_s: Vec::new(),
            round_records: Vec::new(),
            stats: MoveStats::default(),
            total_steps: 0,
        }
    }

    /// Starts from an existing occupancy instead of an empty space
    /// (reconstruction builds).
    pub fn with_source(mut self, source: &Matrix) -> Self {
        assert_eq!(
            source.resolution(),
            self.grid.resolution(),
            "source resolution mismatch"
        );
        self.grid = source.clone();
        self.filled = source.filled_count();
        self
    }

    /// Configures the model halt verifies the grid against.
    pub fn with_target(mut self, target: &Matrix) -> Self {
        assert_eq!(
            target.resolution(),
            self.grid.resolution(),
            "target resolution mismatch"
        );
        self.target = Some(target.clone());
        self
    }

    pub fn energy(&self) -> i64 {
        self.energy
    }

    pub fn harmonics_high(&self) -> bool {
        self.high_harmonics
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn grid(&self) -> &Matrix {
        &self.grid
    }

    pub fn move_stats(&self) -> MoveStats {
        self.stats
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn bot_count(&self) -> usize {
        self.bots.len()
    }

    pub fn bot_positions(&self) -> Vec<IVec3> {
        self.bots.iter().map(|b| b.pos).collect()
    }

    pub fn bot_seeds(&self, id: u8) -> Option<u64> {
        self.bots.iter().find(|b| b.id == id).map(|b| b.seeds)
    }

    /// Id of the bot whose command the executor expects next.
    pub fn next_bot(&self) -> Option<u8> {
        self.bots.get(self.cur).map(|b| b.id)
    }

    /// Flushes the record stream and hands the output back. The current
    /// round must be fully drained.
    pub fn finish(mut self) -> Result<W, StepError> {
        assert!(
            self.cur == 0 && self.round_records.is_empty(),
            "finish mid-round"
        );
        self.out.flush()?;
        Ok(self.out)
    }

    fn cur_bot(&self) -> &BotState {
        &self.bots[self.cur]
    }

    fn own_pos(&self) -> IVec3 {
        self.cur_bot().pos
    }

    fn check_from(&self, from: IVec3) {
        assert!(!self.halted, "command after halt");
        assert!(
            from == self.own_pos(),
            "command issued from {from}, but bot {} is at {}",
            self.cur_bot().id,
            self.own_pos()
        );
    }

    /// The acting bot's own cell must not have been used this round.
    fn check_own_cell(&self) -> Result<(), StepError> {
        let cell = self.own_pos();
        if self.volatile.contains(&cell) {
            return Err(StepError::CellVolatile { cell });
        }
        Ok(())
    }

    /// Shape, budget, and path checks of a move; returns the traversed
    /// cells and whether the move is planar.
    fn validate_move(&self, d: IVec3, reversed: bool) -> Result<(Vec<IVec3>, bool), StepError> {
        let (first, second) = Command::segments(d, reversed).ok_or(StepError::IllegalMove { d })?;
        match second {
            None if !first.is_long_linear() => return Err(StepError::IllegalMove { d }),
            Some(s) if !first.is_short_linear() || !s.is_short_linear() => {
                return Err(StepError::IllegalMove { d })
            }
            _ => {}
        }
        let mut cells = Vec::with_capacity(d.mlen() as usize);
        let mut p = self.own_pos();
        for seg in [Some(first), second].into_iter().flatten() {
            let step = seg.signum();
            for _ in 0..seg.mlen() {
                p += step;
                cells.push(p);
            }
        }
        for &cell in &cells {
            if !self.grid.contains(cell) {
                return Err(StepError::OutOfBounds { cell });
            }
            if self.volatile.contains(&cell) {
                return Err(StepError::CellVolatile { cell });
            }
            if self.grid.get(cell) {
                return Err(StepError::PathBlocked { cell });
            }
        }
        Ok((cells, second.is_some()))
    }

    /// Near-cell checks shared by fill, void, and fission targets.
    fn validate_near_target(&self, d: IVec3) -> Result<IVec3, StepError> {
        let from = self.own_pos();
        let to = from + d;
        if !d.is_near_delta() {
            return Err(StepError::NotAdjacent { from, to });
        }
        if !self.grid.contains(to) {
            return Err(StepError::OutOfBounds { cell: to });
        }
        if self.volatile.contains(&to) {
            return Err(StepError::CellVolatile { cell: to });
        }
        Ok(to)
    }

    fn validate_fill(&self, d: IVec3) -> Result<IVec3, StepError> {
        let to = self.validate_near_target(d)?;
        if self.grid.get(to) {
            return Err(StepError::AlreadyFilled { cell: to });
        }
        Ok(to)
    }

    fn validate_void(&self, d: IVec3) -> Result<IVec3, StepError> {
        let to = self.validate_near_target(d)?;
        if !self.grid.get(to) {
            return Err(StepError::AlreadyEmpty { cell: to });
        }
        Ok(to)
    }

    /// Fission spawn-cell checks, plus the seed-ownership contract.
    fn validate_spawn(&self, d: IVec3, m: u8) -> Result<IVec3, StepError> {
        let to = self.validate_near_target(d)?;
        if self.grid.get(to) {
            return Err(StepError::SpawnBlocked { cell: to });
        }
        let me = self.cur_bot();
        let child_id = lowest_seed(me.seeds);
        let granted = seed_range(child_id, child_id + m);
        assert!(
            me.seeds & granted == granted,
            "fission ids [{child_id}, {}] outside the seeds of bot {}",
            child_id + m,
            me.id
        );
        Ok(to)
    }

    /// Geometry and tally checks of one group-operation participant.
    fn validate_group(&self, d: IVec3, far: IVec3, voiding: bool) -> Result<Region, StepError> {
        let from = self.own_pos();
        let corner = from + d;
        if !d.is_near_delta() {
            return Err(StepError::NotAdjacent { from, to: corner });
        }
        if !far.is_far_delta() {
            return Err(StepError::BadFarDelta { d: far });
        }
        let opposite = corner + far;
        for cell in [corner, opposite] {
            if !self.grid.contains(cell) {
                return Err(StepError::OutOfBounds { cell });
            }
        }
        let region = Region::new(corner, opposite);
        if let Some(tally) = self.group_ops.get(&region) {
            assert!(
                tally.voiding == voiding,
                "conflicting group operations on {:?}..{:?}",
                region.min(),
                region.max()
            );
            if tally.corners.contains(&corner) {
                return Err(StepError::DuplicateCorner { corner });
            }
        }
        Ok(region)
    }

    /// Applies a completed group operation to every cell of its region.
    fn commit_group(&mut self, region: Region, voiding: bool) {
        for cell in region.cells() {
            assert!(
                !self.volatile.contains(&cell),
                "group operation overlaps cell {cell} already used this round"
            );
        }
        for cell in region.cells() {
            self.volatile.insert(cell);
            let filled = self.grid.get(cell);
            match (voiding, filled) {
                (false, false) => {
                    self.grid.set(cell, true);
                    self.filled += 1;
                    self.energy += ENERGY_GROUP_FILL_EMPTY;
                }
                (false, true) => self.energy += ENERGY_GROUP_FILL_FULL,
                (true, true) => {
                    self.grid.set(cell, false);
                    self.filled -= 1;
                    self.energy += ENERGY_GROUP_VOID_FULL;
                }
                (true, false) => self.energy += ENERGY_GROUP_VOID_EMPTY,
            }
        }
    }

    fn group_participation(
        &mut self,
        d: IVec3,
        far: IVec3,
        voiding: bool,
    ) -> Result<(), StepError> {
        self.check_own_cell()?;
        let region = self.validate_group(d, far, voiding)?;
        let corner = self.own_pos() + d;
        self.volatile.insert(self.own_pos());
        let complete = {
            let tally = self.group_ops.entry(region).or_insert_with(|| GroupTally {
                corners: Vec::new(),
                voiding,
            });
            tally.corners.push(corner);
            tally.corners.len() == region.bots_required()
        };
        if complete {
            self.commit_group(region, voiding);
        }
        self.copy_bot();
        Ok(())
    }

    /// Carries the acting bot into the next round unchanged.
    fn copy_bot(&mut self) {
        let me = *self.cur_bot();
        self.bots_next.push(me);
    }

    /// Buffers the wire record and advances the round cursor, closing the
    /// round after its last bot.
    fn complete(&mut self, cmd: &Command) -> Result<(), StepError> {
        encode_command(cmd, &mut self.round_records);
        self.total_steps += 1;
        self.cur += 1;
        if self.cur == self.bots.len() {
            self.close_round()?;
        }
        Ok(())
    }

    fn close_round(&mut self) -> Result<(), StepError> {
        for (region, tally) in &self.group_ops {
            assert!(
                tally.corners.len() == region.bots_required(),
                "group operation on {:?}..{:?} had {} of {} participants",
                region.min(),
                region.max(),
                tally.corners.len(),
                region.bots_required()
            );
        }
        assert_eq!(
            self.pending_fusion_p.len(),
            self.pending_fusion_s.len(),
            "unpaired fusion halves"
        );
        for &(p, s) in &self.pending_fusion_p {
            assert!(
                self.pending_fusion_s.contains(&(s, p)),
                "fusion of bots {p} and {s} has no matching secondary half"
            );
        }

        let r = self.grid.resolution() as i64;
        let rate = if self.high_harmonics {
            ENERGY_HIGH
        } else {
            ENERGY_LOW
        };
        self.energy += rate * r * r * r + ENERGY_BOT * self.bots.len() as i64;
        self.rounds += 1;

        self.bots = std::mem::take(&mut self.bots_next);
        self.bots.sort_by_key(|b| b.id);
        self.cur = 0;
        self.volatile.clear();
        self.group_ops.clear();
        self.pending_fusion_p.clear();
        self.pending_fusion_s.clear();

        self.out.write_all(&self.round_records)?;
        self.round_records.clear();

        debug!(
            round = self.rounds,
            bots = self.bots.len(),
            energy = self.energy,
            filled = self.filled,
            "round closed"
        );
        Ok(())
    }
}

impl<W: Write> TraceSink for Executor<W> {
    fn halt(&mut self) -> Result<(), StepError> {
        assert!(!self.halted, "command after halt");
        assert!(
            self.bots.len() == 1,
            "halt with {} bots live",
            self.bots.len()
        );
        let pos = self.own_pos();
        assert!(pos == IVec3::ZERO, "halt away from home, bot at {pos}");
        assert!(!self.high_harmonics, "halt under high harmonics");
        if let Some(target) = &self.target {
            assert!(
                self.grid.same_occupancy(target),
                "halt with the model incomplete: {} of {} cells filled",
                self.filled,
                target.filled_count()
            );
        }
        self.halted = true;
        self.complete(&Command::Halt)
    }

    fn wait(&mut self) -> Result<(), StepError> {
        assert!(!self.halted, "command after halt");
        self.check_own_cell()?;
        self.volatile.insert(self.own_pos());
        self.copy_bot();
        self.complete(&Command::Wait)
    }

    fn flip(&mut self) -> Result<(), StepError> {
        assert!(!self.halted, "command after halt");
        self.check_own_cell()?;
        self.high_harmonics = !self.high_harmonics;
        self.volatile.insert(self.own_pos());
        self.copy_bot();
        self.complete(&Command::Flip)
    }

    fn move_to(&mut self, from: IVec3, to: IVec3, reversed: bool) -> Result<(), StepError> {
        self.check_from(from);
        self.check_own_cell()?;
        let d = to - from;
        let (path, planar) = self.validate_move(d, reversed)?;
        self.volatile.insert(from);
        self.volatile.extend(path);
        self.energy += 2 * d.mlen() as i64 + if planar { 4 } else { 0 };
        if planar {
            self.stats.short_moves += 1;
        } else {
            self.stats.long_moves += 1;
        }
        let mut me = *self.cur_bot();
        me.pos = to;
        self.bots_next.push(me);
        self.complete(&Command::Move { d, reversed })
    }

    fn fill(&mut self, from: IVec3, to: IVec3) -> Result<(), StepError> {
        self.check_from(from);
        self.check_own_cell()?;
        let d = to - from;
        let target = self.validate_fill(d)?;
        self.grid.set(target, true);
        self.filled += 1;
        self.energy += ENERGY_FILL;
        self.volatile.insert(from);
        self.volatile.insert(target);
        self.copy_bot();
        self.complete(&Command::Fill { d })
    }

    fn void(&mut self, from: IVec3, to: IVec3) -> Result<(), StepError> {
        self.check_from(from);
        self.check_own_cell()?;
        let d = to - from;
        let target = self.validate_void(d)?;
        self.grid.set(target, false);
        self.filled -= 1;
        self.energy += ENERGY_VOID;
        self.volatile.insert(from);
        self.volatile.insert(target);
        self.copy_bot();
        self.complete(&Command::Void { d })
    }

    fn fusion_p(&mut self, from: IVec3, to: IVec3) -> Result<(), StepError> {
        self.check_from(from);
        self.check_own_cell()?;
        let d = to - from;
        if !d.is_near_delta() {
            return Err(StepError::NotAdjacent { from, to });
        }
        let me = *self.cur_bot();
        let secondary = *self
            .bots
            .iter()
            .find(|b| b.pos == to)
            .unwrap_or_else(|| panic!("bot {} has no fusion partner at {to}", me.id));
        self.pending_fusion_p.push((me.id, secondary.id));
        self.energy += ENERGY_FUSION;
        self.volatile.insert(from);
        let mut merged = me;
        merged.seeds |= secondary.seeds | 1 << secondary.id;
        self.bots_next.push(merged);
        debug!(primary = me.id, secondary = secondary.id, "fusion");
        self.complete(&Command::FusionP { d })
    }

    fn fusion_s(&mut self, from: IVec3, to: IVec3) -> Result<(), StepError> {
        self.check_from(from);
        self.check_own_cell()?;
        let d = to - from;
        if !d.is_near_delta() {
            return Err(StepError::NotAdjacent { from, to });
        }
        let me = *self.cur_bot();
        let primary = self
            .bots
            .iter()
            .find(|b| b.pos == to)
            .unwrap_or_else(|| panic!("bot {} has no fusion partner at {to}", me.id));
        self.pending_fusion_s.push((me.id, primary.id));
        self.volatile.insert(from);
        // the secondary is not carried into the next round
        self.complete(&Command::FusionS { d })
    }

    fn fission(&mut self, from: IVec3, to: IVec3, m: u8) -> Result<(), StepError> {
        self.check_from(from);
        self.check_own_cell()?;
        let d = to - from;
        let spawn = self.validate_spawn(d, m)?;
        let me = *self.cur_bot();
        let child_id = lowest_seed(me.seeds);
        let granted = seed_range(child_id, child_id + m);
        let mut parent = me;
        parent.seeds &= !granted;
        let child = BotState {
            id: child_id,
            pos: spawn,
            seeds: granted & !(1 << child_id),
        };
        self.energy += ENERGY_FISSION;
        self.volatile.insert(from);
        self.volatile.insert(spawn);
        self.bots_next.push(parent);
        self.bots_next.push(child);
        debug!(parent = me.id, child = child_id, "fission");
        self.complete(&Command::Fission { d, m })
    }

    fn g_fill(&mut self, from: IVec3, to: IVec3, far: IVec3) -> Result<(), StepError> {
        self.check_from(from);
        let d = to - from;
        self.group_participation(d, far, false)?;
        self.complete(&Command::GFill { d, far })
    }

    fn g_void(&mut self, from: IVec3, to: IVec3, far: IVec3) -> Result<(), StepError> {
        self.check_from(from);
        let d = to - from;
        self.group_participation(d, far, true)?;
        self.complete(&Command::GVoid { d, far })
    }

    fn probe(&self, cmd: &Command) -> Result<(), StepError> {
        assert!(!self.halted, "probe after halt");
        self.check_own_cell()?;
        match *cmd {
            Command::Halt | Command::Wait | Command::Flip => Ok(()),
            Command::Move { d, reversed } => self.validate_move(d, reversed).map(|_| ()),
            Command::Fill { d } => self.validate_fill(d).map(|_| ()),
            Command::Void { d } => self.validate_void(d).map(|_| ()),
            Command::FusionP { d } | Command::FusionS { d } => {
                let from = self.own_pos();
                if !d.is_near_delta() {
                    return Err(StepError::NotAdjacent { from, to: from + d });
                }
                Ok(())
            }
            Command::Fission { d, m } => self.validate_spawn(d, m).map(|_| ()),
            Command::GFill { d, far } => self.validate_group(d, far, false).map(|_| ()),
            Command::GVoid { d, far } => self.validate_group(d, far, true).map(|_| ()),
        }
    }

    fn step_count(&self) -> usize {
        self.total_steps
    }

    fn truncate(&mut self, _len: usize) -> bool {
        // committed rounds cannot be unwound
        false
    }

    fn filled_count(&self) -> usize {
        self.filled
    }

    fn is_filled(&self, p: IVec3) -> bool {
        self.grid.get(p)
    }
}
