//! Point-to-point movement planning
//!
//! `reach_cell` turns "current position, destination" into primitive moves:
//! a breadth-first search over empty cells finds a unit-step path, which is
//! then compressed into straight moves and paired planar moves before being
//! written to the trace sink.

use std::collections::{HashMap, VecDeque};

use glam::IVec3;
use matrix::{IVec3Ext, Matrix, DELTAS6};
use nanoforge_trace::TraceSink;
use tracing::trace;

use crate::SolverError;

/// Routes the bot at `from` to a cell near `to` (or exactly `to` when
/// `exact`), emitting the primitive moves into `sink`. Filled cells of
/// `env` block, as does anything set in the optional `avoid` mask. Returns
/// the bot's final position.
pub fn reach_cell(
    from: IVec3,
    to: IVec3,
    env: &Matrix,
    sink: &mut dyn TraceSink,
    exact: bool,
    avoid: Option<&Matrix>,
) -> Result<IVec3, SolverError> {
    let arrived = |c: IVec3| if exact { c == to } else { c.is_near(to) };
    if arrived(from) {
        return Ok(from);
    }

    let passable =
        |c: IVec3| env.contains(c) && !env.get(c) && avoid.is_none_or(|mask| !mask.get(c));

    let mut prev: HashMap<IVec3, IVec3> = HashMap::new();
    let mut queue = VecDeque::new();
    prev.insert(from, from);
    queue.push_back(from);
    let mut end = None;
    while let Some(c) = queue.pop_front() {
        if arrived(c) {
            end = Some(c);
            break;
        }
        for d in DELTAS6 {
            let n = c + d;
            if !passable(n) || prev.contains_key(&n) {
                continue;
            }
            prev.insert(n, c);
            queue.push_back(n);
        }
    }
    let Some(end) = end else {
        return Err(SolverError::Unroutable { from, to });
    };

    let mut path = vec![end];
    let mut c = end;
    while c != from {
        c = prev[&c];
        path.push(c);
    }
    path.reverse();
    trace!(%from, %to, steps = path.len() - 1, "routed");

    emit_moves(&path, sink)?;
    Ok(end)
}

/// Compresses a unit-step path into moves: runs of one direction become
/// straight moves (split at the length budget), and two adjacent short runs
/// merge into one planar move whose reversal flag preserves the traversal
/// order.
fn emit_moves(path: &[IVec3], sink: &mut dyn TraceSink) -> Result<(), SolverError> {
    let mut runs: Vec<(IVec3, i32)> = Vec::new();
    for w in path.windows(2) {
        let d = w[1] - w[0];
        match runs.last_mut() {
            Some((dir, len)) if *dir == d => *len += 1,
            _ => runs.push((d, 1)),
        }
    }

    let mut pos = path[0];
    let mut i = 0;
    while i < runs.len() {
        let (d1, l1) = runs[i];
        if l1 <= 5 {
            if let Some(&(d2, l2)) = runs.get(i + 1) {
                if l2 <= 5 {
                    let delta = d1 * l1 + d2 * l2;
                    let reversed = (d1 * l1).first_axis() > (d2 * l2).first_axis();
                    sink.move_to(pos, pos + delta, reversed)?;
                    pos += delta;
                    i += 2;
                    continue;
                }
            }
        }
        let mut remaining = l1;
        while remaining > 0 {
            let step = remaining.min(15);
            sink.move_to(pos, pos + d1 * step, false)?;
            pos += d1 * step;
            remaining -= step;
        }
        i += 1;
    }
    Ok(())
}
