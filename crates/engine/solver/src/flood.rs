//! Flood-fill build order
//!
//! The baseline single-bot strategy: breadth-first over the target model's
//! cells with full 26-direction adjacency, filling each visited cell from a
//! neighboring position. Diagonal frontier steps are gated on every
//! intermediate sub-delta cell being part of the model, so the order never
//! cuts an unsupported corner. Correct and complete for simply connected
//! models; makes no attempt to be energy-optimal.

use std::collections::VecDeque;

use glam::IVec3;
use matrix::{check_subdeltas, deltas26, Matrix};
use nanoforge_trace::TraceSink;
use tracing::{debug, info};

use crate::route::reach_cell;
use crate::SolverError;

/// Plans a complete single-bot build of `target` into `sink`: visits and
/// fills every model cell reachable from the start, returns the bot to the
/// origin, and halts.
///
/// Reconstruction (a source model) is not supported and fails immediately.
pub fn flood_fill_solve(
    source: Option<&Matrix>,
    target: &Matrix,
    sink: &mut dyn TraceSink,
) -> Result<(), SolverError> {
    if source.is_some() {
        return Err(SolverError::ReconstructionUnsupported);
    }

    let r = target.resolution() as i32;
    // start on the ground layer, minimizing x + z, first in scan order
    let mut start = None;
    for x in 0..r {
        for z in 0..r {
            let c = IVec3::new(x, 0, z);
            if target.get(c) && start.is_none_or(|(best, _)| x + z < best) {
                start = Some((x + z, c));
            }
        }
    }
    let Some((_, start)) = start else {
        return Err(SolverError::NoGroundContact);
    };
    info!(%start, cells = target.filled_count(), "flood fill");

    let mut pos = IVec3::ZERO;
    let mut built = Matrix::new(r as usize);
    let mut seen = Matrix::new(r as usize);
    let mut queue = VecDeque::new();
    seen.set(start, true);
    queue.push_back(start);
    let mut visited = 0usize;

    while let Some(cell) = queue.pop_front() {
        pos = reach_cell(pos, cell, &built, sink, false, None)?;
        sink.fill(pos, cell)?;
        built.set(cell, true);
        visited += 1;

        for d in deltas26() {
            let n = cell + d;
            if !target.contains(n) || !target.get(n) || seen.get(n) {
                continue;
            }
            if check_subdeltas(d, |sub| target.get(cell + sub)) {
                seen.set(n, true);
                queue.push_back(n);
            }
        }
    }
    debug!(visited, "frontier exhausted");

    pos = reach_cell(pos, IVec3::ZERO, &built, sink, true, None)?;
    debug_assert_eq!(pos, IVec3::ZERO);
    sink.halt()?;
    Ok(())
}
