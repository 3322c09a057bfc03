//! End-to-end flood-fill solver behavior

use glam::IVec3;
use matrix::Matrix;
use nanoforge_solver::{flood_fill_solve, SolverError, SolverRegistry};
use nanoforge_trace::{Command, Executor, Recorder, TraceSink};

/// Replays a recorded single-bot plan, returning the filled cells.
fn filled_cells(commands: &[Command]) -> Vec<IVec3> {
    let mut pos = IVec3::ZERO;
    let mut filled = Vec::new();
    for cmd in commands {
        if let Command::Fill { d } = cmd {
            filled.push(pos + *d);
        }
        pos = cmd.end_position(pos);
    }
    filled
}

#[test]
fn test_single_cell_model_needs_one_fill() {
    let mut target = Matrix::new(6);
    target.set(IVec3::new(2, 0, 3), true);

    let mut plan = Recorder::new();
    flood_fill_solve(None, &target, &mut plan).unwrap();

    let filled = filled_cells(plan.commands());
    assert_eq!(filled, vec![IVec3::new(2, 0, 3)]);

    // the same plan replays cleanly against the authoritative executor,
    // whose halt contract checks the bot came home with the model complete
    let mut exec = Executor::new(6, Vec::new()).with_target(&target);
    flood_fill_solve(None, &target, &mut exec).unwrap();
    assert!(exec.is_halted());
    assert_eq!(exec.filled_count(), 1);
}

#[test]
fn test_no_corner_cutting_through_missing_support() {
    // (2,0,1) is diagonal from the start cell, but both of its axis
    // supports are missing; the frontier must not take that edge
    let mut target = Matrix::new(4);
    target.set(IVec3::new(1, 0, 0), true);
    target.set(IVec3::new(2, 0, 1), true);

    let mut plan = Recorder::new();
    flood_fill_solve(None, &target, &mut plan).unwrap();

    let filled = filled_cells(plan.commands());
    assert_eq!(filled, vec![IVec3::new(1, 0, 0)]);
    assert!(!filled.contains(&IVec3::new(2, 0, 1)));
}

#[test]
fn test_connected_model_is_built_completely() {
    // an L of 5 cells hugging the ground plus a one-cell tower
    let mut target = Matrix::new(8);
    for x in 1..4 {
        target.set(IVec3::new(x, 0, 1), true);
    }
    for z in 2..4 {
        target.set(IVec3::new(3, 0, z), true);
    }
    target.set(IVec3::new(3, 1, 3), true);

    let mut exec = Executor::new(8, Vec::new()).with_target(&target);
    flood_fill_solve(None, &target, &mut exec).unwrap();

    assert!(exec.is_halted());
    assert_eq!(exec.filled_count(), target.filled_count());
    assert!(exec.grid().same_occupancy(&target));
    // the whole build ran in low harmonics
    assert!(!exec.harmonics_high());
}

#[test]
fn test_reconstruction_is_rejected_distinctly() {
    let target = Matrix::new(4);
    let source = Matrix::new(4);
    let mut plan = Recorder::new();
    let err = flood_fill_solve(Some(&source), &target, &mut plan).unwrap_err();
    assert!(matches!(err, SolverError::ReconstructionUnsupported));
    assert!(plan.is_empty());
}

#[test]
fn test_registry_dispatch_runs_the_solver() {
    let mut target = Matrix::new(5);
    target.set(IVec3::new(0, 0, 1), true);

    let registry = SolverRegistry::with_builtins();
    let mut exec = Executor::new(5, Vec::new()).with_target(&target);
    registry.run("bfs", None, &target, &mut exec).unwrap();
    assert!(exec.is_halted());

    let bytes = exec.finish().unwrap();
    assert!(!bytes.is_empty());
}
