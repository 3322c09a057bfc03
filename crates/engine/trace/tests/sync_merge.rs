//! Merging independently planned per-bot buffers into executor rounds

use glam::IVec3;
use nanoforge_trace::{
    drain_rounds, drain_rounds_strict, Executor, Roster, StepError, SyncError, TraceSink,
};

const ORIGIN: IVec3 = IVec3::ZERO;

/// Executor and roster holding two bots at the origin and (1,0,0).
fn two_bot_setup() -> (Executor<Vec<u8>>, Roster) {
    let mut exec = Executor::new(6, Vec::new());
    exec.fission(ORIGIN, IVec3::new(1, 0, 0), 2).unwrap();

    let mut roster = Roster::initial();
    roster.spawn(0, 2, IVec3::new(1, 0, 0));
    (exec, roster)
}

#[test]
fn test_strict_merge_rejects_uneven_buffers() {
    let (mut exec, mut roster) = two_bot_setup();

    for _ in 0..3 {
        roster.get_mut(0).unwrap().plan.wait().unwrap();
    }
    for _ in 0..4 {
        roster.get_mut(1).unwrap().plan.wait().unwrap();
    }

    let energy_before = exec.energy();
    let err = drain_rounds_strict(&mut exec, &mut roster).unwrap_err();
    assert!(
        matches!(
            err,
            SyncError::LengthMismatch {
                id: 1,
                len: 4,
                expected: 3,
            }
        ),
        "{err}"
    );

    // nothing was consumed and nothing reached the executor
    assert_eq!(roster.get(0).unwrap().plan.len(), 3);
    assert_eq!(roster.get(1).unwrap().plan.len(), 4);
    assert_eq!(exec.energy(), energy_before);
    assert_eq!(exec.rounds(), 1);
}

#[test]
fn test_strict_merge_drains_even_buffers() {
    let (mut exec, mut roster) = two_bot_setup();

    // bot 0 fills its column while bot 1 fills its own
    let b0 = roster.get_mut(0).unwrap();
    b0.plan.fill(ORIGIN, IVec3::new(0, 0, 1)).unwrap();
    b0.plan.wait().unwrap();
    let b1 = roster.get_mut(1).unwrap();
    b1.plan
        .fill(IVec3::new(1, 0, 0), IVec3::new(1, 0, 1))
        .unwrap();
    b1.plan
        .void(IVec3::new(1, 0, 0), IVec3::new(1, 0, 1))
        .unwrap();

    drain_rounds_strict(&mut exec, &mut roster).unwrap();

    assert!(roster.get(0).unwrap().plan.is_empty());
    assert!(roster.get(1).unwrap().plan.is_empty());
    assert_eq!(roster.get(0).unwrap().step, 2);
    assert_eq!(exec.rounds(), 3);
    assert_eq!(exec.filled_count(), 1);
    assert!(exec.is_filled(IVec3::new(0, 0, 1)));
}

#[test]
fn test_lockstep_merge_pads_exhausted_buffers() {
    let (mut exec, mut roster) = two_bot_setup();

    roster
        .get_mut(0)
        .unwrap()
        .plan
        .fill(ORIGIN, IVec3::new(0, 0, 1))
        .unwrap();
    let b1 = roster.get_mut(1).unwrap();
    b1.plan
        .move_to(IVec3::new(1, 0, 0), IVec3::new(3, 0, 0), false)
        .unwrap();
    b1.plan
        .fill(IVec3::new(3, 0, 0), IVec3::new(3, 0, 1))
        .unwrap();

    drain_rounds(&mut exec, &mut roster).unwrap();

    // bot 0 waited through round 2
    assert_eq!(exec.rounds(), 3);
    assert_eq!(exec.filled_count(), 2);
    assert_eq!(roster.get(1).unwrap().pos, IVec3::new(3, 0, 0));
}

#[test]
fn test_merge_stops_at_first_rejection() {
    let (mut exec, mut roster) = two_bot_setup();

    // both bots claim the same cell in the same round
    roster
        .get_mut(0)
        .unwrap()
        .plan
        .fill(ORIGIN, IVec3::new(0, 0, 1))
        .unwrap();
    roster
        .get_mut(1)
        .unwrap()
        .plan
        .fill(IVec3::new(1, 0, 0), IVec3::new(0, 0, 1))
        .unwrap();

    let err = drain_rounds(&mut exec, &mut roster).unwrap_err();
    assert!(matches!(err, StepError::CellVolatile { .. }), "{err}");
    // the first fill was accepted before the clash
    assert_eq!(exec.filled_count(), 1);
}
