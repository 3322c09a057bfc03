//! Model file round-trip tests

use glam::IVec3;
use matrix::Matrix;

#[test]
fn test_model_file_round_trip() {
    let mut m = Matrix::new(5);
    for c in [
        IVec3::new(0, 0, 0),
        IVec3::new(2, 0, 3),
        IVec3::new(4, 4, 4),
        IVec3::new(1, 3, 2),
    ] {
        m.set(c, true);
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("target.mdl");
    m.save_model(&path).expect("save");

    let loaded = Matrix::load_model(&path).expect("load");
    assert_eq!(loaded.resolution(), 5);
    assert!(loaded.same_occupancy(&m));
}

#[test]
fn test_diagnostic_dump_appends_bots() {
    let mut m = Matrix::new(4);
    m.set(IVec3::new(1, 0, 1), true);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stuck.dump");
    let bots = [IVec3::new(0, 0, 0), IVec3::new(3, 2, 1)];
    m.dump_diagnostic(&path, &bots).expect("dump");

    let bytes = std::fs::read(&path).expect("read");
    let model = m.to_model_bytes();
    assert_eq!(&bytes[..model.len()], &model[..]);
    assert_eq!(&bytes[model.len()..], &[2, 0, 0, 0, 3, 2, 1]);
}
