//! Integer-lattice coordinate helpers
//!
//! Bot positions, cell addresses, and instruction deltas are all
//! [`glam::IVec3`]; this module adds the lattice vocabulary the instruction
//! set is defined in terms of.

use glam::IVec3;

/// The six axis-aligned unit offsets.
pub const DELTAS6: [IVec3; 6] = [
    IVec3::NEG_X,
    IVec3::X,
    IVec3::NEG_Y,
    IVec3::Y,
    IVec3::NEG_Z,
    IVec3::Z,
];

/// All 26 offsets with every component in {-1, 0, 1}, excluding zero.
pub fn deltas26() -> impl Iterator<Item = IVec3> {
    (-1..=1).flat_map(|x| {
        (-1..=1).flat_map(move |y| {
            (-1..=1)
                .map(move |z| IVec3::new(x, y, z))
                .filter(|d| *d != IVec3::ZERO)
        })
    })
}

/// Lattice operations on [`IVec3`] used throughout the instruction set.
pub trait IVec3Ext {
    /// Manhattan length.
    fn mlen(self) -> i32;

    /// Number of axes on which `self` and `other` differ.
    fn diff_count(self, other: IVec3) -> u32;

    /// True when `other` is a neighbor of `self`: every axis differs by at
    /// most 1 and the total difference is 1 or 2.
    fn is_near(self, other: IVec3) -> bool;

    /// Component-wise sign of the offset toward `other`.
    fn dir_to(self, other: IVec3) -> IVec3;

    /// Exactly one nonzero axis.
    fn is_linear(self) -> bool;

    /// Linear with manhattan length at most 5.
    fn is_short_linear(self) -> bool;

    /// Linear with manhattan length at most 15.
    fn is_long_linear(self) -> bool;

    /// Valid near offset for single-cell instructions.
    fn is_near_delta(self) -> bool;

    /// Valid far-corner offset for group instructions: nonzero, every
    /// component within [-30, 30].
    fn is_far_delta(self) -> bool;

    /// Index of the first nonzero axis in x, y, z priority (2 for zero).
    fn first_axis(self) -> usize;
}

impl IVec3Ext for IVec3 {
    #[inline]
    fn mlen(self) -> i32 {
        self.x.abs() + self.y.abs() + self.z.abs()
    }

    #[inline]
    fn diff_count(self, other: IVec3) -> u32 {
        (self.x != other.x) as u32 + (self.y != other.y) as u32 + (self.z != other.z) as u32
    }

    #[inline]
    fn is_near(self, other: IVec3) -> bool {
        (other - self).is_near_delta()
    }

    #[inline]
    fn dir_to(self, other: IVec3) -> IVec3 {
        (other - self).signum()
    }

    #[inline]
    fn is_linear(self) -> bool {
        (self.x != 0) as u32 + (self.y != 0) as u32 + (self.z != 0) as u32 == 1
    }

    #[inline]
    fn is_short_linear(self) -> bool {
        self.is_linear() && self.mlen() <= 5
    }

    #[inline]
    fn is_long_linear(self) -> bool {
        self.is_linear() && self.mlen() <= 15
    }

    #[inline]
    fn is_near_delta(self) -> bool {
        let a = self.abs();
        let s = a.x + a.y + a.z;
        a.x <= 1 && a.y <= 1 && a.z <= 1 && s >= 1 && s <= 2
    }

    #[inline]
    fn is_far_delta(self) -> bool {
        let a = self.abs();
        self != IVec3::ZERO && a.x <= 30 && a.y <= 30 && a.z <= 30
    }

    #[inline]
    fn first_axis(self) -> usize {
        if self.x != 0 {
            0
        } else if self.y != 0 {
            1
        } else {
            2
        }
    }
}

/// Applies `pred` to every nonzero single-axis sub-vector of `d`, and to each
/// two-axis sub-vector when both of its axes are nonzero.
///
/// A diagonal step is only traversable when every such intermediate offset
/// lands on a supported cell; this is the gate the flood-fill planner uses to
/// forbid corner cutting.
pub fn check_subdeltas<F: FnMut(IVec3) -> bool>(d: IVec3, mut pred: F) -> bool {
    if d.x != 0 && !pred(IVec3::new(d.x, 0, 0)) {
        return false;
    }
    if d.y != 0 && !pred(IVec3::new(0, d.y, 0)) {
        return false;
    }
    if d.z != 0 && !pred(IVec3::new(0, 0, d.z)) {
        return false;
    }
    if d.x != 0 && d.y != 0 && !pred(IVec3::new(d.x, d.y, 0)) {
        return false;
    }
    if d.x != 0 && d.z != 0 && !pred(IVec3::new(d.x, 0, d.z)) {
        return false;
    }
    if d.y != 0 && d.z != 0 && !pred(IVec3::new(0, d.y, d.z)) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mlen_and_diff_count() {
        let a = IVec3::new(1, -2, 3);
        assert_eq!(a.mlen(), 6);
        assert_eq!(a.diff_count(IVec3::new(1, 0, 3)), 1);
        assert_eq!(a.diff_count(a), 0);
        assert_eq!(a.diff_count(IVec3::new(0, 0, 0)), 3);
    }

    #[test]
    fn test_is_near() {
        let p = IVec3::new(4, 4, 4);
        assert!(p.is_near(IVec3::new(5, 4, 4)));
        assert!(p.is_near(IVec3::new(5, 3, 4)));
        // a point is not near itself
        assert!(!p.is_near(p));
        // full diagonal differs on three axes
        assert!(!p.is_near(IVec3::new(5, 5, 5)));
        assert!(!p.is_near(IVec3::new(6, 4, 4)));
    }

    #[test]
    fn test_dir_to() {
        let p = IVec3::new(2, 2, 2);
        assert_eq!(p.dir_to(IVec3::new(9, 2, 0)), IVec3::new(1, 0, -1));
        assert_eq!(p.dir_to(p), IVec3::ZERO);
    }

    #[test]
    fn test_linear_classification() {
        assert!(IVec3::new(0, -5, 0).is_short_linear());
        assert!(!IVec3::new(0, -6, 0).is_short_linear());
        assert!(IVec3::new(15, 0, 0).is_long_linear());
        assert!(!IVec3::new(16, 0, 0).is_long_linear());
        assert!(!IVec3::new(1, 1, 0).is_linear());
        assert!(!IVec3::ZERO.is_linear());
    }

    #[test]
    fn test_far_delta() {
        assert!(IVec3::new(30, -30, 1).is_far_delta());
        assert!(!IVec3::new(31, 0, 0).is_far_delta());
        assert!(!IVec3::ZERO.is_far_delta());
    }

    #[test]
    fn test_deltas26_covers_neighborhood() {
        let all: Vec<IVec3> = deltas26().collect();
        assert_eq!(all.len(), 26);
        assert!(!all.contains(&IVec3::ZERO));
        assert!(all.contains(&IVec3::new(-1, 1, -1)));
    }

    #[test]
    fn test_check_subdeltas_gates_diagonals() {
        // moving by (1, 0, 1) requires both axis projections to hold
        let d = IVec3::new(1, 0, 1);
        assert!(check_subdeltas(d, |_| true));
        assert!(!check_subdeltas(d, |s| s != IVec3::new(1, 0, 0)));
        assert!(!check_subdeltas(d, |s| s != IVec3::new(0, 0, 1)));

        // a full diagonal additionally requires the three two-axis corners
        let full = IVec3::new(1, 1, 1);
        let mut seen = Vec::new();
        assert!(check_subdeltas(full, |s| {
            seen.push(s);
            true
        }));
        assert_eq!(seen.len(), 6);
    }
}
