//! Canonical axis-aligned regions
//!
//! Group instructions describe the box they operate on by two corner points;
//! [`Region`] canonicalizes that description so boxes compare equal no matter
//! which corners the cooperating bots named.

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::IVec3Ext;

/// Axis-aligned box between two lattice corners, stored canonically as its
/// component-wise minimum and maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    min: IVec3,
    max: IVec3,
}

impl Region {
    /// Canonicalizes two arbitrary corners.
    pub fn new(a: IVec3, b: IVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    #[inline]
    pub fn min(&self) -> IVec3 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> IVec3 {
        self.max
    }

    pub fn contains(&self, p: IVec3) -> bool {
        self.min.x <= p.x
            && p.x <= self.max.x
            && self.min.y <= p.y
            && p.y <= self.max.y
            && self.min.z <= p.z
            && p.z <= self.max.z
    }

    /// Mirrors a corner point to the diagonally opposite corner.
    ///
    /// Each coordinate of `p` must equal one of the two extreme values on its
    /// axis; anything else is a planner defect and panics.
    pub fn opposite(&self, p: IVec3) -> IVec3 {
        let mirror = |lo: i32, hi: i32, c: i32| {
            if c == lo {
                hi
            } else if c == hi {
                lo
            } else {
                panic!("point {p} is not a corner of region {lo}..{hi}");
            }
        };
        IVec3::new(
            mirror(self.min.x, self.max.x, p.x),
            mirror(self.min.y, self.max.y, p.y),
            mirror(self.min.z, self.max.z, p.z),
        )
    }

    /// Number of axes on which the region extends (0 = point, 3 = box).
    #[inline]
    pub fn dim(&self) -> u32 {
        self.min.diff_count(self.max)
    }

    /// Number of cooperating bots a group operation over this region needs:
    /// one per corner, 2^dim.
    #[inline]
    pub fn bots_required(&self) -> usize {
        1 << self.dim()
    }

    /// Iterates every cell of the box in x, y, z scan order.
    pub fn cells(&self) -> impl Iterator<Item = IVec3> + '_ {
        (self.min.x..=self.max.x).flat_map(move |x| {
            (self.min.y..=self.max.y)
                .flat_map(move |y| (self.min.z..=self.max.z).map(move |z| IVec3::new(x, y, z)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_contains_its_corners() {
        let a = IVec3::new(7, 1, 4);
        let b = IVec3::new(2, 9, 4);
        let r = Region::new(a, b);
        assert!(r.contains(a));
        assert!(r.contains(b));
        assert_eq!(r.min(), IVec3::new(2, 1, 4));
        assert_eq!(r.max(), IVec3::new(7, 9, 4));
    }

    #[test]
    fn test_dim_counts_differing_axes() {
        let a = IVec3::new(3, 0, 5);
        assert_eq!(Region::new(a, a).dim(), 0);
        assert_eq!(Region::new(a, IVec3::new(8, 0, 5)).dim(), 1);
        assert_eq!(Region::new(a, IVec3::new(8, 2, 5)).dim(), 2);
        assert_eq!(Region::new(a, IVec3::new(8, 2, 9)).dim(), 3);
    }

    #[test]
    fn test_bots_required_per_dim() {
        let a = IVec3::ZERO;
        assert_eq!(Region::new(a, a).bots_required(), 1);
        assert_eq!(Region::new(a, IVec3::new(0, 4, 0)).bots_required(), 2);
        assert_eq!(Region::new(a, IVec3::new(1, 4, 0)).bots_required(), 4);
        assert_eq!(Region::new(a, IVec3::new(1, 4, 2)).bots_required(), 8);
    }

    #[test]
    fn test_opposite_mirrors_corners() {
        let r = Region::new(IVec3::new(1, 2, 3), IVec3::new(4, 2, 8));
        assert_eq!(r.opposite(IVec3::new(1, 2, 3)), IVec3::new(4, 2, 8));
        assert_eq!(r.opposite(IVec3::new(4, 2, 3)), IVec3::new(1, 2, 8));
    }

    #[test]
    #[should_panic(expected = "not a corner")]
    fn test_opposite_rejects_interior_points() {
        let r = Region::new(IVec3::ZERO, IVec3::new(4, 0, 4));
        r.opposite(IVec3::new(2, 0, 0));
    }

    #[test]
    fn test_cells_enumerates_volume() {
        let r = Region::new(IVec3::ZERO, IVec3::new(1, 2, 0));
        let cells: Vec<IVec3> = r.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], IVec3::ZERO);
        assert_eq!(*cells.last().unwrap(), IVec3::new(1, 2, 0));
    }
}
