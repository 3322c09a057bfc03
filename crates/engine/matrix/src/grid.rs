//! Dense occupancy grid with O(1) box-count queries
//!
//! The grid is sized to the model's resolution at construction and stores
//! occupancy contiguously in x, y, z scan order, matching the access pattern
//! of both the prefix-sum build and the flood-fill planners.

use glam::IVec3;

use crate::Region;

/// Dense boolean occupancy over an R x R x R build space.
///
/// An optional inclusive prefix-sum table answers box occupancy counts in
/// O(1); it is built once via [`Matrix::build_sums`] after the cells are
/// fixed, and any later mutation invalidates it. Optional X/Z range limits
/// make every cell outside the configured slab read as filled without
/// touching storage, emulating a restricted build envelope.
#[derive(Debug, Clone)]
pub struct Matrix {
    resolution: usize,
    cells: Vec<bool>,
    sums: Option<Vec<u32>>,
    x_limits: Option<(i32, i32)>,
    z_limits: Option<(i32, i32)>,
}

impl Matrix {
    /// Creates an empty grid of the given resolution.
    pub fn new(resolution: usize) -> Self {
        assert!(resolution > 0, "zero-resolution build space");
        Self {
            resolution,
            cells: vec![false; resolution * resolution * resolution],
            sums: None,
            x_limits: None,
            z_limits: None,
        }
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// True when `p` addresses a cell of the backing storage.
    #[inline]
    pub fn contains(&self, p: IVec3) -> bool {
        let r = self.resolution as i32;
        p.x >= 0 && p.y >= 0 && p.z >= 0 && p.x < r && p.y < r && p.z < r
    }

    #[inline]
    fn index(&self, p: IVec3) -> usize {
        assert!(
            self.contains(p),
            "cell {p} outside resolution {}",
            self.resolution
        );
        (p.x as usize * self.resolution + p.y as usize) * self.resolution + p.z as usize
    }

    /// Reads a cell, applying the envelope limits: coordinates outside a
    /// configured X or Z range report as filled without a storage access.
    #[inline]
    pub fn get(&self, p: IVec3) -> bool {
        if let Some((lo, hi)) = self.x_limits {
            if p.x < lo || p.x > hi {
                return true;
            }
        }
        if let Some((lo, hi)) = self.z_limits {
            if p.z < lo || p.z > hi {
                return true;
            }
        }
        self.cells[self.index(p)]
    }

    /// Writes a cell. Invalidates the prefix-sum table.
    pub fn set(&mut self, p: IVec3, value: bool) {
        let idx = self.index(p);
        self.cells[idx] = value;
        self.sums = None;
    }

    /// Restricts the readable envelope to `lo..=hi` on the X axis.
    pub fn set_x_limits(&mut self, lo: i32, hi: i32) {
        self.x_limits = Some((lo, hi));
    }

    /// Restricts the readable envelope to `lo..=hi` on the Z axis.
    pub fn set_z_limits(&mut self, lo: i32, hi: i32) {
        self.z_limits = Some((lo, hi));
    }

    /// Total number of filled cells in the backing storage.
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    /// True when both grids have the same resolution and cell-for-cell
    /// occupancy. Envelope limits and sum tables are ignored.
    pub fn same_occupancy(&self, other: &Matrix) -> bool {
        self.resolution == other.resolution && self.cells == other.cells
    }

    /// Builds the inclusive 3D prefix-sum table: entry (x, y, z) counts the
    /// filled cells in the box from the origin to (x, y, z).
    pub fn build_sums(&mut self) {
        let r = self.resolution;
        let mut sums = vec![0u32; r * r * r];
        for x in 0..r {
            for y in 0..r {
                for z in 0..r {
                    let idx = (x * r + y) * r + z;
                    let mut v = self.cells[idx] as u32;
                    if x > 0 {
                        v += sums[idx - r * r];
                    }
                    if y > 0 {
                        v += sums[idx - r];
                    }
                    if z > 0 {
                        v += sums[idx - 1];
                    }
                    if x > 0 && y > 0 {
                        v -= sums[idx - r * r - r];
                    }
                    if x > 0 && z > 0 {
                        v -= sums[idx - r * r - 1];
                    }
                    if y > 0 && z > 0 {
                        v -= sums[idx - r - 1];
                    }
                    if x > 0 && y > 0 && z > 0 {
                        v += sums[idx - r * r - r - 1];
                    }
                    sums[idx] = v;
                }
            }
        }
        self.sums = Some(sums);
    }

    #[inline]
    fn sum_at(&self, sums: &[u32], x: i32, y: i32, z: i32) -> i64 {
        if x < 0 || y < 0 || z < 0 {
            0
        } else {
            let r = self.resolution;
            sums[(x as usize * r + y as usize) * r + z as usize] as i64
        }
    }

    /// Number of filled cells inside `region`, in O(1) by 3D
    /// inclusion-exclusion over the prefix-sum table.
    ///
    /// Panics when the table is absent (never built, or invalidated by a
    /// mutation) or the region leaves the grid.
    pub fn box_count(&self, region: &Region) -> u32 {
        let sums = self
            .sums
            .as_ref()
            .expect("box query without a prefix-sum table");
        assert!(
            self.contains(region.min()) && self.contains(region.max()),
            "region {:?}..{:?} outside resolution {}",
            region.min(),
            region.max(),
            self.resolution
        );
        let (a, b) = (region.min(), region.max());
        let (x0, y0, z0) = (a.x - 1, a.y - 1, a.z - 1);
        let count = self.sum_at(sums, b.x, b.y, b.z)
            - self.sum_at(sums, x0, b.y, b.z)
            - self.sum_at(sums, b.x, y0, b.z)
            - self.sum_at(sums, b.x, b.y, z0)
            + self.sum_at(sums, x0, y0, b.z)
            + self.sum_at(sums, x0, b.y, z0)
            + self.sum_at(sums, b.x, y0, z0)
            - self.sum_at(sums, x0, y0, z0);
        count as u32
    }

    /// True when the side^3 block at block-coordinate `block` is completely
    /// filled.
    pub fn box_is_full(&self, block: IVec3, side: i32) -> bool {
        let base = block * side;
        let region = Region::new(base, base + IVec3::splat(side - 1));
        self.box_count(&region) == (side * side * side) as u32
    }

    /// True when `block` is a valid block-coordinate for blocks of the given
    /// side length.
    pub fn block_in_bounds(&self, block: IVec3, side: i32) -> bool {
        let n = self.resolution as i32 / side;
        block.x >= 0 && block.y >= 0 && block.z >= 0 && block.x < n && block.y < n && block.z < n
    }
}
