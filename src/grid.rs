//! Sampling volume geometry.
//!
//! The volume is a box centred on the robot base, anchored at a start corner given in
//! world units. Grid coordinates are integers in `[-half, half)` per axis; the map
//! stores them shifted by `half` so every index is non-negative.

use crate::{Error, Result};
use glam::DVec3;

/// Default per-axis stride: every X and Y index, every tenth Z index.
pub const DEFAULT_STRIDE: [usize; 3] = [1, 1, 10];

/// An integer grid coordinate, `[i, j, k]`, possibly negative.
pub type GridCoord = [i64; 3];

/// A non-negative storage index into the reachability map.
pub type ArrayIndex = [usize; 3];

/// Bounds, stride and index conversions of the sampling volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingGrid {
    half_extents: [usize; 3],
    stride: [usize; 3],
    conversion: u32,
    counts: [usize; 3],
}

impl SamplingGrid {
    /// Derives the volume from a start corner (world units) and a conversion factor
    /// (grid indices per world unit).
    ///
    /// A zero corner component yields an empty axis; that is not an error.
    pub fn new(start_corner: [i32; 3], conversion: u32, stride: [usize; 3]) -> Result<Self> {
        if conversion == 0 {
            return Err(Error::InvalidConfig("conversion factor must be positive".into()));
        }
        if stride.contains(&0) {
            return Err(Error::InvalidConfig(format!(
                "stride must be at least 1 on every axis, got {stride:?}"
            )));
        }

        let mut half_extents = [0usize; 3];
        let mut shape = [0usize; 3];
        for axis in 0..3 {
            let half = (i64::from(start_corner[axis]) * i64::from(conversion)).unsigned_abs();
            half_extents[axis] = usize::try_from(half)
                .ok()
                .filter(|h| h.checked_mul(2).is_some())
                .ok_or(Error::GridTooLarge(start_corner))?;
            shape[axis] = half_extents[axis] * 2;
        }
        shape
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or(Error::GridTooLarge(start_corner))?;

        let counts = [0, 1, 2].map(|a| shape[a].div_ceil(stride[a]));

        Ok(Self {
            half_extents,
            stride,
            conversion,
            counts,
        })
    }

    pub fn half_extents(&self) -> [usize; 3] {
        self.half_extents
    }

    /// Map shape: twice the half-extent on every axis.
    pub fn shape(&self) -> [usize; 3] {
        self.half_extents.map(|h| h * 2)
    }

    pub fn stride(&self) -> [usize; 3] {
        self.stride
    }

    pub fn conversion(&self) -> u32 {
        self.conversion
    }

    /// Number of coordinates the sampler yields.
    pub fn sample_count(&self) -> usize {
        self.counts.iter().product()
    }

    /// The `n`-th sampled coordinate in i-outer, k-inner order.
    pub fn coordinate_at(&self, n: usize) -> Option<GridCoord> {
        if n >= self.sample_count() {
            return None;
        }
        let [_, cy, cz] = self.counts;
        let steps = [n / (cy * cz), (n / cz) % cy, n % cz];
        Some([0, 1, 2].map(|a| {
            (steps[a] * self.stride[a]) as i64 - self.half_extents[a] as i64
        }))
    }

    /// Restartable sequence of every sampled coordinate.
    pub fn coordinates(&self) -> Coordinates<'_> {
        Coordinates {
            grid: self,
            next: 0,
        }
    }

    /// World-space position of a grid coordinate.
    pub fn real_position(&self, coord: GridCoord) -> DVec3 {
        let c = f64::from(self.conversion);
        DVec3::new(coord[0] as f64 / c, coord[1] as f64 / c, coord[2] as f64 / c)
    }

    /// Storage index of a grid coordinate, or `None` outside the volume.
    pub fn array_index(&self, coord: GridCoord) -> Option<ArrayIndex> {
        let mut index = [0usize; 3];
        for axis in 0..3 {
            let shifted = coord[axis].checked_add(self.half_extents[axis] as i64)?;
            let shifted = usize::try_from(shifted).ok()?;
            if shifted >= self.half_extents[axis] * 2 {
                return None;
            }
            index[axis] = shifted;
        }
        Some(index)
    }
}

/// Iterator over the sampled coordinates of a [`SamplingGrid`].
#[derive(Clone, Debug)]
pub struct Coordinates<'a> {
    grid: &'a SamplingGrid,
    next: usize,
}

impl Iterator for Coordinates<'_> {
    type Item = GridCoord;

    fn next(&mut self) -> Option<GridCoord> {
        let coord = self.grid.coordinate_at(self.next)?;
        self.next += 1;
        Some(coord)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.sample_count().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Coordinates<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn unit_corner_at_conversion_ten() {
        let grid = SamplingGrid::new([-1, -1, -1], 10, DEFAULT_STRIDE).unwrap();
        assert_eq!(grid.half_extents(), [10, 10, 10]);
        assert_eq!(grid.shape(), [20, 20, 20]);
        assert_eq!(grid.sample_count(), 20 * 20 * 2);

        let ks: Vec<i64> = grid.coordinates().take(3).map(|c| c[2]).collect();
        assert_eq!(ks, vec![-10, 0, -10]);

        assert_eq!(grid.coordinates().next(), Some([-10, -10, -10]));
        assert_eq!(grid.coordinates().last(), Some([9, 9, 0]));
    }

    #[test]
    fn nesting_order_is_i_outer_k_inner() {
        let grid = SamplingGrid::new([-1, -1, -1], 1, [1, 1, 1]).unwrap();
        let coords: Vec<GridCoord> = grid.coordinates().collect();
        assert_eq!(
            coords,
            vec![
                [-1, -1, -1],
                [-1, -1, 0],
                [-1, 0, -1],
                [-1, 0, 0],
                [0, -1, -1],
                [0, -1, 0],
                [0, 0, -1],
                [0, 0, 0],
            ]
        );
    }

    #[test]
    fn real_position_and_index() {
        let grid = SamplingGrid::new([-1, -1, -1], 10, DEFAULT_STRIDE).unwrap();
        let p = grid.real_position([0, 0, -10]);
        assert_eq!(p, DVec3::new(0.0, 0.0, -1.0));
        assert_eq!(grid.array_index([0, 0, -10]), Some([10, 10, 0]));
        assert_eq!(grid.array_index([10, 0, 0]), None);
        assert_eq!(grid.array_index([-11, 0, 0]), None);
    }

    #[test]
    fn zero_corner_component_empties_axis() {
        let grid = SamplingGrid::new([-1, 0, -1], 10, DEFAULT_STRIDE).unwrap();
        assert_eq!(grid.shape(), [20, 0, 20]);
        assert_eq!(grid.sample_count(), 0);
        assert_eq!(grid.coordinates().count(), 0);
    }

    #[test]
    fn positive_corner_is_mirrored() {
        let grid = SamplingGrid::new([2, -1, 1], 2, [1, 1, 1]).unwrap();
        assert_eq!(grid.half_extents(), [4, 2, 2]);
    }

    #[test]
    fn rejects_zero_stride_and_conversion() {
        assert!(matches!(
            SamplingGrid::new([-1, -1, -1], 10, [1, 0, 1]),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            SamplingGrid::new([-1, -1, -1], 0, DEFAULT_STRIDE),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn huge_volume_is_rejected() {
        let result = SamplingGrid::new([i32::MIN, i32::MIN, i32::MIN], u32::MAX, DEFAULT_STRIDE);
        assert!(matches!(result, Err(Error::GridTooLarge(_))));
    }

    proptest! {
        #[test]
        fn shape_follows_corner_and_conversion(
            x in -4i32..=4,
            y in -4i32..=4,
            z in -4i32..=4,
            conversion in 1u32..6,
        ) {
            let grid = SamplingGrid::new([x, y, z], conversion, [1, 1, 1]).unwrap();
            let c = conversion as i32;
            prop_assert_eq!(
                grid.shape(),
                [x, y, z].map(|v| 2 * (v * c).unsigned_abs() as usize)
            );
        }

        #[test]
        fn every_sample_indexes_inside_the_map(
            x in -3i32..=-1,
            y in -3i32..=-1,
            z in -3i32..=-1,
            conversion in 1u32..5,
            stride in prop::array::uniform3(1usize..12),
        ) {
            let grid = SamplingGrid::new([x, y, z], conversion, stride).unwrap();
            let shape = grid.shape();
            let mut seen = 0;
            for coord in grid.coordinates() {
                let index = grid.array_index(coord);
                prop_assert!(index.is_some());
                let index = index.unwrap();
                for axis in 0..3 {
                    prop_assert!(index[axis] < shape[axis]);
                    prop_assert_eq!(index[axis] % stride[axis], 0);
                }
                seen += 1;
            }
            prop_assert_eq!(seen, grid.sample_count());
        }
    }
}
