//! Storage for scan results.

use crate::grid::ArrayIndex;
use crate::kinematics::JointVector;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// State of one map cell.
///
/// `Untested` keeps cells skipped by a coarse stride apart from cells that were
/// probed and missed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Untested,
    Unreached,
    Reached(JointVector),
}

impl Cell {
    pub fn is_reached(&self) -> bool {
        matches!(self, Self::Reached(_))
    }

    pub fn is_tested(&self) -> bool {
        !matches!(self, Self::Untested)
    }

    pub fn solution(&self) -> Option<&[f64]> {
        match self {
            Self::Reached(joints) => Some(joints),
            _ => None,
        }
    }
}

impl From<Option<JointVector>> for Cell {
    fn from(joints: Option<JointVector>) -> Self {
        match joints {
            Some(joints) => Self::Reached(joints),
            None => Self::Unreached,
        }
    }
}

/// Dense 3D grid of [`Cell`]s in row-major (i, j, k) order.
///
/// The success grid and solution grid are both views over the same cells, so a
/// success flag of 1 always comes with a solution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMap")]
pub struct ReachabilityMap {
    shape: [usize; 3],
    half_extents: [usize; 3],
    cells: Vec<Cell>,
}

/// Unchecked wire form of a [`ReachabilityMap`].
#[derive(Deserialize)]
struct RawMap {
    shape: [usize; 3],
    half_extents: [usize; 3],
    cells: Vec<Cell>,
}

impl TryFrom<RawMap> for ReachabilityMap {
    type Error = Error;

    fn try_from(raw: RawMap) -> Result<Self> {
        let expected_shape = raw.half_extents.map(|h| h.checked_mul(2));
        if expected_shape != raw.shape.map(Some) {
            return Err(Error::InvalidMap(format!(
                "shape {:?} does not match half-extents {:?}",
                raw.shape, raw.half_extents
            )));
        }
        let expected_len = raw.shape.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n));
        if expected_len != Some(raw.cells.len()) {
            return Err(Error::InvalidMap(format!(
                "{} cells stored for shape {:?}",
                raw.cells.len(),
                raw.shape
            )));
        }
        Ok(Self {
            shape: raw.shape,
            half_extents: raw.half_extents,
            cells: raw.cells,
        })
    }
}

impl ReachabilityMap {
    /// An all-`Untested` map covering `[-half, half)` on each axis.
    pub fn new(half_extents: [usize; 3]) -> Self {
        let shape = half_extents.map(|h| h * 2);
        Self {
            shape,
            half_extents,
            cells: vec![Cell::Untested; shape.iter().product()],
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn half_extents(&self) -> [usize; 3] {
        self.half_extents
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn offset(&self, index: ArrayIndex) -> Option<usize> {
        let [dx, dy, dz] = self.shape;
        let [i, j, k] = index;
        (i < dx && j < dy && k < dz).then(|| (i * dy + j) * dz + k)
    }

    fn index_of(&self, offset: usize) -> ArrayIndex {
        let [_, dy, dz] = self.shape;
        [offset / (dy * dz), (offset / dz) % dy, offset % dz]
    }

    pub fn cell(&self, index: ArrayIndex) -> Option<&Cell> {
        self.offset(index).map(|o| &self.cells[o])
    }

    /// Success flag: 1 for a reached cell, 0 otherwise (including out of bounds).
    pub fn success(&self, index: ArrayIndex) -> u8 {
        self.cell(index).map_or(0, |c| u8::from(c.is_reached()))
    }

    /// Recorded joint solution, if the cell was reached.
    pub fn solution(&self, index: ArrayIndex) -> Option<&[f64]> {
        self.cell(index).and_then(Cell::solution)
    }

    /// Stores `cell` at `index`.
    pub fn record(&mut self, index: ArrayIndex, cell: Cell) -> Result<()> {
        let offset = self.offset(index).ok_or(Error::IndexOutOfBounds {
            index,
            shape: self.shape,
        })?;
        self.cells[offset] = cell;
        Ok(())
    }

    /// Every cell with its index, i outermost and k innermost.
    pub fn iter(&self) -> impl Iterator<Item = (ArrayIndex, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(offset, cell)| (self.index_of(offset), cell))
    }

    pub fn reached_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_reached()).count()
    }

    pub fn tested_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_tested()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_map_is_untested() {
        let map = ReachabilityMap::new([1, 2, 3]);
        assert_eq!(map.shape(), [2, 4, 6]);
        assert_eq!(map.len(), 48);
        assert_eq!(map.tested_count(), 0);
        assert!(map.iter().all(|(_, c)| *c == Cell::Untested));
    }

    #[test]
    fn success_and_solution_stay_coupled() {
        let mut map = ReachabilityMap::new([1, 1, 1]);
        map.record([0, 1, 0], Cell::Reached(vec![0.5, -0.5])).unwrap();
        map.record([1, 0, 1], Cell::Unreached).unwrap();

        assert_eq!(map.success([0, 1, 0]), 1);
        assert_eq!(map.solution([0, 1, 0]), Some(&[0.5, -0.5][..]));
        assert_eq!(map.success([1, 0, 1]), 0);
        assert_eq!(map.solution([1, 0, 1]), None);
        assert_eq!(map.cell([1, 1, 1]), Some(&Cell::Untested));
        assert_eq!(map.tested_count(), 2);
        assert_eq!(map.reached_count(), 1);
    }

    #[test]
    fn out_of_bounds_record_fails() {
        let mut map = ReachabilityMap::new([1, 1, 1]);
        let err = map.record([2, 0, 0], Cell::Unreached).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: [2, 0, 0], .. }));
        assert_eq!(map.success([2, 0, 0]), 0);
    }

    #[test]
    fn iteration_is_row_major() {
        let map = ReachabilityMap::new([1, 1, 1]);
        let indices: Vec<ArrayIndex> = map.iter().map(|(i, _)| i).take(4).collect();
        assert_eq!(indices, vec![[0, 0, 0], [0, 0, 1], [0, 1, 0], [0, 1, 1]]);
    }

    #[test]
    fn deserialized_map_is_checked() {
        let short = "shape = [2, 2, 2]\nhalf_extents = [1, 1, 1]\ncells = [\"Untested\"]\n";
        assert!(toml::from_str::<ReachabilityMap>(short).is_err());

        let zero_axis = "shape = [0, 2, 2]\nhalf_extents = [0, 1, 1]\ncells = [\"Unreached\"]\n";
        assert!(toml::from_str::<ReachabilityMap>(zero_axis).is_err());

        let wrong_shape = "shape = [1, 1, 1]\nhalf_extents = [1, 1, 1]\ncells = [\"Untested\"]\n";
        assert!(toml::from_str::<ReachabilityMap>(wrong_shape).is_err());

        let empty = "shape = [0, 0, 0]\nhalf_extents = [0, 0, 0]\ncells = []\n";
        let map = toml::from_str::<ReachabilityMap>(empty).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn map_survives_serialization() {
        let mut map = ReachabilityMap::new([1, 1, 1]);
        map.record([1, 0, 1], Cell::Unreached).unwrap();
        let text = toml::to_string(&map).unwrap();
        assert_eq!(toml::from_str::<ReachabilityMap>(&text).unwrap(), map);
    }

    #[test]
    fn zero_extent_map_is_empty() {
        let map = ReachabilityMap::new([3, 0, 3]);
        assert!(map.is_empty());
        assert_eq!(map.iter().count(), 0);
    }
}
