/// Grid addressing and the pad store
///
/// Pad ids follow the Launchpad programmer-mode layout:
///
/// ```text
/// 91 | 92 | 93 | 94 | 95 | 96 | 97 | 98 || 99
/// ===========================================
/// 81 | 82 | 83 | 84 | 85 | 86 | 87 | 88 || 89
/// ..
/// 11 | 12 | 13 | 14 | 15 | 16 | 17 | 18 || 19
/// ```
///
/// Row and column 8 hold the function buttons; the playable grid is x, y in 0..8.
use crate::error::{Error, Result};

use super::pad::Pad;

/// Number of cells per side, function row/column included
pub const GRID_SIZE: u8 = 9;

/// Number of playable cells per side
pub const PLAYABLE: u8 = 8;

/// Index of the function row (top) and function column (right)
pub const FUNCTION_LANE: u8 = 8;

/// Protocol-level identifier of a pad (the note or control number it sends)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PadId(pub u8);

impl std::fmt::Display for PadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A (column, row) position on the 9x9 surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coords {
    pub x: u8,
    pub y: u8,
}

impl Coords {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    pub fn is_playable(&self) -> bool {
        self.x < PLAYABLE && self.y < PLAYABLE
    }
}

/// Id of the cell at `(x, y)`.
///
/// Panics if either coordinate is outside `0..9`.
pub fn id_of(x: u8, y: u8) -> PadId {
    assert!(
        x < GRID_SIZE && y < GRID_SIZE,
        "coordinates ({x}, {y}) outside the 9x9 surface"
    );
    PadId(10 * (y + 1) + x + 1)
}

/// Inverse of [`id_of`].
pub fn coords_of(id: u8) -> Result<Coords> {
    let x = (id % 10).wrapping_sub(1);
    let y = (id / 10).wrapping_sub(1);
    if x < GRID_SIZE && y < GRID_SIZE {
        Ok(Coords { x, y })
    } else {
        Err(Error::AddressOutOfRange(id))
    }
}

/// All nine ids of column `x`, bottom to top, function row included.
pub fn column(x: u8) -> [PadId; GRID_SIZE as usize] {
    std::array::from_fn(|y| id_of(x, y as u8))
}

/// The eight playable ids of row `y`, left to right.
pub fn row(y: u8) -> [PadId; PLAYABLE as usize] {
    std::array::from_fn(|x| id_of(x as u8, y))
}

/// Every id on the surface, row by row.
pub fn all_ids() -> impl Iterator<Item = PadId> {
    (0..GRID_SIZE).flat_map(|y| (0..GRID_SIZE).map(move |x| id_of(x, y)))
}

/// The 81 pads, stored row-major
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Pad>,
}

impl Grid {
    pub fn new() -> Self {
        let cells = (0..GRID_SIZE)
            .flat_map(|y| (0..GRID_SIZE).map(move |x| Pad::new(x, y)))
            .collect();
        Self { cells }
    }

    fn index(x: u8, y: u8) -> Option<usize> {
        (x < GRID_SIZE && y < GRID_SIZE).then(|| y as usize * GRID_SIZE as usize + x as usize)
    }

    pub fn get(&self, x: u8, y: u8) -> Option<&Pad> {
        Self::index(x, y).and_then(|i| self.cells.get(i))
    }

    pub fn get_mut(&mut self, x: u8, y: u8) -> Option<&mut Pad> {
        Self::index(x, y).and_then(move |i| self.cells.get_mut(i))
    }

    pub fn by_id(&self, id: u8) -> Option<&Pad> {
        let c = coords_of(id).ok()?;
        self.get(c.x, c.y)
    }

    /// Pads of column `x` in the order of [`column`].
    pub fn column(&self, x: u8) -> impl Iterator<Item = &Pad> {
        (0..GRID_SIZE).filter_map(move |y| self.get(x, y))
    }

    /// Playable pads of row `y`.
    pub fn row_mut(&mut self, y: u8) -> impl Iterator<Item = &mut Pad> {
        self.cells
            .iter_mut()
            .filter(move |p| p.y() == y && p.x() < PLAYABLE)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pad> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_fixtures() {
        assert_eq!(id_of(0, 0), PadId(11));
        assert_eq!(id_of(7, 7), PadId(88));
        assert_eq!(id_of(0, 8), PadId(91));
        assert_eq!(id_of(8, 0), PadId(19));
        assert_eq!(id_of(8, 8), PadId(99));
    }

    #[test]
    fn test_playable_ids_resolve_back() {
        for x in 0..PLAYABLE {
            for y in 0..PLAYABLE {
                assert_eq!(coords_of(id_of(x, y).0).unwrap(), Coords::new(x, y));
            }
        }
    }

    #[test]
    fn test_mapping_is_injective() {
        let mut ids: Vec<PadId> = all_ids().collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 81);
    }

    #[test]
    fn test_unknown_ids_are_rejected() {
        for id in [0, 9, 10, 20, 100, 110, 255] {
            assert!(
                matches!(coords_of(id), Err(Error::AddressOutOfRange(i)) if i == id),
                "id {id} should not resolve"
            );
        }
    }

    #[test]
    fn test_column_and_row_shapes() {
        let col = column(2);
        assert_eq!(col.len(), 9);
        assert_eq!(col[0], PadId(13));
        assert_eq!(col[8], PadId(93));

        let r = row(3);
        assert_eq!(r.len(), 8);
        assert_eq!(r[0], PadId(41));
        assert_eq!(r[7], PadId(48));
    }

    #[test]
    fn test_grid_lookup() {
        let grid = Grid::new();
        assert_eq!(grid.len(), 81);
        let pad = grid.by_id(56).unwrap();
        assert_eq!((pad.x(), pad.y()), (5, 4));
        assert!(grid.by_id(9).is_none());
        assert!(grid.get(9, 0).is_none());
    }

    #[test]
    fn test_row_mut_skips_function_column() {
        let mut grid = Grid::new();
        let xs: Vec<u8> = grid.row_mut(3).map(|p| p.x()).collect();
        assert_eq!(xs, (0..8).collect::<Vec<_>>());
    }
}
