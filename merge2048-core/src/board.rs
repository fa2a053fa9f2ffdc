//! Square tile grid, move directions and the shift/merge algorithm

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Smallest playable board edge
pub const MIN_SIZE: usize = 2;

/// Largest accepted board edge
pub const MAX_SIZE: usize = 64;

/// Board edge used when the caller does not pick one
pub const DEFAULT_SIZE: usize = 4;

/// Tile value that wins the game
pub const TARGET_VALUE: u32 = 2048;

/// Value of every freshly spawned tile
pub const SPAWN_VALUE: u32 = 2;

/// Orthogonal neighbour offsets (drow, dcol): up, down, left, right
const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

// ============================================================================
// DIRECTION
// ============================================================================

/// Move direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

/// All four directions in wire order (0=Up, 1=Down, 2=Left, 3=Right)
pub const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    /// Rows move for Left/Right, columns for Up/Down
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = EngineError;

    /// Accepts full names and single letters (U/D/L/R), case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            _ => Err(EngineError::InvalidDirection(s.to_string())),
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DIRECTIONS
            .get(value as usize)
            .copied()
            .ok_or_else(|| EngineError::InvalidDirection(value.to_string()))
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// N x N grid of tile values, row-major. 0 marks an empty cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<u32>>", try_from = "Vec<Vec<u32>>")]
pub struct Board {
    size: usize,
    cells: Vec<u32>,
}

/// Result of sliding every vector of the board in one direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Slide {
    /// Some cell changed value
    pub changed: bool,
    /// Number of pairs merged
    pub merges: usize,
    /// Sum of all merge results
    pub score_delta: u64,
}

impl Board {
    /// Empty board with edge `size`
    pub fn new(size: usize) -> Result<Self, EngineError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(EngineError::InvalidSize(size));
        }
        Ok(Self {
            size,
            cells: vec![0; size * size],
        })
    }

    /// Build from a row matrix. Only the shape is checked, not the values.
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<Self, EngineError> {
        let size = rows.len();
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(EngineError::InvalidSize(size));
        }

        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(EngineError::MalformedGrid {
                    row,
                    expected: size,
                    found: values.len(),
                });
            }
            cells.extend(values);
        }

        Ok(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Value at (row, col). Panics when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, value: u32) {
        let idx = self.index(row, col);
        self.cells[idx] = value;
    }

    /// Copy out as a row matrix
    pub fn rows(&self) -> Vec<Vec<u32>> {
        self.cells.chunks(self.size).map(|row| row.to_vec()).collect()
    }

    /// Iterate (row, col, value) over every cell
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &value)| (i / size, i % size, value))
    }

    /// Coordinates of every empty cell, row-major
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.tiles()
            .filter(|&(_, _, value)| value == 0)
            .map(|(row, col, _)| (row, col))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&value| value != 0)
    }

    /// Largest tile on the board (0 when empty)
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub fn contains(&self, value: u32) -> bool {
        self.cells.contains(&value)
    }

    /// Count of non-empty cells
    pub fn tile_count(&self) -> usize {
        self.cells.iter().filter(|&&value| value != 0).count()
    }

    /// Orthogonal neighbours of (row, col) that lie on the board
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dr, dc)| {
            let r = row.checked_add_signed(dr)?;
            let c = col.checked_add_signed(dc)?;
            (r < self.size && c < self.size).then_some((r, c))
        })
    }

    /// Some non-empty cell has an equal orthogonal neighbour
    pub fn has_adjacent_pair(&self) -> bool {
        self.tiles().any(|(row, col, value)| {
            value != 0
                && self
                    .neighbors(row, col)
                    .any(|(r, c)| self.get(r, c) == value && merge_value(value).is_some())
        })
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(row < self.size && col < self.size, "cell ({row}, {col}) off board");
        row * self.size + col
    }

    // ========================================================================
    // MOVE ALGORITHM
    // ========================================================================

    /// Shift and merge every row (Left/Right) or column (Up/Down).
    ///
    /// Each vector is compacted towards the leading edge, then merged once
    /// from the leading edge backwards, then compacted again if anything
    /// merged. A tile produced by a merge never merges again in the same
    /// slide, so `[2,2,2,2]` becomes `[4,4,0,0]`.
    pub fn slide(&mut self, direction: Direction) -> Slide {
        let mut result = Slide::default();

        for vector in 0..self.size {
            result.changed |= self.compact_vector(direction, vector);
        }

        for vector in 0..self.size {
            let (merges, gained) = self.merge_vector(direction, vector);
            result.merges += merges;
            result.score_delta += gained;
        }

        if result.merges > 0 {
            for vector in 0..self.size {
                self.compact_vector(direction, vector);
            }
            result.changed = true;
        }

        result
    }

    /// Cell index of position `k` along `vector`, counted from the leading edge
    fn vector_index(&self, direction: Direction, vector: usize, k: usize) -> usize {
        let last = self.size - 1;
        let (row, col) = match direction {
            Direction::Left => (vector, k),
            Direction::Right => (vector, last - k),
            Direction::Up => (k, vector),
            Direction::Down => (last - k, vector),
        };
        row * self.size + col
    }

    /// Drop empty cells and pad zeros behind the tiles. Returns whether any cell changed.
    fn compact_vector(&mut self, direction: Direction, vector: usize) -> bool {
        let tiles: Vec<u32> = (0..self.size)
            .map(|k| self.cells[self.vector_index(direction, vector, k)])
            .filter(|&value| value != 0)
            .collect();

        let mut changed = false;
        for k in 0..self.size {
            let idx = self.vector_index(direction, vector, k);
            let value = tiles.get(k).copied().unwrap_or(0);
            if self.cells[idx] != value {
                self.cells[idx] = value;
                changed = true;
            }
        }
        changed
    }

    /// Merge equal neighbours scanning from the leading edge. Returns (merges, score gained).
    fn merge_vector(&mut self, direction: Direction, vector: usize) -> (usize, u64) {
        let mut merges = 0;
        let mut gained = 0u64;
        let mut k = 0;

        while k + 1 < self.size {
            let lead = self.vector_index(direction, vector, k);
            let trail = self.vector_index(direction, vector, k + 1);
            let value = self.cells[lead];

            if value != 0 && value == self.cells[trail] {
                if let Some(merged) = merge_value(value) {
                    self.cells[lead] = merged;
                    self.cells[trail] = 0;
                    gained += u64::from(merged);
                    merges += 1;
                    k += 2; // the consumed pair never merges again
                    continue;
                }
            }
            k += 1;
        }

        (merges, gained)
    }
}

/// Value of a merged pair, `None` when doubling would overflow a tile
fn merge_value(value: u32) -> Option<u32> {
    value.checked_mul(2)
}

impl TryFrom<Vec<Vec<u32>>> for Board {
    type Error = EngineError;

    fn try_from(rows: Vec<Vec<u32>>) -> Result<Self, Self::Error> {
        Board::from_rows(rows)
    }
}

impl From<Board> for Vec<Vec<u32>> {
    fn from(board: Board) -> Self {
        board.rows()
    }
}

impl fmt::Display for Board {
    /// Text grid, one row per line, empty cells as dots
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.max_tile().max(1).to_string().len().max(4);
        for row in self.cells.chunks(self.size) {
            let line: Vec<String> = row
                .iter()
                .map(|&value| match value {
                    0 => format!("{:>width$}", "."),
                    v => format!("{:>width$}", v),
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[&[u32]]) -> Board {
        Board::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    /// Single-row helper: pad a 4-cell row into a 4x4 board, slide, return row 0
    fn slide_row(row: [u32; 4], direction: Direction) -> ([u32; 4], Slide) {
        let mut b = board(&[&row, &[0; 4], &[0; 4], &[0; 4]]);
        let slide = b.slide(direction);
        let out = [b.get(0, 0), b.get(0, 1), b.get(0, 2), b.get(0, 3)];
        (out, slide)
    }

    #[test]
    fn test_new_rejects_small_sizes() {
        assert_eq!(Board::new(1), Err(EngineError::InvalidSize(1)));
        assert_eq!(Board::new(0), Err(EngineError::InvalidSize(0)));
        assert!(Board::new(2).is_ok());
    }

    #[test]
    fn test_new_rejects_huge_sizes() {
        assert!(Board::new(MAX_SIZE).is_ok());
        assert_eq!(Board::new(MAX_SIZE + 1), Err(EngineError::InvalidSize(MAX_SIZE + 1)));
        assert_eq!(Board::new(1 << 33), Err(EngineError::InvalidSize(1 << 33)));

        let rows = vec![Vec::new(); MAX_SIZE + 1];
        assert_eq!(Board::from_rows(rows), Err(EngineError::InvalidSize(MAX_SIZE + 1)));
    }

    #[test]
    fn test_overflowing_pair_does_not_merge() {
        let top = 1u32 << 31;
        let mut b = board(&[&[top, top], &[0, 0]]);
        let slide = b.slide(Direction::Left);

        assert!(!slide.changed);
        assert_eq!(slide.merges, 0);
        assert_eq!(b.rows(), vec![vec![top, top], vec![0, 0]]);

        // Smaller pairs in the same vector still merge
        let mut mixed = board(&[&[top, top, 4, 4], &[0; 4], &[0; 4], &[0; 4]]);
        let slide = mixed.slide(Direction::Left);
        assert_eq!(slide.score_delta, 8);
        assert_eq!(mixed.rows()[0], vec![top, top, 8, 0]);

        let full = board(&[&[top, top], &[2, 4]]);
        assert!(!full.has_adjacent_pair());
    }

    #[test]
    fn test_from_rows_checks_shape() {
        let err = Board::from_rows(vec![vec![0, 2], vec![4]]).unwrap_err();
        assert_eq!(
            err,
            EngineError::MalformedGrid { row: 1, expected: 2, found: 1 }
        );
        assert_eq!(
            Board::from_rows(vec![vec![2]]),
            Err(EngineError::InvalidSize(1))
        );
    }

    #[test]
    fn test_compaction_left_and_right() {
        let (left, slide) = slide_row([0, 2, 0, 4], Direction::Left);
        assert_eq!(left, [2, 4, 0, 0]);
        assert!(slide.changed);
        assert_eq!(slide.score_delta, 0);

        let (right, _) = slide_row([0, 2, 0, 4], Direction::Right);
        assert_eq!(right, [0, 0, 2, 4]);
    }

    #[test]
    fn test_chain_merges_in_pairs() {
        let (left, slide) = slide_row([2, 2, 2, 2], Direction::Left);
        assert_eq!(left, [4, 4, 0, 0]);
        assert_eq!(slide.score_delta, 8);
        assert_eq!(slide.merges, 2);

        let (right, _) = slide_row([2, 2, 2, 2], Direction::Right);
        assert_eq!(right, [0, 0, 4, 4]);
    }

    #[test]
    fn test_single_merge_both_ways() {
        let (left, slide) = slide_row([2, 2, 0, 4], Direction::Left);
        assert_eq!(left, [4, 4, 0, 0]);
        assert_eq!(slide.score_delta, 4);

        let (right, slide) = slide_row([2, 2, 0, 4], Direction::Right);
        assert_eq!(right, [0, 0, 4, 4]);
        assert_eq!(slide.score_delta, 4);
    }

    #[test]
    fn test_leading_pair_wins_triple() {
        let (left, _) = slide_row([4, 4, 4, 0], Direction::Left);
        assert_eq!(left, [8, 4, 0, 0]);

        let (right, _) = slide_row([4, 4, 4, 0], Direction::Right);
        assert_eq!(right, [0, 0, 4, 8]);
    }

    #[test]
    fn test_merged_tile_does_not_remerge() {
        let (left, slide) = slide_row([4, 2, 2, 0], Direction::Left);
        assert_eq!(left, [4, 4, 0, 0]);
        assert_eq!(slide.merges, 1);
    }

    #[test]
    fn test_columns_up_and_down() {
        let mut b = board(&[&[2, 0], &[2, 4]]);
        let slide = b.slide(Direction::Up);
        assert_eq!(b.rows(), vec![vec![4, 4], vec![0, 0]]);
        assert_eq!(slide.score_delta, 4);

        let mut b = board(&[&[2, 4], &[0, 4]]);
        b.slide(Direction::Down);
        assert_eq!(b.rows(), vec![vec![0, 0], vec![2, 8]]);
    }

    #[test]
    fn test_no_change_reports_unchanged() {
        let mut b = board(&[&[2, 4], &[4, 2]]);
        let before = b.clone();
        let slide = b.slide(Direction::Left);
        assert!(!slide.changed);
        assert_eq!(b, before);
    }

    #[test]
    fn test_merge_conserves_sum() {
        let mut b = board(&[
            &[2, 2, 4, 4],
            &[8, 0, 8, 2],
            &[0, 0, 0, 0],
            &[16, 16, 16, 0],
        ]);
        let sum_before: u64 = b.tiles().map(|(_, _, v)| u64::from(v)).sum();
        b.slide(Direction::Right);
        let sum_after: u64 = b.tiles().map(|(_, _, v)| u64::from(v)).sum();
        assert_eq!(sum_before, sum_after);
    }

    #[test]
    fn test_adjacent_pair_detection() {
        let locked = board(&[&[2, 4], &[4, 2]]);
        assert!(!locked.has_adjacent_pair());

        let open = board(&[&[2, 2], &[4, 8]]);
        assert!(open.has_adjacent_pair());

        let vertical = board(&[&[2, 4], &[2, 8]]);
        assert!(vertical.has_adjacent_pair());
    }

    #[test]
    fn test_neighbors_are_bounds_checked() {
        let b = Board::new(3).unwrap();
        assert_eq!(b.neighbors(0, 0).count(), 2);
        assert_eq!(b.neighbors(1, 1).count(), 4);
        assert_eq!(b.neighbors(2, 1).count(), 3);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("R".parse::<Direction>().unwrap(), Direction::Right);
        assert_eq!("Left".parse::<Direction>().unwrap(), Direction::Left);
        assert_eq!(" d ".parse::<Direction>().unwrap(), Direction::Down);
        assert!(matches!(
            "north".parse::<Direction>(),
            Err(EngineError::InvalidDirection(_))
        ));
        assert_eq!(Direction::try_from(3).unwrap(), Direction::Right);
        assert!(Direction::try_from(4).is_err());
    }

    #[test]
    fn test_serde_as_matrix() {
        let b = board(&[&[0, 2], &[4, 0]]);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[[0,2],[4,0]]");

        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
        assert!(serde_json::from_str::<Board>("[[0,2],[4]]").is_err());
    }
}
