use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::ops::Index;

pub use cell::*;
pub use env::*;
pub use error::*;
pub use generator::*;
pub use observation::*;
pub use render::*;
pub use types::*;

mod cell;
mod env;
mod error;
mod generator;
mod observation;
mod render;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl BoardConfig {
    pub const fn new(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    /// Cells that are not mines, the number that must be opened to win.
    pub const fn openable_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }

    pub const fn action_count(&self) -> Action {
        self.total_cells()
    }

    pub const fn decode_action(&self, action: Action) -> Coord2 {
        let width = self.size.0 as Action;
        ((action % width) as Coord, (action / width) as Coord)
    }

    pub const fn encode_action(&self, (x, y): Coord2) -> Action {
        (y as Action) * (self.size.0 as Action) + (x as Action)
    }
}

/// Full engine configuration: the board plus every recognized option.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    pub board: BoardConfig,
    /// Automatically open the whole zero-region around a zero-count cell.
    pub flood_fill: bool,
    /// Reward deducted per action that targets an already-open cell.
    pub punishment: f64,
    /// Deterministic mine layout draws when set.
    pub seed: Option<u64>,
    /// Redraw the layout until the first move of an episode is safe.
    pub first_move_safe: bool,
    /// Run invariant assertions after every mutating call.
    pub debug: bool,
    /// Wait for user input before the display is released.
    pub pause_after_end: bool,
}

impl EnvConfig {
    pub fn new(board: BoardConfig) -> Self {
        Self {
            board,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.board.total_cells() == 0 {
            return Err(EnvError::EmptyBoard);
        }
        if self.board.mines >= self.board.total_cells() {
            return Err(EnvError::TooManyMines);
        }
        Ok(())
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::new((8, 8), 10),
            flood_fill: true,
            punishment: 0.01,
            seed: None,
            first_move_safe: true,
            debug: false,
            pause_after_end: false,
        }
    }
}

/// Placement of mines, immutable for the duration of an episode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(EnvError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn board_config(&self) -> BoardConfig {
        BoardConfig {
            size: self.size(),
            mines: self.mine_count,
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.mine_mask.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.mine_mask
            .iter_neighbors(coords)
            .filter(|&pos| self[pos])
            .count() as u8
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> {
        self.mine_mask.iter_neighbors(coords)
    }

    pub(crate) fn mask(&self) -> &Array2<bool> {
        &self.mine_mask
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_codec_round_trips() {
        let board = BoardConfig::new((5, 3), 2);
        for action in 0..board.action_count() {
            let coords = board.decode_action(action);
            assert!(coords.0 < 5 && coords.1 < 3);
            assert_eq!(board.encode_action(coords), action);
        }
    }

    #[test]
    fn decode_walks_x_within_a_row() {
        let board = BoardConfig::new((4, 4), 0);
        assert_eq!(board.decode_action(0), (0, 0));
        assert_eq!(board.decode_action(3), (3, 0));
        assert_eq!(board.decode_action(4), (0, 1));
    }

    #[test]
    fn config_rejects_unsatisfiable_mine_count() {
        let config = EnvConfig::new(BoardConfig::new((2, 2), 4));
        assert_eq!(config.validate(), Err(EnvError::TooManyMines));

        let config = EnvConfig::new(BoardConfig::new((2, 2), 3));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn config_rejects_empty_board() {
        let config = EnvConfig::new(BoardConfig::new((0, 3), 0));
        assert_eq!(config.validate(), Err(EnvError::EmptyBoard));
    }

    #[test]
    fn layout_counts_mines_and_safe_cells() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();
        assert_eq!(layout.mine_count(), 2);
        assert_eq!(layout.safe_cell_count(), 7);
        assert!(layout.contains_mine((0, 0)));
        assert!(!layout.contains_mine((1, 1)));
        assert_eq!(layout.board_config(), BoardConfig::new((3, 3), 2));
        assert_eq!(layout.board_config().openable_cells(), 7);
    }

    #[test]
    fn layout_rejects_out_of_bounds_mines() {
        let result = MineLayout::from_mine_coords((2, 2), &[(2, 0)]);
        assert_eq!(result.unwrap_err(), EnvError::InvalidCoords);
    }

    #[test]
    fn adjacent_mine_count_ignores_center() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(1, 1)]).unwrap();
        assert_eq!(layout.adjacent_mine_count((1, 1)), 0);
        assert_eq!(layout.adjacent_mine_count((0, 0)), 1);
        assert_eq!(layout.adjacent_mine_count((2, 1)), 1);
    }
}
