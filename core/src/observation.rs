use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Player-visible grid of cell codes, the only state an agent may act on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub size: Coord2,
    pub grid: Array2<i8>,
}

impl Observation {
    pub fn new(size: Coord2, grid: Array2<i8>) -> Result<Self> {
        let obs = Self { size, grid };
        obs.validate()?;
        Ok(obs)
    }

    pub fn validate(&self) -> Result<()> {
        let expected = (self.size.0 as usize, self.size.1 as usize);
        if self.grid.dim() != expected {
            return Err(EnvError::InvalidBoardShape);
        }
        Ok(())
    }

    pub fn code_at(&self, coords: Coord2) -> i8 {
        self.grid[coords.to_nd_index()]
    }

    pub fn view(&self, coords: Coord2) -> Option<CellView> {
        CellView::from_code(self.code_at(coords))
    }

    pub fn hidden_count(&self) -> CellCount {
        self.grid
            .iter()
            .filter(|&&code| code == CellView::HIDDEN_CODE)
            .count() as CellCount
    }

    /// One glyph per cell, one line per board row.
    pub fn to_ansi(&self) -> String {
        let (x_end, y_end) = self.size;
        let mut rows = Vec::with_capacity(y_end as usize);
        for y in 0..y_end {
            let mut row = String::with_capacity(x_end as usize);
            for x in 0..x_end {
                let glyph = self
                    .view((x, y))
                    .map(CellView::glyph)
                    .unwrap_or('?');
                row.push(glyph);
            }
            rows.push(row);
        }
        rows.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Observation {
        let mut grid = Array2::from_elem([2, 2], CellView::HIDDEN_CODE);
        grid[[0, 0]] = 0;
        grid[[1, 0]] = 2;
        grid[[0, 1]] = CellView::BLAST_CODE;
        Observation::new((2, 2), grid).unwrap()
    }

    #[test]
    fn views_decode_cell_codes() {
        let obs = sample();
        assert_eq!(obs.view((0, 0)), Some(CellView::Opened(0)));
        assert_eq!(obs.view((1, 0)), Some(CellView::Opened(2)));
        assert_eq!(obs.view((0, 1)), Some(CellView::Blast));
        assert_eq!(obs.view((1, 1)), Some(CellView::Hidden));
    }

    #[test]
    fn ansi_renders_rows_top_to_bottom() {
        assert_eq!(sample().to_ansi(), ".2\nBx");
    }

    #[test]
    fn hidden_count_tracks_hidden_cells() {
        assert_eq!(sample().hidden_count(), 1);
    }

    #[test]
    fn validate_rejects_shape_mismatch() {
        let obs = Observation {
            size: (2, 2),
            grid: Array2::from_elem([1, 2], CellView::HIDDEN_CODE),
        };
        assert_eq!(obs.validate(), Err(EnvError::InvalidBoardShape));
    }

    #[test]
    fn serializes_to_json_and_back() {
        let obs = sample();
        let json = serde_json::to_string(&obs).unwrap();
        let back: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, obs);
    }
}
