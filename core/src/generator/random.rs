use ndarray::Array2;
use rand::seq::index;

use super::*;

/// Uniform layout: `mines` distinct cells drawn without replacement.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UniformLayoutGenerator;

impl LayoutGenerator for UniformLayoutGenerator {
    fn generate<R: Rng + ?Sized>(&self, board: BoardConfig, rng: &mut R) -> MineLayout {
        let total = usize::from(board.total_cells());
        let mines = usize::from(board.mines);
        let mut mine_mask: Array2<bool> = Array2::default(board.size.to_nd_index());

        // optimize for full boards
        if mines >= total {
            if mines > total {
                log::warn!(
                    "Board already full, generated anyway, requested {} but only fits {}",
                    mines,
                    total
                );
            }
            mine_mask.fill(true);
            return MineLayout::from_mine_mask(mine_mask);
        }

        for flat in index::sample(rng, total, mines) {
            let coords = board.decode_action(flat as Action);
            mine_mask[coords.to_nd_index()] = true;
        }

        MineLayout::from_mine_mask(mine_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn generates_exact_mine_count() {
        let mut rng = SmallRng::seed_from_u64(1);
        for mines in [0, 1, 10, 63] {
            let board = BoardConfig::new((8, 8), mines);
            let layout = UniformLayoutGenerator.generate(board, &mut rng);
            assert_eq!(layout.mine_count(), mines);
            assert_eq!(layout.size(), (8, 8));
        }
    }

    #[test]
    fn same_rng_stream_reproduces_layouts() {
        let board = BoardConfig::new((16, 16), 40);
        let mut a = SmallRng::seed_from_u64(99);
        let mut b = SmallRng::seed_from_u64(99);
        assert_eq!(
            UniformLayoutGenerator.generate(board, &mut a),
            UniformLayoutGenerator.generate(board, &mut b)
        );
    }

    #[test]
    fn full_board_request_fills_every_cell() {
        let mut rng = SmallRng::seed_from_u64(2);
        let board = BoardConfig::new((3, 3), 9);
        let layout = UniformLayoutGenerator.generate(board, &mut rng);
        assert_eq!(layout.mine_count(), 9);
        assert_eq!(layout.safe_cell_count(), 0);
    }
}
