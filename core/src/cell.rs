use serde::{Deserialize, Serialize};

/// Tri-state cell as seen by a consumer of the observation grid.
///
/// The numeric codes are the observation-space values: `-1` hidden, `-2` an
/// opened mine, `0..=8` an opened safe cell's neighbor-mine count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Opened(u8),
    Blast,
}

impl CellView {
    pub const HIDDEN_CODE: i8 = -1;
    pub const BLAST_CODE: i8 = -2;

    pub const fn code(self) -> i8 {
        match self {
            Self::Hidden => Self::HIDDEN_CODE,
            Self::Blast => Self::BLAST_CODE,
            Self::Opened(count) => count as i8,
        }
    }

    pub const fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(Self::Hidden),
            -2 => Some(Self::Blast),
            0..=8 => Some(Self::Opened(code as u8)),
            _ => None,
        }
    }

    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Hidden)
    }

    /// Single-character glyph used by the text-mode display.
    pub const fn glyph(self) -> char {
        match self {
            Self::Hidden => 'x',
            Self::Blast => 'B',
            Self::Opened(0) => '.',
            Self::Opened(count) => (b'0' + count) as char,
        }
    }
}

impl Default for CellView {
    fn default() -> Self {
        Self::Hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for view in [
            CellView::Hidden,
            CellView::Blast,
            CellView::Opened(0),
            CellView::Opened(8),
        ] {
            assert_eq!(CellView::from_code(view.code()), Some(view));
        }
    }

    #[test]
    fn from_code_rejects_out_of_range() {
        assert_eq!(CellView::from_code(9), None);
        assert_eq!(CellView::from_code(-3), None);
    }

    #[test]
    fn glyphs_match_text_mode_contract() {
        assert_eq!(CellView::Hidden.glyph(), 'x');
        assert_eq!(CellView::Blast.glyph(), 'B');
        assert_eq!(CellView::Opened(0).glyph(), '.');
        assert_eq!(CellView::Opened(5).glyph(), '5');
    }
}
