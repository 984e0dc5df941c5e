use std::io::{self, Write};

use crate::*;

/// Output surface the engine pushes observations to.
///
/// `start` is called once when the display is attached, `draw` after every
/// render request and once more when an episode becomes terminal, `close`
/// when the engine releases the surface.
pub trait BoardDisplay {
    fn start(&mut self, size: Coord2, mines: CellCount);
    fn draw(&mut self, observation: &Observation);
    fn close(&mut self, pause: bool);
}

/// Text-mode display: one glyph per cell, one frame per draw.
pub struct AnsiDisplay<W: Write> {
    out: W,
}

impl AnsiDisplay<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> AnsiDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> BoardDisplay for AnsiDisplay<W> {
    fn start(&mut self, size: Coord2, mines: CellCount) {
        log::info!(
            "display started for a {}x{} board with {} mines",
            size.0,
            size.1,
            mines
        );
    }

    fn draw(&mut self, observation: &Observation) {
        if let Err(err) = writeln!(self.out, "{}\n", observation.to_ansi()) {
            log::warn!("failed to draw the board: {err}");
        }
    }

    fn close(&mut self, pause: bool) {
        if pause {
            log::info!("press enter to release the display");
            let mut line = String::new();
            if let Err(err) = io::stdin().read_line(&mut line) {
                log::warn!("failed to wait for input: {err}");
            }
        }
        if let Err(err) = self.out.flush() {
            log::warn!("failed to flush the display: {err}");
        }
    }
}
