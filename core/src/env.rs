use ndarray::Array2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::*;

/// Everything `step()` reports back to the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

/// Side-channel diagnostics attached to every step.
///
/// `mine_layout` is a deliberate information leak for debugging and analysis;
/// a policy that reads it is cheating.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    pub opened_cells: CellCount,
    pub steps: u32,
    pub unnecessary_steps: u32,
    pub game_over: bool,
    pub mine_layout: MineLayout,
    pub opened_cell: Coord2,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum OpenOutcome {
    AlreadyOpen,
    Opened,
    HitMine,
}

/// One playthrough: the layout drawn at reset plus everything that mutates
/// during play.
#[derive(Clone, Debug)]
struct Episode {
    layout: MineLayout,
    open: Array2<bool>,
    open_count: CellCount,
    hit_mine: Option<Coord2>,
    steps: u32,
    unnecessary_steps: u32,
}

impl Episode {
    fn fresh(layout: MineLayout) -> Self {
        let size = layout.size();
        Self {
            layout,
            open: Array2::default(size.to_nd_index()),
            open_count: 0,
            hit_mine: None,
            steps: 0,
            unnecessary_steps: 0,
        }
    }

    fn game_over(&self) -> bool {
        self.hit_mine.is_some()
    }

    fn done(&self) -> bool {
        self.game_over() || self.open_count == self.layout.safe_cell_count()
    }

    fn open_cell(&mut self, coords: Coord2, flood_fill: bool) -> OpenOutcome {
        if self.open[coords.to_nd_index()] {
            self.unnecessary_steps += 1;
            return OpenOutcome::AlreadyOpen;
        }

        self.open[coords.to_nd_index()] = true;
        self.open_count += 1;

        if self.layout[coords] {
            log::debug!("opened a mine at {:?}", coords);
            self.hit_mine = Some(coords);
            return OpenOutcome::HitMine;
        }

        let count = self.layout.adjacent_mine_count(coords);
        log::debug!("opened cell {:?}, adjacent mines: {}", coords, count);
        if count == 0 && flood_fill {
            self.expand_zero_region(coords);
        }
        OpenOutcome::Opened
    }

    /// Worklist sweep over the maximal zero-region around `start`.
    ///
    /// Only zero-count cells enqueue their neighbors, so every frontier cell
    /// borders a zero cell and can never be a mine; each cell is opened at
    /// most once.
    fn expand_zero_region(&mut self, start: Coord2) {
        let mut visited = HashSet::from([start]);
        let mut to_visit: VecDeque<_> = self
            .layout
            .iter_neighbors(start)
            .filter(|&pos| !self.open[pos.to_nd_index()])
            .collect();
        log::trace!("flood fill from {:?}, frontier: {:?}", start, to_visit);

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) {
                continue;
            }
            if self.open[visit_coords.to_nd_index()] {
                continue;
            }

            self.open[visit_coords.to_nd_index()] = true;
            self.open_count += 1;

            let visit_count = self.layout.adjacent_mine_count(visit_coords);
            log::trace!(
                "flood opened cell {:?}, adjacent mines: {}",
                visit_coords,
                visit_count
            );

            if visit_count == 0 {
                to_visit.extend(
                    self.layout
                        .iter_neighbors(visit_coords)
                        .filter(|&pos| !self.open[pos.to_nd_index()])
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    fn reward(&self, punishment: f64) -> f64 {
        let openable = f64::from(self.layout.safe_cell_count());
        let opened = f64::from(self.open_count);
        let game_over = if self.game_over() { 1.0 } else { 0.0 };
        let penalty = f64::from(self.unnecessary_steps) * punishment;
        (opened - penalty) / openable - game_over - game_over / openable
    }

    fn observation(&self) -> Observation {
        let size = self.layout.size();
        let mut grid = Array2::from_elem(size.to_nd_index(), CellView::HIDDEN_CODE);
        let (x_end, y_end) = size;
        for x in 0..x_end {
            for y in 0..y_end {
                let coords = (x, y);
                if !self.open[coords.to_nd_index()] {
                    continue;
                }
                grid[coords.to_nd_index()] = if self.layout[coords] {
                    CellView::Blast.code()
                } else {
                    CellView::Opened(self.layout.adjacent_mine_count(coords)).code()
                };
            }
        }
        Observation { size, grid }
    }

    fn info(&self, opened_cell: Coord2) -> StepInfo {
        StepInfo {
            opened_cells: self.open_count,
            steps: self.steps,
            unnecessary_steps: self.unnecessary_steps,
            game_over: self.game_over(),
            mine_layout: self.layout.clone(),
            opened_cell,
        }
    }

    fn legal_actions(&self, board: BoardConfig) -> Vec<Action> {
        (0..board.action_count())
            .filter(|&action| !self.open[board.decode_action(action).to_nd_index()])
            .collect()
    }

    /// All state-machine invariants in one place, run only under the `debug`
    /// configuration flag.
    fn check_invariants(&self, punishment: f64) {
        let opened = self.open.iter().filter(|&&open| open).count();
        assert_eq!(
            opened as CellCount, self.open_count,
            "open count drifted from the open mask"
        );

        let opened_mines = self
            .open
            .iter()
            .zip(self.layout.mask().iter())
            .filter(|&(&open, &mine)| open && mine)
            .count();
        let game_over = self.game_over();
        assert_eq!(
            opened_mines,
            usize::from(game_over),
            "game over is {}, but {} opened mines",
            game_over,
            opened_mines
        );

        let reward = self.reward(punishment);
        let won = !game_over && self.open_count == self.layout.safe_cell_count();
        if game_over {
            assert!(
                (-1.0..0.0).contains(&reward),
                "game is over, but reward is {}",
                reward
            );
        } else if won {
            assert!(
                reward > 0.0 && reward <= 1.0,
                "game is won, but reward is {}",
                reward
            );
        } else {
            assert!(
                (0.0..1.0).contains(&reward),
                "game is not over, but reward is {}",
                reward
            );
        }

        assert_eq!(
            reward == -1.0,
            self.open_count == 1 && game_over,
            "game over: {}, opened cells: {}, but reward is {}",
            game_over,
            self.open_count,
            reward
        );
        assert_eq!(
            reward == 0.0,
            self.open_count == 0,
            "opened cells: {}, but reward is {}",
            self.open_count,
            reward
        );

        let clean_win = won && self.unnecessary_steps == 0;
        assert_eq!(
            reward == 1.0,
            clean_win,
            "clean win: {}, but reward is {}",
            clean_win,
            reward
        );
    }
}

/// The Board Engine: a synchronous state machine over `reset` and `step`.
///
/// Not reentrant; callers must serialize access to one instance.
pub struct MinesweeperEnv {
    config: EnvConfig,
    rng: SmallRng,
    episode: Option<Episode>,
    display: Option<Box<dyn BoardDisplay>>,
}

impl MinesweeperEnv {
    pub fn new(config: EnvConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        Ok(Self {
            config,
            rng,
            episode: None,
            display: None,
        })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Discards any running episode, draws a fresh layout, and returns the
    /// all-hidden initial observation.
    pub fn reset(&mut self) -> Observation {
        let layout = UniformLayoutGenerator.generate(self.config.board, &mut self.rng);
        self.start_episode(layout)
    }

    /// Starts an episode on a caller-supplied layout instead of a random
    /// draw. The layout must fit the configured board.
    pub fn reset_with(&mut self, layout: MineLayout) -> Result<Observation> {
        if layout.board_config() != self.config.board {
            return Err(EnvError::LayoutMismatch);
        }
        Ok(self.start_episode(layout))
    }

    fn start_episode(&mut self, layout: MineLayout) -> Observation {
        let episode = Episode::fresh(layout);
        if self.config.debug {
            episode.check_invariants(self.config.punishment);
        }
        let observation = episode.observation();
        self.episode = Some(episode);
        observation
    }

    /// Opens the cell addressed by `action` and reports the resulting state.
    pub fn step(&mut self, action: Action) -> Result<StepOutcome> {
        let board = self.config.board;
        if action >= board.action_count() {
            return Err(EnvError::InvalidAction);
        }
        let Some(episode) = self.episode.as_mut() else {
            return Err(EnvError::NotReset);
        };
        if episode.done() {
            return Err(EnvError::EpisodeOver);
        }

        let coords = board.decode_action(action);
        let first_move = episode.steps == 0;
        episode.steps += 1;
        let outcome = episode.open_cell(coords, self.config.flood_fill);
        if outcome == OpenOutcome::AlreadyOpen {
            log::debug!("action {} targeted an already-open cell", action);
        }

        if first_move && self.config.first_move_safe {
            // redraw the layout until the opening move is not fatal
            while episode.game_over() {
                log::debug!("first move at {:?} hit a mine, redrawing layout", coords);
                *episode =
                    Episode::fresh(UniformLayoutGenerator.generate(board, &mut self.rng));
                episode.steps = 1;
                episode.open_cell(coords, self.config.flood_fill);
            }
        }

        let reward = episode.reward(self.config.punishment);
        let done = episode.done();
        let observation = episode.observation();
        let info = episode.info(coords);
        if self.config.debug {
            episode.check_invariants(self.config.punishment);
        }

        if done {
            log::debug!("episode finished after {} steps, reward {:.3}", info.steps, reward);
            if let Some(display) = self.display.as_mut() {
                display.draw(&observation);
            }
        }

        Ok(StepOutcome {
            observation,
            reward,
            done,
            info,
        })
    }

    /// Action indices of every currently hidden cell, in ascending order.
    pub fn legal_actions(&self) -> Result<Vec<Action>> {
        let episode = self.episode.as_ref().ok_or(EnvError::NotReset)?;
        Ok(episode.legal_actions(self.config.board))
    }

    pub fn observation(&self) -> Result<Observation> {
        let episode = self.episode.as_ref().ok_or(EnvError::NotReset)?;
        Ok(episode.observation())
    }

    /// The current episode's mine placement, the same deliberate leak as
    /// [`StepInfo::mine_layout`].
    pub fn mine_layout(&self) -> Result<&MineLayout> {
        let episode = self.episode.as_ref().ok_or(EnvError::NotReset)?;
        Ok(&episode.layout)
    }

    /// The current observation as text-mode rows.
    pub fn render_ansi(&self) -> Result<String> {
        Ok(self.observation()?.to_ansi())
    }

    /// Hands a display surface to the engine for the rest of its lifetime.
    pub fn attach_display(&mut self, mut display: Box<dyn BoardDisplay>) {
        display.start(self.config.board.size, self.config.board.mines);
        if let Some(episode) = self.episode.as_ref() {
            display.draw(&episode.observation());
        }
        self.display = Some(display);
    }

    /// Pushes the current observation to the attached display.
    pub fn render(&mut self) -> Result<()> {
        let episode = self.episode.as_ref().ok_or(EnvError::NotReset)?;
        match self.display.as_mut() {
            Some(display) => display.draw(&episode.observation()),
            None => log::warn!("render requested but no display is attached"),
        }
        Ok(())
    }

    /// Releases the display, honoring `pause_after_end`.
    pub fn close(&mut self) {
        if let Some(mut display) = self.display.take() {
            display.close(self.config.pause_after_end);
        }
    }
}
