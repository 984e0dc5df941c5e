use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("Action index outside the action space")]
    InvalidAction,
    #[error("step() called before reset(), mine layout is undefined")]
    NotReset,
    #[error("Episode already ended, no further actions are accepted")]
    EpisodeOver,
    #[error("Board cannot hold that many mines")]
    TooManyMines,
    #[error("Board must contain at least one cell")]
    EmptyBoard,
    #[error("Mine layout does not match the configured board")]
    LayoutMismatch,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Invalid coordinates")]
    InvalidCoords,
}

pub type Result<T> = core::result::Result<T, EnvError>;
