use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use rand::prelude::*;

use demine_core::{Action, AnsiDisplay, BoardConfig, EnvConfig, MinesweeperEnv};

/// Random-agent demo: plays episodes against the board engine and reports
/// per-episode rewards.
#[derive(Parser, Debug)]
#[command(name = "demine", version, about)]
struct Cli {
    #[arg(long, default_value_t = 8)]
    width: u8,

    #[arg(long, default_value_t = 8)]
    height: u8,

    #[arg(long, default_value_t = 10)]
    mines: u16,

    #[arg(long, default_value_t = 20)]
    episodes: u32,

    /// Reward deducted per action on an already-open cell.
    #[arg(long, default_value_t = 0.01)]
    punishment: f64,

    /// Seed for both the board engine and the agent.
    #[arg(long)]
    seed: Option<u64>,

    /// Open only the targeted cell, never its zero-region.
    #[arg(long)]
    no_flood_fill: bool,

    /// Allow the very first move of an episode to hit a mine.
    #[arg(long)]
    unsafe_first_move: bool,

    /// Run the engine's invariant assertions after every step.
    #[arg(long)]
    check_invariants: bool,

    /// Draw the board after every step.
    #[arg(long)]
    show: bool,

    /// Wait for input before the display is released.
    #[arg(long)]
    pause: bool,

    /// Print the final step info of every episode as JSON.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .init();

    let config = EnvConfig {
        board: BoardConfig::new((cli.width, cli.height), cli.mines),
        flood_fill: !cli.no_flood_fill,
        punishment: cli.punishment,
        seed: cli.seed,
        first_move_safe: !cli.unsafe_first_move,
        debug: cli.check_invariants,
        pause_after_end: cli.pause,
    };
    let mut env = MinesweeperEnv::new(config)?;
    if cli.show {
        env.attach_display(Box::new(AnsiDisplay::stdout()));
    }

    // the agent's exploration RNG is its own, the engine draws layouts from
    // the engine-owned one
    let mut rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_rng(&mut rand::rng()),
    };
    let action_count = config.board.action_count();
    let max_moves = u32::from(action_count);

    let mut rewards = Vec::with_capacity(cli.episodes as usize);
    for episode in 0..cli.episodes {
        env.reset();
        let mut total = 0.0;
        let mut moves = 0;
        let mut last_info = None;

        while moves < max_moves {
            let action: Action = rng.random_range(0..action_count);
            let outcome = env.step(action)?;
            total += outcome.reward;
            moves += 1;
            if cli.show {
                env.render()?;
            }
            let done = outcome.done;
            last_info = Some(outcome.info);
            if done {
                break;
            }
        }

        log::info!(
            "episode {} finished after {} moves, total reward {:.3}",
            episode,
            moves,
            total
        );
        if cli.json {
            if let Some(info) = &last_info {
                println!("{}", serde_json::to_string(info)?);
            }
        }
        rewards.push(total);
    }

    let average: f64 = rewards.iter().sum::<f64>() / f64::from(cli.episodes.max(1));
    println!("average reward over {} episodes: {:.3}", rewards.len(), average);
    env.close();
    Ok(())
}
