use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use learn_game::agent::Agent;
use learn_game::config::{GameConfig, DEFAULT_TABLE_PATH};
use learn_game::store::PolicyStore;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Tic-tac-toe against a Q-learning opponent")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play against the agent on the terminal
    Play {
        #[command(flatten)]
        common: Common,
        /// Let the agent play X and open the game
        #[arg(long)]
        agent_first: bool,
        /// Override the exploration rate
        #[arg(long)]
        epsilon: Option<f64>,
    },
    /// Train the agent against a random opponent
    Train {
        #[command(flatten)]
        common: Common,
        #[arg(long)]
        episodes: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Directory for a dated snapshot of the trained table
        #[arg(long)]
        archive: Option<PathBuf>,
    },
}

#[derive(Args)]
struct Common {
    /// Q-table file (.json, or .pickle for the pickle encoding)
    #[arg(long, default_value = DEFAULT_TABLE_PATH)]
    table: PathBuf,
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(common: &Common) -> anyhow::Result<GameConfig> {
    log::info!("using Q-table {}", common.table.display());
    match &common.config {
        Some(path) => GameConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match Cli::parse().command {
        Command::Play {
            common,
            agent_first,
            epsilon,
        } => {
            let mut config = load_config(&common)?;
            if let Some(epsilon) = epsilon {
                config.agent.exploration_rate = epsilon;
            }
            let agent = Agent::new(config.agent, PolicyStore::new(&common.table))?;
            let score = learn_game::play_session(
                agent,
                io::BufReader::new(io::stdin()),
                config.rewards,
                agent_first,
            )?;
            println!("Thanks for playing: the computer {score}.");
        }
        Command::Train {
            common,
            episodes,
            seed,
            archive,
        } => {
            let mut config = load_config(&common)?;
            config.training.episodes = episodes.unwrap_or(config.training.episodes);
            config.training.seed = seed.or(config.training.seed);
            config.training.archive_dir = archive.or(config.training.archive_dir);
            let mut agent = Agent::new(config.agent, PolicyStore::new(&common.table))?;
            if let Some(seed) = config.training.seed {
                agent = agent.with_seed(seed);
            }
            learn_game::train_agent(agent, &config.training, config.rewards)?;
        }
    }
    Ok(())
}
