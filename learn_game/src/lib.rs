use crate::agent::Agent;
use crate::board::{Action, Board, IsGameOver, Mark, StateKey};
use crate::config::{Rewards, TrainingConfig};
use crate::error::InputError;
use crate::players::{HumanPlayer, Player, RandomPlayer};
use anyhow::Context;
use std::fmt;
use std::io::BufRead;

pub mod agent;
pub mod board;
pub mod config;
pub mod error;
pub mod players;
pub mod q_table;
pub mod store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    AgentWon,
    OpponentWon,
    Draw,
}

/// Results from the agent's side of the board.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Scoreboard {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl Scoreboard {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::AgentWon => self.wins += 1,
            Outcome::OpponentWon => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
    }
    pub fn games(&self) -> usize {
        self.wins + self.losses + self.draws
    }
}

impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "won {} lost {} drawn {}",
            self.wins, self.losses, self.draws
        )
    }
}

/// One board, the learning agent, and whoever sits opposite it.
///
/// Cross always moves first. The agent's move is only scored once its
/// consequence is known: straight away when it ends the game, otherwise
/// after the opponent's reply.
pub struct Game {
    pub board: Board,
    pub agent: Agent,
    pub opponent: Box<dyn Player>,
    agent_mark: Mark,
    rewards: Rewards,
    pending: Option<(StateKey, Action)>,
    episode: usize,
}

impl Game {
    pub fn new(agent: Agent, mut opponent: Box<dyn Player>, rewards: Rewards) -> Self {
        opponent.set_mark(Mark::Cross);
        Game {
            board: Board::new(),
            agent,
            opponent,
            agent_mark: Mark::Nought,
            rewards,
            pending: None,
            episode: 0,
        }
    }
    /// Seats the agent as `mark`; the opponent takes the other one.
    pub fn set_agent_mark(&mut self, mark: Mark) {
        if mark == Mark::Empty {
            return;
        }
        self.agent_mark = mark;
        self.opponent.set_mark(mark.other());
    }
    pub fn agent_mark(&self) -> Mark {
        self.agent_mark
    }
    pub fn episode(&self) -> usize {
        self.episode
    }

    pub fn play_episode(&mut self) -> anyhow::Result<Outcome> {
        self.board = Board::new();
        self.pending = None;
        let mut to_move = Mark::Cross;
        let outcome = loop {
            let finished = if to_move == self.agent_mark {
                self.agent_turn()?
            } else {
                self.opponent_turn()?
            };
            if let Some(outcome) = finished {
                break outcome;
            }
            to_move = to_move.other();
        };
        self.episode += 1;
        log::debug!("episode {} finished: {:?}", self.episode, outcome);
        Ok(outcome)
    }

    fn agent_turn(&mut self) -> anyhow::Result<Option<Outcome>> {
        let state = self.board.to_state_key();
        let legal = self.board.available_moves();
        let action = self.agent.choose_action(&state, &legal)?;
        self.board.place(action, self.agent_mark)?;
        let next_state = self.board.to_state_key();
        let (reward, outcome) = match self.board.status() {
            IsGameOver::InPlay => {
                self.pending = Some((state, action));
                return Ok(None);
            }
            IsGameOver::Drawn => (self.rewards.draw, Outcome::Draw),
            IsGameOver::Win(_) => (self.rewards.win, Outcome::AgentWon),
        };
        self.agent
            .update_value(&state, action, reward, &next_state, &[])?;
        Ok(Some(outcome))
    }

    fn opponent_turn(&mut self) -> anyhow::Result<Option<Outcome>> {
        let action = self.opponent.choose_move(&self.board)?;
        self.board
            .place(action, self.opponent.get_mark())
            .with_context(|| format!("{} made an illegal move", self.opponent.get_name()))?;
        let next_state = self.board.to_state_key();
        let (reward, next_legal, outcome) = match self.board.status() {
            IsGameOver::InPlay => (0.0, self.board.available_moves(), None),
            IsGameOver::Drawn => (self.rewards.draw, vec![], Some(Outcome::Draw)),
            IsGameOver::Win(_) => (self.rewards.loss, vec![], Some(Outcome::OpponentWon)),
        };
        if let Some((state, action)) = self.pending.take() {
            self.agent
                .update_value(&state, action, reward, &next_state, &next_legal)?;
        }
        Ok(outcome)
    }
}

/// Human against the agent, one game after another, until the input ends.
/// The Q-table is saved once after every finished game.
pub fn play_session(
    agent: Agent,
    input: impl BufRead + 'static,
    rewards: Rewards,
    agent_first: bool,
) -> anyhow::Result<Scoreboard> {
    let human = Box::new(HumanPlayer::new("Player".to_owned(), input));
    let mut game = Game::new(agent, human, rewards);
    if agent_first {
        game.set_agent_mark(Mark::Cross);
    }
    let mut score = Scoreboard::default();
    loop {
        match game.play_episode() {
            Ok(outcome) => {
                game.board.draw();
                match outcome {
                    Outcome::AgentWon => println!("Really sorry, you have lost."),
                    Outcome::OpponentWon => println!("Congratulations! You have won!"),
                    Outcome::Draw => println!("The game ended in a draw."),
                }
                score.record(outcome);
                game.agent.save().context("saving Q-table after the game")?;
            }
            Err(e) if matches!(e.downcast_ref::<InputError>(), Some(InputError::Closed)) => {
                log::info!("input closed after {} games ({})", score.games(), score);
                break;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(score)
}

/// Agent against a random opponent, alternating who opens.
pub fn train_agent(
    agent: Agent,
    training: &TrainingConfig,
    rewards: Rewards,
) -> anyhow::Result<Scoreboard> {
    let mut opponent = RandomPlayer::new("Random".to_owned());
    if let Some(seed) = training.seed {
        opponent = opponent.with_seed(seed.wrapping_add(1));
    }
    let mut game = Game::new(agent, Box::new(opponent), rewards);
    let mut score = Scoreboard::default();
    log::info!("beginning training loop ({} episodes)", training.episodes);
    for episode in 0..training.episodes {
        game.set_agent_mark(if episode % 2 == 0 {
            Mark::Nought
        } else {
            Mark::Cross
        });
        score.record(game.play_episode()?);
        if training.log_every > 0 && (episode + 1) % training.log_every == 0 {
            log::info!(
                "episode {:>7}: {} Q-values, {}",
                episode + 1,
                game.agent.q_table().len(),
                score
            );
        }
    }
    game.agent.save().context("saving trained Q-table")?;
    if let Some(dir) = &training.archive_dir {
        game.agent.archive(dir).context("archiving trained Q-table")?;
    }
    log::info!("training finished: {}", score);
    Ok(score)
}
