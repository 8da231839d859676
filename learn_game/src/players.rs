use crate::board::{Action, Board, Mark};
use crate::error::InputError;
use itertools::Itertools;
use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::io::BufRead;

const MAX_ATTEMPTS: usize = 3;

/// Anyone the driver can seat opposite the learning agent.
pub trait Player {
    fn set_mark(&mut self, mark: Mark);
    fn get_mark(&self) -> Mark;
    fn get_name(&self) -> &str;
    fn choose_move(&mut self, board: &Board) -> anyhow::Result<Action>;
}

pub struct HumanPlayer {
    pub name: String,
    pub mark: Mark,
    input: Box<dyn BufRead>,
}

#[derive(Debug)]
pub struct RandomPlayer {
    pub name: String,
    pub mark: Mark,
    rng: StdRng,
}

impl fmt::Debug for HumanPlayer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("HumanPlayer")
            .field("name", &self.name)
            .field("mark", &self.mark)
            .finish_non_exhaustive()
    }
}

/// Parses `"row col"` (1-based, also `"row,col"`) into a zero-based action.
pub fn parse_move(line: &str) -> Option<Action> {
    let (row, col) = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().ok())
        .collect_tuple()?;
    let (row, col) = (row?, col?);
    ((1..=3).contains(&row) && (1..=3).contains(&col)).then(|| (row - 1, col - 1))
}

impl HumanPlayer {
    pub fn new(name: String, input: impl BufRead + 'static) -> Self {
        HumanPlayer {
            name,
            mark: Mark::Cross,
            input: Box::new(input),
        }
    }
    fn read_move(&mut self, board: &Board) -> Result<Action, InputError> {
        board.draw();
        println!(
            "{}, please, choose your move: row and column (1-3), or q to quit:",
            self.name
        );
        for _ in 0..MAX_ATTEMPTS {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 || line.trim() == "q" {
                return Err(InputError::Closed);
            }
            match parse_move(&line) {
                Some(mv) if board.get(mv) == Some(Mark::Empty) => return Ok(mv),
                Some(mv) => {
                    log::warn!("{} picked taken square {:?}", self.name, mv);
                    println!("The square is taken, please, choose another one.");
                }
                None => {
                    log::warn!("{} typed {:?}", self.name, line.trim());
                    println!("Unknown symbol, please, try again (two numbers 1, 2 or 3):");
                }
            }
        }
        Err(InputError::TooManyAttempts(MAX_ATTEMPTS))
    }
}

impl Player for HumanPlayer {
    fn set_mark(&mut self, mark: Mark) {
        self.mark = mark;
    }
    fn get_mark(&self) -> Mark {
        self.mark
    }
    fn get_name(&self) -> &str {
        &self.name
    }
    fn choose_move(&mut self, board: &Board) -> anyhow::Result<Action> {
        loop {
            match self.read_move(board) {
                Ok(mv) => return Ok(mv),
                Err(InputError::TooManyAttempts(n)) => {
                    println!("You tried {n} times. Please, try choosing your move again.")
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl RandomPlayer {
    pub fn new(name: String) -> Self {
        RandomPlayer {
            name,
            mark: Mark::Cross,
            rng: StdRng::from_entropy(),
        }
    }
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl Player for RandomPlayer {
    fn set_mark(&mut self, mark: Mark) {
        self.mark = mark;
    }
    fn get_mark(&self) -> Mark {
        self.mark
    }
    fn get_name(&self) -> &str {
        &self.name
    }
    fn choose_move(&mut self, board: &Board) -> anyhow::Result<Action> {
        board
            .available_moves()
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("{} has no move on a full board", self.name))
    }
}
