use crate::error::{InvalidStateKey, MoveError};
use itertools::Itertools;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `(row, col)` of the square to mark, both in `0..3`.
pub type Action = (usize, usize);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Mark {
    Cross,
    Nought,
    Empty,
}

#[derive(Debug, PartialEq)]
pub enum IsGameOver {
    InPlay,
    Drawn,
    Win(Mark),
}

/// Row-major concatenation of the nine cell characters of a board.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateKey(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Array2<Mark>,
}

impl Mark {
    pub fn other(self) -> Self {
        match self {
            Self::Cross => Mark::Nought,
            Self::Nought => Mark::Cross,
            Self::Empty => Mark::Empty,
        }
    }
    pub fn as_char(self) -> char {
        match self {
            Self::Cross => 'X',
            Self::Nought => 'O',
            Self::Empty => ' ',
        }
    }
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'X' => Some(Self::Cross),
            'O' => Some(Self::Nought),
            ' ' => Some(Self::Empty),
            _ => None,
        }
    }
}

impl StateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn cell(&self, (row, col): Action) -> Option<Mark> {
        if row >= 3 || col >= 3 {
            return None;
        }
        self.0.chars().nth(row * 3 + col).and_then(Mark::from_char)
    }
    /// Nine characters, each a known mark.
    pub fn is_well_formed(&self) -> bool {
        self.0.chars().count() == 9 && self.0.chars().all(|c| Mark::from_char(c).is_some())
    }
}

impl From<String> for StateKey {
    fn from(value: String) -> Self {
        StateKey(value)
    }
}

impl From<&str> for StateKey {
    fn from(value: &str) -> Self {
        StateKey(value.to_owned())
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Board {
            cells: Array::from_elem((3, 3), Mark::Empty),
        }
    }
    pub fn get(&self, (row, col): Action) -> Option<Mark> {
        self.cells.get([row, col]).copied()
    }
    pub fn place(&mut self, action: Action, mark: Mark) -> Result<(), MoveError> {
        let (row, col) = action;
        let cell = self
            .cells
            .get_mut([row, col])
            .ok_or(MoveError::OutOfBounds(action))?;
        if *cell != Mark::Empty {
            return Err(MoveError::Occupied(action));
        }
        *cell = mark;
        Ok(())
    }
    /// Empty squares, scanned row by row.
    pub fn available_moves(&self) -> Vec<Action> {
        self.cells
            .indexed_iter()
            .filter(|(_index, &value)| value == Mark::Empty)
            .map(|(index, _)| index)
            .collect()
    }
    pub fn to_state_key(&self) -> StateKey {
        StateKey(self.cells.iter().map(|m| m.as_char()).collect::<String>())
    }
    pub fn winner(&self) -> Option<Mark> {
        for row in self.cells.rows() {
            if let Some(mark) = line_owner(row.iter().copied()) {
                return Some(mark);
            }
        }
        for column in self.cells.columns() {
            if let Some(mark) = line_owner(column.iter().copied()) {
                return Some(mark);
            }
        }
        if let Some(mark) = line_owner(self.cells.diag().iter().copied()) {
            return Some(mark);
        }
        line_owner([[0_usize, 2], [1, 1], [2, 0]].into_iter().map(|ix| self.cells[ix]))
    }
    pub fn is_full(&self) -> bool {
        !self.cells.iter().any(|&m| m == Mark::Empty)
    }
    pub fn status(&self) -> IsGameOver {
        match self.winner() {
            Some(mark) => IsGameOver::Win(mark),
            None if self.is_full() => IsGameOver::Drawn,
            None => IsGameOver::InPlay,
        }
    }
    pub fn draw(&self) {
        print!("{self}");
    }
}

fn line_owner(mut line: impl Iterator<Item = Mark>) -> Option<Mark> {
    let first = line.next()?;
    if first == Mark::Empty {
        return None;
    }
    line.all(|m| m == first).then_some(first)
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "* * * * *")?;
        for (a, b, c) in self.cells.iter().map(|m| m.as_char()).tuples::<(_, _, _)>() {
            writeln!(f, "* {a} {b} {c} *")?;
        }
        writeln!(f, "* * * * *")
    }
}

impl TryFrom<&StateKey> for Board {
    type Error = InvalidStateKey;
    fn try_from(key: &StateKey) -> Result<Self, Self::Error> {
        if !key.is_well_formed() {
            return Err(InvalidStateKey(key.to_string()));
        }
        let marks: Vec<Mark> = key.0.chars().filter_map(Mark::from_char).collect();
        let cells = Array2::from_shape_vec((3, 3), marks)
            .map_err(|_| InvalidStateKey(key.to_string()))?;
        Ok(Board { cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(key: &str) -> Board {
        Board::try_from(&StateKey::from(key)).expect("well-formed key")
    }

    #[test]
    fn state_key_is_row_major() {
        let mut b = Board::new();
        b.place((0, 1), Mark::Cross).unwrap();
        b.place((2, 0), Mark::Nought).unwrap();
        assert_eq!(b.to_state_key().as_str(), " X    O  ");
    }

    #[test]
    fn equal_boards_give_equal_keys() {
        let mut first = Board::new();
        let mut second = Board::new();
        first.place((1, 1), Mark::Cross).unwrap();
        first.place((0, 0), Mark::Nought).unwrap();
        second.place((0, 0), Mark::Nought).unwrap();
        second.place((1, 1), Mark::Cross).unwrap();
        assert_eq!(first.to_state_key(), second.to_state_key());

        second.place((2, 2), Mark::Cross).unwrap();
        assert_ne!(first.to_state_key(), second.to_state_key());
    }

    #[test]
    fn key_round_trips_through_board() {
        let key = StateKey::from("XO XOX OO");
        assert_eq!(board(key.as_str()).to_state_key(), key);
        assert_eq!(key.cell((2, 0)), Some(Mark::Empty));
        assert_eq!(key.cell((0, 1)), Some(Mark::Nought));
        assert_eq!(key.cell((3, 0)), None);
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(Board::try_from(&StateKey::from("XO")).is_err());
        assert!(Board::try_from(&StateKey::from("XO?XOX OO")).is_err());
    }

    #[test]
    fn available_moves_in_row_major_order() {
        let b = board("X O  X  O");
        assert_eq!(b.available_moves(), vec![(0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);
    }

    #[test]
    fn place_rejects_taken_and_out_of_range() {
        let mut b = Board::new();
        b.place((1, 1), Mark::Cross).unwrap();
        assert_eq!(b.place((1, 1), Mark::Nought), Err(MoveError::Occupied((1, 1))));
        assert_eq!(b.place((3, 0), Mark::Nought), Err(MoveError::OutOfBounds((3, 0))));
    }

    #[test]
    fn detects_top_row_win() {
        let b = board("XXX      ");
        assert_eq!(b.winner(), Some(Mark::Cross));
        assert_eq!(b.status(), IsGameOver::Win(Mark::Cross));
    }

    #[test]
    fn detects_columns_and_diagonals() {
        assert_eq!(board(" O  O  O ").winner(), Some(Mark::Nought));
        assert_eq!(board("X   X   X").winner(), Some(Mark::Cross));
        assert_eq!(board("  O O O  ").winner(), Some(Mark::Nought));
        assert_eq!(board("XX O O   ").winner(), None);
    }

    #[test]
    fn full_board_without_line_is_drawn() {
        let b = board("XOXXOOOXX");
        assert!(b.is_full());
        assert_eq!(b.winner(), None);
        assert_eq!(b.status(), IsGameOver::Drawn);
    }

    #[test]
    fn empty_board_is_in_play() {
        let b = Board::new();
        assert_eq!(b.status(), IsGameOver::InPlay);
        assert_eq!(b.available_moves().len(), 9);
    }

    #[test]
    fn display_frames_the_board() {
        let b = board("X   O   X");
        assert_eq!(
            b.to_string(),
            "* * * * *\n* X     *\n*   O   *\n*     X *\n* * * * *\n"
        );
    }

    #[test]
    fn marks_alternate() {
        assert_eq!(Mark::Cross.other(), Mark::Nought);
        assert_eq!(Mark::Nought.other(), Mark::Cross);
        assert_eq!(Mark::from_char('O'), Some(Mark::Nought));
        assert_eq!(Mark::Cross.as_char(), 'X');
    }
}
