//! Module to play through a game while keeping track of repeated positions
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use log::debug;
use crate::chess::Position;
use crate::chess::error::Result;
use crate::repetition::History;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A sequence of positions, starting from an initial position, along with the history used to
/// detect repetitions among them.
///
/// The position and the history always advance and retreat together, the way a search keeps its
/// history in step with make and unmake.
#[derive(Debug, Clone)]
pub struct Game {
    positions: Vec<Position>,
    history: History,
}

impl Game {
    /// Constructs a game starting at the standard starting position.
    pub fn new() -> Game {
        Game::starting_at(Position::new())
    }

    /// Constructs a game starting at the given initial position.
    ///
    /// Nothing before the initial position is known, so it is recorded as though it was reached by
    /// an irreversible move.
    pub fn starting_at(initial_pos: Position) -> Game {
        let mut history = History::new();
        history.push(initial_pos.zobrist_key(), false);

        Game {
            positions: vec![initial_pos],
            history,
        }
    }

    /// Parses a move in coordinate notation, makes it, and returns the resulting position.
    ///
    /// # Errors
    ///
    /// Returns an error if the move can't be parsed or isn't legal. The game is left unchanged.
    pub fn make_move_from_str(&mut self, s: &str) -> Result<&Position> {
        let (next, reversible) = {
            let mv = self.position().move_from_str(s)?;
            (mv.make()?, mv.is_reversible())
        };

        debug!("ply {}: {} ({}reversible)", self.positions.len(), s, if reversible { "" } else { "ir" });
        self.history.push(next.zobrist_key(), reversible);
        self.positions.push(next);

        Ok(self.position())
    }

    /// Takes back every move after `ply`.
    ///
    /// If `ply` is not less than the number of positions, this has no effect.
    pub fn undo_to(&mut self, ply: usize) {
        if ply < self.positions.len() {
            self.positions.truncate(ply + 1);
            self.history.truncate_to(ply);
        }
    }

    /// Returns the current position.
    pub fn position(&self) -> &Position {
        self.positions.last().expect("INFALLIBLE")
    }

    /// Returns the position at `ply`, or `None` if the game is not that long.
    pub fn position_at(&self, ply: usize) -> Option<&Position> {
        self.positions.get(ply)
    }

    /// Returns the history of position keys.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns the number of moves made since the initial position.
    pub fn ply(&self) -> usize {
        self.positions.len() - 1
    }

    /// Returns `true` if the current position repeats an earlier one, where `ply` is the current
    /// position's distance from the root of the search.
    pub fn is_repetition(&self, ply: usize) -> bool {
        self.history.detect_repetition(ply)
    }

    /// Returns `true` if the side to move can recreate an earlier position with one reversible
    /// move, where `ply` is the current position's distance from the root of the search.
    pub fn has_game_cycle(&self, ply: usize) -> bool {
        self.history.has_game_cycle(self.position(), ply)
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}
