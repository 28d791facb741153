//! Contains the history of positions used to detect repetitions
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::cmp;
use std::slice;
use log::trace;
use crate::chess::{Position, Zobrist};
use crate::chess::bitboard::between;
use super::cuckoo;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The key of a position reached during the game or search, and how it was reached
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Record {
    key: Zobrist,
    reversible: bool,
    reversible_plies: usize,
}

impl Record {
    /// Returns the position's Zobrist key
    pub fn key(&self) -> Zobrist {
        self.key
    }

    /// Returns `true` if the position was reached by a reversible move
    pub fn reversible(&self) -> bool {
        self.reversible
    }

    /// Returns the number of consecutive reversible moves leading to this position
    pub fn reversible_plies(&self) -> usize {
        self.reversible_plies
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The keys of every position from the start of the game (or the first known position) to the
/// current node of the search, indexed by ply.
///
/// One record must be pushed for every move made, and the history truncated whenever a move is
/// unmade.
#[derive(Debug, Clone, Default)]
pub struct History {
    records: Vec<Record>,
}

impl History {
    /// Creates an empty history
    pub fn new() -> History {
        Default::default()
    }

    /// Removes every record
    pub fn reset(&mut self) {
        self.records.clear();
    }

    /// Adds the key of the position reached by the latest move. `reversible` should be `false`
    /// for the first position, since nothing before it can be repeated.
    pub fn push(&mut self, key: Zobrist, reversible: bool) {
        let reversible_plies = match self.records.last() {
            Some(last) if reversible => last.reversible_plies + 1,
            _ => 0,
        };

        self.records.push(Record { key, reversible, reversible_plies });
    }

    /// Discards every record after `ply`
    pub fn truncate_to(&mut self, ply: usize) {
        debug_assert!(ply < self.records.len(), "truncating to ply {} of {}", ply, self.records.len());
        self.records.truncate(ply + 1);
    }

    /// Returns the number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the record for `ply`, if there is one
    pub fn get(&self, ply: usize) -> Option<&Record> {
        self.records.get(ply)
    }

    /// Returns the latest record
    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    /// Returns an iterator over the records, oldest first
    pub fn iter(&self) -> slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Returns the number of consecutive reversible moves leading to the latest position
    pub fn reversible_plies(&self) -> usize {
        self.records.last().map_or(0, |last| last.reversible_plies)
    }

    /// Returns `true` if the latest position repeats an earlier one.
    ///
    /// `ply` is the distance from the root of the search to the latest position. A single earlier
    /// occurrence counts if it comes at or after the root. Otherwise two earlier occurrences are
    /// needed.
    pub fn detect_repetition(&self, ply: usize) -> bool {
        let last = match self.records.last() {
            Some(last) => last,
            None => return false,
        };
        let n = self.records.len() - 1;

        let mut count = 0;
        for dist in (2..=last.reversible_plies).step_by(2) {
            if self.records[n - dist].key == last.key {
                count += 1;
                if dist <= ply || count >= 2 {
                    trace!("position {:016x} repeats at distance {}", last.key, dist);
                    return true;
                }
            }
        }

        false
    }

    /// Returns `true` if the side to move in `pos` has a reversible move which recreates an earlier
    /// position, without generating any moves.
    ///
    /// `pos` must be the position of the latest record and `ply` its distance from the root of the
    /// search. A cycle whose earlier position comes before the root only counts if that position
    /// was itself a repetition.
    pub fn has_game_cycle(&self, pos: &Position, ply: usize) -> bool {
        let last = match self.records.last() {
            Some(last) => last,
            None => return false,
        };
        debug_assert_eq!(last.key, pos.zobrist_key());

        let end = cmp::min(last.reversible_plies, pos.draw_plies());
        if end < 3 {
            return false;
        }

        let n = self.records.len() - 1;
        let occupied = pos.occupied();
        let table = cuckoo::table();

        for dist in (3..=end).step_by(2) {
            let mv = match table.lookup(last.key ^ self.records[n - dist].key) {
                Some(mv) => mv,
                None => continue,
            };

            // one end must hold the mover's piece and the other must be empty
            let piece = Some((pos.turn(), mv.piece));
            let movable = (pos.piece_at(mv.a) == piece && !occupied.contains(mv.b))
                || (pos.piece_at(mv.b) == piece && !occupied.contains(mv.a));
            if !movable || !between(mv.a, mv.b).is_disjoint(occupied) {
                continue;
            }

            if dist < ply || self.is_repetition_at(n - dist) {
                trace!("{} recreates the position at distance {}", mv, dist);
                return true;
            }
        }

        false
    }

    // whether the record at `index` repeats an earlier record within its reversible span
    fn is_repetition_at(&self, index: usize) -> bool {
        let record = &self.records[index];
        (2..=record.reversible_plies).step_by(2)
            .any(|dist| self.records[index - dist].key == record.key)
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Record;
    type IntoIter = slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::Position;

    const SHUFFLE: [&str; 8] = ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"];

    // plays `moves` from `pos`, returning every position along with a history of all of them
    fn replay(pos: Position, moves: &[&str]) -> (Vec<Position>, History) {
        let mut history = History::new();
        history.push(pos.zobrist_key(), false);
        let mut positions = vec![pos];

        for s in moves {
            let pos = positions.last().unwrap();
            let mv = pos.move_from_str(s).unwrap();
            let reversible = mv.is_reversible();
            let next = mv.make().unwrap();
            history.push(next.zobrist_key(), reversible);
            positions.push(next);
        }

        (positions, history)
    }

    #[test]
    fn push_tracks_reversible_plies() {
        let mut history = History::new();
        assert!(history.is_empty());
        assert_eq!(history.reversible_plies(), 0);

        history.push(Zobrist::from(1u64), true);
        history.push(Zobrist::from(2u64), true);
        history.push(Zobrist::from(3u64), true);
        history.push(Zobrist::from(4u64), false);
        history.push(Zobrist::from(5u64), true);

        let plies: Vec<_> = history.iter().map(|r| r.reversible_plies()).collect();
        assert_eq!(plies, vec![0, 1, 2, 0, 1]);
        assert_eq!(history.len(), 5);
        assert_eq!(history.last().map(|r| r.key()), Some(Zobrist::from(5u64)));
        assert_eq!(history.get(3).map(|r| r.reversible()), Some(false));
        assert_eq!(history.get(5), None);
    }

    #[test]
    fn truncate_and_reset() {
        let mut history = History::new();
        for i in 0..6u64 {
            history.push(Zobrist::from(i), i > 0);
        }

        history.truncate_to(2);
        assert_eq!(history.len(), 3);
        assert_eq!(history.reversible_plies(), 2);

        history.push(Zobrist::from(9u64), true);
        assert_eq!(history.reversible_plies(), 3);
        assert_eq!((&history).into_iter().count(), 4);

        history.reset();
        assert!(history.is_empty());
        assert!(!history.detect_repetition(0));
    }

    #[test]
    fn repetitions_in_game_history_need_two_occurrences() {
        let (_, mut history) = replay(Position::new(), &SHUFFLE);

        for ply in (0..=8).rev() {
            history.truncate_to(ply);
            assert_eq!(history.detect_repetition(0), ply == 8, "ply {}", ply);
        }
    }

    #[test]
    fn repetitions_after_the_root_need_one_occurrence() {
        let (_, mut history) = replay(Position::new(), &SHUFFLE);

        for ply in (0..=8).rev() {
            history.truncate_to(ply);
            assert_eq!(history.detect_repetition(ply), ply >= 4, "ply {}", ply);
        }
    }

    #[test]
    fn irreversible_moves_start_a_new_span() {
        let moves = ["g1f3", "g8f6", "f3g1", "f6g8", "e2e3", "g8f6", "g1f3", "f6g8", "f3g1"];
        let (_, mut history) = replay(Position::new(), &moves);
        assert_eq!(history.reversible_plies(), 4);

        // the position right after e2e3 is still part of the span
        assert!(history.detect_repetition(4));
        assert!(!history.detect_repetition(3));

        history.truncate_to(8);
        assert!(!history.detect_repetition(100));
    }

    #[test]
    fn cycles_before_the_root_are_ignored() {
        let (positions, history) = replay(Position::new(), &SHUFFLE[..3]);
        assert!(!history.has_game_cycle(&positions[3], 3));
    }

    #[test]
    fn cycles_after_the_root_are_found() {
        let (positions, history) = replay(Position::new(), &SHUFFLE[..4]);
        assert!(history.has_game_cycle(&positions[4], 4));

        // rooted at ply 1, the position g1f3 would recreate lies before the root
        assert!(!history.has_game_cycle(&positions[4], 3));
    }

    #[test]
    fn cycles_before_the_root_count_when_already_repeated() {
        let (positions, history) = replay(Position::new(), &SHUFFLE[..7]);
        // f6g8 recreates the position at ply 4, which repeats ply 0
        assert!(history.has_game_cycle(&positions[7], 0));
    }

    #[test]
    fn cycle_needs_fewer_than_three_plies() {
        let (positions, history) = replay(Position::new(), &SHUFFLE[..2]);
        assert!(!history.has_game_cycle(&positions[2], 100));

        let empty = History::new();
        assert!(!empty.has_game_cycle(&Position::new(), 100));
    }

    #[test]
    fn blocked_moves_do_not_count() {
        // the queen went around the pawn, so it can't return to d1 directly
        let moves = ["a8b8", "d1c2", "b8b7", "c2d3", "b7a8"];

        let pos: Position = "k7/8/8/8/8/8/3P4/3QK3 b - - 0 1".parse().unwrap();
        let (positions, history) = replay(pos, &moves);
        assert!(!history.has_game_cycle(&positions[5], 100));

        let pos: Position = "k7/8/8/8/8/8/8/3QK3 b - - 0 1".parse().unwrap();
        let (positions, history) = replay(pos, &moves);
        assert!(history.has_game_cycle(&positions[5], 100));
    }
}
