//! Contains the cuckoo table of reversible moves
//!
//! Every move of a knight, bishop, rook, queen or king between two squares `a` and `b` changes
//! the Zobrist key of a position by the same amount, regardless of the rest of the board:
//! `psq(c, p, a) ^ psq(c, p, b) ^ black_to_move`. The table maps each of these deltas back to the
//! move that produces it, so a single lookup tells whether two keys are one quiet move apart.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use lazy_static::lazy_static;
use log::{debug, error};
use crate::chess::{Color, Piece, Square, Zobrist};
use crate::chess::bitboard::pseudo_attacks;
use crate::chess::zobrist::{self, Keys};

/// Number of slots in the table
pub const SIZE: usize = 0x4000;

/// Maximum number of entries displaced while inserting a single move
pub const MAX_EVICTIONS: usize = 1000;

/// Pieces whose moves never change anything but their own location
const REVERSIBLE_PIECES: [Piece; 5] = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King];

lazy_static! {
    static ref TABLE: CuckooTable = CuckooTable::build(zobrist::keys());
}

/// Returns the process-wide table, building it on first use
pub fn table() -> &'static CuckooTable {
    &TABLE
}

/// Builds the process-wide table if that hasn't happened yet
pub fn init() {
    lazy_static::initialize(&TABLE);
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A move by a piece of `color` and type `piece` between squares `a` and `b`, in either
/// direction. `a` is always less than `b`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ReversibleMove {
    /// Color of the moving piece
    pub color: Color,
    /// Type of the moving piece
    pub piece: Piece,
    /// The lower of the two squares
    pub a: Square,
    /// The higher of the two squares
    pub b: Square,
}

impl ReversibleMove {
    /// Creates a move between `from` and `to`, putting the squares in order
    pub fn new(color: Color, piece: Piece, from: Square, to: Square) -> ReversibleMove {
        let (a, b) = if from < to { (from, to) } else { (to, from) };
        ReversibleMove { color, piece, a, b }
    }

    /// Returns the amount by which making this move changes a position's key
    pub fn key(&self, keys: &Keys) -> Zobrist {
        Zobrist::from(keys.piece_square(self.color, self.piece, self.a)
            ^ keys.piece_square(self.color, self.piece, self.b)
            ^ keys.black_to_move())
    }
}

impl fmt::Display for ReversibleMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let piece = match self.color {
            Color::White => self.piece.to_string(),
            Color::Black => self.piece.to_string().to_lowercase(),
        };
        write!(f, "{}{}-{}", piece, self.a, self.b)
    }
}

/// Returns an iterator over every reversible move on an empty board, for both colors
pub fn signatures() -> impl Iterator<Item = ReversibleMove> {
    let mut moves = Vec::new();
    for &color in Color::ALL.iter() {
        for &piece in REVERSIBLE_PIECES.iter() {
            for a in Square::all() {
                for b in pseudo_attacks(piece, a) {
                    if a < b {
                        moves.push(ReversibleMove { color, piece, a, b });
                    }
                }
            }
        }
    }
    moves.into_iter()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Slot {
    key: Zobrist,
    mv: ReversibleMove,
}

#[inline]
fn h1(key: Zobrist) -> usize {
    (u64::from(key) & (SIZE as u64 - 1)) as usize
}

#[inline]
fn h2(key: Zobrist) -> usize {
    ((u64::from(key) >> 16) & (SIZE as u64 - 1)) as usize
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A cuckoo hash table mapping key deltas to the reversible moves which produce them
///
/// Each delta can only live in one of two slots, so a lookup is always exactly two probes.
#[derive(Debug, Clone)]
pub struct CuckooTable {
    slots: Vec<Option<Slot>>,
    len: usize,
}

impl CuckooTable {
    /// Builds the table of every reversible move, using `keys` to compute the deltas.
    ///
    /// # Panics
    /// Panics if a move cannot be placed within `MAX_EVICTIONS` displacements.
    pub fn build(keys: &Keys) -> CuckooTable {
        let mut table = CuckooTable {
            slots: vec![None; SIZE],
            len: 0,
        };

        for mv in signatures() {
            table.insert(mv.key(keys), mv);
        }

        debug!("built cuckoo table with {} moves in {} slots", table.len, SIZE);
        table
    }

    fn insert(&mut self, key: Zobrist, mv: ReversibleMove) {
        let mut entry = Slot { key, mv };
        let mut i = h1(key);

        for _ in 0..=MAX_EVICTIONS {
            match self.slots[i].replace(entry) {
                None => {
                    self.len += 1;
                    return;
                },
                Some(evicted) => {
                    // the evicted entry moves to its other slot
                    entry = evicted;
                    i = if i == h1(entry.key) { h2(entry.key) } else { h1(entry.key) };
                },
            }
        }

        error!("cuckoo table insertion exceeded {} evictions at {}", MAX_EVICTIONS, mv);
        panic!("cuckoo table insertion exceeded {} evictions", MAX_EVICTIONS);
    }

    /// Returns the move which changes a position's key by `delta`, if there is one
    pub fn lookup(&self, delta: Zobrist) -> Option<ReversibleMove> {
        [h1(delta), h2(delta)].iter()
            .filter_map(|&i| self.slots[i])
            .find(|slot| slot.key == delta)
            .map(|slot| slot.mv)
    }

    /// Returns the number of moves in the table
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no moves
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
